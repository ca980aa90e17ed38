//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- CAPABILITIES ----

    /// Maximum steer servo absolute position (symmetric limit).
    ///
    /// Units: degrees
    #[serde(default = "default_max_steer_angle_deg")]
    pub max_steer_angle_deg: f64,

    /// Maximum speed magnitude the driver accepts.
    #[serde(default = "default_max_speed")]
    pub max_speed: i16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            max_steer_angle_deg: default_max_steer_angle_deg(),
            max_speed: default_max_speed(),
        }
    }
}

// ---------------------------------------------------------------------------
// DEFAULTS
// ---------------------------------------------------------------------------

fn default_max_steer_angle_deg() -> f64 {
    25.0
}

fn default_max_speed() -> i16 {
    100
}
