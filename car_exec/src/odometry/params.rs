//! Parameters structure for Odometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the odometry integrator.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// Distance between the front and rear axles, the characteristic length
    /// of the bicycle model.
    ///
    /// Units: centimeters
    #[serde(default = "default_wheelbase_cm")]
    pub wheelbase_cm: f64,

    // ---- NUMERICS ----

    /// Steering angles below this magnitude are integrated as straight-line
    /// motion. Keeps the turn radius calculation away from tan(0).
    ///
    /// Units: degrees
    #[serde(default = "default_straight_steer_threshold_deg")]
    pub straight_steer_threshold_deg: f64,

    /// Velocity per speed unit assumed when no measured velocity is
    /// supplied.
    ///
    /// Units: (centimeters/second) per speed unit
    #[serde(default = "default_fallback_cm_per_sec_per_speed")]
    pub fallback_cm_per_sec_per_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            wheelbase_cm: default_wheelbase_cm(),
            straight_steer_threshold_deg: default_straight_steer_threshold_deg(),
            fallback_cm_per_sec_per_speed: default_fallback_cm_per_sec_per_speed(),
        }
    }
}

// ---------------------------------------------------------------------------
// DEFAULTS
// ---------------------------------------------------------------------------

fn default_wheelbase_cm() -> f64 {
    11.4
}

fn default_straight_steer_threshold_deg() -> f64 {
    0.5
}

fn default_fallback_cm_per_sec_per_speed() -> f64 {
    0.5
}
