//! Parameters structure for the behaviour module

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the behaviour manager.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    /// Time allowed in GotoTarget before giving up and searching in place.
    ///
    /// Units: seconds
    #[serde(default = "default_goto_timeout_s")]
    pub goto_timeout_s: f64,

    /// Number of consecutive ticks without a valid bounding box before the
    /// cat is considered lost.
    #[serde(default = "default_lost_threshold")]
    pub lost_threshold: u32,

    /// Width of the camera frame the tracker boxes refer to.
    ///
    /// Units: pixels
    #[serde(default = "default_frame_width_px")]
    pub frame_width_px: f64,

    /// Height of the camera frame the tracker boxes refer to.
    ///
    /// Units: pixels
    #[serde(default = "default_frame_height_px")]
    pub frame_height_px: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            goto_timeout_s: default_goto_timeout_s(),
            lost_threshold: default_lost_threshold(),
            frame_width_px: default_frame_width_px(),
            frame_height_px: default_frame_height_px(),
        }
    }
}

// ---------------------------------------------------------------------------
// DEFAULTS
// ---------------------------------------------------------------------------

fn default_goto_timeout_s() -> f64 {
    30.0
}

fn default_lost_threshold() -> u32 {
    15
}

fn default_frame_width_px() -> f64 {
    640.0
}

fn default_frame_height_px() -> f64 {
    480.0
}
