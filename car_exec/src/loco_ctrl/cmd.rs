//! Commands passed into LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command to move the car for one tick.
///
/// Speed is signed throughout the software: positive drives forward,
/// negative reverses, zero stops. The split into separate forward/backward
/// driver calls happens only at the driver boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MotionCommand {

    /// The steering angle to command.
    ///
    /// Units: degrees, positive = left
    pub steer_deg: f64,

    /// The speed to command, within [-100, 100].
    pub speed: i16,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCommand {

    /// A full stop with centred steering.
    pub fn stop() -> Self {
        Self {
            steer_deg: 0.0,
            speed: 0,
        }
    }

    /// True if this command demands no wheel motion.
    pub fn is_stop(&self) -> bool {
        self.speed == 0
    }

    /// Determine if the command is valid (i.e. contains finite values).
    pub fn is_valid(&self) -> bool {
        self.steer_deg.is_finite()
    }
}
