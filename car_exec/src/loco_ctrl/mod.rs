//! Locomotion control module
//!
//! Takes the motion command chosen by the behaviour module, enforces the
//! car's steering and speed limits, and converts it into the demands the
//! motion driver executes (steer servo angle plus a wheel demand).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod driver;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use cmd::*;
pub use driver::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Received a non-finite motion command: {0:?}")]
    NonFiniteCmd(MotionCommand),
}
