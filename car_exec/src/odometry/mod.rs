//! Odometry module
//!
//! Maintains the car's best estimate of position and heading by dead
//! reckoning: commanded speed and steering angle are integrated over the
//! measured tick time using a bicycle kinematic model. The pose lives here
//! and nowhere else - control laws and the status reporting read it, only
//! [`Odometry::update`] mutates it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
