//! # Behaviour module
//!
//! This module implements the cat-chasing behaviour of the car: a finite
//! state machine selecting which control law runs each tick, the control
//! laws themselves, and the per-tick policy which connects them to the
//! sensors and the command intake. The states are:
//!
//! - `Idle` - The car is stationary, waiting for a cat location.
//! - `GotoTarget` - Driving towards a commanded cat location, scanning for
//!   the cat on the way.
//! - `Search` - Turning a full circle on the spot looking for the cat.
//! - `Approach` - The cat is in view, closing in on it.
//! - `Track` - At holding distance, keeping the cat centred.
//! - `LostSearch` - The cat was lost from view, searching again.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod center;
mod goto;
mod mgr;
mod params;
mod search;
mod state_machine;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use center::*;
pub use goto::*;
pub use mgr::*;
pub use params::Params;
pub use search::*;
pub use state_machine::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the behaviour module.
#[derive(Debug, thiserror::Error)]
pub enum BehavError {
    #[error("Failed to load BehavMgr parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
