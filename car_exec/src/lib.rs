//! # Car library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests and benches) to access items defined inside the car crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Behaviour module - the state machine and control laws which chase the cat
pub mod behav;

/// Calibration data - measured speed/steer/distance characteristics of the car
pub mod calib;

/// Command intake - single-slot pending command queue fed by external sources
pub mod commands;

/// Data store - owned aggregate of all module states and cyclic data
pub mod data_store;

/// Localisation module - provides the car with an idea of where it is in the world
pub mod loc;

/// Locomotion control module - converts motion commands into driver demands
pub mod loco_ctrl;

/// Odometry module - bicycle-model dead reckoning from commanded motion
pub mod odometry;

/// Range sensor - ultrasonic distance readings with validity enforcement
pub mod range_sensor;

/// Shared snapshot store - lock-per-resource values exchanged with workers
pub mod shared;

/// Worker stubs - stand-ins for the camera/tracker/detector threads
pub mod workers;
