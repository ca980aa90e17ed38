//! Motion driver interface
//!
//! Thin boundary to the car's motor/servo hardware. The real hardware
//! binding is injected at startup; the stub driver lets the rest of the
//! software run without it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::OutputData;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Wheel motion demand for the driver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum WheelDem {
    /// Bring the wheels to a full stop.
    Stop,

    /// Drive forward at the contained speed (0-100).
    Forward(u8),

    /// Drive backward at the contained speed (0-100).
    Backward(u8),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The motion driver executing LocoCtrl's demands.
pub trait MotionDriver {
    /// Stop all wheel motion. Shall never fail to bring the car to a stop.
    fn stop(&mut self);

    /// Drive forward at the given speed (0-100).
    fn forward(&mut self, speed: u8);

    /// Drive backward at the given speed (0-100).
    fn backward(&mut self, speed: u8);

    /// Set the steering servo angle in degrees, positive = left.
    fn set_steer(&mut self, angle_deg: f64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Driver used when no hardware is attached, logs demands at trace level.
#[derive(Default)]
pub struct StubDriver;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a set of LocoCtrl output demands on the given driver.
pub fn exec_dems(driver: &mut dyn MotionDriver, dems: &OutputData) {
    driver.set_steer(dems.steer_servo_deg);

    match dems.wheel_dem {
        WheelDem::Stop => driver.stop(),
        WheelDem::Forward(speed) => driver.forward(speed),
        WheelDem::Backward(speed) => driver.backward(speed),
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionDriver for StubDriver {
    fn stop(&mut self) {
        trace!("StubDriver: stop");
    }

    fn forward(&mut self, speed: u8) {
        trace!("StubDriver: forward({})", speed);
    }

    fn backward(&mut self, speed: u8) {
        trace!("StubDriver: backward({})", speed);
    }

    fn set_steer(&mut self, angle_deg: f64) {
        trace!("StubDriver: set_steer({})", angle_deg);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
