//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{MotionCommand, Params, WheelDem};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state
#[derive(Default)]
pub struct LocoCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) current_cmd: Option<MotionCommand>,
    arch_current_cmd: Archiver,

    pub(crate) output: Option<OutputData>,
}

/// Input data to Locomotion Control.
#[derive(Clone, Copy, Default)]
pub struct InputData {
    /// The motion command to be executed, or `None` if there is no new
    /// command on this cycle. No command demands a stop.
    pub cmd: Option<MotionCommand>,
}

/// Output demands from LocoCtrl that the motion driver must execute.
#[derive(Clone, Copy, Serialize, Debug, PartialEq)]
pub struct OutputData {
    /// Steer servo absolute position demand.
    ///
    /// Units: degrees, positive = left
    pub steer_servo_deg: f64,

    /// Wheel motion demand.
    pub wheel_dem: WheelDem,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the commanded steer angle had to be limited.
    pub steer_limited: bool,

    /// True if the commanded speed had to be limited.
    pub speed_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            steer_servo_deg: 0.0,
            wheel_dem: WheelDem::Stop,
        }
    }
}

impl State for LocoCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = super::LocoCtrlError;

    /// Initialise the LocoCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e)
        };

        // Create the arch folder for loco_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("loco_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "loco_ctrl/status_report.csv"
        ).unwrap();
        self.arch_current_cmd = Archiver::from_path(
            session, "loco_ctrl/current_cmd.csv"
        ).unwrap();

        Ok(())
    }

    /// Perform cyclic processing of Locomotion Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // A tick with no command demands a stop: the wheels are halted but
        // the steer servo holds its previous position.
        let cmd = match input_data.cmd {
            Some(c) => c,
            None => {
                let output = match self.output {
                    Some(po) => OutputData {
                        wheel_dem: WheelDem::Stop,
                        ..po
                    },
                    None => OutputData::default(),
                };

                self.output = Some(output);

                return Ok((output, self.report));
            }
        };

        if !cmd.is_valid() {
            return Err(super::LocoCtrlError::NonFiniteCmd(cmd));
        }

        self.current_cmd = Some(cmd);

        // Enforce the limits in the car's hardware capabilities, raising the
        // corresponding flag in the status report when a limit is hit.
        let mut steer_servo_deg = cmd.steer_deg;
        if steer_servo_deg > self.params.max_steer_angle_deg {
            steer_servo_deg = self.params.max_steer_angle_deg;
            self.report.steer_limited = true;
        }
        if steer_servo_deg < -self.params.max_steer_angle_deg {
            steer_servo_deg = -self.params.max_steer_angle_deg;
            self.report.steer_limited = true;
        }

        let mut speed = cmd.speed;
        if speed > self.params.max_speed {
            speed = self.params.max_speed;
            self.report.speed_limited = true;
        }
        if speed < -self.params.max_speed {
            speed = -self.params.max_speed;
            self.report.speed_limited = true;
        }

        // Map the signed speed onto the driver's wheel demand
        let wheel_dem = if speed > 0 {
            WheelDem::Forward(speed as u8)
        } else if speed < 0 {
            WheelDem::Backward((-speed) as u8)
        } else {
            WheelDem::Stop
        };

        let output = OutputData {
            steer_servo_deg,
            wheel_dem,
        };

        trace!(
            "LocoCtrl output:\n    steer: {:?}\n    wheel: {:?}",
            output.steer_servo_deg,
            output.wheel_dem
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for LocoCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_current_cmd.serialise(self.current_cmd)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
