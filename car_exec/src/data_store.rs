//! # Data Store

use crate::{behav, calib::Calib, loc::LocMgr, loco_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
///
/// Owns every module state and the cyclic data passed between them. There
/// is no process-wide state anywhere else, the store is passed by reference
/// through the main loop.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Calibration
    pub calib: Calib,

    // Localisation
    pub loc_mgr: LocMgr,

    // Behaviour
    pub behav_mgr: behav::BehavMgr,
    pub behav_cmd: loco_ctrl::MotionCommand,

    // LocoCtrl
    pub loco_ctrl: loco_ctrl::LocoCtrl,
    pub loco_ctrl_input: loco_ctrl::InputData,
    pub loco_ctrl_output: loco_ctrl::OutputData,
    pub loco_ctrl_status_rpt: loco_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;

        self.behav_cmd = loco_ctrl::MotionCommand::stop();
        self.loco_ctrl_input = loco_ctrl::InputData::default();
        self.loco_ctrl_output = loco_ctrl::OutputData::default();
        self.loco_ctrl_status_rpt = loco_ctrl::StatusReport::default();
    }
}
