//! Main car-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Command intake (pending target / stop)
//!         - Sensor snapshot acquisition (tracker bbox, ultrasonic range)
//!         - Behaviour processing (state machine + active control law)
//!         - Locomotion control processing
//!         - Motion driver execution
//!         - Odometry integration and pose publication
//!
//! # Modules
//!
//! All cyclically processed modules (e.g. `loco_ctrl`) shall meet the
//! following requirements:
//!     1. Provide a public struct implementing the `util::module::State`
//!        trait, or an equivalent owned init/step pair.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use car_lib::{
    behav::{BehavMgr, BehavState, TickInput},
    calib::Calib,
    commands::{self, CommandQueue},
    data_store::DataStore,
    loc::{LocMgr, LocMgrParams},
    loco_ctrl::{self, StubDriver},
    range_sensor::RangeSensor,
    shared::SharedState,
    workers,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 1.0 / 30.0;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("car_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Cat-Car Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let calib: Calib = util::params::load("calib.toml").wrap_err("Could not load calibration")?;
    let loc_params: LocMgrParams =
        util::params::load("loc.toml").wrap_err("Could not load localisation params")?;

    info!("Exec parameters loaded");

    // ---- COMMAND INTAKE ----

    let command_queue = CommandQueue::new();

    // An optional single argument gives a file holding an initial target
    // ("x y" in meters), queued before the loop starts.
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    if args.len() == 2 {
        match commands::read_target_from_file(&args[1]) {
            Some((x_m, y_m)) => {
                info!("Initial target ({}, {}) m loaded from \"{}\"", x_m, y_m, &args[1]);
                command_queue.set_target(x_m, y_m);
            }
            None => {
                return Err(eyre!("Could not read a target from \"{}\"", &args[1]));
            }
        }
    } else if args.len() > 2 {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();
    ds.calib = calib.clone();

    // ---- INITIALISE MODULES ----

    ds.loc_mgr =
        LocMgr::init(loc_params.source, "odometry.toml").wrap_err("Failed to initialise LocMgr")?;
    ds.loc_mgr.reset(0.0, 0.0, 0.0);
    info!("LocMgr init complete");

    ds.loco_ctrl
        .init("loco_ctrl.toml", &session)
        .wrap_err("Failed to initialise LocoCtrl")?;
    info!("LocoCtrl init complete");

    ds.behav_mgr = BehavMgr::init("behav.toml", calib.clone(), &session)
        .wrap_err("Failed to initialise BehavMgr")?;
    info!("BehavMgr init complete");

    info!("Module initialisation complete\n");

    // ---- START WORKERS ----

    let shared = Arc::new(SharedState::new());
    let worker_stop = Arc::new(AtomicBool::new(false));

    let _workers = workers::spawn(shared.clone(), worker_stop.clone())
        .wrap_err("Failed to spawn the worker threads")?;

    info!("Workers started");

    // Range sensor and motion driver. No hardware bindings are injected
    // here yet, both run as stubs.
    let mut range_sensor = RangeSensor::new();
    let mut driver = StubDriver::default();

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut last_odom_instant = Instant::now();

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        // Poll pending commands, cleared on consumption
        let pending = command_queue.poll();

        // Snapshot of the tracker's bounding box
        let bbox = shared.get_bbox_tracker();

        // Ultrasonic reading, suppressed while Idle
        let range_cm = if ds.behav_mgr.state() != BehavState::Idle {
            range_sensor.distance_cm()
        } else {
            None
        };

        // ---- BEHAVIOUR PROCESSING ----

        let tick_input = TickInput {
            time_s: session::get_elapsed_seconds(),
            pending_target_m: pending.target_m,
            pending_stop: pending.stop,
            bbox,
            range_cm,
            pose: ds.loc_mgr.pose(),
        };

        ds.behav_cmd = ds.behav_mgr.step(&tick_input);

        // ---- CONTROL ALGORITHM PROCESSING ----

        // LocoCtrl processing
        ds.loco_ctrl_input = loco_ctrl::InputData {
            cmd: Some(ds.behav_cmd),
        };

        match ds.loco_ctrl.proc(&ds.loco_ctrl_input) {
            Ok((o, r)) => {
                ds.loco_ctrl_output = o;
                ds.loco_ctrl_status_rpt = r;
            }
            Err(e) => {
                // A bad command means this tick's demand is dropped, the
                // driver output below falls back to the cleared (stop) dems
                warn!("Error during LocoCtrl processing: {}", e)
            }
        };

        // Execute the demands on the motion driver
        loco_ctrl::exec_dems(&mut driver, &ds.loco_ctrl_output);

        // ---- ODOMETRY ----

        // Integrate the issued command over the measured elapsed time
        let odom_dt_s = last_odom_instant.elapsed().as_secs_f64();
        last_odom_instant = Instant::now();

        let cm_per_sec = ds.calib.cm_per_sec(ds.behav_cmd.speed);
        ds.loc_mgr.update(
            odom_dt_s,
            ds.behav_cmd.speed,
            ds.behav_cmd.steer_deg,
            Some(cm_per_sec),
        );

        // Publish the pose for external display
        shared.set_odometry(&ds.loc_mgr.pose());

        // ---- ARCHIVES & STATUS ----

        if ds.is_1_hz_cycle {
            use util::archive::Archived;

            if let Err(e) = ds.behav_mgr.write() {
                warn!("Could not archive BehavMgr: {}", e);
            }
            if let Err(e) = ds.loco_ctrl.write() {
                warn!("Could not archive LocoCtrl: {}", e);
            }

            let pose = ds.loc_mgr.pose();
            info!(
                "{}: pose ({:.1}, {:.1}) cm, heading {:.1} deg, range {:?}",
                ds.behav_mgr.state(),
                pose.position_cm.x,
                pose.position_cm.y,
                pose.heading_deg,
                range_sensor.last_distance_cm()
            );
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}
