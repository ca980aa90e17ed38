//! Behaviour manager
//!
//! Owns the state machine and encodes the per-tick policy: consume pending
//! commands, apply the obstacle-avoidance override, dispatch to the control
//! law selected by the current state, and raise the events which drive the
//! transitions. One call to [`BehavMgr::step`] per main-loop cycle produces
//! the motion command for that tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use super::{center, goto, search, BehavError, BehavState, Event, Params, SearchCycle, StateMachine};
use crate::calib::Calib;
use crate::loco_ctrl::MotionCommand;
use crate::odometry::Pose;
use crate::shared::BBox;
use util::{
    archive::{Archived, Archiver},
    maths,
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Conversion from the command interface's meters to centimeters.
const M_TO_CM: f64 = 100.0;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Behaviour manager state.
pub struct BehavMgr {
    params: Params,

    /// Calibration data, used for steer limits and the target distance.
    calib: Calib,

    /// The state machine, single source of truth for the active behaviour.
    sm: StateMachine,

    /// Accumulator for the current search episode, `Some` only while in a
    /// state which drives an arc (GotoTarget/Search/LostSearch).
    search_cycle: Option<SearchCycle>,

    /// Time the obstacle-avoidance override first engaged, `None` while not
    /// avoiding. Kept separate from the search cycle timer.
    avoid_start_s: Option<f64>,

    /// Time the current state was entered.
    state_entry_s: f64,

    /// Consecutive ticks without a valid bounding box in Approach/Track.
    lost_count: u32,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input snapshot for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Monotonic time of this tick.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Pending target from the command queue, in meters.
    pub pending_target_m: Option<(f64, f64)>,

    /// True if a stop command is pending.
    pub pending_stop: bool,

    /// Latest tracker bounding box.
    pub bbox: BBox,

    /// Ultrasonic distance, `None` when unavailable. The caller suppresses
    /// the reading while Idle, so the avoidance override cannot fire there.
    pub range_cm: Option<f64>,

    /// Current pose from the localisation module.
    pub pose: Pose,
}

/// Status report for one behaviour tick.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    /// State after this tick's events.
    pub state: BehavState,

    /// Steering demand issued this tick.
    ///
    /// Units: degrees
    pub steer_dem_deg: f64,

    /// Speed demand issued this tick, signed.
    pub speed_dem: i16,

    /// True if the obstacle-avoidance override ran this tick.
    pub avoiding: bool,

    /// Unwrapped rotation of the current search episode.
    ///
    /// Units: degrees
    pub search_rotation_deg: f64,

    /// Consecutive no-detection ticks in Approach/Track.
    pub lost_count: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            state: BehavState::Idle,
            steer_dem_deg: 0.0,
            speed_dem: 0,
            avoiding: false,
            search_rotation_deg: 0.0,
            lost_count: 0,
        }
    }
}

impl Default for BehavMgr {
    fn default() -> Self {
        Self::new(Params::default(), Calib::default())
    }
}

impl BehavMgr {
    /// Build the manager from already loaded parameters and calibration.
    pub fn new(params: Params, calib: Calib) -> Self {
        Self {
            params,
            calib,
            sm: StateMachine::new(),
            search_cycle: None,
            avoid_start_s: None,
            state_entry_s: 0.0,
            lost_count: 0,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// Initialise the manager, loading parameters from the given file.
    pub fn init(
        params_path: &str,
        calib: Calib,
        session: &Session,
    ) -> Result<Self, BehavError> {
        let params: Params = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(BehavError::ParamLoadError(e)),
        };

        let mut mgr = Self::new(params, calib);

        // Create the arch folder for behav
        let mut arch_path = session.arch_root.clone();
        arch_path.push("behav");
        std::fs::create_dir_all(arch_path).unwrap();

        mgr.arch_report = Archiver::from_path(session, "behav/status_report.csv").unwrap();

        Ok(mgr)
    }

    /// The current behavioural state.
    pub fn state(&self) -> BehavState {
        self.sm.state()
    }

    /// The status report from the most recent tick.
    pub fn report(&self) -> StatusReport {
        self.report
    }

    /// Force Idle, clearing all episode data.
    pub fn reset_to_idle(&mut self) {
        self.sm.reset_to_idle();
        self.search_cycle = None;
        self.avoid_start_s = None;
        self.lost_count = 0;
    }

    /// Run one behaviour tick, producing the motion command to issue.
    pub fn step(&mut self, input: &TickInput) -> MotionCommand {
        self.report = StatusReport::default();

        // ---- COMMAND INTAKE ----
        // At most one target and one stop are pending, consumption already
        // cleared the queue

        if let Some((x_m, y_m)) = input.pending_target_m {
            self.dispatch(
                Event::CatLocationReceived {
                    x_cm: x_m * M_TO_CM,
                    y_cm: y_m * M_TO_CM,
                },
                input,
            );
        }

        let cmd = if input.pending_stop {
            // Stop is honoured from every state and issues an immediate stop
            // command, not merely a state change
            self.dispatch(Event::StopCommand, input);
            MotionCommand::stop()
        } else if let Some(cmd) = self.avoidance_override(input) {
            // Something is closer than the hold distance: evade with the
            // oscillating arc regardless of state
            cmd
        } else {
            match self.sm.state() {
                BehavState::Idle => MotionCommand::stop(),
                BehavState::GotoTarget => self.step_goto(input),
                BehavState::Search | BehavState::LostSearch => self.step_search(input),
                BehavState::Approach | BehavState::Track => self.step_follow(input),
            }
        };

        self.report.state = self.sm.state();
        self.report.steer_dem_deg = cmd.steer_deg;
        self.report.speed_dem = cmd.speed;
        self.report.lost_count = self.lost_count;

        cmd
    }

    // ---- STATE STEPS ----

    /// GotoTarget: drive towards the stored target while sweeping the
    /// oscillating arc to scan for the cat on the way.
    fn step_goto(&mut self, input: &TickInput) -> MotionCommand {
        let target_cm = match self.sm.target_cm() {
            Some(t) => t,
            None => {
                // Cannot happen through the transition table, but don't
                // drive anywhere without a target
                warn!("In GotoTarget with no target stored, stopping");
                return MotionCommand::stop();
            }
        };

        let goto = goto::compute_goto(&input.pose, target_cm, self.calib.max_steer_angle_deg);

        if goto.arrived {
            self.dispatch(Event::AtTarget, input);
            return MotionCommand::stop();
        }

        if input.bbox.is_valid() {
            self.dispatch(Event::CatFound(input.bbox), input);
            return MotionCommand::stop();
        }

        if input.time_s - self.state_entry_s > self.params.goto_timeout_s {
            self.dispatch(Event::Timeout, input);
            return MotionCommand::stop();
        }

        // Overlay the scan sweep on the goto steer, clamped back to the
        // steering limit. The scan shares the search arc generator but runs
        // on the episode timer started at state entry.
        let scan_elapsed_s = self
            .search_cycle
            .get_or_insert_with(|| SearchCycle::start(input.time_s, input.pose.heading_deg))
            .elapsed_s(input.time_s);
        let scan = search::compute_search_tick(scan_elapsed_s, self.calib.max_steer_angle_deg);

        let steer_deg = maths::clamp(
            &(goto.steer_deg + scan.steer_deg),
            &-self.calib.max_steer_angle_deg,
            &self.calib.max_steer_angle_deg,
        );

        MotionCommand {
            steer_deg,
            speed: goto.speed,
        }
    }

    /// Search/LostSearch: turn a full circle, watching for the cat.
    fn step_search(&mut self, input: &TickInput) -> MotionCommand {
        if input.bbox.is_valid() {
            self.dispatch(Event::CatFound(input.bbox), input);
            return MotionCommand::stop();
        }

        let cycle = self
            .search_cycle
            .get_or_insert_with(|| SearchCycle::start(input.time_s, input.pose.heading_deg));

        self.report.search_rotation_deg = cycle.accumulate(input.pose.heading_deg);

        if cycle.complete() {
            self.dispatch(Event::SearchCycleDone, input);
            return MotionCommand::stop();
        }

        search::compute_full_circle_tick(self.calib.max_steer_angle_deg)
    }

    /// Approach/Track: keep the cat centred and at the holding distance.
    fn step_follow(&mut self, input: &TickInput) -> MotionCommand {
        if !input.bbox.is_valid() {
            self.lost_count += 1;

            if self.lost_count >= self.params.lost_threshold {
                self.dispatch(Event::CatLost, input);
            }

            return MotionCommand::stop();
        }

        self.lost_count = 0;

        let cmd = center::compute_center(
            &input.bbox,
            self.params.frame_width_px,
            self.params.frame_height_px,
            input.range_cm,
            self.calib.target_distance_cm,
            self.calib.max_steer_angle_deg,
        );

        // Approach hands over to Track once the range sensor reports the
        // car inside the hold band
        if self.sm.state() == BehavState::Approach {
            if let Some(range_cm) = input.range_cm {
                if range_cm <= self.calib.target_distance_cm + center::DISTANCE_DEADBAND_CM {
                    self.dispatch(Event::DistanceAtHold, input);
                }
            }
        }

        cmd
    }

    // ---- HELPERS ----

    /// If something is closer than the calibrated target distance, produce
    /// the evading arc command. Runs its own timer, independent of the
    /// search episode timer.
    fn avoidance_override(&mut self, input: &TickInput) -> Option<MotionCommand> {
        let range_cm = input.range_cm?;

        if range_cm < self.calib.target_distance_cm {
            let start_s = *self.avoid_start_s.get_or_insert(input.time_s);
            self.report.avoiding = true;

            Some(search::compute_search_tick(
                input.time_s - start_s,
                self.calib.max_steer_angle_deg,
            ))
        } else {
            self.avoid_start_s = None;
            None
        }
    }

    /// Dispatch an event and perform the entry bookkeeping if the state
    /// changed.
    fn dispatch(&mut self, event: Event, input: &TickInput) {
        let prev_state = self.sm.state();
        let new_state = self.sm.dispatch(event);

        if new_state != prev_state {
            self.on_enter(new_state, input);
        }
    }

    /// Entry bookkeeping for a newly entered state.
    fn on_enter(&mut self, state: BehavState, input: &TickInput) {
        self.state_entry_s = input.time_s;
        self.lost_count = 0;

        // The search accumulator restarts for every arc-driving state and
        // is dropped for the others
        match state {
            BehavState::GotoTarget | BehavState::Search | BehavState::LostSearch => {
                self.search_cycle = Some(SearchCycle::start(input.time_s, input.pose.heading_deg));
            }
            _ => self.search_cycle = None,
        }
    }
}

impl Archived for BehavMgr {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)?;

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
