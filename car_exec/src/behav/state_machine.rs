//! Behavioural state machine
//!
//! Single source of truth for the cat-chasing state. Events drive the
//! transitions through a fixed table; an event with no entry for the
//! current state leaves the state unchanged. No hardware access here.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use nalgebra::Point2;
use serde::Serialize;
use std::fmt::Display;

// Internal
use crate::shared::BBox;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The behavioural states of the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BehavState {
    Idle,
    GotoTarget,
    Search,
    Approach,
    Track,
    LostSearch,
}

/// Events driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A cat location was commanded. Payload in centimeters, odometry frame.
    CatLocationReceived { x_cm: f64, y_cm: f64 },

    /// The car arrived at the commanded location.
    AtTarget,

    /// The car gave up driving to the commanded location.
    Timeout,

    /// The tracker reported a valid bounding box.
    CatFound(BBox),

    /// The tracker lost the cat for too many consecutive ticks.
    CatLost,

    /// The range sensor reports the car is at holding distance.
    DistanceAtHold,

    /// An external stop was commanded.
    StopCommand,

    /// A full search circle completed without finding the cat.
    SearchCycleDone,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The behavioural state machine.
pub struct StateMachine {
    state: BehavState,

    /// Target position stored on `CatLocationReceived`.
    ///
    /// Units: centimeters, odometry frame
    target_cm: Option<Point2<f64>>,

    /// Bounding box stored on the most recent `CatFound`.
    last_bbox: Option<BBox>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: BehavState::Idle,
            target_cm: None,
            last_bbox: None,
        }
    }

    /// The current state.
    pub fn state(&self) -> BehavState {
        self.state
    }

    /// The stored target, if one has been commanded.
    pub fn target_cm(&self) -> Option<Point2<f64>> {
        self.target_cm
    }

    /// The bounding box from the most recent `CatFound`.
    pub fn last_bbox(&self) -> Option<BBox> {
        self.last_bbox
    }

    /// Process an event, updating the state and any stored payload.
    ///
    /// Returns the (possibly unchanged) new state. An event undefined for
    /// the current state leaves everything untouched.
    pub fn dispatch(&mut self, event: Event) -> BehavState {
        let new_state = match transition(self.state, event) {
            Some(s) => s,
            None => return self.state,
        };

        if new_state != self.state {
            info!("Behav state change: {} -> {} ({:?})", self.state, new_state, event);
        }
        self.state = new_state;

        match event {
            Event::CatLocationReceived { x_cm, y_cm } => {
                self.target_cm = Some(Point2::new(x_cm, y_cm));
            }
            Event::CatFound(bbox) => {
                self.last_bbox = Some(bbox);
            }
            _ => (),
        }

        // A target only lives while the chase it started is running
        if self.state == BehavState::Idle {
            self.target_cm = None;
        }

        self.state
    }

    /// Force Idle and clear the stored target and bounding box.
    pub fn reset_to_idle(&mut self) {
        self.state = BehavState::Idle;
        self.target_cm = None;
        self.last_bbox = None;
    }
}

impl Display for BehavState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BehavState::Idle => write!(f, "Idle"),
            BehavState::GotoTarget => write!(f, "GotoTarget"),
            BehavState::Search => write!(f, "Search"),
            BehavState::Approach => write!(f, "Approach"),
            BehavState::Track => write!(f, "Track"),
            BehavState::LostSearch => write!(f, "LostSearch"),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The transition table.
///
/// Returns the new state for a `(state, event)` pair, or `None` for pairs
/// with no defined transition. There are no guards hidden here beyond which
/// events the caller chooses to raise.
fn transition(state: BehavState, event: Event) -> Option<BehavState> {
    use BehavState::*;
    use Event::*;

    Some(match (state, event) {
        (Idle, CatLocationReceived { .. }) => GotoTarget,
        (Idle, StopCommand) => Idle,

        (GotoTarget, AtTarget) => Search,
        (GotoTarget, CatFound(_)) => Approach,
        (GotoTarget, Timeout) => Search,
        (GotoTarget, StopCommand) => Idle,

        (Search, CatFound(_)) => Approach,
        (Search, SearchCycleDone) => Idle,
        (Search, StopCommand) => Idle,

        (Approach, DistanceAtHold) => Track,
        (Approach, CatLost) => LostSearch,
        (Approach, StopCommand) => Idle,

        (Track, CatLost) => LostSearch,
        (Track, StopCommand) => Idle,

        (LostSearch, CatFound(_)) => Approach,
        (LostSearch, SearchCycleDone) => Idle,
        (LostSearch, Timeout) => Search,
        (LostSearch, StopCommand) => Idle,

        _ => return None,
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn valid_bbox() -> BBox {
        BBox {
            x: 100.0,
            y: 100.0,
            w: 50.0,
            h: 40.0,
            valid: true,
        }
    }

    #[test]
    fn test_idle_to_goto_on_cat_location() {
        let mut sm = StateMachine::new();

        let state = sm.dispatch(Event::CatLocationReceived {
            x_cm: 100.0,
            y_cm: 200.0,
        });

        assert_eq!(state, BehavState::GotoTarget);
        assert_eq!(sm.target_cm(), Some(Point2::new(100.0, 200.0)));
    }

    #[test]
    fn test_goto_to_search_on_at_target() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });

        assert_eq!(sm.dispatch(Event::AtTarget), BehavState::Search);
    }

    #[test]
    fn test_goto_to_search_on_timeout() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });

        assert_eq!(sm.dispatch(Event::Timeout), BehavState::Search);
    }

    #[test]
    fn test_goto_to_approach_on_cat_found() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });

        let state = sm.dispatch(Event::CatFound(valid_bbox()));

        assert_eq!(state, BehavState::Approach);
        assert_eq!(sm.last_bbox(), Some(valid_bbox()));
    }

    #[test]
    fn test_search_to_approach_on_cat_found() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
        sm.dispatch(Event::AtTarget);

        assert_eq!(
            sm.dispatch(Event::CatFound(valid_bbox())),
            BehavState::Approach
        );
    }

    #[test]
    fn test_approach_to_track_on_distance_hold() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
        sm.dispatch(Event::CatFound(valid_bbox()));

        assert_eq!(sm.dispatch(Event::DistanceAtHold), BehavState::Track);
    }

    #[test]
    fn test_track_to_lost_search_on_cat_lost() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
        sm.dispatch(Event::CatFound(valid_bbox()));
        sm.dispatch(Event::DistanceAtHold);

        assert_eq!(sm.dispatch(Event::CatLost), BehavState::LostSearch);
    }

    #[test]
    fn test_search_cycle_done_goes_to_idle() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
        sm.dispatch(Event::AtTarget);

        assert_eq!(sm.dispatch(Event::SearchCycleDone), BehavState::Idle);
    }

    #[test]
    fn test_lost_search_cycle_done_goes_to_idle() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
        sm.dispatch(Event::CatFound(valid_bbox()));
        sm.dispatch(Event::CatLost);

        assert_eq!(sm.state(), BehavState::LostSearch);
        assert_eq!(sm.dispatch(Event::SearchCycleDone), BehavState::Idle);
    }

    #[test]
    fn test_lost_search_timeout_goes_to_search() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
        sm.dispatch(Event::CatFound(valid_bbox()));
        sm.dispatch(Event::CatLost);

        assert_eq!(sm.dispatch(Event::Timeout), BehavState::Search);
    }

    #[test]
    fn test_stop_from_any_state_goes_to_idle() {
        // Build each of the six states and check StopCommand returns to Idle
        let builders: Vec<fn(&mut StateMachine)> = vec![
            |_| (),
            |sm| {
                sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
            },
            |sm| {
                sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
                sm.dispatch(Event::AtTarget);
            },
            |sm| {
                sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
                sm.dispatch(Event::CatFound(valid_bbox()));
            },
            |sm| {
                sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
                sm.dispatch(Event::CatFound(valid_bbox()));
                sm.dispatch(Event::DistanceAtHold);
            },
            |sm| {
                sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });
                sm.dispatch(Event::CatFound(valid_bbox()));
                sm.dispatch(Event::CatLost);
            },
        ];

        for build in builders {
            let mut sm = StateMachine::new();
            build(&mut sm);

            assert_eq!(sm.dispatch(Event::StopCommand), BehavState::Idle);
        }
    }

    #[test]
    fn test_unknown_event_leaves_state_unchanged() {
        let mut sm = StateMachine::new();

        // AtTarget is not defined for Idle
        assert_eq!(sm.dispatch(Event::AtTarget), BehavState::Idle);

        sm.dispatch(Event::CatLocationReceived { x_cm: 0.0, y_cm: 0.0 });

        // SearchCycleDone is not defined for GotoTarget
        assert_eq!(sm.dispatch(Event::SearchCycleDone), BehavState::GotoTarget);
    }

    #[test]
    fn test_target_cleared_on_return_to_idle() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 50.0, y_cm: 60.0 });

        assert!(sm.target_cm().is_some());

        sm.dispatch(Event::StopCommand);

        assert_eq!(sm.target_cm(), None);
    }

    #[test]
    fn test_reset_to_idle_clears_all() {
        let mut sm = StateMachine::new();
        sm.dispatch(Event::CatLocationReceived { x_cm: 50.0, y_cm: 60.0 });
        sm.dispatch(Event::CatFound(valid_bbox()));

        sm.reset_to_idle();

        assert_eq!(sm.state(), BehavState::Idle);
        assert_eq!(sm.target_cm(), None);
        assert_eq!(sm.last_bbox(), None);
    }
}
