//! Search controllers
//!
//! Two arc generators used to scan for the cat: an oscillating arc which
//! alternates full left and full right every couple of seconds, and a
//! full-circle arc which holds maximum left steer until the caller has
//! accumulated a complete turn. Both are stateless, driven by externally
//! tracked elapsed time; the [`SearchCycle`] accumulator carries that
//! tracking for one search episode.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::loco_ctrl::MotionCommand;
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time spent on each side of the oscillating arc.
///
/// Units: seconds
pub const ARC_DURATION_S: f64 = 2.0;

/// Speed while searching.
pub const SEARCH_SPEED: i16 = 20;

/// Rotation at which a full-circle search is complete.
///
/// Units: degrees
pub const FULL_CIRCLE_DEG: f64 = 360.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Per-search-episode accumulator.
///
/// Created when a searching state is entered and discarded on exit. Tracks
/// the elapsed time driving the arc generators and the unwrapped cumulative
/// rotation for the full-circle termination condition.
#[derive(Debug, Clone, Copy)]
pub struct SearchCycle {
    /// Time the episode started.
    ///
    /// Units: seconds, same clock the caller steps with
    start_time_s: f64,

    /// Heading at the previous accumulation.
    ///
    /// Units: degrees
    prev_heading_deg: f64,

    /// Unwrapped cumulative rotation since the episode started. Positive =
    /// anticlockwise.
    ///
    /// Units: degrees
    accum_rotation_deg: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Steer and speed for the current moment of the oscillating search arc.
///
/// Alternates: the first [`ARC_DURATION_S`] steers left at the limit, the
/// next steers right, and so on.
pub fn compute_search_tick(cycle_s: f64, steer_limit_deg: f64) -> MotionCommand {
    let arc_index = (cycle_s / ARC_DURATION_S) as i64;
    let direction = if arc_index % 2 == 0 { 1.0 } else { -1.0 };

    MotionCommand {
        steer_deg: direction * steer_limit_deg,
        speed: SEARCH_SPEED,
    }
}

/// Steer and speed for a full-circle search: maximum left steer at search
/// speed.
///
/// Drive this until the caller's [`SearchCycle`] reports a complete turn,
/// then stop and signal cycle completion.
pub fn compute_full_circle_tick(steer_limit_deg: f64) -> MotionCommand {
    MotionCommand {
        steer_deg: steer_limit_deg,
        speed: SEARCH_SPEED,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SearchCycle {
    /// Start a new episode at the given time and heading.
    pub fn start(time_s: f64, heading_deg: f64) -> Self {
        Self {
            start_time_s: time_s,
            prev_heading_deg: heading_deg,
            accum_rotation_deg: 0.0,
        }
    }

    /// Seconds since the episode started.
    pub fn elapsed_s(&self, time_s: f64) -> f64 {
        time_s - self.start_time_s
    }

    /// Fold the current heading into the unwrapped rotation total.
    ///
    /// Uses the shortest-path delta between consecutive headings, so as long
    /// as the caller accumulates at least twice per half turn the total
    /// never aliases.
    pub fn accumulate(&mut self, heading_deg: f64) -> f64 {
        let delta = maths::ang_dist_deg(self.prev_heading_deg, heading_deg);
        self.accum_rotation_deg += delta;
        self.prev_heading_deg = heading_deg;

        self.accum_rotation_deg
    }

    /// The unwrapped cumulative rotation so far.
    pub fn rotation_deg(&self) -> f64 {
        self.accum_rotation_deg
    }

    /// True once a full circle has been turned, in either direction.
    pub fn complete(&self) -> bool {
        self.accum_rotation_deg.abs() >= FULL_CIRCLE_DEG
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_search_speed_constant() {
        assert_eq!(compute_search_tick(0.0, 25.0).speed, SEARCH_SPEED);
        assert_eq!(compute_search_tick(7.3, 25.0).speed, SEARCH_SPEED);
    }

    #[test]
    fn test_first_arc_left() {
        assert_eq!(compute_search_tick(0.0, 25.0).steer_deg, 25.0);
        assert_eq!(compute_search_tick(0.5, 25.0).steer_deg, 25.0);
        assert_eq!(compute_search_tick(1.99, 25.0).steer_deg, 25.0);
    }

    #[test]
    fn test_second_arc_right() {
        assert_eq!(compute_search_tick(2.0, 25.0).steer_deg, -25.0);
        assert_eq!(compute_search_tick(3.0, 25.0).steer_deg, -25.0);
        assert_eq!(compute_search_tick(3.99, 25.0).steer_deg, -25.0);
    }

    #[test]
    fn test_third_arc_left_again() {
        assert_eq!(compute_search_tick(4.0, 25.0).steer_deg, 25.0);
        assert_eq!(compute_search_tick(5.0, 25.0).steer_deg, 25.0);
    }

    #[test]
    fn test_full_circle_steer_left() {
        let cmd = compute_full_circle_tick(25.0);

        assert_eq!(cmd.steer_deg, 25.0);
        assert_eq!(cmd.speed, SEARCH_SPEED);
    }

    #[test]
    fn test_cycle_elapsed() {
        let cycle = SearchCycle::start(10.0, 0.0);

        assert_eq!(cycle.elapsed_s(12.5), 2.5);
    }

    #[test]
    fn test_cycle_accumulates_across_wrap() {
        let mut cycle = SearchCycle::start(0.0, 170.0);

        // Turning left through the 180 wrap must accumulate +20, not -340
        assert_eq!(cycle.accumulate(-170.0), 20.0);
        assert_eq!(cycle.accumulate(-150.0), 40.0);
    }

    #[test]
    fn test_cycle_completes_after_full_turn() {
        let mut cycle = SearchCycle::start(0.0, 0.0);

        // Quarter turns, anticlockwise
        let mut heading = 0.0f64;
        for _ in 0..3 {
            heading = util::maths::normalize_angle_deg(heading + 90.0);
            cycle.accumulate(heading);
            assert!(!cycle.complete());
        }

        heading = util::maths::normalize_angle_deg(heading + 90.0);
        cycle.accumulate(heading);
        assert!(cycle.complete());
        assert_eq!(cycle.rotation_deg(), 360.0);
    }

    #[test]
    fn test_cycle_completes_clockwise_too() {
        let mut cycle = SearchCycle::start(0.0, 0.0);

        let mut heading = 0.0f64;
        for _ in 0..4 {
            heading = util::maths::normalize_angle_deg(heading - 90.0);
            cycle.accumulate(heading);
        }

        assert!(cycle.complete());
        assert_eq!(cycle.rotation_deg(), -360.0);
    }
}
