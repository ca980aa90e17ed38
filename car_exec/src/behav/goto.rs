//! Go-to-point controller
//!
//! Proportional heading controller driving the car towards a target
//! position. Given the current pose from odometry and a target, computes
//! the steering angle and speed for one tick. Stateless and side-effect
//! free.
//!
//! All distances in centimeters, angles in degrees.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;

// Internal
use crate::odometry::Pose;
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Proportional gain from heading error to steering angle.
pub const KP: f64 = 1.5;

/// Distance below which the car is considered to have arrived.
///
/// Units: centimeters
pub const ARRIVAL_THRESHOLD_CM: f64 = 10.0;

/// Heading errors above this magnitude use the slow speed.
///
/// Units: degrees
pub const SLOW_ERROR_DEG: f64 = 45.0;

/// Normal forward speed.
pub const CRUISE_SPEED: i16 = 40;

/// Speed used while the heading is far off the bearing.
pub const SLOW_SPEED: i16 = 20;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Output of the go-to-point controller for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GotoOutput {
    /// Steering angle to command, clamped to the given limit.
    ///
    /// Units: degrees, positive = left
    pub steer_deg: f64,

    /// Speed to command, zero once arrived.
    pub speed: i16,

    /// True if the car is within the arrival threshold of the target.
    pub arrived: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Bearing from the pose position to the target.
///
/// Units: degrees
pub fn compute_bearing_deg(from: Point2<f64>, to: Point2<f64>) -> f64 {
    (to.y - from.y).atan2(to.x - from.x).to_degrees()
}

/// Signed heading error within [-180, 180). Positive = need to turn left.
///
/// The shortest-path convention applies: the error between heading 170 and
/// bearing -170 is +20, not -340.
pub fn compute_heading_error(desired_deg: f64, current_deg: f64) -> f64 {
    maths::ang_dist_deg(current_deg, desired_deg)
}

/// Compute the steer/speed command driving towards the target for one tick.
pub fn compute_goto(pose: &Pose, target_cm: Point2<f64>, steer_limit_deg: f64) -> GotoOutput {
    let distance_cm = (target_cm - pose.position_cm).norm();

    if distance_cm < ARRIVAL_THRESHOLD_CM {
        return GotoOutput {
            steer_deg: 0.0,
            speed: 0,
            arrived: true,
        };
    }

    let bearing_deg = compute_bearing_deg(pose.position_cm, target_cm);
    let error_deg = compute_heading_error(bearing_deg, pose.heading_deg);

    // Proportional steering
    let steer_deg = maths::clamp(&(KP * error_deg), &-steer_limit_deg, &steer_limit_deg);

    // Slow down when the heading is far off the bearing
    let speed = if error_deg.abs() > SLOW_ERROR_DEG {
        SLOW_SPEED
    } else {
        CRUISE_SPEED
    };

    GotoOutput {
        steer_deg,
        speed,
        arrived: false,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn pose(x: f64, y: f64, heading_deg: f64) -> Pose {
        Pose {
            position_cm: Point2::new(x, y),
            heading_deg,
        }
    }

    #[test]
    fn test_arrival_within_threshold() {
        let output = compute_goto(&pose(0.0, 0.0, 0.0), Point2::new(5.0, 5.0), 25.0);

        assert!(output.arrived);
        assert_eq!(output.speed, 0);
        assert_eq!(output.steer_deg, 0.0);
    }

    #[test]
    fn test_cruise_when_roughly_aligned() {
        // Target straight ahead, small heading error
        let output = compute_goto(&pose(0.0, 0.0, 10.0), Point2::new(100.0, 0.0), 25.0);

        assert!(!output.arrived);
        assert_eq!(output.speed, CRUISE_SPEED);
    }

    #[test]
    fn test_slow_when_heading_far_off() {
        // Target behind the car
        let output = compute_goto(&pose(0.0, 0.0, 0.0), Point2::new(-100.0, 0.0), 25.0);

        assert!(!output.arrived);
        assert_eq!(output.speed, SLOW_SPEED);
    }

    #[test]
    fn test_steer_sign_matches_bearing_side() {
        // Target to the left of the heading -> positive steer
        let left = compute_goto(&pose(0.0, 0.0, 0.0), Point2::new(100.0, 50.0), 25.0);
        assert!(left.steer_deg > 0.0, "steer={}", left.steer_deg);

        // Target to the right -> negative steer
        let right = compute_goto(&pose(0.0, 0.0, 0.0), Point2::new(100.0, -50.0), 25.0);
        assert!(right.steer_deg < 0.0, "steer={}", right.steer_deg);
    }

    #[test]
    fn test_steer_clamped_to_limit() {
        // 90 degrees of error, KP * 90 well beyond the limit
        let output = compute_goto(&pose(0.0, 0.0, 0.0), Point2::new(0.0, 100.0), 25.0);

        assert_eq!(output.steer_deg, 25.0);
    }

    #[test]
    fn test_heading_error_wraparound() {
        assert_eq!(compute_heading_error(-170.0, 170.0), 20.0);
        assert_eq!(compute_heading_error(170.0, -170.0), -20.0);
    }

    #[test]
    fn test_bearing() {
        let origin = Point2::new(0.0, 0.0);

        assert_eq!(compute_bearing_deg(origin, Point2::new(10.0, 0.0)), 0.0);
        assert_eq!(compute_bearing_deg(origin, Point2::new(0.0, 10.0)), 90.0);
        assert_eq!(compute_bearing_deg(origin, Point2::new(-10.0, 0.0)), 180.0);
    }
}
