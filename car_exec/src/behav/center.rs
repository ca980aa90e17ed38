//! Center-on-target controller
//!
//! Keeps the cat in the middle of the camera frame and at the holding
//! distance. Lateral control steers the bounding box centre towards the
//! frame centre; distance control drives forward or backward from the
//! ultrasonic range against a dead-band around the target distance.
//! Stateless, one command per tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::loco_ctrl::MotionCommand;
use crate::shared::BBox;
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Forward speed while closing in on the cat.
pub const APPROACH_SPEED: i16 = 40;

/// Steering gain from horizontal pixel error to degrees.
pub const LATERAL_GAIN_DEG_PER_PX: f64 = 0.08;

/// Half-width of the distance dead-band around the target distance.
///
/// Units: centimeters
pub const DISTANCE_DEADBAND_CM: f64 = 5.0;

/// With no range reading, boxes smaller than this fraction of the frame are
/// treated as "far" and approached slowly.
pub const FAR_AREA_FRACTION: f64 = 0.1;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the steer/speed command keeping the cat centred and at distance.
///
/// The camera faces forward with the frame x axis pointing right, so a box
/// right of the frame centre yields a negative (right) steer.
///
/// # Inputs
/// - `bbox`: The tracked bounding box, expected valid.
/// - `frame_width_px`, `frame_height_px`: Camera frame dimensions.
/// - `range_cm`: Ultrasonic distance to the cat, `None` when unavailable.
/// - `target_distance_cm`: Distance to hold.
/// - `steer_limit_deg`: Symmetric steering clamp.
pub fn compute_center(
    bbox: &BBox,
    frame_width_px: f64,
    frame_height_px: f64,
    range_cm: Option<f64>,
    target_distance_cm: f64,
    steer_limit_deg: f64,
) -> MotionCommand {
    // Lateral: steer the box centre towards the frame centre
    let error_px = bbox.centre_x() - frame_width_px / 2.0;
    let steer_deg = maths::clamp(
        &(-error_px * LATERAL_GAIN_DEG_PER_PX),
        &-steer_limit_deg,
        &steer_limit_deg,
    );

    let speed = match range_cm {
        Some(d) if d > target_distance_cm + DISTANCE_DEADBAND_CM => APPROACH_SPEED,
        Some(d) if d < target_distance_cm - DISTANCE_DEADBAND_CM => -(APPROACH_SPEED / 2),
        Some(_) => 0,
        // No range reading: a small box means the cat is far, approach
        // slowly, otherwise hold position
        None => {
            if bbox.area_px() < frame_width_px * frame_height_px * FAR_AREA_FRACTION {
                APPROACH_SPEED
            } else {
                0
            }
        }
    };

    MotionCommand { steer_deg, speed }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const FRAME_W: f64 = 640.0;
    const FRAME_H: f64 = 480.0;

    fn bbox_at(centre_x: f64, w: f64, h: f64) -> BBox {
        BBox {
            x: centre_x - w / 2.0,
            y: 100.0,
            w,
            h,
            valid: true,
        }
    }

    #[test]
    fn test_centred_box_no_steer() {
        let cmd = compute_center(
            &bbox_at(320.0, 50.0, 40.0),
            FRAME_W,
            FRAME_H,
            Some(100.0),
            15.0,
            25.0,
        );

        assert_eq!(cmd.steer_deg, 0.0);
    }

    #[test]
    fn test_steer_towards_offset_box() {
        // Box right of centre -> steer right (negative)
        let cmd = compute_center(
            &bbox_at(420.0, 50.0, 40.0),
            FRAME_W,
            FRAME_H,
            Some(100.0),
            15.0,
            25.0,
        );

        assert_eq!(cmd.steer_deg, -100.0 * LATERAL_GAIN_DEG_PER_PX);

        // Box left of centre -> steer left (positive)
        let cmd = compute_center(
            &bbox_at(220.0, 50.0, 40.0),
            FRAME_W,
            FRAME_H,
            Some(100.0),
            15.0,
            25.0,
        );

        assert_eq!(cmd.steer_deg, 100.0 * LATERAL_GAIN_DEG_PER_PX);
    }

    #[test]
    fn test_steer_clamped() {
        let cmd = compute_center(
            &bbox_at(10.0, 2.0, 40.0),
            FRAME_W,
            FRAME_H,
            Some(100.0),
            15.0,
            25.0,
        );

        assert_eq!(cmd.steer_deg, 25.0);
    }

    #[test]
    fn test_forward_when_far() {
        let cmd = compute_center(
            &bbox_at(320.0, 50.0, 40.0),
            FRAME_W,
            FRAME_H,
            Some(30.0),
            15.0,
            25.0,
        );

        assert_eq!(cmd.speed, APPROACH_SPEED);
    }

    #[test]
    fn test_backward_when_too_close() {
        let cmd = compute_center(
            &bbox_at(320.0, 50.0, 40.0),
            FRAME_W,
            FRAME_H,
            Some(5.0),
            15.0,
            25.0,
        );

        assert_eq!(cmd.speed, -(APPROACH_SPEED / 2));
    }

    #[test]
    fn test_hold_inside_deadband() {
        for d in &[10.0, 15.0, 20.0] {
            let cmd = compute_center(
                &bbox_at(320.0, 50.0, 40.0),
                FRAME_W,
                FRAME_H,
                Some(*d),
                15.0,
                25.0,
            );

            assert_eq!(cmd.speed, 0, "distance {}", d);
        }
    }

    #[test]
    fn test_no_range_small_box_approaches() {
        let cmd = compute_center(
            &bbox_at(320.0, 50.0, 40.0),
            FRAME_W,
            FRAME_H,
            None,
            15.0,
            25.0,
        );

        assert_eq!(cmd.speed, APPROACH_SPEED);
    }

    #[test]
    fn test_no_range_large_box_holds() {
        let cmd = compute_center(
            &bbox_at(320.0, 400.0, 300.0),
            FRAME_W,
            FRAME_H,
            None,
            15.0,
            25.0,
        );

        assert_eq!(cmd.speed, 0);
    }
}
