//! Car calibration data
//!
//! Calibration holds the measured characteristics of the car: the commanded
//! speed to ground velocity table, the steering limits, and the distance
//! tables used when following the cat. Values are loaded from `calib.toml`
//! through [`util::params`] and treated as read-only afterwards.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Velocity fallback gradient used when no speed table is calibrated.
///
/// Units: (centimeters/second) per speed unit
const FALLBACK_CM_PER_SEC_PER_SPEED: f64 = 0.4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Calibration data for the car.
#[derive(Debug, Clone, Deserialize)]
pub struct Calib {

    // ---- SPEED ----

    /// Table of `[speed, cm_per_sec]` pairs mapping commanded speed (0-100)
    /// to measured ground velocity. Must be sorted by ascending speed.
    #[serde(default)]
    pub speed_to_cm_per_sec: Vec<[f64; 2]>,

    // ---- STEERING ----

    /// Maximum steering angle (symmetric), steer demands are clamped to
    /// plus/minus this value.
    ///
    /// Units: degrees
    #[serde(default = "default_max_steer_angle_deg")]
    pub max_steer_angle_deg: f64,

    /// Minimum turn radius achievable at full steering lock.
    ///
    /// Units: centimeters
    #[serde(default = "default_min_turn_radius_cm")]
    pub min_turn_radius_cm: f64,

    // ---- DISTANCE ----

    /// Distance to hold from the cat while tracking.
    ///
    /// Units: centimeters
    #[serde(default = "default_target_distance_cm")]
    pub target_distance_cm: f64,

    /// Optional table of `[bbox_area_px2, distance_cm]` pairs mapping
    /// bounding box area to an estimated distance. Empty when uncalibrated.
    #[serde(default)]
    pub bbox_area_to_cm: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Calib {
    fn default() -> Self {
        Self {
            speed_to_cm_per_sec: Vec::new(),
            max_steer_angle_deg: default_max_steer_angle_deg(),
            min_turn_radius_cm: default_min_turn_radius_cm(),
            target_distance_cm: default_target_distance_cm(),
            bbox_area_to_cm: Vec::new(),
        }
    }
}

impl Calib {

    /// Get the ground velocity for a commanded speed.
    ///
    /// Performs piecewise-linear interpolation over the speed table, clamped
    /// at the table ends. With no calibrated table the fallback
    /// `max(1.0, speed * 0.4)` is used. The sign of `speed` is ignored, the
    /// returned velocity is always a magnitude.
    pub fn cm_per_sec(&self, speed: i16) -> f64 {
        let s = f64::from(speed.abs());

        interp_table(&self.speed_to_cm_per_sec, s)
            .unwrap_or_else(|| (s * FALLBACK_CM_PER_SEC_PER_SPEED).max(1.0))
    }

    /// Estimate the distance to the cat from a bounding box area.
    ///
    /// Returns `None` when the bbox/distance table is not calibrated.
    pub fn distance_cm_from_bbox_area(&self, bbox_area_px: f64) -> Option<f64> {
        interp_table(&self.bbox_area_to_cm, bbox_area_px)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Piecewise-linear interpolation over a sorted `[key, value]` table,
/// clamped at the table ends. Returns `None` for an empty table.
fn interp_table(table: &[[f64; 2]], key: f64) -> Option<f64> {
    let first = table.first()?;
    let last = table.last()?;

    if key <= first[0] {
        return Some(first[1]);
    }
    if key >= last[0] {
        return Some(last[1]);
    }

    for pair in table.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a[0] <= key && key <= b[0] {
            return Some(lin_map((a[0], b[0]), (a[1], b[1]), key));
        }
    }

    Some(last[1])
}

// ---------------------------------------------------------------------------
// DEFAULTS
// ---------------------------------------------------------------------------

fn default_max_steer_angle_deg() -> f64 {
    25.0
}

fn default_min_turn_radius_cm() -> f64 {
    40.0
}

fn default_target_distance_cm() -> f64 {
    15.0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn calib_with_speed_table() -> Calib {
        Calib {
            speed_to_cm_per_sec: vec![
                [20.0, 8.0],
                [40.0, 16.0],
                [100.0, 40.0],
            ],
            ..Calib::default()
        }
    }

    #[test]
    fn test_cm_per_sec_interpolates() {
        let calib = calib_with_speed_table();

        assert_eq!(calib.cm_per_sec(20), 8.0);
        assert_eq!(calib.cm_per_sec(40), 16.0);
        assert_eq!(calib.cm_per_sec(30), 12.0);
        assert_eq!(calib.cm_per_sec(70), 28.0);
    }

    #[test]
    fn test_cm_per_sec_clamps_at_table_ends() {
        let calib = calib_with_speed_table();

        assert_eq!(calib.cm_per_sec(5), 8.0);
        assert_eq!(calib.cm_per_sec(100), 40.0);
    }

    #[test]
    fn test_cm_per_sec_ignores_sign() {
        let calib = calib_with_speed_table();

        assert_eq!(calib.cm_per_sec(-40), calib.cm_per_sec(40));
    }

    #[test]
    fn test_cm_per_sec_fallback() {
        let calib = Calib::default();

        // speed * 0.4, with a floor of 1.0
        assert_eq!(calib.cm_per_sec(50), 20.0);
        assert_eq!(calib.cm_per_sec(1), 1.0);
        assert_eq!(calib.cm_per_sec(0), 1.0);
    }

    #[test]
    fn test_default_limits() {
        let calib = Calib::default();

        assert_eq!(calib.max_steer_angle_deg, 25.0);
        assert_eq!(calib.target_distance_cm, 15.0);
        assert_eq!(calib.min_turn_radius_cm, 40.0);
    }

    #[test]
    fn test_bbox_distance_uncalibrated() {
        let calib = Calib::default();

        assert_eq!(calib.distance_cm_from_bbox_area(10000.0), None);
    }

    #[test]
    fn test_bbox_distance_interpolates() {
        let calib = Calib {
            bbox_area_to_cm: vec![
                [4000.0, 60.0],
                [12000.0, 30.0],
            ],
            ..Calib::default()
        };

        assert_eq!(calib.distance_cm_from_bbox_area(8000.0), Some(45.0));
        assert_eq!(calib.distance_cm_from_bbox_area(1000.0), Some(60.0));
        assert_eq!(calib.distance_cm_from_bbox_area(20000.0), Some(30.0));
    }
}
