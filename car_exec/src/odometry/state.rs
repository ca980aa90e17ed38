//! Implementations for the Odometry state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::Serialize;

// Internal
use super::Params;
use util::{maths, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the odometry frame) of the car.
///
/// Heading is the angle from the positive X axis, anticlockwise positive,
/// and is always within [-180, 180). Position accumulates unboundedly, no
/// world limits are imposed at this level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    /// The position in the odometry frame.
    ///
    /// Units: centimeters
    pub position_cm: Point2<f64>,

    /// The heading in the odometry frame.
    ///
    /// Units: degrees
    pub heading_deg: f64,
}

/// Odometry module state.
#[derive(Debug, Clone, Default)]
pub struct Odometry {
    params: Params,

    pose: Pose,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Pose {
    fn default() -> Self {
        Self {
            position_cm: Point2::new(0.0, 0.0),
            heading_deg: 0.0,
        }
    }
}

impl Odometry {
    /// Initialise the module from the given parameter file.
    pub fn init(params_path: &str) -> Result<Self, params::LoadError> {
        Ok(Self {
            params: params::load(params_path)?,
            pose: Pose::default(),
        })
    }

    /// Build the module from already loaded parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            pose: Pose::default(),
        }
    }

    /// Set the pose unconditionally.
    ///
    /// Used at startup and whenever an external re-localisation occurs.
    pub fn reset(&mut self, x_cm: f64, y_cm: f64, heading_deg: f64) {
        self.pose = Pose {
            position_cm: Point2::new(x_cm, y_cm),
            heading_deg: maths::normalize_angle_deg(heading_deg),
        };
    }

    /// Integrate one tick of commanded motion into the pose estimate.
    ///
    /// # Inputs
    /// - `dt_s`: Elapsed time since the previous update. Non-positive values
    ///   leave the pose unchanged.
    /// - `speed`: The commanded speed, signed (negative = reverse). Zero
    ///   leaves the pose unchanged.
    /// - `steer_deg`: The commanded steering angle, positive = left.
    /// - `cm_per_sec`: Measured velocity magnitude from calibration, or
    ///   `None` to fall back to `|speed| * 0.5`.
    pub fn update(&mut self, dt_s: f64, speed: i16, steer_deg: f64, cm_per_sec: Option<f64>) {
        if dt_s <= 0.0 || speed == 0 {
            return;
        }

        // Velocity magnitude, signed by the commanded direction
        let velocity_magn = match cm_per_sec {
            Some(v) => v.abs(),
            None => f64::from(speed.abs()) * self.params.fallback_cm_per_sec_per_speed,
        };
        let velocity = if speed < 0 {
            -velocity_magn
        } else {
            velocity_magn
        };

        let distance_cm = velocity * dt_s;
        let heading_rad = self.pose.heading_deg.to_radians();

        if steer_deg.abs() < self.params.straight_steer_threshold_deg {
            // Straight-line advance along the current heading
            self.pose.position_cm.x += distance_cm * heading_rad.cos();
            self.pose.position_cm.y += distance_cm * heading_rad.sin();
        } else {
            // Bicycle-model arc about the signed turn radius. The steer
            // threshold above keeps tan() away from zero.
            let turn_radius_cm = self.params.wheelbase_cm / steer_deg.to_radians().tan();
            let new_heading_rad = heading_rad + distance_cm / turn_radius_cm;

            // Displace the rear-axle reference point along the arc
            self.pose.position_cm.x += turn_radius_cm * (new_heading_rad.sin() - heading_rad.sin());
            self.pose.position_cm.y +=
                turn_radius_cm * (-new_heading_rad.cos() + heading_rad.cos());
            self.pose.heading_deg = new_heading_rad.to_degrees();
        }

        self.pose.heading_deg = maths::normalize_angle_deg(self.pose.heading_deg);
    }

    /// The current pose estimate.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The current position as (x_cm, y_cm).
    pub fn position_cm(&self) -> (f64, f64) {
        (self.pose.position_cm.x, self.pose.position_cm.y)
    }

    /// The current heading in degrees, within [-180, 180).
    pub fn heading_deg(&self) -> f64 {
        self.pose.heading_deg
    }

    /// The wheelbase this integrator is configured with.
    ///
    /// Units: centimeters
    pub fn wheelbase_cm(&self) -> f64 {
        self.params.wheelbase_cm
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn odom() -> Odometry {
        Odometry::with_params(Params::default())
    }

    // ---- STRAIGHT LINE ----

    #[test]
    fn test_straight_forward() {
        let mut odom = odom();
        odom.update(1.0, 50, 0.0, Some(10.0));

        let (x, y) = odom.position_cm();
        assert!((x - 10.0).abs() < 0.01, "x={}", x);
        assert!(y.abs() < 0.01, "y={}", y);
        assert!(odom.heading_deg().abs() < 0.01);
    }

    #[test]
    fn test_straight_backward() {
        let mut odom = odom();
        odom.update(1.0, -50, 0.0, Some(10.0));

        let (x, y) = odom.position_cm();
        assert!((x + 10.0).abs() < 0.01, "x={}", x);
        assert!(y.abs() < 0.01, "y={}", y);
    }

    #[test]
    fn test_straight_multiple_steps() {
        let mut odom = odom();
        for _ in 0..10 {
            odom.update(0.1, 50, 0.0, Some(20.0));
        }

        let (x, y) = odom.position_cm();
        assert!((x - 20.0).abs() < 0.1, "x={}", x);
        assert!(y.abs() < 0.1, "y={}", y);
    }

    // ---- TURNING ----

    #[test]
    fn test_turn_left_heading_increases() {
        let mut odom = odom();
        odom.update(1.0, 50, 15.0, Some(10.0));

        assert!(odom.heading_deg() > 0.0, "heading={}", odom.heading_deg());
    }

    #[test]
    fn test_turn_right_heading_decreases() {
        let mut odom = odom();
        odom.update(1.0, 50, -15.0, Some(10.0));

        assert!(odom.heading_deg() < 0.0, "heading={}", odom.heading_deg());
    }

    #[test]
    fn test_turn_symmetric() {
        let mut left = odom();
        left.update(1.0, 50, 20.0, Some(10.0));

        let mut right = odom();
        right.update(1.0, 50, -20.0, Some(10.0));

        let (xl, yl) = left.position_cm();
        let (xr, yr) = right.position_cm();

        assert!((xl - xr).abs() < 0.01, "xl={}, xr={}", xl, xr);
        assert!((yl + yr).abs() < 0.01, "yl={}, yr={}", yl, yr);
        assert!(
            (left.heading_deg() + right.heading_deg()).abs() < 0.01,
            "hl={}, hr={}",
            left.heading_deg(),
            right.heading_deg()
        );
    }

    // ---- HEADING NORMALISATION ----

    #[test]
    fn test_heading_stays_in_range() {
        let mut odom = odom();
        for _ in 0..200 {
            odom.update(0.1, 50, 25.0, Some(20.0));
        }

        let h = odom.heading_deg();
        assert!(h >= -180.0 && h < 180.0, "heading={}", h);
    }

    // ---- NO-OP CONDITIONS ----

    #[test]
    fn test_zero_speed_no_movement() {
        let mut odom = odom();
        odom.update(1.0, 0, 15.0, Some(10.0));

        assert_eq!(odom.pose(), Pose::default());
    }

    #[test]
    fn test_zero_dt_no_movement() {
        let mut odom = odom();
        odom.update(0.0, 50, 15.0, Some(10.0));
        odom.update(-0.1, 50, 15.0, Some(10.0));

        assert_eq!(odom.pose(), Pose::default());
    }

    // ---- RESET ----

    #[test]
    fn test_reset_to_custom() {
        let mut odom = odom();
        odom.reset(100.0, 200.0, 45.0);

        assert_eq!(odom.position_cm(), (100.0, 200.0));
        assert_eq!(odom.heading_deg(), 45.0);
    }

    #[test]
    fn test_reset_clears_previous() {
        let mut odom = odom();
        odom.update(1.0, 50, 10.0, Some(10.0));
        odom.reset(0.0, 0.0, 0.0);

        assert_eq!(odom.pose(), Pose::default());
    }

    // ---- FALLBACK VELOCITY ----

    #[test]
    fn test_fallback_velocity() {
        let mut odom = odom();
        odom.update(1.0, 20, 0.0, None);

        // |speed| * 0.5 = 10 cm/s
        let (x, _) = odom.position_cm();
        assert!((x - 10.0).abs() < 0.01, "x={}", x);
    }

    // ---- ARC GEOMETRY ----

    #[test]
    fn test_full_circle_returns_near_origin() {
        let mut odom = odom();

        let steer_deg = 20.0f64;
        let velocity = 15.0;
        let turn_radius_cm = odom.wheelbase_cm() / steer_deg.to_radians().tan();
        let circumference_cm = 2.0 * std::f64::consts::PI * turn_radius_cm.abs();
        let total_time_s = circumference_cm / velocity;

        let steps = 500;
        for _ in 0..steps {
            odom.update(total_time_s / steps as f64, 50, steer_deg, Some(velocity));
        }

        let (x, y) = odom.position_cm();
        let dist_from_origin = (x * x + y * y).sqrt();
        assert!(
            dist_from_origin < 2.0,
            "After full circle: ({:.2}, {:.2}), dist={:.2}",
            x,
            y,
            dist_from_origin
        );

        let h = odom.heading_deg();
        assert!(h.abs() < 5.0, "Heading after full circle: {:.2}", h);
    }
}
