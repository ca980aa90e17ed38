//! # Localisation module
//!
//! Provides the car with an idea of where it is in the world. The source of
//! the pose is selected at composition time: dead-reckoning odometry is the
//! implemented source, wheel encoders and an IMU are recognised but not yet
//! available.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Deserialize;

// Internal
use crate::odometry::{Odometry, Pose};
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Provides an interface for the localisation system of the car.
#[derive(Debug, Clone, Default)]
pub struct LocMgr {
    source: LocSource,

    odometry: Odometry,
}

/// Parameters for the localisation manager.
#[derive(Debug, Clone, Deserialize)]
pub struct LocMgrParams {
    pub source: LocSource,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Selectable pose sources.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
pub enum LocSource {
    Odometry,
    Encoder,
    Imu,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LocSource {
    fn default() -> Self {
        LocSource::Odometry
    }
}

impl LocMgr {
    /// Initialise the manager with the given source, loading the odometry
    /// parameters from the given file.
    ///
    /// Sources without an implementation fall back to odometry with a
    /// warning rather than failing.
    pub fn init(source: LocSource, odometry_params_path: &str) -> Result<Self, params::LoadError> {
        let source = match source {
            LocSource::Odometry => source,
            _ => {
                warn!(
                    "Location source {:?} is not yet supported, falling back to odometry",
                    source
                );
                LocSource::Odometry
            }
        };

        Ok(Self {
            source,
            odometry: Odometry::init(odometry_params_path)?,
        })
    }

    /// Build a manager around an existing odometry instance.
    pub fn with_odometry(odometry: Odometry) -> Self {
        Self {
            source: LocSource::Odometry,
            odometry,
        }
    }

    /// The active source.
    pub fn source(&self) -> LocSource {
        self.source
    }

    /// The current pose.
    pub fn pose(&self) -> Pose {
        self.odometry.pose()
    }

    /// Update the pose after a motion tick.
    ///
    /// Forwards to the dead-reckoning integrator; a no-op for sources which
    /// don't integrate commands.
    pub fn update(&mut self, dt_s: f64, speed: i16, steer_deg: f64, cm_per_sec: Option<f64>) {
        self.odometry.update(dt_s, speed, steer_deg, cm_per_sec);
    }

    /// Reset the pose, at startup or on external re-localisation.
    pub fn reset(&mut self, x_cm: f64, y_cm: f64, heading_deg: f64) {
        self.odometry.reset(x_cm, y_cm, heading_deg);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::odometry::Params;

    #[test]
    fn test_default_source_is_odometry() {
        let mgr = LocMgr::default();

        assert_eq!(mgr.source(), LocSource::Odometry);
        assert_eq!(mgr.pose(), Pose::default());
    }

    #[test]
    fn test_update_forwards_to_odometry() {
        let mut mgr = LocMgr::with_odometry(Odometry::with_params(Params::default()));

        mgr.update(1.0, 50, 0.0, Some(10.0));

        let pose = mgr.pose();
        assert!((pose.position_cm.x - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_reset() {
        let mut mgr = LocMgr::default();

        mgr.update(1.0, 50, 0.0, Some(10.0));
        mgr.reset(5.0, 6.0, 7.0);

        let pose = mgr.pose();
        assert_eq!(pose.position_cm.x, 5.0);
        assert_eq!(pose.position_cm.y, 6.0);
        assert_eq!(pose.heading_deg, 7.0);
    }
}
