//! Shared snapshot store
//!
//! The worker threads (camera/tracker/detector stand-ins) and the main loop
//! exchange data exclusively through this store. Every shared value is a
//! small fixed-size array guarded by its own lock, and every accessor copies
//! the whole value in or out under that lock, so a reader always sees a
//! consistent snapshot and never blocks for longer than a single copy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;
use std::sync::Mutex;

// Internal
use crate::odometry::Pose;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of elements in a packed bounding box array.
pub const BBOX_LEN: usize = 5;

/// Number of elements in a packed odometry array (x, y, heading).
pub const ODOM_LEN: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A bounding box from the tracker or detector, in pixels.
///
/// The validity flag is packed as 0.0/1.0 in the shared array form so that
/// the whole box is a plain copyable `[f64; 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub valid: bool,
}

/// Thread-safe store of the values shared between the main loop and the
/// worker threads. One lock per logical resource.
#[derive(Default)]
pub struct SharedState {
    bbox_tracker: Mutex<[f64; BBOX_LEN]>,
    bbox_detector: Mutex<[f64; BBOX_LEN]>,
    odometry_xyh: Mutex<[f64; ODOM_LEN]>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BBox {
    /// An invalid (no detection) box.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// True if this box represents a detection.
    ///
    /// A box flagged valid but with zero area is still treated as no
    /// detection.
    pub fn is_valid(&self) -> bool {
        self.valid && self.w > 0.0 && self.h > 0.0
    }

    /// Horizontal centre of the box in pixels.
    pub fn centre_x(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Area of the box in square pixels.
    pub fn area_px(&self) -> f64 {
        self.w * self.h
    }

    /// Pack into the shared array form, validity as 0.0/1.0.
    pub fn to_array(&self) -> [f64; BBOX_LEN] {
        [
            self.x,
            self.y,
            self.w,
            self.h,
            if self.valid { 1.0 } else { 0.0 },
        ]
    }

    /// Unpack from the shared array form.
    pub fn from_array(array: [f64; BBOX_LEN]) -> Self {
        Self {
            x: array[0],
            y: array[1],
            w: array[2],
            h: array[3],
            valid: array[4] > 0.0,
        }
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the tracker bounding box under its lock.
    pub fn set_bbox_tracker(&self, bbox: &BBox) {
        match self.bbox_tracker.lock() {
            Ok(mut buf) => *buf = bbox.to_array(),
            Err(_) => warn!("Could not lock the tracker bbox for writing"),
        }
    }

    /// Get a snapshot of the tracker bounding box.
    ///
    /// Returns an invalid box if the lock is poisoned.
    pub fn get_bbox_tracker(&self) -> BBox {
        match self.bbox_tracker.lock() {
            Ok(buf) => BBox::from_array(*buf),
            Err(_) => {
                warn!("Could not lock the tracker bbox for reading");
                BBox::invalid()
            }
        }
    }

    /// Write the detector bounding box under its lock.
    pub fn set_bbox_detector(&self, bbox: &BBox) {
        match self.bbox_detector.lock() {
            Ok(mut buf) => *buf = bbox.to_array(),
            Err(_) => warn!("Could not lock the detector bbox for writing"),
        }
    }

    /// Get a snapshot of the detector bounding box.
    pub fn get_bbox_detector(&self) -> BBox {
        match self.bbox_detector.lock() {
            Ok(buf) => BBox::from_array(*buf),
            Err(_) => {
                warn!("Could not lock the detector bbox for reading");
                BBox::invalid()
            }
        }
    }

    /// Publish the odometry pose for external display.
    pub fn set_odometry(&self, pose: &Pose) {
        match self.odometry_xyh.lock() {
            Ok(mut buf) => {
                *buf = [pose.position_cm.x, pose.position_cm.y, pose.heading_deg]
            }
            Err(_) => warn!("Could not lock the odometry snapshot for writing"),
        }
    }

    /// Get a snapshot of the published odometry as (x_cm, y_cm, heading_deg).
    pub fn get_odometry(&self) -> (f64, f64, f64) {
        match self.odometry_xyh.lock() {
            Ok(buf) => (buf[0], buf[1], buf[2]),
            Err(_) => {
                warn!("Could not lock the odometry snapshot for reading");
                (0.0, 0.0, 0.0)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_bbox_pack_round_trip() {
        let bbox = BBox {
            x: 10.0,
            y: 20.0,
            w: 64.0,
            h: 48.0,
            valid: true,
        };

        assert_eq!(BBox::from_array(bbox.to_array()), bbox);
        assert_eq!(bbox.to_array()[4], 1.0);
        assert_eq!(BBox::invalid().to_array()[4], 0.0);
    }

    #[test]
    fn test_zero_area_box_is_not_valid() {
        let bbox = BBox {
            x: 10.0,
            y: 20.0,
            w: 0.0,
            h: 0.0,
            valid: true,
        };

        assert!(!bbox.is_valid());
    }

    #[test]
    fn test_tracker_bbox_snapshot() {
        let shared = SharedState::new();

        assert!(!shared.get_bbox_tracker().is_valid());

        let bbox = BBox {
            x: 1.0,
            y: 2.0,
            w: 3.0,
            h: 4.0,
            valid: true,
        };
        shared.set_bbox_tracker(&bbox);

        assert_eq!(shared.get_bbox_tracker(), bbox);
    }

    #[test]
    fn test_odometry_snapshot() {
        let shared = SharedState::new();
        let mut pose = Pose::default();
        pose.position_cm.x = 12.0;
        pose.position_cm.y = -3.0;
        pose.heading_deg = 90.0;

        shared.set_odometry(&pose);

        assert_eq!(shared.get_odometry(), (12.0, -3.0, 90.0));
    }
}
