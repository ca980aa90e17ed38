//! Worker thread stubs
//!
//! Stand-ins for the camera/tracker/detector collaborators. Each runs as an
//! independent thread pacing itself at the real worker's rate and writing
//! its outputs into the shared snapshot store; the inference internals will
//! eventually wrap a vision model and an object tracker. The main loop
//! never blocks on them beyond the single locked copy per snapshot.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Internal
use crate::shared::{BBox, SharedState};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tracker pacing, matches the camera frame rate.
const TRACKER_PERIOD_MS: u64 = 33;

/// Detector pacing, a full detection pass is much slower than tracking.
const DETECTOR_PERIOD_MS: u64 = 330;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Spawn the tracker and detector workers.
///
/// The workers run until `stop` is set. The returned handles can be joined
/// at shutdown.
pub fn spawn(
    shared: Arc<SharedState>,
    stop: Arc<AtomicBool>,
) -> std::io::Result<Vec<JoinHandle<()>>> {
    let tracker_shared = shared.clone();
    let tracker_stop = stop.clone();
    let tracker = thread::Builder::new()
        .name("tracker".into())
        .spawn(move || run_tracker_loop(tracker_shared, tracker_stop))?;

    let detector = thread::Builder::new()
        .name("detector".into())
        .spawn(move || run_detector_loop(shared, stop))?;

    Ok(vec![tracker, detector])
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Tracker stand-in: publishes the tracked bounding box each frame.
///
/// With no model attached there is never a detection, so an invalid box is
/// published, which the behaviour module reads as "no cat in view".
fn run_tracker_loop(shared: Arc<SharedState>, stop: Arc<AtomicBool>) {
    info!("Tracker worker started");

    while !stop.load(Ordering::Relaxed) {
        shared.set_bbox_tracker(&BBox::invalid());

        thread::sleep(Duration::from_millis(TRACKER_PERIOD_MS));
    }

    info!("Tracker worker stopped");
}

/// Detector stand-in: publishes the latest full-frame detection.
fn run_detector_loop(shared: Arc<SharedState>, stop: Arc<AtomicBool>) {
    info!("Detector worker started");

    while !stop.load(Ordering::Relaxed) {
        shared.set_bbox_detector(&BBox::invalid());

        thread::sleep(Duration::from_millis(DETECTOR_PERIOD_MS));
    }

    info!("Detector worker stopped");
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
