//! Command intake
//!
//! External sources (a web handler, a test harness, a file at startup) queue
//! commands for the main loop through a [`CommandQueue`]. The queue holds at
//! most one pending item per kind: a newly queued target overwrites any
//! unconsumed previous target, and the stop flag is idempotent. Polling
//! clears both pending items under the same lock that guards production, so
//! the main loop never observes a half-written command and never applies a
//! queued command twice.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use std::fs::read_to_string;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Single-slot pending command queue, cheap to clone and share between
/// threads.
#[derive(Clone, Default)]
pub struct CommandQueue {
    inner: Arc<Mutex<Pending>>,
}

/// The commands consumed from the queue on one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingCommands {
    /// Queued cat location in meters, if any.
    pub target_m: Option<(f64, f64)>,

    /// True if a stop was queued.
    pub stop: bool,
}

#[derive(Default)]
struct Pending {
    target_m: Option<(f64, f64)>,
    stop: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cat location in meters, overwriting any unconsumed target.
    pub fn set_target(&self, x_m: f64, y_m: f64) {
        match self.inner.lock() {
            Ok(mut pending) => pending.target_m = Some((x_m, y_m)),
            Err(_) => warn!("Could not lock the command queue to set a target"),
        }
    }

    /// Queue a stop command.
    pub fn set_stop(&self) {
        match self.inner.lock() {
            Ok(mut pending) => pending.stop = true,
            Err(_) => warn!("Could not lock the command queue to set a stop"),
        }
    }

    /// Take all pending commands, clearing the queue.
    ///
    /// The clear happens under the production lock, so a command is consumed
    /// exactly once. Returns no commands if the lock is poisoned.
    pub fn poll(&self) -> PendingCommands {
        match self.inner.lock() {
            Ok(mut pending) => {
                let polled = PendingCommands {
                    target_m: pending.target_m.take(),
                    stop: pending.stop,
                };
                pending.stop = false;
                polled
            }
            Err(_) => {
                warn!("Could not lock the command queue to poll");
                PendingCommands::default()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Read an `x y` target (meters) from the first line of a file.
///
/// Returns `None` if the file is missing or does not parse.
pub fn read_target_from_file(path: &str) -> Option<(f64, f64)> {
    let contents = read_to_string(path).ok()?;
    let mut parts = contents.lines().next()?.split_whitespace();

    let x_m: f64 = parts.next()?.parse().ok()?;
    let y_m: f64 = parts.next()?.parse().ok()?;

    Some((x_m, y_m))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
