//! Range sensor
//!
//! Wraps an ultrasonic distance source (HC-SR04 class hardware) and enforces
//! its constraints: readings outside [1, 500] cm or negative error codes are
//! rejected as `None`, and hardware pings are throttled to one per 60 ms
//! (the sensor needs that long between pings to avoid echo interference),
//! returning the cached value in between.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum seconds between hardware reads.
pub const MIN_READ_INTERVAL_S: f64 = 0.06;

/// Lowest distance considered a valid reading.
///
/// Units: centimeters
pub const MIN_CM: f64 = 1.0;

/// Highest distance considered a valid reading.
///
/// Units: centimeters
pub const MAX_CM: f64 = 500.0;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A raw distance source, normally the ultrasonic hardware.
///
/// `read_cm` performs one ping and returns the raw measurement, or `None` if
/// the hardware reported an error. Injected at startup so the rest of the
/// software runs unchanged without the sensor.
pub trait DistanceSource {
    fn read_cm(&mut self) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Validated, throttled view of the ultrasonic sensor.
#[derive(Default)]
pub struct RangeSensor {
    source: Option<Box<dyn DistanceSource + Send>>,

    /// Last valid distance, kept for display.
    last_cm: Option<f64>,

    /// Time of the last hardware ping.
    last_read: Option<Instant>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RangeSensor {
    /// A sensor with no hardware attached, always reads `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sensor reading from the given source.
    pub fn with_source(source: Box<dyn DistanceSource + Send>) -> Self {
        Self {
            source: Some(source),
            last_cm: None,
            last_read: None,
        }
    }

    /// Get the current distance in centimeters.
    ///
    /// Returns `None` when no source is attached, the hardware errored, or
    /// the reading is outside the valid range. Within the minimum read
    /// interval the last valid value is returned without pinging the
    /// hardware.
    pub fn distance_cm(&mut self) -> Option<f64> {
        let source = self.source.as_mut()?;

        // Within the throttle window return the cached value, but only if it
        // is a valid one - an invalid read is retried immediately.
        if let (Some(last_read), Some(last_cm)) = (self.last_read, self.last_cm) {
            if last_read.elapsed().as_secs_f64() < MIN_READ_INTERVAL_S {
                return Some(last_cm);
            }
        }

        let raw = source.read_cm();
        self.last_read = Some(Instant::now());

        self.last_cm = match raw {
            Some(d) if d >= MIN_CM && d <= MAX_CM => Some(d),
            // Negative values are hardware timeout/error codes
            _ => None,
        };

        self.last_cm
    }

    /// Last valid distance in centimeters, for display. No hardware read.
    pub fn last_distance_cm(&self) -> Option<f64> {
        self.last_cm
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A source which replays a fixed sequence of raw readings.
    struct FakeSource {
        readings: Vec<Option<f64>>,
        index: usize,
    }

    impl FakeSource {
        fn new(readings: Vec<Option<f64>>) -> Self {
            Self { readings, index: 0 }
        }
    }

    impl DistanceSource for FakeSource {
        fn read_cm(&mut self) -> Option<f64> {
            let reading = self.readings.get(self.index).cloned().flatten();
            self.index += 1;
            reading
        }
    }

    #[test]
    fn test_no_source_reads_none() {
        let mut sensor = RangeSensor::new();

        assert_eq!(sensor.distance_cm(), None);
        assert_eq!(sensor.last_distance_cm(), None);
    }

    #[test]
    fn test_valid_reading_passes() {
        let mut sensor = RangeSensor::with_source(Box::new(FakeSource::new(vec![Some(42.0)])));

        assert_eq!(sensor.distance_cm(), Some(42.0));
        assert_eq!(sensor.last_distance_cm(), Some(42.0));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut sensor = RangeSensor::with_source(Box::new(FakeSource::new(vec![
            Some(0.5),
            Some(600.0),
            Some(-1.0),
        ])));

        assert_eq!(sensor.distance_cm(), None);
        assert_eq!(sensor.distance_cm(), None);
        assert_eq!(sensor.distance_cm(), None);
        assert_eq!(sensor.last_distance_cm(), None);
    }

    #[test]
    fn test_throttle_returns_cached_value() {
        let mut sensor = RangeSensor::with_source(Box::new(FakeSource::new(vec![
            Some(100.0),
            Some(50.0),
        ])));

        // Two immediate reads fall within the throttle window, so the second
        // must return the cached first value without pinging the source.
        assert_eq!(sensor.distance_cm(), Some(100.0));
        assert_eq!(sensor.distance_cm(), Some(100.0));
    }

    #[test]
    fn test_invalid_read_is_retried() {
        let mut sensor = RangeSensor::with_source(Box::new(FakeSource::new(vec![
            None,
            Some(75.0),
        ])));

        // An invalid read is not cached, the next call pings again even
        // inside the throttle window.
        assert_eq!(sensor.distance_cm(), None);
        assert_eq!(sensor.distance_cm(), Some(75.0));
    }
}
