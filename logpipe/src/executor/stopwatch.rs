//! Timing of a single run.

use std::time::{Duration, Instant};

/// Measures a whole run and the laps between processor boundaries.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStopwatch {
    started: Instant,
    last_lap: Instant,
}

impl PipelineStopwatch {
    /// Starts a new stopwatch.
    #[must_use]
    pub fn start() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_lap: now,
        }
    }

    /// Returns the time since the previous lap (or the start) and begins a
    /// new lap.
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.last_lap);
        self.last_lap = now;
        lap
    }

    /// Total time since the start.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Total time since the start, in nanoseconds.
    #[must_use]
    pub fn elapsed_ns(&self) -> u64 {
        as_nanos(self.elapsed())
    }
}

/// Converts a duration to nanoseconds, saturating.
#[must_use]
pub fn as_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laps_partition_the_total() {
        let mut stopwatch = PipelineStopwatch::start();
        std::thread::sleep(Duration::from_millis(5));
        let first = stopwatch.lap();
        std::thread::sleep(Duration::from_millis(5));
        let second = stopwatch.lap();

        assert!(first >= Duration::from_millis(5));
        assert!(second >= Duration::from_millis(5));
        assert!(stopwatch.elapsed() >= first + second);
    }

    #[test]
    fn test_as_nanos_saturates() {
        assert_eq!(as_nanos(Duration::from_nanos(42)), 42);
        assert_eq!(as_nanos(Duration::MAX), u64::MAX);
    }
}
