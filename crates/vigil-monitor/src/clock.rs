//! Monotonic millisecond clock
//!
//! All debounce bookkeeping works in whole milliseconds since the
//! monitor's own epoch (the instant the driver started). Keeping the
//! arithmetic in integers makes the deadline logic exact and lets the
//! table and scheduler be tested without a runtime; the clock converts
//! back to [`tokio::time::Instant`] only at the timer boundary, so the
//! whole core runs against tokio's pausable test clock.

use std::time::Duration;

use tokio::time::Instant;

/// Monotonic clock anchored at the monitor's start
#[derive(Debug, Clone)]
pub struct MonitorClock {
    epoch: Instant,
}

impl MonitorClock {
    /// Creates a clock anchored at the current instant
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the epoch
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Converts a millisecond timestamp back into an `Instant`
    ///
    /// Used to arm the driver's sleep timer for an absolute deadline.
    pub fn instant_at(&self, at_ms: u64) -> Instant {
        self.epoch + Duration::from_millis(at_ms)
    }
}
