//! Wall-clock access for the timer engine.
//!
//! All derived timer values come from wall-clock timestamps, so the clock is
//! the one seam the engine needs for deterministic tests: swap in a
//! [`ManualClock`] and the whole lifecycle runs under a simulated clock.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock. Trusted as-is; no monotonic correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests and simulations.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    epoch_ms: Rc<Cell<i64>>,
}

impl ManualClock {
    /// Create a clock frozen at the given epoch milliseconds.
    pub fn at(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Rc::new(Cell::new(epoch_ms)),
        }
    }

    pub fn set(&self, epoch_ms: i64) {
        self.epoch_ms.set(epoch_ms);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs * 1000);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.epoch_ms.set(self.epoch_ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.epoch_ms.get()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(1_000);
        assert_eq!(clock.now().timestamp_millis(), 1_000);
        clock.advance_secs(5);
        assert_eq!(clock.now().timestamp_millis(), 6_000);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::at(0);
        let other = clock.clone();
        clock.advance_ms(250);
        assert_eq!(other.now().timestamp_millis(), 250);
    }

    #[test]
    fn system_clock_is_sane() {
        // Anything after 2020 counts as working.
        assert!(SystemClock.now().timestamp() > 1_577_836_800);
    }
}
