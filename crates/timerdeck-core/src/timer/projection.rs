//! Read-time derivation of a timer's current value.
//!
//! Storing a start timestamp plus a base value (instead of decrementing a
//! counter every second and persisting each tick) makes the derived value
//! exact no matter how long the process was suspended: resume is a single
//! recomputation, with no catch-up loop and no accumulated drift.

use chrono::{DateTime, Utc};

use super::{RuntimeRecord, Timer};

/// Compute the timer as it should be displayed at `now`.
///
/// Pure: neither the stored timer nor the runtime record is touched. With no
/// active runtime record the stored value is already authoritative and the
/// timer comes back unchanged. Sub-second precision is dropped (whole-second
/// floor), and a wall clock that moved backwards reads as zero elapsed.
pub fn project(timer: &Timer, runtime: Option<&RuntimeRecord>, now: DateTime<Utc>) -> Timer {
    let mut projected = timer.clone();
    let Some(record) = runtime.filter(|r| r.is_active()) else {
        return projected;
    };
    let elapsed = elapsed_whole_secs(record.started_at, now);
    match &mut projected {
        Timer::Countdown { remaining_secs, .. } => {
            *remaining_secs = record.base_secs.saturating_sub(elapsed);
        }
        Timer::Countup { elapsed_secs, .. } => {
            *elapsed_secs = record.base_secs.saturating_add(elapsed);
        }
    }
    projected
}

/// Whole seconds between two instants, clamped at zero if `now` is earlier.
fn elapsed_whole_secs(started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let ms = now.signed_duration_since(started_at).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms / 1000) as u64
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::timer::TimerId;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn countdown(id: TimerId, total: u64, remaining: u64) -> Timer {
        Timer::Countdown {
            id,
            label: "t".into(),
            total_secs: total,
            remaining_secs: remaining,
            is_running: true,
            is_finished: false,
            is_acknowledged: false,
            alert: Default::default(),
        }
    }

    fn countup(id: TimerId, elapsed: u64) -> Timer {
        Timer::Countup {
            id,
            label: "t".into(),
            elapsed_secs: elapsed,
            is_running: true,
        }
    }

    #[test]
    fn no_runtime_returns_timer_unchanged() {
        let timer = countdown(1, 60, 45);
        assert_eq!(project(&timer, None, at(99_000)), timer);
    }

    #[test]
    fn inactive_runtime_returns_timer_unchanged() {
        let timer = countdown(1, 60, 45);
        let record = RuntimeRecord::new(1, at(0), 45);
        assert_eq!(project(&timer, Some(&record), at(99_000)), timer);
    }

    #[test]
    fn countdown_subtracts_elapsed() {
        let timer = countdown(1, 60, 60);
        let record = RuntimeRecord::new(1, at(10_000), 60);
        let projected = project(&timer, Some(&record), at(25_000));
        assert_eq!(projected.value_secs(), 45);
    }

    #[test]
    fn countdown_clamps_at_zero() {
        let timer = countdown(1, 60, 60);
        let record = RuntimeRecord::new(1, at(10_000), 60);
        let projected = project(&timer, Some(&record), at(500_000));
        assert_eq!(projected.value_secs(), 0);
    }

    #[test]
    fn countup_adds_elapsed() {
        let timer = countup(2, 100);
        let record = RuntimeRecord::new(2, at(10_000), 100);
        let projected = project(&timer, Some(&record), at(17_000));
        assert_eq!(projected.value_secs(), 107);
    }

    #[test]
    fn sub_second_elapsed_floors_to_whole_seconds() {
        let timer = countdown(1, 60, 60);
        let record = RuntimeRecord::new(1, at(10_000), 60);
        assert_eq!(project(&timer, Some(&record), at(11_999)).value_secs(), 59);
        assert_eq!(project(&timer, Some(&record), at(12_000)).value_secs(), 58);
    }

    #[test]
    fn backwards_clock_reads_as_zero_elapsed() {
        let timer = countup(2, 100);
        let record = RuntimeRecord::new(2, at(50_000), 100);
        let projected = project(&timer, Some(&record), at(20_000));
        assert_eq!(projected.value_secs(), 100);
    }

    proptest! {
        #[test]
        fn countdown_remaining_stays_within_base(
            base in 0u64..100_000,
            started_ms in 1i64..1_000_000_000,
            delta_ms in 0i64..1_000_000_000,
        ) {
            let timer = countdown(1, base, base);
            let record = RuntimeRecord::new(1, at(started_ms), base);
            let projected = project(&timer, Some(&record), at(started_ms + delta_ms));
            prop_assert!(projected.value_secs() <= base);
        }

        #[test]
        fn countup_elapsed_never_shrinks(
            base in 0u64..100_000,
            started_ms in 1i64..1_000_000_000,
            delta_ms in 0i64..1_000_000_000,
        ) {
            let timer = countup(2, base);
            let record = RuntimeRecord::new(2, at(started_ms), base);
            let projected = project(&timer, Some(&record), at(started_ms + delta_ms));
            prop_assert!(projected.value_secs() >= base);
        }
    }
}
