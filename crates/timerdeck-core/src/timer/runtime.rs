use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TimerId;

/// Ephemeral record of one timer's current running period.
///
/// Present only while the timer runs. `base_secs` snapshots the stored value
/// at the moment running began (remaining seconds for a countdown, elapsed
/// seconds for a count-up); the live value is derived from it and
/// `started_at` on every read. Nothing is written back per tick, which keeps
/// the derived value exact across arbitrary suspensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRecord {
    pub timer_id: TimerId,
    /// Wall-clock instant the running period began.
    pub started_at: DateTime<Utc>,
    /// Stored value at `started_at`, interpreted per timer variant.
    pub base_secs: u64,
}

impl RuntimeRecord {
    pub fn new(timer_id: TimerId, started_at: DateTime<Utc>, base_secs: u64) -> Self {
        Self {
            timer_id,
            started_at,
            base_secs,
        }
    }

    /// An epoch-zero start stands for "not actually running"; such records
    /// are treated the same as an absent one.
    pub fn is_active(&self) -> bool {
        self.started_at.timestamp_millis() != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_start_is_inactive() {
        let record = RuntimeRecord::new(1, DateTime::from_timestamp_millis(0).unwrap(), 30);
        assert!(!record.is_active());
        let record = RuntimeRecord::new(1, DateTime::from_timestamp_millis(1_000).unwrap(), 30);
        assert!(record.is_active());
    }
}
