use serde::{Deserialize, Serialize};

use crate::alert::AlertConfig;

/// Process-unique timer identifier. Monotonically increasing; the engine
/// reseeds its counter from the persisted collection on load.
pub type TimerId = u64;

/// Discriminant of the two timer variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Countdown,
    Countup,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::Countdown => "countdown",
            TimerKind::Countup => "countup",
        }
    }
}

/// A timer definition plus its cached display value.
///
/// The cached value (`remaining_secs` / `elapsed_secs`) is authoritative only
/// while the timer is paused; while it runs, the live value is derived by
/// [`super::project`] from the runtime record.
///
/// Invariants: `remaining_secs <= total_secs`; `is_finished` implies
/// `remaining_secs == 0`; `is_acknowledged` is meaningful only while
/// `is_finished` holds. Count-up timers never finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Timer {
    Countdown {
        id: TimerId,
        label: String,
        /// Fixed at creation.
        total_secs: u64,
        remaining_secs: u64,
        #[serde(default)]
        is_running: bool,
        #[serde(default)]
        is_finished: bool,
        #[serde(default)]
        is_acknowledged: bool,
        #[serde(default)]
        alert: AlertConfig,
    },
    Countup {
        id: TimerId,
        label: String,
        elapsed_secs: u64,
        #[serde(default)]
        is_running: bool,
    },
}

impl Timer {
    pub fn id(&self) -> TimerId {
        match self {
            Timer::Countdown { id, .. } | Timer::Countup { id, .. } => *id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Timer::Countdown { label, .. } | Timer::Countup { label, .. } => label,
        }
    }

    pub fn kind(&self) -> TimerKind {
        match self {
            Timer::Countdown { .. } => TimerKind::Countdown,
            Timer::Countup { .. } => TimerKind::Countup,
        }
    }

    pub fn is_running(&self) -> bool {
        match self {
            Timer::Countdown { is_running, .. } | Timer::Countup { is_running, .. } => *is_running,
        }
    }

    /// Count-up timers never finish.
    pub fn is_finished(&self) -> bool {
        match self {
            Timer::Countdown { is_finished, .. } => *is_finished,
            Timer::Countup { .. } => false,
        }
    }

    /// The displayed value: seconds remaining for countdowns, seconds elapsed
    /// for count-ups.
    pub fn value_secs(&self) -> u64 {
        match self {
            Timer::Countdown { remaining_secs, .. } => *remaining_secs,
            Timer::Countup { elapsed_secs, .. } => *elapsed_secs,
        }
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        match self {
            Timer::Countdown { is_running, .. } | Timer::Countup { is_running, .. } => {
                *is_running = running
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_serializes_with_type_tag() {
        let timer = Timer::Countdown {
            id: 1,
            label: "tea".into(),
            total_secs: 180,
            remaining_secs: 180,
            is_running: false,
            is_finished: false,
            is_acknowledged: false,
            alert: AlertConfig::default(),
        };
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["type"], "countdown");
        assert_eq!(json["total_secs"], 180);
    }

    #[test]
    fn countup_roundtrips() {
        let timer = Timer::Countup {
            id: 2,
            label: "meeting".into(),
            elapsed_secs: 42,
            is_running: true,
        };
        let json = serde_json::to_string(&timer).unwrap();
        let back: Timer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, timer);
        assert_eq!(back.kind(), TimerKind::Countup);
        assert_eq!(back.value_secs(), 42);
        assert!(!back.is_finished());
    }

    #[test]
    fn missing_flags_default_to_false() {
        let json = r#"{"type":"countdown","id":3,"label":"x","total_secs":5,"remaining_secs":5}"#;
        let timer: Timer = serde_json::from_str(json).unwrap();
        assert!(!timer.is_running());
        assert!(!timer.is_finished());
    }
}
