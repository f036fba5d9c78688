//! Fan-out notification of timer lifecycle events.
//!
//! Notification is synchronous and runs in subscription order, after the
//! mutation and its persistence write have completed -- a listener always
//! observes durable state.

use crate::timer::{Timer, TimerId};

/// Listener for timer lifecycle events.
///
/// Timers handed to callbacks are live projections, never the possibly-stale
/// stored value.
pub trait TimerObserver {
    fn on_timer_created(&self, timer: &Timer);
    fn on_timer_updated(&self, timer: &Timer);
    fn on_timer_deleted(&self, id: TimerId);
}

/// Handle returned by [`ObserverBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered set of subscribed observers.
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<(ObserverId, Box<dyn TimerObserver>)>,
    next_id: u64,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn TimerObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Returns false when the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub_id, _)| *sub_id != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn notify_created(&self, timer: &Timer) {
        for (_, observer) in &self.observers {
            observer.on_timer_created(timer);
        }
    }

    pub(crate) fn notify_updated(&self, timer: &Timer) {
        for (_, observer) in &self.observers {
            observer.on_timer_updated(timer);
        }
    }

    pub(crate) fn notify_deleted(&self, id: TimerId) {
        for (_, observer) in &self.observers {
            observer.on_timer_deleted(id);
        }
    }
}
