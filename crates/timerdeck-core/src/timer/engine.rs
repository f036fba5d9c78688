//! Timer engine implementation.
//!
//! The engine is a wall-clock state machine over a collection of independent
//! countdown and count-up timers. It owns the canonical collection, persists
//! it on every mutation, and fans lifecycle events out to subscribed
//! observers. It has no internal threads -- a driver calls `tick()` roughly
//! once per second while anything is running.
//!
//! ## Countdown state transitions
//!
//! ```text
//! Idle -> Running -> Finished(unacknowledged) -> Finished(acknowledged)
//!   ^                                                   |
//!   +------------------ start (values reset) -----------+
//! ```
//!
//! `Running -> Finished` fires the completion alert exactly once per run,
//! whether the zero crossing is observed by a tick, by several ticks, or on
//! resume from storage after the process was away.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Database::open()?, NullAlerts);
//! let timer = engine.create_countdown_timer("bake", 300, None)?;
//! engine.start_timer(timer.id())?;
//! // In a loop:
//! engine.tick();
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::alert::{AlertConfig, AlertDispatcher};
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result, ValidationError};
use crate::observer::{ObserverBus, ObserverId, TimerObserver};
use crate::storage::TimerStore;

use super::projection::project;
use super::{RuntimeRecord, Timer, TimerId};

/// Owns the canonical timer collection and drives its lifecycle.
///
/// Single-threaded and synchronous: every operation runs to completion before
/// another can observe intermediate state, so no locking is needed. Pausing
/// or deleting a timer removes its runtime record before returning, which is
/// what guarantees no tick notification escapes for a timer the caller
/// already considers paused or gone.
pub struct TimerEngine {
    store: Box<dyn TimerStore>,
    alerts: Box<dyn AlertDispatcher>,
    clock: Box<dyn Clock>,
    timers: BTreeMap<TimerId, Timer>,
    /// In-memory mirror of the store's runtime namespace; holds exactly the
    /// running timers.
    runtimes: HashMap<TimerId, RuntimeRecord>,
    /// Countdown ids whose completion alert already fired this run.
    alert_fired: HashSet<TimerId>,
    observers: ObserverBus,
    next_id: TimerId,
}

impl TimerEngine {
    /// Build an engine over the given store and alert dispatcher, loading any
    /// persisted timers. Countdowns that reached zero while no engine was
    /// alive are finished (and alerted) immediately.
    pub fn new(store: impl TimerStore + 'static, alerts: impl AlertDispatcher + 'static) -> Self {
        Self::with_clock(store, alerts, SystemClock)
    }

    /// Like [`TimerEngine::new`] with an explicit clock, for simulations.
    pub fn with_clock(
        store: impl TimerStore + 'static,
        alerts: impl AlertDispatcher + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        let mut engine = Self {
            store: Box::new(store),
            alerts: Box::new(alerts),
            clock: Box::new(clock),
            timers: BTreeMap::new(),
            runtimes: HashMap::new(),
            alert_fired: HashSet::new(),
            observers: ObserverBus::new(),
            next_id: 1,
        };
        engine.load();
        engine
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: Box<dyn TimerObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The live projection of one timer, or `None` after deletion.
    pub fn get_timer(&self, id: TimerId) -> Option<Timer> {
        let now = self.clock.now();
        self.timers
            .get(&id)
            .map(|timer| project(timer, self.runtimes.get(&id), now))
    }

    /// Live projections of every timer, in id order.
    pub fn all_timers(&self) -> Vec<Timer> {
        let now = self.clock.now();
        self.timers
            .values()
            .map(|timer| project(timer, self.runtimes.get(&timer.id()), now))
            .collect()
    }

    // ── Lifecycle operations ─────────────────────────────────────────

    /// Create a stopped countdown timer. `total_secs` must be positive.
    pub fn create_countdown_timer(
        &mut self,
        label: impl Into<String>,
        total_secs: u64,
        alert: Option<AlertConfig>,
    ) -> Result<Timer> {
        if total_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "total_secs".into(),
                message: "countdown duration must be greater than zero".into(),
            }
            .into());
        }
        let id = self.allocate_id();
        self.insert_new(Timer::Countdown {
            id,
            label: label.into(),
            total_secs,
            remaining_secs: total_secs,
            is_running: false,
            is_finished: false,
            is_acknowledged: false,
            alert: alert.unwrap_or_default(),
        })
    }

    /// Create a stopped count-up timer at zero.
    pub fn create_countup_timer(&mut self, label: impl Into<String>) -> Result<Timer> {
        let id = self.allocate_id();
        self.insert_new(Timer::Countup {
            id,
            label: label.into(),
            elapsed_secs: 0,
            is_running: false,
        })
    }

    /// Start (or restart) a timer.
    ///
    /// A finished countdown that has not been acknowledged stays put -- the
    /// call is a no-op returning the current state. A finished-and-
    /// acknowledged countdown resets to its full duration first. Starting a
    /// timer that is already running re-bases its runtime record on the
    /// current projection, which is observably idempotent.
    pub fn start_timer(&mut self, id: TimerId) -> Result<Timer> {
        match self.timers.get(&id) {
            None => return Err(CoreError::NotFound { id }),
            Some(Timer::Countdown {
                is_finished: true,
                is_acknowledged: false,
                ..
            }) => {
                // Still alerting; cannot restart until acknowledged.
                return self.get_timer(id).ok_or(CoreError::NotFound { id });
            }
            Some(Timer::Countdown {
                is_finished: true,
                is_acknowledged: true,
                ..
            }) => {
                self.reset_countdown_values(id);
            }
            Some(_) => {}
        }

        let now = self.clock.now();
        let base = self
            .get_timer(id)
            .ok_or(CoreError::NotFound { id })?
            .value_secs();
        self.write_runtime(RuntimeRecord::new(id, now, base));
        if let Some(timer) = self.timers.get_mut(&id) {
            timer.set_running(true);
        }
        self.alert_fired.remove(&id);
        self.persist_all();
        debug!(id, "timer started");
        self.notify_updated_and_get(id)
    }

    /// Freeze the current projection into the stored value and stop running.
    /// A no-op for timers that are not running.
    pub fn pause_timer(&mut self, id: TimerId) -> Result<Timer> {
        let timer = self.timers.get(&id).ok_or(CoreError::NotFound { id })?;
        if !timer.is_running() {
            // Stored value is authoritative as-is.
            return self.get_timer(id).ok_or(CoreError::NotFound { id });
        }
        let now = self.clock.now();
        // Freeze the in-flight elapsed time before dropping the runtime record.
        let mut frozen = project(timer, self.runtimes.get(&id), now);
        frozen.set_running(false);
        self.clear_runtime(id);
        self.timers.insert(id, frozen);
        self.persist_all();
        debug!(id, "timer paused");
        self.notify_updated_and_get(id)
    }

    /// Put a countdown back at its full duration, stopped and unfinished.
    pub fn reset_countdown_timer(&mut self, id: TimerId) -> Result<Timer> {
        match self.timers.get(&id) {
            None => return Err(CoreError::NotFound { id }),
            Some(Timer::Countup { .. }) => {
                return Err(CoreError::WrongType {
                    id,
                    expected: "countdown",
                })
            }
            Some(Timer::Countdown { .. }) => {}
        }
        self.reset_countdown_values(id);
        self.persist_all();
        debug!(id, "countdown reset");
        self.notify_updated_and_get(id)
    }

    /// Put a count-up back at zero, stopped.
    pub fn reset_countup_timer(&mut self, id: TimerId) -> Result<Timer> {
        match self.timers.get(&id) {
            None => return Err(CoreError::NotFound { id }),
            Some(Timer::Countdown { .. }) => {
                return Err(CoreError::WrongType {
                    id,
                    expected: "count-up",
                })
            }
            Some(Timer::Countup { .. }) => {}
        }
        self.clear_runtime(id);
        if let Some(Timer::Countup {
            elapsed_secs,
            is_running,
            ..
        }) = self.timers.get_mut(&id)
        {
            *elapsed_secs = 0;
            *is_running = false;
        }
        self.persist_all();
        debug!(id, "count-up reset");
        self.notify_updated_and_get(id)
    }

    /// Clear the alerting condition of a finished countdown, enabling restart.
    ///
    /// Cancels the dispatcher before touching state so observers never see a
    /// stale "still alerting" view. Running and finished flags are untouched.
    pub fn acknowledge_timer(&mut self, id: TimerId) -> Result<Timer> {
        match self.timers.get(&id) {
            None => return Err(CoreError::NotFound { id }),
            Some(Timer::Countup { .. }) => {
                return Err(CoreError::WrongType {
                    id,
                    expected: "countdown",
                })
            }
            Some(Timer::Countdown {
                is_finished: false, ..
            }) => {
                return Err(CoreError::WrongType {
                    id,
                    expected: "finished countdown",
                })
            }
            Some(Timer::Countdown { .. }) => {}
        }
        self.alerts.cancel_alert();
        if let Some(Timer::Countdown {
            is_acknowledged, ..
        }) = self.timers.get_mut(&id)
        {
            *is_acknowledged = true;
        }
        self.persist_all();
        debug!(id, "timer acknowledged");
        self.notify_updated_and_get(id)
    }

    /// Same transition as [`TimerEngine::acknowledge_timer`] under its
    /// user-facing name: silence the alert.
    pub fn stop_alert(&mut self, id: TimerId) -> Result<Timer> {
        self.acknowledge_timer(id)
    }

    /// Remove a timer, its runtime record, and any sounding alert.
    /// Returns false (not an error) when the id is absent.
    pub fn delete_timer(&mut self, id: TimerId) -> Result<bool> {
        if !self.timers.contains_key(&id) {
            return Ok(false);
        }
        // Silence a completion alert that may still be sounding.
        if let Some(Timer::Countdown {
            is_finished: true,
            is_acknowledged: false,
            ..
        }) = self.timers.get(&id)
        {
            if self.alert_fired.contains(&id) {
                self.alerts.cancel_alert();
            }
        }
        self.alert_fired.remove(&id);
        self.clear_runtime(id);
        self.timers.remove(&id);
        self.persist_all();
        debug!(id, "timer deleted");
        self.observers.notify_deleted(id);
        Ok(true)
    }

    // ── Ticking ──────────────────────────────────────────────────────

    /// Drive every running timer forward. Call roughly once per second.
    ///
    /// Each running timer gets a fresh projection and an update notification;
    /// countdowns that crossed zero are finished. Returns the ids finished on
    /// this tick.
    pub fn tick(&mut self) -> Vec<TimerId> {
        let mut running: Vec<TimerId> = self.runtimes.keys().copied().collect();
        running.sort_unstable();
        let mut finished = Vec::new();
        for id in running {
            if self.finish_if_due(id) {
                finished.push(id);
            } else {
                let _ = self.notify_updated_and_get(id);
            }
        }
        finished
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load(&mut self) {
        let loaded = match self.store.load_all() {
            Ok(timers) => timers,
            Err(e) => {
                warn!("failed to load timer collection: {e}");
                Vec::new()
            }
        };
        let count = loaded.len();
        for mut timer in loaded {
            let id = timer.id();
            let mut runtime = match self.store.get_runtime(id) {
                Ok(record) => record.filter(RuntimeRecord::is_active),
                Err(e) => {
                    warn!("failed to load runtime record for timer {id}: {e}");
                    None
                }
            };
            // A finished timer can't be running; drop any leftover record
            // from an interrupted write.
            if timer.is_finished() && runtime.is_some() {
                runtime = None;
                if let Err(e) = self.store.delete_runtime(id) {
                    warn!("failed to delete stale runtime record for timer {id}: {e}");
                }
            }
            timer.set_running(runtime.is_some());
            if let Some(record) = runtime {
                self.runtimes.insert(id, record);
            }
            self.timers.insert(id, timer);
        }
        self.next_id = self.timers.keys().next_back().map_or(1, |max| max + 1);
        debug!(count, "loaded timer collection");

        // A countdown can reach zero while no engine instance is alive;
        // detect those now so the completion alert still fires.
        let mut running: Vec<TimerId> = self.runtimes.keys().copied().collect();
        running.sort_unstable();
        for id in running {
            self.finish_if_due(id);
        }
    }

    fn allocate_id(&mut self) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_new(&mut self, timer: Timer) -> Result<Timer> {
        let id = timer.id();
        let created = timer.clone();
        self.timers.insert(id, timer);
        self.persist_all();
        debug!(id, label = created.label(), "timer created");
        self.observers.notify_created(&created);
        Ok(created)
    }

    /// Completion check for one running countdown. True when it finished.
    fn finish_if_due(&mut self, id: TimerId) -> bool {
        let now = self.clock.now();
        let due = match self.timers.get(&id) {
            Some(timer @ Timer::Countdown { .. }) => {
                project(timer, self.runtimes.get(&id), now).value_secs() == 0
            }
            _ => false,
        };
        if due {
            self.finish_countdown(id);
        }
        due
    }

    /// `Running -> Finished(unacknowledged)`. Alerts at most once per run.
    fn finish_countdown(&mut self, id: TimerId) {
        self.clear_runtime(id);
        let (label, alert) = match self.timers.get_mut(&id) {
            Some(Timer::Countdown {
                label,
                remaining_secs,
                is_running,
                is_finished,
                is_acknowledged,
                alert,
                ..
            }) => {
                *remaining_secs = 0;
                *is_running = false;
                *is_finished = true;
                *is_acknowledged = false;
                (label.clone(), alert.clone())
            }
            _ => return,
        };
        self.persist_all();
        debug!(id, "countdown finished");
        // The marker absorbs repeat zero observations within one run.
        if self.alert_fired.insert(id) && alert.enabled {
            self.alerts.play_alert(&label, &alert);
        }
        let _ = self.notify_updated_and_get(id);
    }

    /// Back to the initial countdown state: full duration, no flags, no
    /// runtime, alert marker cleared.
    fn reset_countdown_values(&mut self, id: TimerId) {
        self.clear_runtime(id);
        self.alert_fired.remove(&id);
        if let Some(Timer::Countdown {
            total_secs,
            remaining_secs,
            is_running,
            is_finished,
            is_acknowledged,
            ..
        }) = self.timers.get_mut(&id)
        {
            *remaining_secs = *total_secs;
            *is_running = false;
            *is_finished = false;
            *is_acknowledged = false;
        }
    }

    /// Best-effort write of the whole collection as a single record.
    fn persist_all(&self) {
        let timers: Vec<Timer> = self.timers.values().cloned().collect();
        if let Err(e) = self.store.save_all(&timers) {
            warn!("failed to persist timer collection: {e}");
        }
    }

    fn write_runtime(&mut self, record: RuntimeRecord) {
        if let Err(e) = self.store.save_runtime(&record) {
            warn!(
                "failed to persist runtime record for timer {}: {e}",
                record.timer_id
            );
        }
        self.runtimes.insert(record.timer_id, record);
    }

    fn clear_runtime(&mut self, id: TimerId) {
        self.runtimes.remove(&id);
        if let Err(e) = self.store.delete_runtime(id) {
            warn!("failed to delete runtime record for timer {id}: {e}");
        }
    }

    fn notify_updated_and_get(&self, id: TimerId) -> Result<Timer> {
        let projected = self.get_timer(id).ok_or(CoreError::NotFound { id })?;
        self.observers.notify_updated(&projected);
        Ok(projected)
    }
}
