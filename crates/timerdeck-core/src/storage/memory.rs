//! In-memory store for tests and embedders.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StorageError;
use crate::timer::{RuntimeRecord, Timer, TimerId};

use super::TimerStore;

#[derive(Default)]
struct Inner {
    timers: Vec<Timer>,
    runtimes: HashMap<TimerId, RuntimeRecord>,
    fail_writes: bool,
}

/// Shared-handle in-memory store.
///
/// Clones observe the same data, which lets a test hand one handle to an
/// engine and keep another to inspect persisted state or to build a second
/// engine simulating a process restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, to exercise best-effort persistence.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Snapshot of the persisted collection.
    pub fn stored_timers(&self) -> Vec<Timer> {
        self.inner.borrow().timers.clone()
    }

    /// Snapshot of one persisted runtime record.
    pub fn stored_runtime(&self, id: TimerId) -> Option<RuntimeRecord> {
        self.inner.borrow().runtimes.get(&id).cloned()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.inner.borrow().fail_writes {
            Err(StorageError::QueryFailed(
                "simulated write failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl TimerStore for MemoryStore {
    fn save_all(&self, timers: &[Timer]) -> Result<(), StorageError> {
        self.check_writable()?;
        self.inner.borrow_mut().timers = timers.to_vec();
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Timer>, StorageError> {
        Ok(self.inner.borrow().timers.clone())
    }

    fn save_runtime(&self, record: &RuntimeRecord) -> Result<(), StorageError> {
        self.check_writable()?;
        self.inner
            .borrow_mut()
            .runtimes
            .insert(record.timer_id, record.clone());
        Ok(())
    }

    fn get_runtime(&self, id: TimerId) -> Result<Option<RuntimeRecord>, StorageError> {
        Ok(self.inner.borrow().runtimes.get(&id).cloned())
    }

    fn delete_runtime(&self, id: TimerId) -> Result<(), StorageError> {
        self.check_writable()?;
        self.inner.borrow_mut().runtimes.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();

        let timers = vec![Timer::Countup {
            id: 1,
            label: "x".into(),
            elapsed_secs: 0,
            is_running: false,
        }];
        store.save_all(&timers).unwrap();
        assert_eq!(other.load_all().unwrap(), timers);
    }

    #[test]
    fn fail_writes_rejects_mutations_only() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.save_all(&[]).is_err());
        assert!(store.load_all().is_ok());
    }
}
