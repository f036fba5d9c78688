mod config;
pub mod database;
mod memory;

pub use config::{AlertDefaultsConfig, Config, WatchConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;
use crate::timer::{RuntimeRecord, Timer, TimerId};

/// Persistence contract for timer definitions and runtime records.
///
/// Two logical namespaces: the timer collection, written whole as a single
/// record, and one runtime record per running timer. The engine treats every
/// call as best effort -- implementations report failures, the engine logs
/// and carries on with its in-memory state.
pub trait TimerStore {
    /// Replace the persisted collection with `timers`.
    fn save_all(&self, timers: &[Timer]) -> Result<(), StorageError>;
    /// The persisted collection; empty when nothing was ever saved.
    fn load_all(&self) -> Result<Vec<Timer>, StorageError>;
    fn save_runtime(&self, record: &RuntimeRecord) -> Result<(), StorageError>;
    fn get_runtime(&self, id: TimerId) -> Result<Option<RuntimeRecord>, StorageError>;
    /// Removing an absent record is not an error.
    fn delete_runtime(&self, id: TimerId) -> Result<(), StorageError>;
}

/// Returns `~/.config/timerdeck[-dev]/` based on TIMERDECK_ENV.
///
/// Set TIMERDECK_ENV=dev to use the development data directory, or
/// TIMERDECK_DATA_DIR to point somewhere else entirely (tests do).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    if let Ok(dir) = std::env::var("TIMERDECK_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMERDECK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timerdeck-dev")
    } else {
        base_dir.join("timerdeck")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
