//! SQLite-backed persistence.
//!
//! Layout:
//! - `kv` table: the timer collection as one JSON record under the `timers`
//!   key (each write fully replaces the previous one), plus dashboards
//! - `runtime` table: one row per running timer
//!
//! Crash between writes can lose the most recent mutation but never corrupts
//! stored state.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::timer::{RuntimeRecord, Timer, TimerId};

use super::{data_dir, TimerStore};

const TIMERS_KEY: &str = "timers";

/// SQLite database holding timers, runtime records, and dashboards.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/timerdeck/timerdeck.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("timerdeck.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS runtime (
                timer_id   INTEGER PRIMARY KEY,
                started_at TEXT NOT NULL,
                base_secs  INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl TimerStore for Database {
    fn save_all(&self, timers: &[Timer]) -> Result<(), StorageError> {
        let json = serde_json::to_string(timers)?;
        self.kv_set(TIMERS_KEY, &json)
    }

    fn load_all(&self) -> Result<Vec<Timer>, StorageError> {
        match self.kv_get(TIMERS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_runtime(&self, record: &RuntimeRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO runtime (timer_id, started_at, base_secs)
             VALUES (?1, ?2, ?3)",
            params![
                record.timer_id,
                record.started_at.to_rfc3339(),
                record.base_secs
            ],
        )?;
        Ok(())
    }

    fn get_runtime(&self, id: TimerId) -> Result<Option<RuntimeRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT started_at, base_secs FROM runtime WHERE timer_id = ?1")?;
        let result = stmt.query_row(params![id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        });
        match result {
            Ok((started_at, base_secs)) => {
                let started_at = DateTime::parse_from_rfc3339(&started_at)
                    .map_err(|e| {
                        StorageError::CorruptRecord(format!(
                            "bad started_at for timer {id}: {e}"
                        ))
                    })?
                    .with_timezone(&Utc);
                Ok(Some(RuntimeRecord {
                    timer_id: id,
                    started_at,
                    base_secs,
                }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_runtime(&self, id: TimerId) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM runtime WHERE timer_id = ?1", params![id])?;
        Ok(())
    }
}
