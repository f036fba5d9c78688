//! # Timerdeck Core Library
//!
//! Core business logic for Timerdeck: many independent countdown and
//! count-up timers, grouped into named dashboards, that survive process
//! restarts without losing accuracy. All state derives from wall-clock
//! timestamps -- nothing is persisted per tick, so a timer that ran while the
//! process was away is exact after a single recomputation on load.
//!
//! ## Architecture
//!
//! - **Timer Engine**: wall-clock state machine owning the canonical timer
//!   collection; a driver calls `tick()` roughly once per second while
//!   anything runs
//! - **Time Projection**: pure derivation of the live value from a stored
//!   base value and a start timestamp
//! - **Storage**: SQLite-backed key-value store and TOML configuration
//! - **Observer Bus**: synchronous fan-out of create/update/delete events
//! - **Alert Dispatcher**: seam to whatever renders completion alerts
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: timer lifecycle and completion detection
//! - [`project`]: the read-time value derivation
//! - [`Database`]: timer, runtime, and dashboard persistence
//! - [`Config`]: application configuration management

pub mod alert;
pub mod clock;
pub mod dashboard;
pub mod error;
pub mod observer;
pub mod storage;
pub mod timer;

pub use alert::{AlertConfig, AlertDispatcher, NullAlerts, Repeat};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dashboard::{Dashboard, Dashboards};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use observer::{ObserverBus, ObserverId, TimerObserver};
pub use storage::{Config, Database, MemoryStore, TimerStore};
pub use timer::{project, RuntimeRecord, Timer, TimerEngine, TimerId, TimerKind};
