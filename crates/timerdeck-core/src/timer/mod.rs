mod engine;
mod projection;
mod runtime;
mod types;

pub use engine::TimerEngine;
pub use projection::project;
pub use runtime::RuntimeRecord;
pub use types::{Timer, TimerId, TimerKind};
