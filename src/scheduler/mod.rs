//! Periodic task scheduling
//!
//! - `task`: task trait, kinds and timing types
//! - `timer`: one stoppable worker thread per running task
//! - `registry`: name-keyed registry with bulk start/stop

pub mod registry;
pub mod task;
pub mod timer;

pub use registry::TaskRegistry;
pub use task::{Period, ScheduledTask, StartMode, TaskKind, TaskStatus, TickOutcome, TimeScale};
pub use timer::PeriodicTimer;
