//! Service layer for server monitoring
//!
//! Services hold the periodic work of the monitor: info pollers, CSV logging,
//! the startup wait and the wiring that registers all of it.

pub mod csv_log;
pub mod monitor;
pub mod pollers;
pub mod report;
pub mod startup;

pub use csv_log::{CsvLogger, LogScheduler, LOGGING_TASK};
pub use monitor::{Monitor, Sources};
pub use pollers::{
    GameInfoPoller, MemoryPoller, ProcessPoller, GAME_INFO_LAG_MINUTES, GAME_INFO_TASK,
    MEMORY_POLL, MEMORY_TASK, SERVERS_TASK, SERVER_POLL,
};
pub use report::{CooldownStatus, StatusReport};
pub use startup::{ServerWait, WaitOutcome};
