//! Trait definitions for monitored data sources
//!
//! These traits abstract the operating system and game server so pollers can
//! be tested with mocks.

use crate::domain::{MemoryDetail, MemoryInfo};
use crate::error::CollectError;

/// System memory counters
pub trait MemorySource: Send + Sync {
    /// Available, total and used memory in megabytes
    fn memory_info(&self) -> Result<MemoryInfo, CollectError>;

    /// Detailed counter snapshot, as written to the CSV log
    fn memory_detail(&self) -> Result<MemoryDetail, CollectError>;
}

/// Process presence queries
pub trait ProcessLookup: Send + Sync {
    fn is_running(&self, name: &str) -> Result<bool, CollectError>;
}

/// Forced process termination
pub trait ProcessTerminator: Send + Sync {
    /// Kill every process with this name; returns how many were signalled
    fn terminate(&self, name: &str) -> Result<usize, CollectError>;
}

/// Live game-server data
pub trait GameInfoSource: Send + Sync {
    fn theater_name(&self) -> Result<String, CollectError>;

    fn pilot_count(&self) -> Result<u32, CollectError>;

    /// Roster lines, in server order
    fn pilot_data(&self) -> Result<Vec<String>, CollectError>;
}
