//! Data source abstraction layer
//!
//! Collaborators the pollers read from, behind traits so tests can swap
//! in fakes:
//! - `traits`: source and terminator traits
//! - `system`: `sysinfo`-backed memory and process access
//! - `offline`: game info source used when no game data is reachable

pub mod offline;
pub mod system;
pub mod traits;

pub use offline::OfflineGameInfo;
pub use system::{process_name_matches, SystemSource};
pub use traits::{GameInfoSource, MemorySource, ProcessLookup, ProcessTerminator};
