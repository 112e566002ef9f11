//! Domain models for servmon
//!
//! Memory readings, threshold checks and the shared monitored state.

pub mod memory;
pub mod state;

pub use memory::{MemoryDetail, MemoryInfo, MemoryThresholds, ThresholdCheck};
pub use state::{
    GameUpdate, MemoryUpdate, ProcessUpdate, SharedState, StateHandle, Tracked, OFFLINE_THEATER,
};
