//! Shared monitored state
//!
//! Every monitored fact lives in one [`SharedState`] guarded by a single
//! `RwLock`. Each poller owns a slice of the state and replaces it in one
//! write-locked update, so a reader can never see a current value paired with
//! a stale or half-rotated former value.

use super::memory::{MemoryDetail, MemoryInfo, ThresholdCheck};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

/// Theater name reported while the game is not providing data
pub const OFFLINE_THEATER: &str = "(offline)";

/// A value together with the value it held at the previous poll
///
/// # Examples
///
/// ```
/// use servmon::domain::Tracked;
///
/// let mut count = Tracked::new(0);
/// count.rotate(12);
/// count.rotate(0);
/// assert_eq!(count.current, 0);
/// assert_eq!(count.former, 12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tracked<T> {
    pub current: T,
    pub former: T,
}

impl<T: Clone> Tracked<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial.clone(),
            former: initial,
        }
    }

    /// Move `current` into `former`, then store the fresh value
    pub fn rotate(&mut self, fresh: T) {
        self.former = std::mem::replace(&mut self.current, fresh);
    }
}

/// Snapshot of all monitored facts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedState {
    pub memory: Tracked<MemoryInfo>,
    pub memory_detail: Tracked<MemoryDetail>,
    pub memory_below_max: bool,
    pub memory_below_kill: bool,

    pub game_online: bool,
    pub voip_online: bool,

    pub player_count: Tracked<u32>,
    pub player_status: Tracked<Vec<String>>,
    pub theater_name: String,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            memory: Tracked::default(),
            memory_detail: Tracked::default(),
            memory_below_max: true,
            memory_below_kill: true,
            game_online: false,
            voip_online: false,
            player_count: Tracked::new(0),
            player_status: Tracked::default(),
            theater_name: OFFLINE_THEATER.to_string(),
        }
    }
}

/// Memory slice written by the memory poller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryUpdate {
    pub info: MemoryInfo,
    pub detail: MemoryDetail,
    pub check: ThresholdCheck,
}

/// Process-presence slice written by the process poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessUpdate {
    pub game_online: bool,
    pub voip_online: bool,
}

/// Game-info slice written by the game poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameUpdate {
    pub player_count: u32,
    pub player_status: Vec<String>,
    pub theater_name: String,
}

impl GameUpdate {
    /// The reading recorded when the game data source is unavailable
    pub fn offline() -> Self {
        Self {
            player_count: 0,
            player_status: Vec::new(),
            theater_name: OFFLINE_THEATER.to_string(),
        }
    }
}

/// Cloneable handle to the process-wide [`SharedState`]
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Arc<RwLock<SharedState>>,
}

impl StateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the whole state, taken under one read lock
    pub fn snapshot(&self) -> SharedState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run a closure against the state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&SharedState) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn apply_memory(&self, update: MemoryUpdate) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.memory.rotate(update.info);
        state.memory_detail.rotate(update.detail);
        state.memory_below_max = update.check.below_max;
        state.memory_below_kill = update.check.below_kill;
    }

    pub fn apply_processes(&self, update: ProcessUpdate) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.game_online = update.game_online;
        state.voip_online = update.voip_online;
    }

    pub fn apply_game(&self, update: GameUpdate) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.player_count.rotate(update.player_count);
        state.player_status.rotate(update.player_status);
        state.theater_name = update.theater_name;
    }
}
