//! Alert suppression windows
//!
//! Each alert kind owns one [`CooldownWindow`]. While the window is not idle
//! the kind's rule cannot trigger. The window is armed by the registry start
//! gate of its [`CooldownTask`] and cleared by that task's recheck ticks.
//!
//! Transition table (`recovered` = the watched condition is healthy again):
//!
//! | phase       | event               | next        | timer                 |
//! |-------------|---------------------|-------------|-----------------------|
//! | Idle        | arm (normal)        | Suppressing | start                 |
//! | Idle        | arm (hastened)      | Escalating  | start                 |
//! | Suppressing | arm / Escalating    | unchanged   | start declined        |
//! | any         | recheck, recovered  | unchanged   | stop                  |
//! | Suppressing | recheck, memory     | Escalating  | reschedule to 1 min   |
//! | Suppressing | recheck, process    | Suppressing | continue              |
//! | Escalating  | recheck             | Escalating  | continue              |
//! | Idle        | recheck             | Idle        | stop                  |
//! | any         | task stopped        | Idle        |                       |
//!
//! A recovered recheck leaves the phase alone; the window goes idle from the
//! task's stop hook, which runs only after its timer is marked stopped. An
//! alert tick in between still sees the window active and stays quiet.

use super::types::AlertKind;
use crate::domain::{SharedState, StateHandle};
use crate::error::TaskError;
use crate::scheduler::{Period, ScheduledTask, StartMode, TaskKind, TickOutcome};

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Recheck interval for process cooldowns, and for memory once escalated
pub const RECHECK: Period = Period::minutes(1);

/// Suppression phase of a cooldown window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownPhase {
    Idle,
    /// Armed; waiting for the first recheck
    Suppressing,
    /// Memory only: still unhealthy after `min_time`, rechecking every minute
    Escalating,
}

impl fmt::Display for CooldownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Suppressing => write!(f, "suppressing"),
            Self::Escalating => write!(f, "escalating"),
        }
    }
}

#[derive(Debug)]
struct WindowState {
    phase: CooldownPhase,
    armed_at: Option<SystemTime>,
}

/// Suppression state for one alert kind
#[derive(Debug)]
pub struct CooldownWindow {
    kind: AlertKind,
    state: Mutex<WindowState>,
}

impl CooldownWindow {
    pub fn new(kind: AlertKind) -> Self {
        Self {
            kind,
            state: Mutex::new(WindowState {
                phase: CooldownPhase::Idle,
                armed_at: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    pub fn phase(&self) -> CooldownPhase {
        self.lock().phase
    }

    pub fn is_active(&self) -> bool {
        self.phase() != CooldownPhase::Idle
    }

    pub fn armed_at(&self) -> Option<SystemTime> {
        self.lock().armed_at
    }

    /// Delay until the first recheck after arming
    pub fn first_recheck(&self, min_time: u32, mode: StartMode) -> Period {
        match (self.kind, mode) {
            (AlertKind::Memory, StartMode::Normal) => Period::minutes(min_time),
            _ => RECHECK,
        }
    }

    /// Idle to armed, atomically; `false` if already armed
    pub fn try_arm(&self, mode: StartMode) -> bool {
        let mut state = self.lock();
        if state.phase != CooldownPhase::Idle {
            return false;
        }

        state.phase = match (self.kind, mode) {
            (AlertKind::Memory, StartMode::Hastened) => CooldownPhase::Escalating,
            _ => CooldownPhase::Suppressing,
        };
        state.armed_at = Some(SystemTime::now());
        log::info!("{} alerts suppressed ({})", self.kind, state.phase);
        true
    }

    /// Apply one recheck and tell the timer what to do next
    pub fn recheck(&self, recovered: bool) -> TickOutcome {
        let mut state = self.lock();
        match (state.phase, recovered) {
            (CooldownPhase::Idle, _) => TickOutcome::Stop,
            (_, true) => {
                log::info!("{} condition recovered", self.kind);
                TickOutcome::Stop
            }
            (CooldownPhase::Suppressing, false) if self.kind == AlertKind::Memory => {
                state.phase = CooldownPhase::Escalating;
                log::info!(
                    "{} still above threshold; rechecking every {}",
                    self.kind,
                    RECHECK
                );
                TickOutcome::Reschedule(RECHECK)
            }
            (_, false) => TickOutcome::Continue,
        }
    }

    /// Back to idle, whatever the phase
    pub fn reset(&self) {
        let mut state = self.lock();
        if state.phase != CooldownPhase::Idle {
            log::info!("{} cooldown cleared; alerts re-enabled", self.kind);
        }
        state.phase = CooldownPhase::Idle;
        state.armed_at = None;
    }
}

/// The three cooldown windows, one per alert kind
#[derive(Debug, Clone)]
pub struct Cooldowns {
    game: Arc<CooldownWindow>,
    voip: Arc<CooldownWindow>,
    memory: Arc<CooldownWindow>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self {
            game: Arc::new(CooldownWindow::new(AlertKind::Game)),
            voip: Arc::new(CooldownWindow::new(AlertKind::Voip)),
            memory: Arc::new(CooldownWindow::new(AlertKind::Memory)),
        }
    }

    pub fn get(&self, kind: AlertKind) -> &Arc<CooldownWindow> {
        match kind {
            AlertKind::Game => &self.game,
            AlertKind::Voip => &self.voip,
            AlertKind::Memory => &self.memory,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CooldownWindow>> {
        [&self.game, &self.voip, &self.memory].into_iter()
    }
}

impl Default for Cooldowns {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry task that rechecks one cooldown window
pub struct CooldownTask {
    name: String,
    window: Arc<CooldownWindow>,
    state: StateHandle,
}

impl CooldownTask {
    pub fn new(window: Arc<CooldownWindow>, state: StateHandle) -> Self {
        Self {
            name: window.kind().cooldown_task(),
            window,
            state,
        }
    }
}

fn recovered(kind: AlertKind, state: &SharedState) -> bool {
    match kind {
        AlertKind::Game => state.game_online,
        AlertKind::Voip => state.voip_online,
        AlertKind::Memory => state.memory_below_max,
    }
}

impl ScheduledTask for CooldownTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Cooldown
    }

    fn default_interval(&self) -> Period {
        RECHECK
    }

    fn can_start(&self, mode: StartMode) -> bool {
        self.window.try_arm(mode)
    }

    fn on_stopped(&self) {
        self.window.reset();
    }

    fn run(&self) -> Result<TickOutcome, TaskError> {
        let kind = self.window.kind();
        let recovered = self.state.read(|s| recovered(kind, s));
        Ok(self.window.recheck(recovered))
    }
}
