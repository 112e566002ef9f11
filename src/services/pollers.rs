//! Info pollers
//!
//! Service tasks that refresh one slice of the shared state each. Every poll
//! rotates the previous reading into `former` before storing the new one.
//! When a source fails the poller records an offline/zero reading and
//! reports the error; the schedule carries on.

use crate::config::Config;
use crate::domain::{GameUpdate, MemoryDetail, MemoryInfo, MemoryUpdate, ProcessUpdate, StateHandle};
use crate::error::{CollectError, TaskError};
use crate::scheduler::{Period, ScheduledTask, TaskKind, TickOutcome};
use crate::sources::{GameInfoSource, MemorySource, ProcessLookup, ProcessTerminator};

use std::sync::Arc;

pub const MEMORY_TASK: &str = "memory";
pub const SERVERS_TASK: &str = "servers";
pub const GAME_INFO_TASK: &str = "game-info";

/// How many minutes the game-info poll trails the alert tick
pub const GAME_INFO_LAG_MINUTES: u32 = 1;

/// Process-presence poll cadence
pub const SERVER_POLL: Period = Period::seconds(5);

/// Memory poll cadence
pub const MEMORY_POLL: Period = Period::seconds(10);

/// Memory poller
///
/// Also enforces auto-kill: when memory passes the kill threshold while the
/// game server runs, the game process is terminated.
pub struct MemoryPoller {
    config: Arc<Config>,
    state: StateHandle,
    source: Arc<dyn MemorySource>,
    terminator: Arc<dyn ProcessTerminator>,
}

impl MemoryPoller {
    pub fn new(
        config: Arc<Config>,
        state: StateHandle,
        source: Arc<dyn MemorySource>,
        terminator: Arc<dyn ProcessTerminator>,
    ) -> Self {
        Self {
            config,
            state,
            source,
            terminator,
        }
    }

    fn read(&self) -> Result<(MemoryInfo, MemoryDetail), CollectError> {
        Ok((self.source.memory_info()?, self.source.memory_detail()?))
    }
}

impl ScheduledTask for MemoryPoller {
    fn name(&self) -> &str {
        MEMORY_TASK
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Service
    }

    fn default_interval(&self) -> Period {
        MEMORY_POLL
    }

    fn run(&self) -> Result<TickOutcome, TaskError> {
        let (reading, failure) = match self.read() {
            Ok(reading) => (reading, None),
            Err(e) => ((MemoryInfo::default(), MemoryDetail::default()), Some(e)),
        };
        let (info, detail) = reading;

        let check = self.config.memory.thresholds().check(&info);
        self.state.apply_memory(MemoryUpdate {
            info,
            detail,
            check,
        });
        log::debug!("Memory: {}", info);

        if let Some(e) = failure {
            return Err(e.into());
        }

        let game_online = self.state.read(|s| s.game_online);
        if !check.below_kill && self.config.memory.auto_kill && game_online {
            let name = &self.config.monitor.game_server_name;
            log::warn!(
                "Memory use {:.0} MB exceeds kill limit; terminating '{}'",
                info.used_mb,
                name
            );
            self.terminator.terminate(name)?;
        }

        Ok(TickOutcome::Continue)
    }
}

/// Process-presence poller for the game and voice servers
pub struct ProcessPoller {
    config: Arc<Config>,
    state: StateHandle,
    processes: Arc<dyn ProcessLookup>,
}

impl ProcessPoller {
    pub fn new(config: Arc<Config>, state: StateHandle, processes: Arc<dyn ProcessLookup>) -> Self {
        Self {
            config,
            state,
            processes,
        }
    }

    fn online(&self, name: &str) -> bool {
        self.processes.is_running(name).unwrap_or_else(|e| {
            log::debug!("Process check for '{}' failed: {}", name, e);
            false
        })
    }
}

impl ScheduledTask for ProcessPoller {
    fn name(&self) -> &str {
        SERVERS_TASK
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Service
    }

    fn default_interval(&self) -> Period {
        SERVER_POLL
    }

    fn run(&self) -> Result<TickOutcome, TaskError> {
        let update = ProcessUpdate {
            game_online: self.online(&self.config.monitor.game_server_name),
            voip_online: self.online(&self.config.monitor.voip_server_name),
        };
        log::debug!(
            "Servers: game {} voip {}",
            online_label(update.game_online),
            online_label(update.voip_online)
        );
        self.state.apply_processes(update);
        Ok(TickOutcome::Continue)
    }
}

fn online_label(online: bool) -> &'static str {
    if online {
        "online"
    } else {
        "offline"
    }
}

/// Game-data poller: theater, player count and roster
///
/// Runs one minute slower than the alert tick, so an alert sees the player
/// count from before the failure rather than the zero recorded after it.
pub struct GameInfoPoller {
    config: Arc<Config>,
    state: StateHandle,
    source: Arc<dyn GameInfoSource>,
}

impl GameInfoPoller {
    pub fn new(config: Arc<Config>, state: StateHandle, source: Arc<dyn GameInfoSource>) -> Self {
        Self {
            config,
            state,
            source,
        }
    }

    fn read(&self) -> Result<GameUpdate, CollectError> {
        Ok(GameUpdate {
            player_count: self.source.pilot_count()?,
            player_status: self.source.pilot_data()?,
            theater_name: self.source.theater_name()?,
        })
    }
}

impl ScheduledTask for GameInfoPoller {
    fn name(&self) -> &str {
        GAME_INFO_TASK
    }

    fn kind(&self) -> TaskKind {
        TaskKind::Service
    }

    fn default_interval(&self) -> Period {
        Period::minutes(self.config.monitor.interval + GAME_INFO_LAG_MINUTES)
    }

    fn run(&self) -> Result<TickOutcome, TaskError> {
        match self.read() {
            Ok(update) => {
                log::debug!(
                    "Game: {} player(s) in {}",
                    update.player_count,
                    update.theater_name
                );
                self.state.apply_game(update);
                Ok(TickOutcome::Continue)
            }
            Err(e) => {
                self.state.apply_game(GameUpdate::offline());
                Err(e.into())
            }
        }
    }
}
