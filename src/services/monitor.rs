//! Server monitor
//!
//! Wires the shared state, pollers, alert scheduler, cooldown tasks and CSV
//! logger into one task registry, and drives the start/stop sequence.

use crate::alerts::{
    AlertScheduler, CooldownTask, Cooldowns, LogMailer, NotificationManager, ALERTS_TASK,
};
use crate::config::Config;
use crate::domain::StateHandle;
use crate::error::SchedulerError;
use crate::scheduler::{Period, ScheduledTask, StartMode, TaskKind, TaskRegistry, TimeScale};
use crate::services::csv_log::{LogScheduler, LOGGING_TASK};
use crate::services::pollers::{GameInfoPoller, MemoryPoller, ProcessPoller};
use crate::services::report::StatusReport;
use crate::services::startup::{ServerWait, WaitOutcome};
use crate::sources::{
    GameInfoSource, MemorySource, OfflineGameInfo, ProcessLookup, ProcessTerminator, SystemSource,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Data sources the monitor reads from
#[derive(Clone)]
pub struct Sources {
    pub memory: Arc<dyn MemorySource>,
    pub processes: Arc<dyn ProcessLookup>,
    pub terminator: Arc<dyn ProcessTerminator>,
    pub game: Arc<dyn GameInfoSource>,
}

impl Sources {
    /// Local host via `sysinfo`, no game data
    pub fn system() -> Self {
        let host = Arc::new(SystemSource::new());
        Self {
            memory: host.clone(),
            processes: host.clone(),
            terminator: host,
            game: Arc::new(OfflineGameInfo),
        }
    }
}

/// Server monitor
pub struct Monitor {
    config: Arc<Config>,
    state: StateHandle,
    cooldowns: Cooldowns,
    registry: Arc<TaskRegistry>,
    pollers: Vec<Arc<dyn ScheduledTask>>,
}

impl Monitor {
    /// Build and register every task; nothing is started yet
    pub fn new(
        config: Config,
        sources: Sources,
        notifications: NotificationManager,
        scale: TimeScale,
    ) -> Result<Self, SchedulerError> {
        let config = Arc::new(config);
        let state = StateHandle::new();
        let cooldowns = Cooldowns::new();
        let registry = Arc::new(TaskRegistry::new(scale));

        let pollers: Vec<Arc<dyn ScheduledTask>> = vec![
            Arc::new(MemoryPoller::new(
                Arc::clone(&config),
                state.clone(),
                sources.memory,
                Arc::clone(&sources.terminator),
            )),
            Arc::new(ProcessPoller::new(
                Arc::clone(&config),
                state.clone(),
                sources.processes,
            )),
            Arc::new(GameInfoPoller::new(
                Arc::clone(&config),
                state.clone(),
                sources.game,
            )),
        ];
        for poller in &pollers {
            registry.register(Arc::clone(poller))?;
        }

        for window in cooldowns.iter() {
            registry.register(Arc::new(CooldownTask::new(
                Arc::clone(window),
                state.clone(),
            )))?;
        }

        registry.register(Arc::new(AlertScheduler::new(
            Arc::clone(&config),
            state.clone(),
            cooldowns.clone(),
            notifications,
            sources.terminator,
            Arc::downgrade(&registry),
        )))?;
        registry.register(Arc::new(LogScheduler::new(
            Arc::clone(&config),
            state.clone(),
        )))?;

        Ok(Self {
            config,
            state,
            cooldowns,
            registry,
            pollers,
        })
    }

    /// Monitor for the local host in real time
    pub fn system(config: Config) -> Result<Self, SchedulerError> {
        let notifications = NotificationManager::with_email(
            &config.emails,
            Box::new(LogMailer::new(&config.emails)),
        );
        Self::new(config, Sources::system(), notifications, TimeScale::default())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Run every poller once, synchronously
    pub fn poll_once(&self) {
        for poller in &self.pollers {
            if let Err(e) = poller.run() {
                log::warn!("Initial {} poll failed: {}", poller.name(), e);
            }
        }
    }

    /// Initial poll, then start the pollers
    pub fn start_services(&self) -> usize {
        self.poll_once();
        self.registry.start_all_of_kind(TaskKind::Service)
    }

    /// Start the alert and logging tasks, each only if enabled
    pub fn start_system_tasks(&self) -> Result<(), SchedulerError> {
        if self.registry.start_task(
            ALERTS_TASK,
            Period::minutes(self.config.monitor.interval),
            StartMode::Normal,
        )? {
            log::info!(
                "Alerts active: checking every {} min, {} min cooldown",
                self.config.monitor.interval,
                self.config.monitor.min_time
            );
        } else if !self.config.alerts.all {
            log::warn!("Alerts are disabled");
        }

        if self.registry.start_task(
            LOGGING_TASK,
            Period::minutes(self.config.logging.frequency),
            StartMode::Normal,
        )? {
            log::info!(
                "Memory logging every {} min",
                self.config.logging.frequency
            );
        }
        Ok(())
    }

    /// Full startup: pollers, server wait, then alerts and logging
    pub fn start(
        &self,
        wait: &ServerWait,
        shutdown: &AtomicBool,
    ) -> Result<WaitOutcome, SchedulerError> {
        self.start_services();
        let outcome = wait.run(&self.config, &self.state, shutdown);
        if outcome != WaitOutcome::Interrupted {
            self.start_system_tasks()?;
        }
        Ok(outcome)
    }

    /// Block until `shutdown` is set, then stop everything
    pub fn run_until(&self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(200));
        }
        self.shutdown();
    }

    pub fn shutdown(&self) -> usize {
        let stopped = self.registry.stop_all();
        log::info!("Stopped {} task(s)", stopped);
        stopped
    }

    pub fn status(&self) -> StatusReport {
        StatusReport::new(
            &self.state.snapshot(),
            (
                &self.config.monitor.game_server_name,
                &self.config.monitor.voip_server_name,
            ),
            self.registry.tasks(),
            Some(&self.cooldowns),
        )
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.registry.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{mock_sources, MockProcesses};

    fn monitor(config: Config) -> (Monitor, Arc<MockProcesses>) {
        let (sources, processes) = mock_sources();
        let monitor = Monitor::new(
            config,
            sources,
            NotificationManager::new(),
            TimeScale::new(Duration::from_secs(3600)),
        )
        .unwrap();
        (monitor, processes)
    }

    #[test]
    fn test_registers_every_task() {
        let (monitor, _) = monitor(Config::default());
        let names: Vec<String> = monitor.registry().tasks().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "alerts",
                "cooldown:game",
                "cooldown:memory",
                "cooldown:voip",
                "game-info",
                "logging",
                "memory",
                "servers",
            ]
        );
    }

    #[test]
    fn test_start_sequence() {
        let (monitor, processes) = monitor(Config::default());
        processes.set_running("Falcon BMS", true);
        processes.set_running("IVC Server", true);

        let outcome = monitor
            .start(&ServerWait::default(), &AtomicBool::new(false))
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Ready);

        let registry = monitor.registry();
        assert!(registry.is_running("memory"));
        assert!(registry.is_running("servers"));
        assert!(registry.is_running("game-info"));
        assert!(registry.is_running(ALERTS_TASK));
        assert!(!registry.is_running(LOGGING_TASK));

        assert!(monitor.status().game_online);
        assert_eq!(monitor.shutdown(), 4);
        assert!(!registry.is_running("memory"));
    }

    #[test]
    fn test_interrupted_start_skips_system_tasks() {
        let (monitor, _) = monitor(Config::default());
        let outcome = monitor
            .start(&ServerWait::default(), &AtomicBool::new(true))
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Interrupted);
        assert!(!monitor.registry().is_running(ALERTS_TASK));
    }
}
