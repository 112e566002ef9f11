//! Alert scheduler implementation
//!
//! The periodic `alerts` task: evaluates the rules in priority order against
//! a state snapshot, delivers what fires and arms the matching cooldowns.

use super::cooldown::Cooldowns;
use super::notifier::NotificationManager;
use super::rules::AlertRule;
use super::types::{AlertEvent, AlertKind, AlertPolicy};
use crate::config::Config;
use crate::domain::StateHandle;
use crate::error::{CollectError, TaskError};
use crate::scheduler::{Period, ScheduledTask, StartMode, TaskKind, TaskRegistry, TickOutcome};
use crate::sources::ProcessTerminator;

use std::sync::{Arc, Weak};

/// Registry name of the alert task
pub const ALERTS_TASK: &str = "alerts";

/// Alert scheduler
///
/// Holds only a weak reference to the registry it is registered in.
pub struct AlertScheduler {
    config: Arc<Config>,
    state: StateHandle,
    cooldowns: Cooldowns,
    notifications: NotificationManager,
    terminator: Arc<dyn ProcessTerminator>,
    registry: Weak<TaskRegistry>,
}

impl AlertScheduler {
    pub fn new(
        config: Arc<Config>,
        state: StateHandle,
        cooldowns: Cooldowns,
        notifications: NotificationManager,
        terminator: Arc<dyn ProcessTerminator>,
        registry: Weak<TaskRegistry>,
    ) -> Self {
        Self {
            config,
            state,
            cooldowns,
            notifications,
            terminator,
            registry,
        }
    }

    /// Rules that fire against the current state, without side effects
    pub fn evaluate(&self) -> Vec<AlertEvent> {
        let snapshot = self.state.snapshot();
        let mut events = Vec::new();

        for rule in AlertRule::prioritized() {
            let suppressed = self.cooldowns.get(rule.kind()).is_active();
            if !rule.can_trigger(&snapshot, &self.config, suppressed) {
                continue;
            }
            events.push(rule.fire(&snapshot, &self.config));
            if self.config.alerts.policy == AlertPolicy::FirstMatchWins {
                break;
            }
        }

        events
    }

    /// One alert tick; returns the events that fired
    pub fn tick(&self) -> Vec<AlertEvent> {
        let events = self.evaluate();

        for event in &events {
            log::warn!("{} alert: {}", event.kind, event.subject);

            let failures = self.notifications.notify_all(event);
            if failures > 0 {
                log::warn!(
                    "{} notification channel(s) failed for {} alert",
                    failures,
                    event.kind
                );
            }

            // Suppression starts whether or not delivery worked
            if event.auto_kill_requested {
                self.terminate_game();
                // Memory should drop right away; recheck every minute from the start
                self.arm_cooldown(event.kind, StartMode::Hastened);
            } else {
                self.arm_cooldown(event.kind, StartMode::Normal);
            }
        }

        events
    }

    fn terminate_game(&self) {
        let name = &self.config.monitor.game_server_name;
        match self.terminator.terminate(name) {
            Ok(count) => log::warn!("Auto-kill terminated {} '{}' process(es)", count, name),
            Err(CollectError::ProcessNotFound(_)) => {
                log::debug!("Auto-kill: '{}' already gone", name)
            }
            Err(e) => log::error!("Auto-kill of '{}' failed: {}", name, e),
        }
    }

    fn arm_cooldown(&self, kind: AlertKind, mode: StartMode) {
        let Some(registry) = self.registry.upgrade() else {
            log::debug!("Registry gone; {} cooldown not armed", kind);
            return;
        };

        let period = self
            .cooldowns
            .get(kind)
            .first_recheck(self.config.monitor.min_time, mode);
        if let Err(e) = registry.start_task(&kind.cooldown_task(), period, mode) {
            log::error!("Failed to arm {} cooldown: {}", kind, e);
        }
    }
}

impl ScheduledTask for AlertScheduler {
    fn name(&self) -> &str {
        ALERTS_TASK
    }

    fn kind(&self) -> TaskKind {
        TaskKind::SystemTask
    }

    fn default_interval(&self) -> Period {
        Period::minutes(self.config.monitor.interval)
    }

    fn can_start(&self, _mode: StartMode) -> bool {
        self.config.alerts.all
    }

    fn run(&self) -> Result<TickOutcome, TaskError> {
        self.tick();
        Ok(TickOutcome::Continue)
    }
}
