//! Alert trigger conditions and event construction
//!
//! Rules are pure: they read a state snapshot and the configuration and never
//! mutate anything. Suppression is passed in as `cooldown_active`.

use super::types::{AlertEvent, AlertKind, PRIORITY};
use crate::config::Config;
use crate::domain::SharedState;

use std::time::SystemTime;

const RESTART_NOTICE: &str =
    "If you are unable to restart the server, please contact additional support team members.";

/// One alert rule, keyed by the condition it watches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRule {
    kind: AlertKind,
}

impl AlertRule {
    pub const fn new(kind: AlertKind) -> Self {
        Self { kind }
    }

    /// All rules in evaluation order
    pub fn prioritized() -> [AlertRule; 3] {
        PRIORITY.map(AlertRule::new)
    }

    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    /// The raw monitored condition, ignoring enable flags and suppression
    pub fn condition_holds(&self, state: &SharedState) -> bool {
        match self.kind {
            AlertKind::Game => !state.game_online,
            AlertKind::Voip => state.game_online && !state.voip_online,
            AlertKind::Memory => !state.memory_below_max,
        }
    }

    /// Whether this rule may fire right now
    ///
    /// Always false while the kind's cooldown is active.
    pub fn can_trigger(&self, state: &SharedState, config: &Config, cooldown_active: bool) -> bool {
        !cooldown_active && config.alerts.enabled(self.kind) && self.condition_holds(state)
    }

    /// Build the alert for the current snapshot
    ///
    /// Reports the player count of the previous poll, i.e. the state just
    /// before the failure was observed.
    pub fn fire(&self, state: &SharedState, config: &Config) -> AlertEvent {
        let players = state.player_count.former;
        let designation = designation(&config.monitor.player_designation, players);
        let was_were = if players == 1 { "was" } else { "were" };

        let auto_kill_requested = self.kind == AlertKind::Memory
            && config.memory.auto_kill
            && !state.memory_below_kill;

        let (subject, message) = match self.kind {
            AlertKind::Game => (
                format!(
                    "{} {} {} {} online",
                    config.alerts.game_offline_subject, players, designation, was_were
                ),
                format!("{}\n{}", config.alerts.game_offline_message, RESTART_NOTICE),
            ),
            AlertKind::Voip => (
                format!(
                    "{} {} {} {} online",
                    config.alerts.voip_offline_subject, players, designation, was_were
                ),
                format!("{}\n{}", config.alerts.voip_offline_message, RESTART_NOTICE),
            ),
            AlertKind::Memory => {
                let tense = if auto_kill_requested { was_were } else { "are" };
                let kill_notice = if auto_kill_requested {
                    format!(
                        " and the {} process has been terminated as instructed.",
                        config.monitor.game_server_name
                    )
                } else {
                    String::new()
                };
                (
                    format!(
                        "A System Memory Alert has been triggered! {} {} {} online.",
                        players, designation, tense
                    ),
                    format!(
                        "Memory usage has exceeded alert limits{}\n \
                         - Please check server or contact additional support staff.",
                        kill_notice
                    ),
                )
            }
        };

        AlertEvent {
            kind: self.kind,
            subject,
            message,
            former_player_count: players,
            send_email: config.emails.enabled(self.kind),
            auto_kill_requested,
            fired_at: SystemTime::now(),
        }
    }
}

fn designation(base: &str, count: u32) -> String {
    if count == 1 {
        base.to_string()
    } else {
        format!("{}s", base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online_state() -> SharedState {
        SharedState {
            game_online: true,
            voip_online: true,
            ..SharedState::default()
        }
    }

    #[test]
    fn test_voip_condition() {
        let rule = AlertRule::new(AlertKind::Voip);
        let config = Config::default();
        let mut state = online_state();
        assert!(!rule.can_trigger(&state, &config, false));

        state.voip_online = false;
        assert!(rule.can_trigger(&state, &config, false));
        assert!(!rule.can_trigger(&state, &config, true));

        // Voice server down while the game is also down is the game rule's job
        state.game_online = false;
        assert!(!rule.can_trigger(&state, &config, false));
    }

    #[test]
    fn test_game_condition() {
        let rule = AlertRule::new(AlertKind::Game);
        let mut config = Config::default();
        let mut state = online_state();
        assert!(!rule.can_trigger(&state, &config, false));

        state.game_online = false;
        assert!(rule.can_trigger(&state, &config, false));

        config.alerts.game = false;
        assert!(!rule.can_trigger(&state, &config, false));
    }

    #[test]
    fn test_memory_condition_respects_master_switch() {
        let rule = AlertRule::new(AlertKind::Memory);
        let mut config = Config::default();
        let mut state = online_state();
        state.memory_below_max = false;
        assert!(rule.can_trigger(&state, &config, false));

        config.alerts.all = false;
        assert!(!rule.can_trigger(&state, &config, false));
    }

    #[test]
    fn test_fire_uses_former_player_count() {
        let rule = AlertRule::new(AlertKind::Voip);
        let config = Config::default();
        let mut state = online_state();
        state.voip_online = false;
        state.player_count.current = 0;
        state.player_count.former = 12;

        let event = rule.fire(&state, &config);
        assert_eq!(event.former_player_count, 12);
        assert!(event.subject.starts_with(&config.alerts.voip_offline_subject));
        assert!(event.subject.ends_with("12 Pilots were online"));
        assert!(event.message.contains(RESTART_NOTICE));
        assert!(!event.send_email);
        assert!(!event.auto_kill_requested);
    }

    #[test]
    fn test_fire_singular_designation() {
        let rule = AlertRule::new(AlertKind::Game);
        let config = Config::default();
        let mut state = online_state();
        state.player_count.former = 1;

        let event = rule.fire(&state, &config);
        assert!(event.subject.ends_with("1 Pilot was online"));
    }

    #[test]
    fn test_memory_fire_with_auto_kill() {
        let rule = AlertRule::new(AlertKind::Memory);
        let mut config = Config::default();
        config.memory.auto_kill = true;
        config.emails.all = true;
        config.emails.memory = true;

        let mut state = online_state();
        state.memory_below_max = false;
        state.memory_below_kill = false;
        state.player_count.former = 3;

        let event = rule.fire(&state, &config);
        assert!(event.auto_kill_requested);
        assert!(event.send_email);
        assert!(event.subject.contains("3 Pilots were online"));
        assert!(event.message.contains("Falcon BMS process has been terminated"));
    }

    #[test]
    fn test_memory_fire_below_kill_threshold() {
        let rule = AlertRule::new(AlertKind::Memory);
        let mut config = Config::default();
        config.memory.auto_kill = true;

        let mut state = online_state();
        state.memory_below_max = false;
        state.player_count.former = 2;

        let event = rule.fire(&state, &config);
        assert!(!event.auto_kill_requested);
        assert!(event.subject.contains("2 Pilots are online"));
        assert!(!event.message.contains("terminated"));
    }
}
