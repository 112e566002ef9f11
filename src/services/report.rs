//! Status report
//!
//! A serializable summary of the monitored state, the registered tasks and
//! the cooldown windows.

use crate::alerts::{AlertKind, CooldownPhase, Cooldowns};
use crate::domain::{MemoryInfo, SharedState, Tracked};
use crate::scheduler::TaskStatus;

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CooldownStatus {
    pub kind: AlertKind,
    pub phase: CooldownPhase,
    pub armed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub generated_at: String,
    pub memory: Tracked<MemoryInfo>,
    pub memory_below_max: bool,
    pub memory_below_kill: bool,
    pub game_server: String,
    pub game_online: bool,
    pub voip_server: String,
    pub voip_online: bool,
    pub player_count: Tracked<u32>,
    pub players: Vec<String>,
    pub theater_name: String,
    pub tasks: Vec<TaskStatus>,
    pub cooldowns: Vec<CooldownStatus>,
}

impl StatusReport {
    pub fn new(
        state: &SharedState,
        servers: (&str, &str),
        tasks: Vec<TaskStatus>,
        cooldowns: Option<&Cooldowns>,
    ) -> Self {
        let cooldowns = cooldowns
            .map(|set| {
                set.iter()
                    .map(|window| CooldownStatus {
                        kind: window.kind(),
                        phase: window.phase(),
                        armed_at: window.armed_at().map(|t| {
                            let local: DateTime<Local> = t.into();
                            local.format("%Y-%m-%d %H:%M:%S").to_string()
                        }),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            memory: state.memory.clone(),
            memory_below_max: state.memory_below_max,
            memory_below_kill: state.memory_below_kill,
            game_server: servers.0.to_string(),
            game_online: state.game_online,
            voip_server: servers.1.to_string(),
            voip_online: state.voip_online,
            player_count: state.player_count.clone(),
            players: state.player_status.current.clone(),
            theater_name: state.theater_name.clone(),
            tasks,
            cooldowns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{Period, StartMode, TaskKind};

    #[test]
    fn test_report_collects_cooldowns() {
        let cooldowns = Cooldowns::new();
        cooldowns.get(AlertKind::Voip).try_arm(StartMode::Normal);

        let tasks = vec![TaskStatus {
            name: "alerts".to_string(),
            kind: TaskKind::SystemTask,
            interval: Period::minutes(1),
            running: true,
        }];
        let report = StatusReport::new(
            &SharedState::default(),
            ("Falcon BMS", "IVC Server"),
            tasks,
            Some(&cooldowns),
        );

        assert_eq!(report.cooldowns.len(), 3);
        let voip = &report.cooldowns[1];
        assert_eq!(voip.kind, AlertKind::Voip);
        assert_eq!(voip.phase, CooldownPhase::Suppressing);
        assert!(voip.armed_at.is_some());
        assert_eq!(report.tasks.len(), 1);
    }

    #[test]
    fn test_report_serializes() {
        let report = StatusReport::new(&SharedState::default(), ("g", "v"), Vec::new(), None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["game_online"], false);
        assert!(json["cooldowns"].as_array().unwrap().is_empty());
    }
}
