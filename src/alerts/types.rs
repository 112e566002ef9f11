//! Alert system domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// The monitored conditions that can raise an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Game server process went offline
    Game,
    /// Voice server offline while the game server is up
    Voip,
    /// System memory above the alert threshold
    Memory,
}

/// Evaluation order of the alert rules, highest priority first
pub const PRIORITY: [AlertKind; 3] = [AlertKind::Game, AlertKind::Voip, AlertKind::Memory];

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Voip => "voip",
            Self::Memory => "memory",
        }
    }

    /// Name of the cooldown task guarding this kind
    pub fn cooldown_task(&self) -> String {
        format!("cooldown:{}", self.as_str())
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many rules a single alert tick may fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPolicy {
    /// Stop at the first rule that can trigger
    #[default]
    FirstMatchWins,
    /// Fire every rule that can trigger
    NotifyAll,
}

impl fmt::Display for AlertPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMatchWins => write!(f, "first-match-wins"),
            Self::NotifyAll => write!(f, "notify-all"),
        }
    }
}

/// A fired alert, handed to the notifiers and then dropped
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub subject: String,
    pub message: String,
    /// Player count from the poll before the one that saw the failure
    pub former_player_count: u32,
    pub send_email: bool,
    /// The game process should be terminated for exceeding the kill threshold
    pub auto_kill_requested: bool,
    pub fired_at: SystemTime,
}
