//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::alerts::{AlertKind, AlertPolicy};
use crate::domain::MemoryThresholds;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const INTERVAL_RANGE: RangeInclusive<u32> = 1..=15;
const MIN_TIME_RANGE: RangeInclusive<u32> = 1..=11000;
const FREQUENCY_RANGE: RangeInclusive<u32> = 1..=11000;
const DURATION_RANGE: RangeInclusive<u32> = 0..=11000;
const LOG_SIZE_RANGE: RangeInclusive<u64> = 1..=4096;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Polling and cooldown cadence, monitored process names
    pub monitor: MonitorConfig,
    /// Memory thresholds and auto-kill
    pub memory: MemoryConfig,
    /// Alert enable flags and texts
    pub alerts: AlertsConfig,
    /// Email alert settings
    pub emails: EmailConfig,
    /// CSV memory logging
    pub logging: LoggingConfig,
}

/// Monitoring cadence and monitored processes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Alert tick interval in minutes
    pub interval: u32,
    /// Base cooldown between repeated unresolved alerts, in minutes
    pub min_time: u32,
    /// Game server process name, without extension
    pub game_server_name: String,
    /// Voice server process name, without extension
    pub voip_server_name: String,
    /// Singular word used for players in alert texts
    pub player_designation: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: 1,
            min_time: 60,
            game_server_name: "Falcon BMS".to_string(),
            voip_server_name: "IVC Server".to_string(),
            player_designation: "Pilot".to_string(),
        }
    }
}

/// Memory thresholds in megabytes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Used memory above which a memory alert is raised
    pub max_mem: f64,
    /// Used memory above which the game server is terminated (if `auto_kill`)
    pub kill_mem: f64,
    pub auto_kill: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_mem: 7168.0,
            kill_mem: 11766.0,
            auto_kill: false,
        }
    }
}

impl MemoryConfig {
    pub fn thresholds(&self) -> MemoryThresholds {
        MemoryThresholds::new(self.max_mem, self.kill_mem)
    }
}

/// Alert enable flags and alert texts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertsConfig {
    /// Master switch for the alert task
    pub all: bool,
    pub game: bool,
    pub voip: bool,
    pub memory: bool,
    /// How many alerts a single tick may emit
    pub policy: AlertPolicy,
    pub game_offline_subject: String,
    pub game_offline_message: String,
    pub voip_offline_subject: String,
    pub voip_offline_message: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            all: true,
            game: true,
            voip: true,
            memory: true,
            policy: AlertPolicy::default(),
            game_offline_subject: "A Falcon BMS Server CTD Alert has been triggered!".to_string(),
            game_offline_message: "The Falcon BMS server is not responding, is closed, \
                or has crashed to desktop and must be manually started."
                .to_string(),
            voip_offline_subject: "An IVC Server CTD Alert has been triggered!".to_string(),
            voip_offline_message: "The Falcon BMS IVC Server is not responding, is closed, \
                or has crashed to desktop and must be manually started. \
                The IVC Server also may have simply not been started or started properly."
                .to_string(),
        }
    }
}

impl AlertsConfig {
    /// Whether alerts of this kind may trigger (master switch included)
    pub fn enabled(&self, kind: AlertKind) -> bool {
        self.all
            && match kind {
                AlertKind::Game => self.game,
                AlertKind::Voip => self.voip,
                AlertKind::Memory => self.memory,
            }
    }
}

/// Email alert settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmailConfig {
    pub all: bool,
    pub game: bool,
    pub voip: bool,
    pub memory: bool,
    /// Recipients as `"Name address@example.com"` entries
    pub recipients: Vec<String>,
    /// Display name used as the sender
    pub sender_name: String,
    pub sender_address: String,
    pub reply_to: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_ssl: bool,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            all: false,
            game: false,
            voip: false,
            memory: false,
            recipients: Vec::new(),
            sender_name: "Server Monitor".to_string(),
            sender_address: String::new(),
            reply_to: String::new(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_ssl: true,
        }
    }
}

impl EmailConfig {
    /// Whether alerts of this kind should also be emailed
    pub fn enabled(&self, kind: AlertKind) -> bool {
        self.all
            && match kind {
                AlertKind::Game => self.game,
                AlertKind::Voip => self.voip,
                AlertKind::Memory => self.memory,
            }
    }
}

/// CSV memory logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// Minutes between rows
    pub frequency: u32,
    /// Session length in hours, 0 for endless
    pub duration: u32,
    pub file_path: String,
    /// Rotation size in megabytes
    pub max_size_mb: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: 1,
            duration: 0,
            file_path: String::new(),
            max_size_mb: 1024,
        }
    }
}

impl Config {
    /// Check every ranged value, returning the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("monitor.interval", self.monitor.interval, &INTERVAL_RANGE)?;
        check_range("monitor.min_time", self.monitor.min_time, &MIN_TIME_RANGE)?;
        check_range("logging.frequency", self.logging.frequency, &FREQUENCY_RANGE)?;
        check_range("logging.duration", self.logging.duration, &DURATION_RANGE)?;
        check_range("logging.max_size_mb", self.logging.max_size_mb, &LOG_SIZE_RANGE)?;

        let thresholds = self.memory.thresholds();
        if thresholds.max_mb().is_none() {
            return Err(invalid("memory.max_mem", "must be a positive number"));
        }
        if thresholds.kill_mb().is_none() {
            return Err(invalid("memory.kill_mem", "must be a positive number"));
        }

        if self.monitor.game_server_name.trim().is_empty() {
            return Err(invalid("monitor.game_server_name", "must not be empty"));
        }
        if self.monitor.voip_server_name.trim().is_empty() {
            return Err(invalid("monitor.voip_server_name", "must not be empty"));
        }

        Ok(())
    }

    /// Pull ranged values back into bounds, logging each correction
    ///
    /// Invalid memory thresholds are left alone: the memory rule treats them
    /// as absent and never triggers.
    pub fn clamp_ranges(&mut self) {
        clamp("monitor.interval", &mut self.monitor.interval, &INTERVAL_RANGE);
        clamp("monitor.min_time", &mut self.monitor.min_time, &MIN_TIME_RANGE);
        clamp("logging.frequency", &mut self.logging.frequency, &FREQUENCY_RANGE);
        clamp("logging.duration", &mut self.logging.duration, &DURATION_RANGE);
        clamp("logging.max_size_mb", &mut self.logging.max_size_mb, &LOG_SIZE_RANGE);

        let thresholds = self.memory.thresholds();
        if thresholds.max_mb().is_none() {
            log::warn!(
                "memory.max_mem = {} is not usable; memory alerts will never trigger",
                self.memory.max_mem
            );
        }
        if thresholds.kill_mb().is_none() {
            log::warn!(
                "memory.kill_mem = {} is not usable; auto-kill will never fire",
                self.memory.kill_mem
            );
        }
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn check_range<T>(key: &str, value: T, range: &RangeInclusive<T>) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if range.contains(&value) {
        return Ok(());
    }
    Err(ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!(
            "{} is outside {}..={}",
            value,
            range.start(),
            range.end()
        ),
    })
}

fn clamp<T>(key: &str, value: &mut T, range: &RangeInclusive<T>)
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    let original = *value;
    if original < *range.start() {
        *value = *range.start();
    } else if original > *range.end() {
        *value = *range.end();
    } else {
        return;
    }
    log::warn!("{} = {} is out of range, using {}", key, original, value);
}
