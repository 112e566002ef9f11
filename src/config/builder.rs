//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    pub fn with_file(mut self, path: Option<&str>) -> Self {
        let file_config = match path {
            Some(path) => match ConfigFile::load(path) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    log::warn!("{}; using defaults", e);
                    None
                }
            },
            None => ConfigFile::load_default().map(|(cfg, _)| cfg),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        self
    }

    /// Override with CLI alert interval (minutes)
    pub fn with_interval(mut self, interval: Option<u32>) -> Self {
        if let Some(i) = interval {
            self.config.monitor.interval = i;
        }
        self
    }

    /// Override with CLI cooldown base (minutes)
    pub fn with_min_time(mut self, min_time: Option<u32>) -> Self {
        if let Some(m) = min_time {
            self.config.monitor.min_time = m;
        }
        self
    }

    /// Override with CLI memory alert threshold
    pub fn with_max_mem(mut self, max_mem: Option<f64>) -> Self {
        if let Some(m) = max_mem {
            self.config.memory.max_mem = m;
        }
        self
    }

    /// Override with CLI auto-kill threshold
    pub fn with_kill_mem(mut self, kill_mem: Option<f64>) -> Self {
        if let Some(k) = kill_mem {
            self.config.memory.kill_mem = k;
        }
        self
    }

    /// Override with CLI auto-kill switch
    pub fn with_auto_kill(mut self, auto_kill: Option<bool>) -> Self {
        if let Some(a) = auto_kill {
            self.config.memory.auto_kill = a;
        }
        self
    }

    /// Override the master alert switch
    pub fn with_alerts(mut self, enabled: Option<bool>) -> Self {
        if let Some(e) = enabled {
            self.config.alerts.all = e;
        }
        self
    }

    /// Override with CLI CSV logging switch
    pub fn with_logging(mut self, enabled: Option<bool>) -> Self {
        if let Some(e) = enabled {
            self.config.logging.enabled = e;
        }
        self
    }

    /// Build the final configuration, clamping ranged values
    pub fn build(self) -> Config {
        let mut config = self.config;
        config.clamp_ranges();
        config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
