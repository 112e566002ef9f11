//! Configuration file loading
//!
//! Handles loading and saving configuration as TOML.

use crate::config::Config;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

/// Configuration file handler
pub struct ConfigFile;

impl ConfigFile {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write configuration to a file, creating parent directories
    pub fn save<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(config)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, contents)
            .map_err(|e| ConfigError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Load configuration from the first default location that parses
    pub fn load_default() -> Option<(Config, PathBuf)> {
        for path in Self::default_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return Some((config, path));
                }
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Get default configuration file paths
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // System-wide config
        paths.push(PathBuf::from("/etc/servmon/config.toml"));

        // User config
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("servmon").join("config.toml"));
        }

        // Current directory
        paths.push(PathBuf::from("servmon.toml"));

        paths
    }

    /// Where `config init` writes when no path is given
    pub fn user_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("servmon").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("servmon.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertPolicy;

    #[test]
    fn test_default_paths_not_empty() {
        let paths = ConfigFile::default_paths();
        assert!(!paths.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let result = ConfigFile::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.monitor.interval = 5;
        config.alerts.policy = AlertPolicy::NotifyAll;
        ConfigFile::save(&config, &path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[memory]\nmax_mem = 9000.0\nauto_kill = true\n\n[alerts]\npolicy = \"notify-all\"\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.memory.max_mem, 9000.0);
        assert!(config.memory.auto_kill);
        assert_eq!(config.memory.kill_mem, 11766.0);
        assert_eq!(config.alerts.policy, AlertPolicy::NotifyAll);
        assert_eq!(config.monitor.min_time, 60);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[monitor\ninterval = ").unwrap();

        assert!(matches!(
            ConfigFile::load(&path),
            Err(ConfigError::TomlError(_))
        ));
    }
}
