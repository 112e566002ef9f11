//! Config command implementation
//!
//! Shows, initializes and validates the configuration file.

use crate::cli::args::{ConfigArgs, ConfigCommands, OutputFormat};
use crate::cli::output::{print_output, Message};
use crate::config::{Config, ConfigBuilder, ConfigFile};
use crate::error::{ConfigError, Result};

use std::path::PathBuf;

/// Execute the config command
pub fn run_config(args: &ConfigArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    match &args.command {
        ConfigCommands::Show => {
            let config = ConfigBuilder::new().with_file(config_path).build();
            print_output(&config, format)?;
        }
        ConfigCommands::Init { path, force } => {
            let target = path
                .as_deref()
                .or(config_path)
                .map(PathBuf::from)
                .unwrap_or_else(ConfigFile::user_path);
            init(&target, *force)?;
            let msg = Message::ok(format!("Wrote default configuration to {}", target.display()));
            print_output(&msg, format)?;
        }
        ConfigCommands::Check => {
            let msg = check(config_path)?;
            print_output(&msg, format)?;
        }
    }

    Ok(())
}

/// Write the default configuration, refusing to clobber without `force`
pub fn init(target: &std::path::Path, force: bool) -> Result<()> {
    if target.exists() && !force {
        return Err(ConfigError::AlreadyExists(target.display().to_string()).into());
    }
    ConfigFile::save(&Config::default(), target)?;
    log::info!("Created {}", target.display());
    Ok(())
}

/// Strictly load and validate; unlike `run`, nothing is clamped
pub fn check(config_path: Option<&str>) -> Result<Message> {
    let (config, source) = match config_path {
        Some(path) => (ConfigFile::load(path)?, path.to_string()),
        None => match ConfigFile::load_default() {
            Some((config, path)) => (config, path.display().to_string()),
            None => (Config::default(), "built-in defaults".to_string()),
        },
    };

    config.validate()?;
    Ok(Message::ok(format!("Configuration is valid ({})", source)))
}
