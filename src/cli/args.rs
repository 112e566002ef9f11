//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Game and voice server monitor
///
/// Watches the game server and voice server processes and system memory,
/// and raises alerts when they go down or memory runs high.
#[derive(Parser, Debug)]
#[command(name = "servmon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SERVMON_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor until interrupted
    Run(RunArgs),

    /// Show a one-shot memory and server snapshot
    Status,

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the run command; each overrides the config file
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Alert check interval in minutes (1-15)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=15))]
    pub interval: Option<u32>,

    /// Alert cooldown in minutes
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=11000))]
    pub min_time: Option<u32>,

    /// Memory alert threshold in MB
    #[arg(long)]
    pub max_mem: Option<f64>,

    /// Auto-kill threshold in MB
    #[arg(long)]
    pub kill_mem: Option<f64>,

    /// Terminate the game server when memory passes the kill threshold
    #[arg(long)]
    pub auto_kill: bool,

    /// Start with alerts switched off
    #[arg(long)]
    pub no_alerts: bool,

    /// Enable CSV memory logging
    #[arg(long)]
    pub logging: bool,

    /// Do not wait for the servers to start before enabling alerts
    #[arg(long)]
    pub no_wait: bool,
}

/// Arguments for configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (defaults to the user config directory)
        path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration file
    Check,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_status() {
        let args = Cli::try_parse_from(["servmon", "status"]).unwrap();
        assert!(matches!(args.command, Commands::Status));
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["servmon", "-v", "status"]).unwrap();
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let args = Cli::try_parse_from([
            "servmon",
            "run",
            "--interval",
            "5",
            "--min-time",
            "30",
            "--max-mem",
            "9000",
            "--auto-kill",
            "--logging",
        ])
        .unwrap();

        if let Commands::Run(run) = args.command {
            assert_eq!(run.interval, Some(5));
            assert_eq!(run.min_time, Some(30));
            assert_eq!(run.max_mem, Some(9000.0));
            assert!(run.auto_kill);
            assert!(run.logging);
            assert!(!run.no_alerts);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_interval_validation() {
        let result = Cli::try_parse_from(["servmon", "run", "--interval", "20"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_config_init() {
        let args =
            Cli::try_parse_from(["servmon", "config", "init", "/tmp/servmon.toml", "--force"])
                .unwrap();
        if let Commands::Config(config) = args.command {
            if let ConfigCommands::Init { path, force } = config.command {
                assert_eq!(path.as_deref(), Some("/tmp/servmon.toml"));
                assert!(force);
            } else {
                panic!("Expected Init command");
            }
        } else {
            panic!("Expected Config command");
        }
    }
}
