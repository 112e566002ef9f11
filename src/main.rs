//! servmon - game and voice server monitor
//!
//! Watches the game server and voice server processes and system memory,
//! and raises cooldown-gated alerts when something goes wrong.

use clap::Parser;
use servmon::cli::args::{generate_completions, Cli, Commands};
use servmon::commands::{run_config, run_monitor, run_status};
use servmon::error::{AppError, ConfigError};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config_path = cli.config.as_deref();

    match &cli.command {
        Commands::Run(args) => run_monitor(args, config_path, cli.format),

        Commands::Status => run_status(config_path, cli.format),

        Commands::Config(args) => run_config(args, config_path, cli.format),

        Commands::Completions { shell } => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::AlreadyExists(_)) => {
            eprintln!();
            eprintln!("Hint: Pass --force to overwrite it.");
        }
        AppError::Config(ConfigError::InvalidValue { .. }) => {
            eprintln!();
            eprintln!("Hint: 'servmon run' clamps out-of-range values instead of failing.");
            eprintln!("      Run 'servmon config show' to see the effective values.");
        }
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Create one with 'servmon config init'.");
        }
        _ => {}
    }
}
