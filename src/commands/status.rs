//! Status command implementation
//!
//! Polls memory, processes and game data once and prints the snapshot.

use crate::cli::args::OutputFormat;
use crate::cli::output::print_output;
use crate::config::ConfigBuilder;
use crate::error::Result;
use crate::services::Monitor;

/// Execute the status command
pub fn run_status(config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = ConfigBuilder::new().with_file(config_path).build();
    let monitor = Monitor::system(config)?;

    monitor.poll_once();
    print_output(&monitor.status(), format)?;

    Ok(())
}
