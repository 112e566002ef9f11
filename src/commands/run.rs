//! Run command implementation
//!
//! Starts the pollers, waits for the servers, enables alerts and logging,
//! then blocks until Ctrl+C.

use crate::cli::args::{OutputFormat, RunArgs};
use crate::cli::output::print_output;
use crate::config::{Config, ConfigBuilder};
use crate::error::Result;
use crate::services::{Monitor, ServerWait, WaitOutcome};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Merge the config file with the run overrides
pub fn build_config(args: &RunArgs, config_path: Option<&str>) -> Config {
    ConfigBuilder::new()
        .with_file(config_path)
        .with_interval(args.interval)
        .with_min_time(args.min_time)
        .with_max_mem(args.max_mem)
        .with_kill_mem(args.kill_mem)
        .with_auto_kill(args.auto_kill.then_some(true))
        .with_alerts(args.no_alerts.then_some(false))
        .with_logging(args.logging.then_some(true))
        .build()
}

/// Execute the run command
pub fn run_monitor(args: &RunArgs, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = build_config(args, config_path);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("Shutdown requested");
        flag.store(true, Ordering::SeqCst);
    })?;

    let monitor = Monitor::system(config)?;

    if args.no_wait {
        monitor.start_services();
        monitor.start_system_tasks()?;
    } else {
        match monitor.start(&ServerWait::default(), &shutdown)? {
            WaitOutcome::Interrupted => {
                monitor.shutdown();
                return Ok(());
            }
            WaitOutcome::VoipMissing | WaitOutcome::Ready => {}
        }
    }

    print_output(&monitor.status(), format)?;
    log::info!("Monitoring; press Ctrl+C to stop");

    monitor.run_until(&shutdown);
    print_output(&monitor.status(), format)?;

    Ok(())
}
