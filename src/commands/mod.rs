//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod config;
pub mod run;
pub mod status;

pub use config::run_config;
pub use run::run_monitor;
pub use status::run_status;
