//! servmon - game and voice server monitor library
//!
//! Periodically samples system memory, the game and voice server processes
//! and live game data, and raises alerts gated by per-kind cooldown windows.
//!
//! # Modules
//!
//! - [`alerts`]: Alert rules, cooldown windows and notifiers
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`domain`]: Memory readings and the shared monitored state
//! - [`error`]: Error types
//! - [`scheduler`]: Periodic timers and the task registry
//! - [`services`]: Pollers, CSV logging and the monitor wiring
//! - [`sources`]: Data source traits and the host implementation

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod scheduler;
pub mod services;
pub mod sources;

#[cfg(test)]
pub mod mock;

pub use error::{AppError, Result};
