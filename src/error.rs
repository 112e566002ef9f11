//! Unified error types for servmon
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a data collaborator (memory, processes, game info)
    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    /// Error delivering an alert
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Error from the task scheduler
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Ctrl+C handler could not be installed
    #[error("Failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Refusing to overwrite an existing config file
    #[error("Configuration file already exists: {0}")]
    AlreadyExists(String),

    /// Config file could not be written
    #[error("Failed to write configuration: {0}")]
    WriteFailed(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

/// Transient failures from a data source.
///
/// Pollers treat these as an offline or zero reading and retry on the next tick.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectError {
    /// The data source cannot be read right now
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    /// No process with the given name exists
    #[error("Process not found: {0}")]
    ProcessNotFound(String),
}

/// Errors from alert delivery
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Writing to the console failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No valid email recipient is configured
    #[error("No valid email recipients configured")]
    NoRecipients,

    /// Mail transport rejected the message
    #[error("Mail transport failed: {0}")]
    Transport(String),
}

/// Errors a periodic task callback may return
#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Errors from task registry operations
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// No task registered under this name
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// A task with this name is already registered
    #[error("Task already registered: {0}")]
    DuplicateTask(String),

    /// The timer thread could not be spawned
    #[error("Failed to spawn timer for '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
