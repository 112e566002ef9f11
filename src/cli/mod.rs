//! CLI argument parsing and output formatting
//!
//! Uses clap for ergonomic CLI argument definitions.

pub mod args;
pub mod output;

pub use args::{Cli, Commands, ConfigCommands, OutputFormat, RunArgs};
pub use output::{print_output, Message, TableDisplay};
