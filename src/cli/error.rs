//! Error types for the command line interface

use std::path::PathBuf;

use thiserror::Error;

use crate::error::MigrationError;

/// Errors reported by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read {}: {}", .0.display(), .1)]
    FileReadError(PathBuf, String),

    #[error("Failed to write {}: {}", .0.display(), .1)]
    FileWriteError(PathBuf, String),

    #[error("Invalid config file {}: {}", .0.display(), .1)]
    ConfigError(PathBuf, String),

    /// Rendered on one line with the root cause appended
    #[error("{}", .0.user_message())]
    MigrationError(#[from] MigrationError),
}
