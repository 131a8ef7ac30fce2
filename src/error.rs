//! Error types for document migration
//!
//! Every error carries enough context to tell which dialect step failed.
//! Step failures wrap the underlying error so the whole chain is available
//! through `std::error::Error::source`.

use thiserror::Error;

use crate::dialect::Dialect;

/// Errors that can occur while detecting, building or converting a document
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The version marker is missing or names a dialect we do not handle
    #[error("Unsupported input document OpenAPI version: {0:?}")]
    UnsupportedVersion(String),

    /// The input is not well-formed JSON or YAML, or has the wrong shape
    #[error("Cannot parse Swagger or OpenAPI document: {0}")]
    ParseFailure(String),

    /// One adjacent-dialect conversion failed
    #[error("Error converting {from} to {to}")]
    StepConversionFailure {
        from: Dialect,
        to: Dialect,
        #[source]
        source: Box<MigrationError>,
    },

    /// Structural problems collected while building the document model
    #[error("Errors loading document: {}", .0.join("; "))]
    AggregateBuildFailure(Vec<String>),

    /// Rendering the document model back to text failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

impl MigrationError {
    /// Wrap an error raised inside the `from` → `to` step
    pub fn step(from: Dialect, to: Dialect, source: MigrationError) -> Self {
        Self::StepConversionFailure {
            from,
            to,
            source: Box::new(source),
        }
    }

    /// Get the failing step if this is a step error
    pub fn failed_step(&self) -> Option<(Dialect, Dialect)> {
        match self {
            MigrationError::StepConversionFailure { from, to, .. } => Some((*from, *to)),
            _ => None,
        }
    }

    /// Get a single-line message including the root cause, for CLI output
    pub fn user_message(&self) -> String {
        match self {
            MigrationError::StepConversionFailure { source, .. } => {
                format!("{self}: {}", source.user_message())
            }
            _ => self.to_string(),
        }
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(e: serde_json::Error) -> Self {
        MigrationError::ParseFailure(e.to_string())
    }
}

impl From<serde_yaml::Error> for MigrationError {
    fn from(e: serde_yaml::Error) -> Self {
        MigrationError::ParseFailure(e.to_string())
    }
}
