//! OpenAPI Migrate - Stepwise conversion of API descriptions
//!
//! Converts documents between three dialects:
//! - Swagger 2.0
//! - OpenAPI 3.0 (3.0.0 - 3.0.4)
//! - OpenAPI 3.1 (3.1.0 - 3.1.1)
//!
//! Input may be JSON or YAML. Conversions run one adjacent dialect at a
//! time, so Swagger 2.0 reaches OpenAPI 3.1 through OpenAPI 3.0 and back.

pub mod codec;
pub mod config;
pub mod dialect;
pub mod error;
pub mod migrate;
pub mod model;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use codec::TextFormat;
pub use config::MigrationConfig;
pub use dialect::{Dialect, detect_dialect};
pub use error::{MigrationError, MigrationResult};
pub use migrate::{ConversionStep, Migrator, convert_document, plan};
