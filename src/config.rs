//! Migration configuration types

use serde::{Deserialize, Serialize};

use crate::codec::TextFormat;
use crate::dialect::Dialect;
use crate::error::{MigrationError, MigrationResult};

/// Main migration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MigrationConfig {
    /// Dialect to convert to
    pub target: Dialect,
    /// Notation of the rendered output
    pub output_format: TextFormat,
    /// Version string written when producing OpenAPI 3.0 from OpenAPI 3.1
    pub openapi30_version: String,
    /// Version string written when producing OpenAPI 3.1
    pub openapi31_version: String,
    /// Version string written when producing OpenAPI 3.0 from Swagger 2.0
    pub swagger_upgrade_version: String,
    /// Media type assumed when a Swagger operation declares no consumes/produces
    pub default_media_type: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            target: Dialect::OpenApi31,
            output_format: TextFormat::Json,
            openapi30_version: "3.0.4".to_string(),
            openapi31_version: "3.1.1".to_string(),
            swagger_upgrade_version: "3.0.3".to_string(),
            default_media_type: "application/json".to_string(),
        }
    }
}

impl MigrationConfig {
    /// Create a new migration config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target dialect
    pub fn with_target(mut self, target: Dialect) -> Self {
        self.target = target;
        self
    }

    /// Set the output notation
    pub fn with_output_format(mut self, format: TextFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the version written for OpenAPI 3.0 output
    pub fn with_openapi30_version(mut self, version: impl Into<String>) -> Self {
        self.openapi30_version = version.into();
        self
    }

    /// Set the version written for OpenAPI 3.1 output
    pub fn with_openapi31_version(mut self, version: impl Into<String>) -> Self {
        self.openapi31_version = version.into();
        self
    }

    /// Set the version written when upgrading Swagger 2.0
    pub fn with_swagger_upgrade_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_upgrade_version = version.into();
        self
    }

    /// Set the fallback media type
    pub fn with_default_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.default_media_type = media_type.into();
        self
    }

    /// Validate the configuration
    ///
    /// Every configured output version must be recognised by the detector as
    /// the dialect it is written for, so that converted documents can be fed
    /// back in.
    pub fn validate(&self) -> MigrationResult<()> {
        let checks = [
            ("openapi30_version", &self.openapi30_version, Dialect::OpenApi30),
            ("openapi31_version", &self.openapi31_version, Dialect::OpenApi31),
            (
                "swagger_upgrade_version",
                &self.swagger_upgrade_version,
                Dialect::OpenApi30,
            ),
        ];

        for (field, version, expected) in checks {
            match Dialect::from_marker(version) {
                Ok(dialect) if dialect == expected => {}
                _ => {
                    return Err(MigrationError::InvalidConfig(format!(
                        "{field} '{version}' is not an {expected} version"
                    )));
                }
            }
        }

        if !self.default_media_type.contains('/') {
            return Err(MigrationError::InvalidConfig(format!(
                "default_media_type '{}' is not a media type",
                self.default_media_type
            )));
        }

        Ok(())
    }
}
