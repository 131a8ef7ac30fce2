//! Version migration engine
//!
//! Converts documents between Swagger 2.0, OpenAPI 3.0 and OpenAPI 3.1 one
//! adjacent dialect at a time. Every step takes JSON or YAML bytes and
//! returns pretty JSON bytes; the next step parses them again, so no model
//! is shared between steps.

pub mod downgrade;
pub mod normalize;
pub mod rules;
pub mod swagger;
pub mod upgrade;
pub mod visitor;

use std::fmt;

use tracing::{debug, info, info_span};

use crate::codec;
use crate::config::MigrationConfig;
use crate::dialect::{Dialect, detect_dialect};
use crate::error::{MigrationError, MigrationResult};

pub use visitor::{visit_document_schemas, visit_schema};

/// One conversion between adjacent dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStep {
    SwaggerToOpenApi30,
    OpenApi30ToOpenApi31,
    OpenApi31ToOpenApi30,
    OpenApi30ToSwagger,
}

impl ConversionStep {
    /// The step from `from` to the adjacent dialect `to`
    pub fn between(from: Dialect, to: Dialect) -> Option<ConversionStep> {
        match (from, to) {
            (Dialect::Swagger, Dialect::OpenApi30) => Some(ConversionStep::SwaggerToOpenApi30),
            (Dialect::OpenApi30, Dialect::OpenApi31) => Some(ConversionStep::OpenApi30ToOpenApi31),
            (Dialect::OpenApi31, Dialect::OpenApi30) => Some(ConversionStep::OpenApi31ToOpenApi30),
            (Dialect::OpenApi30, Dialect::Swagger) => Some(ConversionStep::OpenApi30ToSwagger),
            _ => None,
        }
    }

    /// Dialect the step reads
    pub fn source(self) -> Dialect {
        match self {
            ConversionStep::SwaggerToOpenApi30 => Dialect::Swagger,
            ConversionStep::OpenApi30ToOpenApi31 | ConversionStep::OpenApi30ToSwagger => {
                Dialect::OpenApi30
            }
            ConversionStep::OpenApi31ToOpenApi30 => Dialect::OpenApi31,
        }
    }

    /// Dialect the step produces
    pub fn target(self) -> Dialect {
        match self {
            ConversionStep::OpenApi30ToSwagger => Dialect::Swagger,
            ConversionStep::SwaggerToOpenApi30 | ConversionStep::OpenApi31ToOpenApi30 => {
                Dialect::OpenApi30
            }
            ConversionStep::OpenApi30ToOpenApi31 => Dialect::OpenApi31,
        }
    }

    /// Run the step on a document
    pub fn apply(self, input: &[u8], config: &MigrationConfig) -> MigrationResult<Vec<u8>> {
        match self {
            ConversionStep::SwaggerToOpenApi30 => swagger::swagger_to_openapi30(input, config),
            ConversionStep::OpenApi30ToOpenApi31 => upgrade::openapi30_to_31(input, config),
            ConversionStep::OpenApi31ToOpenApi30 => downgrade::openapi31_to_30(input, config),
            ConversionStep::OpenApi30ToSwagger => swagger::openapi30_to_swagger(input, config),
        }
    }
}

impl fmt::Display for ConversionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source(), self.target())
    }
}

/// Steps needed to get from one dialect to another, in order
pub fn plan(from: Dialect, to: Dialect) -> Vec<ConversionStep> {
    let mut steps = Vec::new();
    let mut current = from;

    while current != to {
        let next = if current < to {
            current.next_up()
        } else {
            current.next_down()
        };
        let Some(step) = next.and_then(|next| ConversionStep::between(current, next)) else {
            break;
        };
        steps.push(step);
        current = step.target();
    }

    steps
}

/// Convert a document to the target dialect
///
/// Input already in the target dialect is returned unchanged. A failing step
/// aborts the conversion with [`MigrationError::StepConversionFailure`].
pub fn convert_document(
    input: &[u8],
    target: Dialect,
    config: &MigrationConfig,
) -> MigrationResult<Vec<u8>> {
    let source = detect_dialect(input)?;
    let steps = plan(source, target);
    debug!(
        steps = steps.len(),
        source = %source,
        target = %target,
        "Planned conversion"
    );

    if steps.is_empty() {
        return Ok(input.to_vec());
    }

    let mut current = input.to_vec();
    for step in &steps {
        let _step_span = info_span!("conversion_step", step = %step).entered();
        debug!("Starting step");
        current = step
            .apply(&current, config)
            .map_err(|e| MigrationError::step(step.source(), step.target(), e))?;
    }

    info!(
        source = %source,
        target = %target,
        steps = steps.len(),
        "Conversion completed"
    );
    Ok(current)
}

/// Converts documents with one configuration
///
/// # Example
///
/// ```rust
/// use openapi_migrate::{Dialect, MigrationConfig, Migrator};
///
/// let config = MigrationConfig::new().with_target(Dialect::OpenApi31);
/// let migrator = Migrator::new(config).unwrap();
///
/// let output = migrator
///     .convert(br#"{"openapi": "3.0.3", "paths": {}}"#)
///     .unwrap();
/// let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();
/// assert_eq!(doc["openapi"], "3.1.1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    config: MigrationConfig,
}

impl Migrator {
    /// Create a migrator, validating the configuration
    pub fn new(config: MigrationConfig) -> MigrationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Convert a document to the configured dialect and output format
    pub fn convert(&self, input: &[u8]) -> MigrationResult<Vec<u8>> {
        let converted = convert_document(input, self.config.target, &self.config)?;
        codec::convert_format(converted, self.config.output_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::TextFormat;

    #[test]
    fn test_plan() {
        assert!(plan(Dialect::OpenApi30, Dialect::OpenApi30).is_empty());
        assert_eq!(
            plan(Dialect::Swagger, Dialect::OpenApi31),
            vec![
                ConversionStep::SwaggerToOpenApi30,
                ConversionStep::OpenApi30ToOpenApi31
            ]
        );
        assert_eq!(
            plan(Dialect::OpenApi31, Dialect::Swagger),
            vec![
                ConversionStep::OpenApi31ToOpenApi30,
                ConversionStep::OpenApi30ToSwagger
            ]
        );
        assert_eq!(
            plan(Dialect::OpenApi30, Dialect::Swagger),
            vec![ConversionStep::OpenApi30ToSwagger]
        );
    }

    #[test]
    fn test_steps_are_adjacent() {
        for from in Dialect::all() {
            for to in Dialect::all() {
                let steps = plan(from, to);
                assert!(steps.len() <= 2);
                let mut current = from;
                for step in steps {
                    assert_eq!(step.source(), current);
                    current = step.target();
                }
                assert_eq!(current, to);
            }
        }
    }

    #[test]
    fn test_identity_returns_input() {
        let input = b"openapi: 3.1.0\npaths: {}\n";
        let output = convert_document(input, Dialect::OpenApi31, &MigrationConfig::default()).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_unsupported_version() {
        let result = convert_document(
            br#"{"openapi": "4.0.0"}"#,
            Dialect::OpenApi31,
            &MigrationConfig::default(),
        );
        assert!(matches!(result, Err(MigrationError::UnsupportedVersion(v)) if v == "4.0.0"));
    }

    #[test]
    fn test_step_failure_is_wrapped() {
        let input = br#"{"openapi": "3.0.3", "paths": {"no-slash": {}}}"#;
        let err = convert_document(input, Dialect::Swagger, &MigrationConfig::default()).unwrap_err();

        assert_eq!(err.failed_step(), Some((Dialect::OpenApi30, Dialect::Swagger)));
        match err {
            MigrationError::StepConversionFailure { source, .. } => {
                assert!(matches!(*source, MigrationError::AggregateBuildFailure(_)));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_migrator_output_format() {
        let config = MigrationConfig::new()
            .with_target(Dialect::OpenApi30)
            .with_output_format(TextFormat::Yaml);
        let migrator = Migrator::new(config).unwrap();

        let output = migrator
            .convert(br#"{"openapi": "3.1.0", "paths": {}}"#)
            .unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("openapi: 3.0.4"));
    }

    #[test]
    fn test_migrator_rejects_bad_config() {
        let config = MigrationConfig::new().with_openapi31_version("3.0.0");
        assert!(matches!(
            Migrator::new(config),
            Err(MigrationError::InvalidConfig(_))
        ));
    }
}
