//! Document model builder
//!
//! Parses JSON or YAML text into the typed document models, runs a
//! structural check over the result and renders models back to text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::openapi::{OpenApiDocument, Parameter};
use super::swagger::{SwaggerDocument, SwaggerParameter};
use crate::codec;
use crate::error::{MigrationError, MigrationResult};

static RESPONSE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(default|[1-5](\d\d|XX))$").unwrap());

const OPENAPI_LOCATIONS: &[&str] = &["query", "header", "path", "cookie"];
const SWAGGER_LOCATIONS: &[&str] = &["query", "header", "path", "formData", "body"];

/// Builds typed document models from text and back
pub struct DocumentBuilder;

impl DocumentBuilder {
    /// Parse an OpenAPI 3.x document
    pub fn parse_openapi(input: &[u8]) -> MigrationResult<OpenApiDocument> {
        let doc: OpenApiDocument = Self::parse_typed(input, "openapi")?;
        Self::check(openapi_problems(&doc))?;
        Ok(doc)
    }

    /// Parse a Swagger 2.0 document
    pub fn parse_swagger(input: &[u8]) -> MigrationResult<SwaggerDocument> {
        let doc: SwaggerDocument = Self::parse_typed(input, "swagger")?;
        Self::check(swagger_problems(&doc))?;
        Ok(doc)
    }

    /// Render an OpenAPI 3.x document as pretty JSON
    pub fn serialize_openapi(doc: &OpenApiDocument) -> MigrationResult<Vec<u8>> {
        Self::serialize(doc)
    }

    /// Render a Swagger 2.0 document as pretty JSON
    pub fn serialize_swagger(doc: &SwaggerDocument) -> MigrationResult<Vec<u8>> {
        Self::serialize(doc)
    }

    /// Convert any model to a JSON value tree
    pub fn to_value<T: Serialize>(model: &T) -> MigrationResult<JsonValue> {
        serde_json::to_value(model)
            .map_err(|e| MigrationError::Serialization(format!("Failed to build value: {}", e)))
    }

    /// Build a model from a JSON value tree
    pub fn from_value<T: DeserializeOwned>(value: JsonValue) -> MigrationResult<T> {
        serde_json::from_value(value).map_err(|e| {
            MigrationError::ParseFailure(format!("Document has an unexpected shape: {}", e))
        })
    }

    fn parse_typed<T: DeserializeOwned>(input: &[u8], marker: &str) -> MigrationResult<T> {
        let mut value = codec::parse_value(input)?;
        let Some(root) = value.as_object_mut() else {
            return Err(MigrationError::ParseFailure(
                "Document root is not a mapping".to_string(),
            ));
        };

        // `swagger: 2.0` and `version: 1.0` without quotes arrive as numbers
        number_to_text(root, marker);
        if let Some(JsonValue::Object(info)) = root.get_mut("info") {
            number_to_text(info, "version");
        }

        Self::from_value(value)
    }

    fn serialize<T: Serialize>(model: &T) -> MigrationResult<Vec<u8>> {
        serde_json::to_vec_pretty(model)
            .map_err(|e| MigrationError::Serialization(format!("Failed to serialize document: {}", e)))
    }

    fn check(problems: Vec<String>) -> MigrationResult<()> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::AggregateBuildFailure(problems))
        }
    }
}

fn number_to_text(object: &mut serde_json::Map<String, JsonValue>, key: &str) {
    let text = match object.get(key) {
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => return,
    };
    object.insert(key.to_string(), JsonValue::String(text));
}

fn check_path_key(path: &str, problems: &mut Vec<String>) {
    if !path.starts_with('/') {
        problems.push(format!("path '{}' must begin with '/'", path));
    }
}

fn check_response_keys<'a>(
    context: &str,
    keys: impl Iterator<Item = &'a String>,
    problems: &mut Vec<String>,
) {
    for key in keys {
        if !RESPONSE_KEY.is_match(key) {
            problems.push(format!("{}: invalid response code '{}'", context, key));
        }
    }
}

fn check_parameter(
    context: &str,
    reference: Option<&str>,
    name: &str,
    location: &str,
    known: &[&str],
    problems: &mut Vec<String>,
) {
    if reference.is_some() {
        return;
    }
    if name.is_empty() {
        problems.push(format!("{}: parameter without a name", context));
    }
    if !known.contains(&location) {
        problems.push(format!(
            "{}: parameter '{}' has unknown location '{}'",
            context, name, location
        ));
    }
}

fn check_openapi_parameter(context: &str, param: &Parameter, problems: &mut Vec<String>) {
    check_parameter(
        context,
        param.reference.as_deref(),
        &param.name,
        &param.location,
        OPENAPI_LOCATIONS,
        problems,
    );
}

fn check_swagger_parameter(context: &str, param: &SwaggerParameter, problems: &mut Vec<String>) {
    check_parameter(
        context,
        param.reference.as_deref(),
        &param.name,
        &param.location,
        SWAGGER_LOCATIONS,
        problems,
    );
}

fn openapi_problems(doc: &OpenApiDocument) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(components) = &doc.components {
        for (key, param) in &components.parameters {
            check_openapi_parameter(&format!("components.parameters.{}", key), param, &mut problems);
        }
    }

    for (path, item) in &doc.paths {
        check_path_key(path, &mut problems);
        for param in &item.parameters {
            check_openapi_parameter(path, param, &mut problems);
        }
        for (method, op) in item.operations() {
            let context = format!("{} {}", method, path);
            for param in &op.parameters {
                check_openapi_parameter(&context, param, &mut problems);
            }
            check_response_keys(&context, op.responses.keys(), &mut problems);
        }
    }

    problems
}

fn swagger_problems(doc: &SwaggerDocument) -> Vec<String> {
    let mut problems = Vec::new();

    for (key, param) in &doc.parameters {
        check_swagger_parameter(&format!("parameters.{}", key), param, &mut problems);
    }

    for (path, item) in &doc.paths {
        check_path_key(path, &mut problems);
        for param in &item.parameters {
            check_swagger_parameter(path, param, &mut problems);
        }
        for (method, op) in item.operations() {
            let context = format!("{} {}", method, path);
            for param in &op.parameters {
                check_swagger_parameter(&context, param, &mut problems);
            }
            check_response_keys(&context, op.responses.keys(), &mut problems);
        }
    }

    problems
}
