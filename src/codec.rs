//! Text format codec
//!
//! Detects whether a document is written as JSON or YAML and converts between
//! the two notations. Only used at the process boundary; migration steps
//! always exchange JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{MigrationError, MigrationResult};

/// Plain-text notation of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Json,
    Yaml,
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Json => write!(f, "json"),
            TextFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for TextFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(TextFormat::Json),
            "yaml" => Ok(TextFormat::Yaml),
            _ => Err(format!("Invalid format: {s}: expected json or yaml")),
        }
    }
}

/// Detect the notation of a document
///
/// The first non-whitespace byte decides: `{` means JSON, anything else
/// (including an all-whitespace input) means YAML.
pub fn detect_format(data: &[u8]) -> TextFormat {
    for b in data {
        match b {
            b'{' => return TextFormat::Json,
            b' ' | b'\t' | b'\r' | b'\n' => {}
            _ => return TextFormat::Yaml,
        }
    }

    TextFormat::Yaml
}

/// Parse JSON or YAML text into a JSON value tree
pub fn parse_value(data: &[u8]) -> MigrationResult<JsonValue> {
    match detect_format(data) {
        TextFormat::Json => serde_json::from_slice(data).map_err(|e| {
            MigrationError::ParseFailure(format!("Failed to parse JSON: {}", e))
        }),
        TextFormat::Yaml => serde_yaml::from_slice(data)
            .map(yaml_to_json)
            .map_err(|e| MigrationError::ParseFailure(format!("Failed to parse YAML: {}", e))),
    }
}

/// Convert a YAML tree to JSON
///
/// Mapping keys that YAML types as numbers or booleans (`200:` in a
/// responses block) become their text.
fn yaml_to_json(value: serde_yaml::Value) -> JsonValue {
    use serde_yaml::Value as Yaml;

    match value {
        Yaml::Null => JsonValue::Null,
        Yaml::Bool(b) => JsonValue::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(JsonValue::Null, JsonValue::Number)
            }
        }
        Yaml::String(s) => JsonValue::String(s),
        Yaml::Sequence(items) => JsonValue::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => s,
        Yaml::Number(n) => n.to_string(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Render a JSON value tree in the given notation
pub fn render_value(value: &JsonValue, format: TextFormat) -> MigrationResult<Vec<u8>> {
    match format {
        TextFormat::Json => serde_json::to_vec_pretty(value).map_err(|e| {
            MigrationError::Serialization(format!("Failed to serialize to JSON: {}", e))
        }),
        TextFormat::Yaml => serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| {
                MigrationError::Serialization(format!("Failed to serialize to YAML: {}", e))
            }),
    }
}

/// Convert a document to the target notation
///
/// Input already in the target notation is returned untouched.
pub fn convert_format(data: Vec<u8>, target: TextFormat) -> MigrationResult<Vec<u8>> {
    if detect_format(&data) == target {
        return Ok(data);
    }

    let value = parse_value(&data)?;
    render_value(&value, target)
}
