//! Dialect detection
//!
//! Classifies a document by its `openapi` / `swagger` version marker without
//! building the full model. YAML is a superset of JSON, so a single YAML parse
//! handles both notations.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::MigrationConfig;
use crate::error::{MigrationError, MigrationResult};

/// Supported document dialects, ordered from oldest to newest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dialect {
    /// Swagger 2.0
    Swagger,
    /// OpenAPI 3.0.x
    OpenApi30,
    /// OpenAPI 3.1.x
    OpenApi31,
}

impl Dialect {
    /// All dialects in migration order
    pub fn all() -> [Dialect; 3] {
        [Dialect::Swagger, Dialect::OpenApi30, Dialect::OpenApi31]
    }

    /// The adjacent newer dialect, if any
    pub fn next_up(self) -> Option<Dialect> {
        match self {
            Dialect::Swagger => Some(Dialect::OpenApi30),
            Dialect::OpenApi30 => Some(Dialect::OpenApi31),
            Dialect::OpenApi31 => None,
        }
    }

    /// The adjacent older dialect, if any
    pub fn next_down(self) -> Option<Dialect> {
        match self {
            Dialect::Swagger => None,
            Dialect::OpenApi30 => Some(Dialect::Swagger),
            Dialect::OpenApi31 => Some(Dialect::OpenApi30),
        }
    }

    /// Map a literal version marker to a dialect
    pub fn from_marker(marker: &str) -> MigrationResult<Dialect> {
        match marker {
            "2.0" => Ok(Dialect::Swagger),
            "3.0.0" | "3.0.1" | "3.0.2" | "3.0.3" | "3.0.4" => Ok(Dialect::OpenApi30),
            "3.1.0" | "3.1.1" => Ok(Dialect::OpenApi31),
            other => Err(MigrationError::UnsupportedVersion(other.to_string())),
        }
    }

    /// Version string written into documents produced in this dialect
    pub fn canonical_version(self, config: &MigrationConfig) -> &str {
        match self {
            Dialect::Swagger => "2.0",
            Dialect::OpenApi30 => &config.openapi30_version,
            Dialect::OpenApi31 => &config.openapi31_version,
        }
    }

    /// Short name accepted on the command line
    pub fn short_name(self) -> &'static str {
        match self {
            Dialect::Swagger => "swagger",
            Dialect::OpenApi30 => "3.0",
            Dialect::OpenApi31 => "3.1",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Swagger => write!(f, "Swagger 2.0"),
            Dialect::OpenApi30 => write!(f, "OpenAPI 3.0"),
            Dialect::OpenApi31 => write!(f, "OpenAPI 3.1"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swagger" => Ok(Dialect::Swagger),
            "3.0" => Ok(Dialect::OpenApi30),
            "3.1" => Ok(Dialect::OpenApi31),
            _ => Err(format!(
                "Invalid target version {s}: expected swagger, 3.0 or 3.1"
            )),
        }
    }
}

impl serde::Serialize for Dialect {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}

impl<'de> Deserialize<'de> for Dialect {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The only two fields read when sniffing the dialect
#[derive(Deserialize, Default)]
struct VersionMarker {
    #[serde(default)]
    openapi: Option<serde_yaml::Value>,
    #[serde(default)]
    swagger: Option<serde_yaml::Value>,
}

/// Render a scalar marker as text; `swagger: 2.0` arrives as a float
fn marker_text(value: Option<serde_yaml::Value>) -> String {
    match value {
        Some(serde_yaml::Value::String(s)) => s,
        Some(serde_yaml::Value::Number(n)) => {
            let text = n.to_string();
            if n.is_f64() && !text.contains('.') {
                format!("{text}.0")
            } else {
                text
            }
        }
        Some(serde_yaml::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Read the version marker of a document
///
/// Returns the `openapi` field if it is non-empty, otherwise the `swagger`
/// field, otherwise an empty string.
pub fn read_version_marker(input: &[u8]) -> MigrationResult<String> {
    let marker: VersionMarker = serde_yaml::from_slice(input)?;

    let openapi = marker_text(marker.openapi);
    if !openapi.is_empty() {
        return Ok(openapi);
    }

    Ok(marker_text(marker.swagger))
}

/// Detect the dialect of a raw document
pub fn detect_dialect(input: &[u8]) -> MigrationResult<Dialect> {
    let marker = read_version_marker(input)?;
    Dialect::from_marker(&marker)
}
