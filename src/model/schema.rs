//! Schema fragment shared by all three dialects
//!
//! Only the keywords that differ between dialects get typed fields. Every
//! other keyword (`description`, `enum`, `contentMediaType`, `x-…`, …) lives
//! in the `annotations` map and is written back untouched.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value as JsonValue};

/// Annotation key for the v3.1 content media type marker
pub const CONTENT_MEDIA_TYPE: &str = "contentMediaType";
/// Annotation key for the v3.1 content encoding marker
pub const CONTENT_ENCODING: &str = "contentEncoding";
/// Type name used as the null sentinel in v3.1 type arrays
pub const NULL_TYPE: &str = "null";

/// Exclusivity indicator of a numeric bound
///
/// OpenAPI 3.0 and Swagger 2.0 write a flag next to `minimum`/`maximum`;
/// OpenAPI 3.1 writes the bound itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    /// `exclusiveMinimum: true` style
    Flag(bool),
    /// `exclusiveMinimum: 10` style
    Value(Number),
}

/// `additionalProperties`: either a switch or a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// A schema fragment
///
/// OpenAPI 3.1 also accepts a bare `true` or `false` wherever a schema may
/// appear; such fragments are kept in `literal` and carry nothing else.
///
/// # Example
///
/// ```rust
/// use openapi_migrate::model::Schema;
///
/// let user = Schema::of_type("object")
///     .with_property("id", Schema::of_type("integer").with_format("int64"))
///     .with_property("name", Schema::of_type("string"))
///     .with_required("id");
/// assert_eq!(user.properties.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Schema {
    /// Boolean schema (`true` accepts anything, `false` nothing)
    #[serde(skip)]
    pub literal: Option<bool>,

    // === Reference ===
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    // === Type ===
    /// Declared types; written as a scalar when there is exactly one
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "type_list"
    )]
    pub schema_type: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// OpenAPI 3.0 only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    // === Numeric bounds ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,

    // === Examples ===
    /// `Some(Null)` for an explicit `example: null`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<JsonValue>,
    /// OpenAPI 3.1 only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<JsonValue>>,

    // === Object ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    // === Array ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    // === Composition ===
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    /// Every keyword without a typed field
    #[serde(flatten)]
    pub annotations: BTreeMap<String, JsonValue>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a boolean schema
    pub fn literal(accepts: bool) -> Self {
        Self {
            literal: Some(accepts),
            ..Default::default()
        }
    }

    /// Whether this is a boolean schema
    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }

    /// Create a schema with a single declared type
    pub fn of_type(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: vec![schema_type.into()],
            ..Default::default()
        }
    }

    /// Create a `$ref` schema
    pub fn reference_to(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Default::default()
        }
    }

    /// `{type: string, format: binary}`
    pub fn binary_string() -> Self {
        Self::of_type("string").with_format("binary")
    }

    /// Set the format hint
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set the nullable flag
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Add a property
    pub fn with_property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Add a required property name
    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Set the array item schema
    pub fn with_items(mut self, items: Schema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// Set an annotation
    pub fn with_annotation(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }

    /// The declared type when exactly one is declared
    pub fn sole_type(&self) -> Option<&str> {
        match self.schema_type.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// Whether `name` is among the declared types
    pub fn has_type(&self, name: &str) -> bool {
        self.schema_type.iter().any(|t| t == name)
    }

    /// Whether the schema is marked `readOnly: true`
    pub fn is_read_only(&self) -> bool {
        self.read_only == Some(true)
    }

    /// Whether the schema is a binary string (`type: string, format: binary`)
    pub fn is_binary_string(&self) -> bool {
        self.sole_type() == Some("string") && self.format.as_deref() == Some("binary")
    }

    /// Read an annotation
    pub fn annotation(&self, key: &str) -> Option<&JsonValue> {
        self.annotations.get(key)
    }

    /// Read a string annotation
    pub fn annotation_str(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).and_then(JsonValue::as_str)
    }

    /// Set an annotation, replacing any previous value
    pub fn set_annotation(&mut self, key: impl Into<String>, value: JsonValue) {
        self.annotations.insert(key.into(), value);
    }

    /// Remove and return an annotation
    pub fn take_annotation(&mut self, key: &str) -> Option<JsonValue> {
        self.annotations.remove(key)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.literal {
            Some(accepts) => serializer.serialize_bool(accepts),
            None => Schema::serialize(self, serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Bool(accepts) => Ok(Schema::literal(accepts)),
            value => Schema::deserialize(value).map_err(D::Error::custom),
        }
    }
}

/// A present key keeps its value, `null` included
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<JsonValue>, D::Error> {
    JsonValue::deserialize(deserializer).map(Some)
}

/// `type` is either a single name or a list of names
mod type_list {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    pub fn serialize<S: Serializer>(types: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        match types {
            [only] => only.serialize(serializer),
            many => many.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(t) => vec![t],
            OneOrMany::Many(ts) => ts,
        })
    }
}
