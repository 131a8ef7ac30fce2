//! Document models
//!
//! Typed in-memory representation of Swagger 2.0 and OpenAPI 3.x documents.
//! Only the constructs that migration touches get typed fields; everything
//! else is carried in flattened `extensions` maps and written back as found.

pub mod builder;
pub mod extensible;
pub mod openapi;
pub mod refs;
pub mod schema;
pub mod swagger;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub use builder::DocumentBuilder;
pub use extensible::Extensible;
pub use openapi::{
    Components, Header, MediaType, OAuthFlow, OAuthFlows, OpenApiDocument, Operation, Parameter,
    PathItem, RequestBody, Response, SecurityScheme, Server,
};
pub use schema::{AdditionalProperties, ExclusiveBound, Schema};
pub use swagger::{
    SwaggerDocument, SwaggerOperation, SwaggerParameter, SwaggerPathItem, SwaggerResponse,
    SwaggerSecurityScheme,
};

/// HTTP methods that can carry an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Every method OpenAPI 3.x knows, in path-item order
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// The methods Swagger 2.0 knows (no `trace`)
    pub const SWAGGER: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Lower-case key used in path items
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    /// OpenAPI 3.1 only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `contact`, `license`, `termsOfService` and extensions
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}
