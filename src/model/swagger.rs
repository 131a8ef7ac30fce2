//! Swagger 2.0 document model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::extensible::Extensible;
use super::schema::Schema;
use super::{HttpMethod, Info};

/// Root of a Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerDocument {
    pub swagger: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default)]
    pub paths: Extensible<SwaggerPathItem>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Schema>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, SwaggerParameter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, SwaggerResponse>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_definitions: BTreeMap<String, SwaggerSecurityScheme>,
    /// `security`, `tags`, `externalDocs` and extensions
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

impl SwaggerDocument {
    /// Create an empty Swagger 2.0 document
    pub fn new() -> Self {
        Self {
            swagger: "2.0".to_string(),
            ..Default::default()
        }
    }
}

/// Operations available on one path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwaggerPathItem {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<SwaggerOperation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SwaggerParameter>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

impl SwaggerPathItem {
    /// Get the operation for a method
    ///
    /// Swagger 2.0 has no `trace`; that slot is always reported empty.
    pub fn operation(&self, method: HttpMethod) -> Option<&SwaggerOperation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => None,
        }
    }

    /// Set the operation for a method; `trace` operations are dropped
    pub fn set_operation(&mut self, method: HttpMethod, operation: SwaggerOperation) -> bool {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => return false,
        };
        *slot = Some(operation);
        true
    }

    /// Iterate over the defined operations in method order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &SwaggerOperation)> {
        HttpMethod::SWAGGER
            .into_iter()
            .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }

    /// Iterate mutably over the defined operations in method order
    pub fn operations_mut(&mut self) -> impl Iterator<Item = (HttpMethod, &mut SwaggerOperation)> {
        [
            (HttpMethod::Get, &mut self.get),
            (HttpMethod::Put, &mut self.put),
            (HttpMethod::Post, &mut self.post),
            (HttpMethod::Delete, &mut self.delete),
            (HttpMethod::Options, &mut self.options),
            (HttpMethod::Head, &mut self.head),
            (HttpMethod::Patch, &mut self.patch),
        ]
        .into_iter()
        .filter_map(|(m, slot)| slot.as_mut().map(|op| (m, op)))
    }
}

/// A single API operation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerOperation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SwaggerParameter>,
    #[serde(default)]
    pub responses: Extensible<SwaggerResponse>,
    /// `deprecated`, `schemes`, `security` and extensions
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

/// A parameter
///
/// Body parameters carry a `schema`; every other location describes its value
/// inline with `type`, `format`, `items` and the validation keywords, which
/// stay in `extensions`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerParameter {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "in", default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

impl SwaggerParameter {
    /// Whether this is a `body` parameter
    pub fn is_body(&self) -> bool {
        self.location == "body"
    }

    /// Whether this is a `formData` parameter
    pub fn is_form_data(&self) -> bool {
        self.location == "formData"
    }
}

/// A response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwaggerResponse {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    /// Header objects, written in the inline `type`/`format` style
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, serde_json::Map<String, JsonValue>>,
    /// Example payloads keyed by media type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, JsonValue>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

/// A security definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerSecurityScheme {
    #[serde(rename = "type", default)]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scopes: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_document() {
        let doc: SwaggerDocument = serde_json::from_value(json!({
            "swagger": "2.0",
            "paths": {"/x": {"get": {"responses": {"200": {"description": "ok"}}}}}
        }))
        .unwrap();

        assert_eq!(doc.swagger, "2.0");
        assert!(doc.info.is_none());
        let get = doc.paths["/x"].get.as_ref().unwrap();
        assert_eq!(get.responses["200"].description, "ok");
    }

    #[test]
    fn test_parameter_styles() {
        let doc: SwaggerDocument = serde_json::from_value(json!({
            "swagger": "2.0",
            "paths": {
                "/items/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "type": "integer", "minimum": 1}
                    ],
                    "post": {
                        "parameters": [
                            {"name": "payload", "in": "body", "schema": {"$ref": "#/definitions/Item"}}
                        ],
                        "responses": {}
                    }
                }
            }
        }))
        .unwrap();

        let item = &doc.paths["/items/{id}"];
        let id = &item.parameters[0];
        assert_eq!(id.param_type.as_deref(), Some("integer"));
        assert_eq!(id.extensions["minimum"], json!(1));
        assert!(!id.is_body());

        let body = &item.post.as_ref().unwrap().parameters[0];
        assert!(body.is_body());
        assert_eq!(
            body.schema.as_ref().unwrap().reference.as_deref(),
            Some("#/definitions/Item")
        );
    }

    #[test]
    fn test_trace_is_not_representable() {
        let mut item = SwaggerPathItem::default();
        assert!(!item.set_operation(HttpMethod::Trace, SwaggerOperation::default()));
        assert!(item.set_operation(HttpMethod::Head, SwaggerOperation::default()));
        assert_eq!(item.operations().count(), 1);
        assert!(item.operation(HttpMethod::Head).is_some());
    }
}
