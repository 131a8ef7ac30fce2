//! OpenAPI 3.1 → 3.0 step

use tracing::debug;

use super::rules;
use super::visitor::visit_document_schemas;
use crate::config::MigrationConfig;
use crate::dialect::Dialect;
use crate::error::MigrationResult;
use crate::model::DocumentBuilder;

/// Downgrade an OpenAPI 3.1 document to OpenAPI 3.0
pub fn openapi31_to_30(input: &[u8], config: &MigrationConfig) -> MigrationResult<Vec<u8>> {
    let mut doc = DocumentBuilder::parse_openapi(input)?;

    doc.openapi = Dialect::OpenApi30.canonical_version(config).to_string();
    rules::set_upload_content_schemas(&mut doc);

    let mut visited = 0usize;
    visit_document_schemas(&mut doc, &mut |schema| {
        rules::downgrade_schema(schema);
        visited += 1;
    });
    debug!("Downgraded {} schema fragments", visited);

    rules::strip_v31_fields(&mut doc);

    DocumentBuilder::serialize_openapi(&doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn downgrade(doc: Value) -> Value {
        let input = serde_json::to_vec(&doc).unwrap();
        let output = openapi31_to_30(&input, &MigrationConfig::default()).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_version_and_schemas() {
        let out = downgrade(json!({
            "openapi": "3.1.0",
            "jsonSchemaDialect": "https://spec.openapis.org/oas/3.1/dialect/base",
            "info": {"title": "t", "version": "1", "summary": "gone"},
            "paths": {"/pets": {"get": {"responses": {"200": {
                "description": "ok",
                "content": {"application/json": {"schema": {
                    "type": "array",
                    "items": {"type": ["integer", "null"], "exclusiveMaximum": 100}
                }}}
            }}}}},
            "webhooks": {"ping": {}}
        }));

        assert_eq!(out["openapi"], "3.0.4");
        assert!(out.get("jsonSchemaDialect").is_none());
        assert!(out.get("webhooks").is_none());
        assert!(out["info"].get("summary").is_none());

        let schema = &out["paths"]["/pets"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"];
        assert_eq!(
            schema["items"],
            json!({"type": "integer", "nullable": true, "maximum": 100, "exclusiveMaximum": true})
        );
    }

    #[test]
    fn test_upload_body_schema_restored() {
        let out = downgrade(json!({
            "openapi": "3.1.1",
            "paths": {"/files": {"put": {
                "requestBody": {"content": {"application/octet-stream": {}}},
                "responses": {"204": {"description": "stored"}}
            }}}
        }));

        let content = &out["paths"]["/files"]["put"]["requestBody"]["content"];
        assert_eq!(
            content["application/octet-stream"]["schema"],
            json!({"type": "string", "format": "binary"})
        );
    }
}
