//! OpenAPI 3.0 → 3.1 step

use tracing::debug;

use super::rules;
use super::visitor::visit_document_schemas;
use crate::config::MigrationConfig;
use crate::dialect::Dialect;
use crate::error::MigrationResult;
use crate::model::DocumentBuilder;

/// Upgrade an OpenAPI 3.0 document to OpenAPI 3.1
pub fn openapi30_to_31(input: &[u8], config: &MigrationConfig) -> MigrationResult<Vec<u8>> {
    let mut doc = DocumentBuilder::parse_openapi(input)?;

    doc.openapi = Dialect::OpenApi31.canonical_version(config).to_string();
    rules::clear_upload_content_schemas(&mut doc);

    let mut visited = 0usize;
    visit_document_schemas(&mut doc, &mut |schema| {
        rules::upgrade_schema(schema);
        visited += 1;
    });
    debug!("Upgraded {} schema fragments", visited);

    DocumentBuilder::serialize_openapi(&doc)
}
