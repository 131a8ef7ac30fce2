//! Swagger 2.0 post-processing
//!
//! Runs on the output of the OpenAPI 3.0 → Swagger 2.0 conversion. Documents
//! produced here are consumed by gRPC-gateway style tooling, which expects
//! every operation to carry a `default` error response backed by the
//! `rpcStatus` definition.

use serde_json::json;
use tracing::debug;

use super::rules::OCTET_STREAM;
use crate::model::{
    AdditionalProperties, HttpMethod, Schema, SwaggerDocument, SwaggerOperation, SwaggerResponse,
};

/// Definition name of the protobuf `Any` message
pub const ANY_DEFINITION: &str = "googleprotobufAny";
/// Definition name of the gRPC status message
pub const STATUS_DEFINITION: &str = "rpcStatus";
/// Description of the injected `default` response
pub const DEFAULT_ERROR_DESCRIPTION: &str = "An unexpected error response.";

const UPLOAD_METHODS: [HttpMethod; 4] = [
    HttpMethod::Post,
    HttpMethod::Patch,
    HttpMethod::Put,
    HttpMethod::Options,
];

/// Apply every normalization to a Swagger 2.0 document
pub fn normalize(doc: &mut SwaggerDocument) {
    inject_status_definitions(doc);

    let mut operations = 0;
    for item in doc.paths.values_mut() {
        for (method, op) in item.operations_mut() {
            annotate_operation(op);
            dedup_tags(op);
            set_default_error_response(op);
            if UPLOAD_METHODS.contains(&method) {
                fix_upload_parameters(op);
            }
            operations += 1;
        }
    }

    debug!("Normalized {} Swagger operations", operations);
}

/// Add `googleprotobufAny` and `rpcStatus` unless already defined
pub fn inject_status_definitions(doc: &mut SwaggerDocument) {
    doc.definitions
        .entry(ANY_DEFINITION.to_string())
        .or_insert_with(any_definition);
    doc.definitions
        .entry(STATUS_DEFINITION.to_string())
        .or_insert_with(status_definition);
}

fn any_definition() -> Schema {
    let type_url = Schema::of_type("string").with_annotation(
        "description",
        json!(
            "A URL/resource name that uniquely identifies the type of the serialized\n\
             protocol buffer message."
        ),
    );

    let mut any = Schema::of_type("object")
        .with_annotation(
            "description",
            json!(
                "`Any` contains an arbitrary serialized protocol buffer message along with a\n\
                 URL that describes the type of the serialized message."
            ),
        )
        .with_property("@type", type_url);
    any.additional_properties = Some(AdditionalProperties::Schema(Box::default()));
    any
}

fn status_definition() -> Schema {
    Schema::of_type("object")
        .with_property("code", Schema::of_type("integer").with_format("int32"))
        .with_property("message", Schema::of_type("string"))
        .with_property(
            "details",
            Schema::of_type("array")
                .with_items(Schema::reference_to(format!("#/definitions/{}", ANY_DEFINITION))),
        )
}

/// The method part of an operation id
///
/// `Greeter_SayHello` gives `SayHello`. An id without an underscore, or
/// ending in one, is used whole.
pub fn method_name(operation_id: &str) -> &str {
    match operation_id.rfind('_') {
        Some(idx) if idx + 1 < operation_id.len() => &operation_id[idx + 1..],
        _ => operation_id,
    }
}

/// Fill an empty summary from the description, then append the gRPC note
///
/// The note names the client (first tag) and the method (from the operation
/// id), one per line, after a blank line.
pub fn annotate_operation(op: &mut SwaggerOperation) {
    let client = op.tags.first().map(String::as_str).unwrap_or_default();
    let method = op.operation_id.as_deref().map(method_name).unwrap_or_default();

    let mut lines = Vec::new();
    if !client.is_empty() {
        lines.push(format!("gRPC client: {}", client));
    }
    if !method.is_empty() {
        lines.push(format!("Method: {}", method));
    }

    let description = op.description.take().unwrap_or_default();

    if op.summary.as_deref().unwrap_or_default().is_empty() && !description.is_empty() {
        op.summary = Some(description.clone());
    }

    let note = lines.join("\n");
    op.description = match (description.is_empty(), note.is_empty()) {
        (true, true) => None,
        (true, false) => Some(note),
        (false, true) => Some(description),
        (false, false) => Some(format!("{}\n\n{}", description, note)),
    };
}

/// Drop repeated tags, keeping first occurrences in order
pub fn dedup_tags(op: &mut SwaggerOperation) {
    let mut seen = std::collections::HashSet::new();
    op.tags.retain(|tag| seen.insert(tag.clone()));
}

/// Point the `default` response at `rpcStatus`, replacing any existing one
pub fn set_default_error_response(op: &mut SwaggerOperation) {
    op.responses.insert(
        "default".to_string(),
        SwaggerResponse {
            description: DEFAULT_ERROR_DESCRIPTION.to_string(),
            schema: Some(Schema::reference_to(format!(
                "#/definitions/{}",
                STATUS_DEFINITION
            ))),
            ..Default::default()
        },
    );
}

/// Give schema-less body parameters of binary uploads a binary string schema
pub fn fix_upload_parameters(op: &mut SwaggerOperation) {
    if !op.consumes.iter().any(|c| c == OCTET_STREAM) {
        return;
    }

    for param in op.parameters.iter_mut() {
        if param.is_body() && param.schema.is_none() {
            param.schema = Some(Schema::binary_string());
        }
    }
}
