//! Field transformation rules
//!
//! Each schema rule rewrites one fragment in place and leaves it untouched
//! when its trigger is absent. Upgrade rules (`upgrade_*`) turn OpenAPI 3.0
//! constructs into their OpenAPI 3.1 form; downgrade rules (`downgrade_*`)
//! go the other way. The pairs are not inverses of each other: several
//! downgrades are lossy.

use std::collections::BTreeSet;

use serde_json::json;
use tracing::{debug, warn};

use crate::model::schema::{CONTENT_ENCODING, CONTENT_MEDIA_TYPE, NULL_TYPE};
use crate::model::{ExclusiveBound, MediaType, OpenApiDocument, Schema};

/// Media type of raw binary uploads
pub const OCTET_STREAM: &str = "application/octet-stream";

const COMPONENT_SCHEMAS: &str = "#/components/schemas/";

// ============================================================================
// Schema rules
// ============================================================================

/// `nullable: true` becomes a `"null"` entry in the type list
pub fn upgrade_nullable(schema: &mut Schema) {
    if let Some(nullable) = schema.nullable.take() {
        if nullable {
            schema.schema_type.push(NULL_TYPE.to_string());
        }
    }
}

/// A type list becomes a single type plus `nullable`, or a `oneOf`
///
/// `["string", "null"]` turns into `type: string, nullable: true`. Two or
/// more non-null types turn into a `oneOf` with one single-typed branch per
/// type; every branch is nullable when `"null"` was listed.
pub fn downgrade_type_list(schema: &mut Schema) {
    let nullable = schema.has_type(NULL_TYPE);
    let non_null: Vec<String> = schema
        .schema_type
        .iter()
        .filter(|t| *t != NULL_TYPE)
        .cloned()
        .collect();

    if nullable && schema.schema_type.len() == 2 && non_null.len() == 1 {
        schema.schema_type = non_null;
        schema.nullable = Some(true);
    } else if non_null.len() >= 2 {
        if !schema.one_of.is_empty() {
            warn!(
                "Replacing {} existing oneOf branches with the type union {:?}",
                schema.one_of.len(),
                non_null
            );
        }
        schema.one_of = non_null
            .into_iter()
            .map(|t| {
                let branch = Schema::of_type(t);
                if nullable {
                    branch.with_nullable(true)
                } else {
                    branch
                }
            })
            .collect();
        schema.schema_type.clear();
    }
}

/// `exclusiveMinimum: true` + `minimum: n` becomes `exclusiveMinimum: n`
pub fn upgrade_exclusive_bounds(schema: &mut Schema) {
    upgrade_bound(&mut schema.minimum, &mut schema.exclusive_minimum);
    upgrade_bound(&mut schema.maximum, &mut schema.exclusive_maximum);
}

fn upgrade_bound(
    bound: &mut Option<serde_json::Number>,
    indicator: &mut Option<ExclusiveBound>,
) {
    match indicator {
        Some(ExclusiveBound::Flag(true)) => {
            // without a bound the flag has nothing to absorb and stays
            if let Some(n) = bound.take() {
                *indicator = Some(ExclusiveBound::Value(n));
            }
        }
        Some(ExclusiveBound::Flag(false)) => {
            *indicator = None;
        }
        _ => {}
    }
}

/// `exclusiveMinimum: n` becomes `exclusiveMinimum: true` + `minimum: n`
pub fn downgrade_exclusive_bounds(schema: &mut Schema) {
    downgrade_bound(&mut schema.minimum, &mut schema.exclusive_minimum);
    downgrade_bound(&mut schema.maximum, &mut schema.exclusive_maximum);
}

fn downgrade_bound(
    bound: &mut Option<serde_json::Number>,
    indicator: &mut Option<ExclusiveBound>,
) {
    if let Some(ExclusiveBound::Value(n)) = indicator.as_ref() {
        *bound = Some(n.clone());
        *indicator = Some(ExclusiveBound::Flag(true));
    }
}

/// `example` becomes a one-entry `examples` list
pub fn upgrade_example(schema: &mut Schema) {
    if let Some(example) = schema.example.take() {
        schema.examples = Some(vec![example]);
    }
}

/// The first entry of `examples` becomes `example`; the rest is dropped
pub fn downgrade_examples(schema: &mut Schema) {
    if let Some(examples) = schema.examples.take() {
        if examples.len() > 1 {
            warn!(
                "Dropping {} of {} schema examples; OpenAPI 3.0 keeps only one",
                examples.len() - 1,
                examples.len()
            );
        }
        if let Some(first) = examples.into_iter().next() {
            schema.example = Some(first);
        }
    }
}

/// Binary string formats become content markers
///
/// Applies to fragments whose only type is `string`: `binary` and `byte`
/// set `contentMediaType: base64`, `base64` sets `contentEncoding: base64`.
/// Other formats stay as they are.
pub fn upgrade_binary_format(schema: &mut Schema) {
    if schema.sole_type() != Some("string") {
        return;
    }

    let marker = match schema.format.as_deref() {
        Some("binary") | Some("byte") => CONTENT_MEDIA_TYPE,
        Some("base64") => CONTENT_ENCODING,
        _ => return,
    };
    schema.set_annotation(marker, json!("base64"));
    schema.format = None;
}

/// Content markers become binary string formats
///
/// Applies to fragments whose only type is `string`. Both markers are
/// removed; `contentMediaType: application/octet-stream` restores
/// `format: binary` and `contentEncoding: base64` restores `format: base64`.
pub fn downgrade_content_markers(schema: &mut Schema) {
    if schema.sole_type() != Some("string") {
        return;
    }

    if let Some(media_type) = schema.take_annotation(CONTENT_MEDIA_TYPE) {
        if media_type == OCTET_STREAM {
            schema.format = Some("binary".to_string());
        }
    }
    if let Some(encoding) = schema.take_annotation(CONTENT_ENCODING) {
        if encoding == "base64" {
            schema.format = Some("base64".to_string());
        }
    }
}

/// Remove read-only properties from `required`
///
/// Swagger 2.0 does not allow a property to be both. A property is read-only
/// when it says so itself or when its `$ref` is in `read_only_refs` (see
/// [`read_only_references`]).
pub fn drop_read_only_from_required(schema: &mut Schema, read_only_refs: &BTreeSet<String>) {
    if schema.properties.is_empty() || schema.required.is_empty() {
        return;
    }

    let properties = &schema.properties;
    schema.required.retain(|name| {
        let Some(property) = properties.get(name) else {
            return true;
        };
        let by_reference = property
            .reference
            .as_ref()
            .is_some_and(|target| read_only_refs.contains(target));
        !(property.is_read_only() || by_reference)
    });
}

/// `$ref` targets of component schemas that resolve to a read-only schema
///
/// Chains of component references are followed; a cycle resolves to
/// nothing.
pub fn read_only_references(doc: &OpenApiDocument) -> BTreeSet<String> {
    let Some(components) = &doc.components else {
        return BTreeSet::new();
    };
    let schemas = &components.schemas;

    let resolves_read_only = |start: &str| {
        let mut seen = BTreeSet::new();
        let mut current = start;
        loop {
            let Some(schema) = schemas.get(current) else {
                return false;
            };
            if schema.is_read_only() {
                return true;
            }
            match schema
                .reference
                .as_deref()
                .and_then(|target| target.strip_prefix(COMPONENT_SCHEMAS))
            {
                Some(next) if seen.insert(next) => current = next,
                _ => return false,
            }
        }
    };

    schemas
        .keys()
        .filter(|name| resolves_read_only(name.as_str()))
        .map(|name| format!("{}{}", COMPONENT_SCHEMAS, name))
        .collect()
}

/// Every OpenAPI 3.0 → 3.1 schema rule, in application order
pub fn upgrade_schema(schema: &mut Schema) {
    upgrade_nullable(schema);
    upgrade_exclusive_bounds(schema);
    upgrade_example(schema);
    upgrade_binary_format(schema);
}

/// Every OpenAPI 3.1 → 3.0 schema rule, in application order
pub fn downgrade_schema(schema: &mut Schema) {
    downgrade_type_list(schema);
    downgrade_exclusive_bounds(schema);
    downgrade_examples(schema);
    downgrade_content_markers(schema);
}

// ============================================================================
// Document rules
// ============================================================================

fn upload_media_types(doc: &mut OpenApiDocument) -> impl Iterator<Item = &mut MediaType> {
    doc.operations_mut()
        .filter_map(|op| op.request_body.as_mut())
        .filter_map(|body| body.content.get_mut(OCTET_STREAM))
}

/// Drop the schema of `application/octet-stream` request bodies
///
/// OpenAPI 3.1 implies the binary payload from the media type alone.
pub fn clear_upload_content_schemas(doc: &mut OpenApiDocument) {
    let mut cleared = 0;
    for media in upload_media_types(doc) {
        if media.schema.take().is_some() {
            cleared += 1;
        }
    }
    debug!("Cleared {} upload request body schemas", cleared);
}

/// Give `application/octet-stream` request bodies an explicit binary schema
pub fn set_upload_content_schemas(doc: &mut OpenApiDocument) {
    let mut set = 0;
    for media in upload_media_types(doc) {
        media.schema = Some(Schema::binary_string());
        set += 1;
    }
    debug!("Set {} upload request body schemas", set);
}

/// Give every request-body media type without a schema `{type: object}`
pub fn ensure_request_body_schemas(doc: &mut OpenApiDocument) {
    let mut filled = 0;
    for op in doc.operations_mut() {
        let Some(body) = op.request_body.as_mut() else {
            continue;
        };
        for media in body.content.values_mut() {
            if media.schema.is_none() {
                media.schema = Some(Schema::of_type("object"));
                filled += 1;
            }
        }
    }
    debug!("Filled {} request body schemas", filled);
}

/// Remove the fields OpenAPI 3.0 does not have
///
/// Clears `jsonSchemaDialect`, `webhooks` and `info.summary`.
pub fn strip_v31_fields(doc: &mut OpenApiDocument) {
    doc.json_schema_dialect = None;
    if let Some(webhooks) = doc.webhooks.take() {
        if !webhooks.is_empty() {
            warn!("Dropping {} webhooks; OpenAPI 3.0 has no webhooks", webhooks.len());
        }
    }
    if let Some(info) = doc.info.as_mut() {
        info.summary = None;
    }
}
