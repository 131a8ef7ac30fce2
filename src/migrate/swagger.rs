//! Swagger 2.0 ↔ OpenAPI 3.0 structural conversion
//!
//! Moves the document skeleton between the two layouts: servers, reusable
//! components, parameters, request bodies, responses and security schemes.
//! Schema fragments are carried over as they are, apart from the handful of
//! keywords Swagger spells differently (`x-nullable`, `type: file`, string
//! discriminators). `$ref` targets are rewritten on the serialized tree once
//! the typed conversion is done.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value as JsonValue, json};
use tracing::{debug, info, warn};

use super::normalize;
use super::rules;
use super::visitor::{visit_document_schemas, visit_schema};
use crate::config::MigrationConfig;
use crate::error::MigrationResult;
use crate::model::refs::{replace_prefix, rewrite_refs};
use crate::model::{
    DocumentBuilder, Header, HttpMethod, MediaType, OAuthFlow, OAuthFlows, OpenApiDocument,
    Operation, Parameter, PathItem, RequestBody, Response, Schema, SecurityScheme, Server,
    SwaggerDocument, SwaggerOperation, SwaggerParameter, SwaggerPathItem, SwaggerResponse,
    SwaggerSecurityScheme,
};

const MULTIPART: &str = "multipart/form-data";
const URL_ENCODED: &str = "application/x-www-form-urlencoded";
const JSON_MEDIA_TYPE: &str = "application/json";
const ORIGINAL_PARAM_NAME: &str = "x-originalParamName";
const X_NULLABLE: &str = "x-nullable";

/// Keywords of a non-body Swagger parameter that describe its value
const VALUE_KEYWORDS: &[&str] = &[
    "default",
    "enum",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "multipleOf",
];

/// Convert a Swagger 2.0 document to OpenAPI 3.0 (step entry point)
pub fn swagger_to_openapi30(input: &[u8], config: &MigrationConfig) -> MigrationResult<Vec<u8>> {
    let swagger = DocumentBuilder::parse_swagger(input)?;
    let doc = swagger_to_openapi(swagger, config)?;
    DocumentBuilder::serialize_openapi(&doc)
}

/// Convert an OpenAPI 3.0 document to Swagger 2.0 (step entry point)
///
/// Read-only properties leave `required` and request bodies without a schema
/// get `{type: object}` before the conversion; the result is normalized.
pub fn openapi30_to_swagger(input: &[u8], _config: &MigrationConfig) -> MigrationResult<Vec<u8>> {
    let mut doc = DocumentBuilder::parse_openapi(input)?;

    let read_only = rules::read_only_references(&doc);
    visit_document_schemas(&mut doc, &mut |s: &mut Schema| {
        rules::drop_read_only_from_required(s, &read_only)
    });
    rules::ensure_request_body_schemas(&mut doc);

    let mut swagger = openapi_to_swagger(doc)?;
    normalize::normalize(&mut swagger);

    DocumentBuilder::serialize_swagger(&swagger)
}

// ============================================================================
// Swagger 2.0 → OpenAPI 3.0
// ============================================================================

struct UpgradeContext<'a> {
    config: &'a MigrationConfig,
    consumes: &'a [String],
    produces: &'a [String],
    /// Global parameters by name, to resolve `$ref`s to body/form parameters
    globals: &'a BTreeMap<String, SwaggerParameter>,
}

impl UpgradeContext<'_> {
    fn media_types(&self, local: &[String], global: &[String]) -> Vec<String> {
        let chosen = if !local.is_empty() { local } else { global };
        if chosen.is_empty() {
            vec![self.config.default_media_type.clone()]
        } else {
            chosen.to_vec()
        }
    }

    fn global_name<'b>(&self, reference: &'b str) -> Option<&'b str> {
        reference.strip_prefix("#/parameters/")
    }
}

/// Convert a typed Swagger 2.0 document to OpenAPI 3.0
pub fn swagger_to_openapi(
    swagger: SwaggerDocument,
    config: &MigrationConfig,
) -> MigrationResult<OpenApiDocument> {
    let mut doc = OpenApiDocument::new(config.swagger_upgrade_version.clone());
    doc.info = swagger.info.clone();
    doc.servers = servers_from_host(
        swagger.host.as_deref(),
        swagger.base_path.as_deref(),
        &swagger.schemes,
    );
    doc.extensions = swagger.extensions.clone();

    let ctx = UpgradeContext {
        config,
        consumes: &swagger.consumes,
        produces: &swagger.produces,
        globals: &swagger.parameters,
    };

    let body_globals: BTreeSet<String> = swagger
        .parameters
        .iter()
        .filter(|(_, p)| p.is_body())
        .map(|(name, _)| name.clone())
        .collect();

    {
        let components = doc.components_mut();
        for (name, schema) in &swagger.definitions {
            components
                .schemas
                .insert(name.clone(), upgrade_schema_keywords(schema.clone()));
        }
        for (name, param) in &swagger.parameters {
            if param.is_body() {
                let body = body_to_request_body(param, &ctx.media_types(&[], ctx.consumes));
                components.request_bodies.insert(name.clone(), body);
            } else if param.is_form_data() {
                warn!("Dropping global formData parameter '{}'; it is inlined where referenced", name);
            } else {
                components
                    .parameters
                    .insert(name.clone(), upgrade_parameter(param)?);
            }
        }
        for (name, response) in &swagger.responses {
            let produces = ctx.media_types(&[], ctx.produces);
            components
                .responses
                .insert(name.clone(), upgrade_response(response, &produces)?);
        }
        for (name, scheme) in &swagger.security_definitions {
            if let Some(converted) = upgrade_security_scheme(name, scheme) {
                components.security_schemes.insert(name.clone(), converted);
            }
        }
    }
    if doc.components.as_ref().is_some_and(|c| c == &Default::default()) {
        doc.components = None;
    }

    for (path, item) in &swagger.paths {
        doc.paths.insert(path.clone(), upgrade_path_item(item, &ctx)?);
    }
    doc.paths.extensions = swagger.paths.extensions.clone();

    let mut value = DocumentBuilder::to_value(&doc)?;
    rewrite_refs(&mut value, &|target: &str| {
        replace_prefix(target, "#/definitions/", "#/components/schemas/")
            .or_else(|| replace_prefix(target, "#/responses/", "#/components/responses/"))
            .or_else(|| {
                let name = target.strip_prefix("#/parameters/")?;
                if body_globals.contains(name) {
                    Some(format!("#/components/requestBodies/{}", name))
                } else {
                    Some(format!("#/components/parameters/{}", name))
                }
            })
    });

    let doc: OpenApiDocument = DocumentBuilder::from_value(value)?;
    info!(
        "Converted Swagger 2.0 document with {} paths to OpenAPI {}",
        doc.paths.len(),
        doc.openapi
    );
    Ok(doc)
}

/// Build server entries from `host`, `basePath` and `schemes`
pub fn servers_from_host(host: Option<&str>, base_path: Option<&str>, schemes: &[String]) -> Vec<Server> {
    let path = base_path.unwrap_or_default();
    let urls: Vec<String> = match host {
        Some(host) if !host.is_empty() => {
            if schemes.is_empty() {
                vec![format!("https://{}{}", host, path)]
            } else {
                schemes
                    .iter()
                    .map(|scheme| format!("{}://{}{}", scheme, host, path))
                    .collect()
            }
        }
        _ if !path.is_empty() => vec![path.to_string()],
        _ => Vec::new(),
    };

    urls.into_iter()
        .map(|url| Server {
            url,
            ..Default::default()
        })
        .collect()
}

/// Rewrite Swagger-only schema keywords throughout a fragment
fn upgrade_schema_keywords(mut schema: Schema) -> Schema {
    visit_schema(Some(&mut schema), &mut |s: &mut Schema| {
        if let Some(nullable) = s.take_annotation(X_NULLABLE) {
            s.nullable = nullable.as_bool();
        }
        if s.sole_type() == Some("file") {
            s.schema_type = vec!["string".to_string()];
            s.format = Some("binary".to_string());
        }
        if let Some(JsonValue::String(property)) = s.annotation("discriminator").cloned() {
            s.set_annotation("discriminator", json!({"propertyName": property}));
        }
    });
    schema
}

/// Build the value schema of a non-body parameter from its inline keywords
fn parameter_value_schema(param: &SwaggerParameter) -> MigrationResult<Schema> {
    let mut object = Map::new();
    if let Some(t) = &param.param_type {
        object.insert("type".to_string(), json!(t));
    }
    if let Some(format) = &param.format {
        object.insert("format".to_string(), json!(format));
    }
    if let Some(items) = &param.items {
        object.insert("items".to_string(), DocumentBuilder::to_value(items)?);
    }
    for key in VALUE_KEYWORDS {
        if let Some(value) = param.extensions.get(*key) {
            object.insert(key.to_string(), value.clone());
        }
    }
    if let Some(nullable) = param.extensions.get(X_NULLABLE) {
        object.insert("nullable".to_string(), nullable.clone());
    }

    let schema: Schema = DocumentBuilder::from_value(JsonValue::Object(object))?;
    Ok(upgrade_schema_keywords(schema))
}

/// Extensions of a parameter that stay on the OpenAPI 3.0 parameter
fn parameter_extensions(param: &SwaggerParameter) -> BTreeMap<String, JsonValue> {
    param
        .extensions
        .iter()
        .filter(|(key, _)| !VALUE_KEYWORDS.contains(&key.as_str()) && key.as_str() != X_NULLABLE)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// `collectionFormat` as OpenAPI 3.0 `style`/`explode`
fn collection_style(param: &SwaggerParameter) -> Option<(&'static str, bool)> {
    let format = param.collection_format.as_deref()?;
    let simple_location = param.location == "path" || param.location == "header";
    match format {
        "csv" if simple_location => Some(("simple", false)),
        "csv" => Some(("form", false)),
        "multi" => Some(("form", true)),
        "ssv" => Some(("spaceDelimited", false)),
        "pipes" => Some(("pipeDelimited", false)),
        _ => None,
    }
}

fn upgrade_parameter(param: &SwaggerParameter) -> MigrationResult<Parameter> {
    if let Some(reference) = &param.reference {
        return Ok(Parameter {
            reference: Some(reference.clone()),
            ..Default::default()
        });
    }

    let mut extensions = parameter_extensions(param);
    if let Some((style, explode)) = collection_style(param) {
        extensions.insert("style".to_string(), json!(style));
        extensions.insert("explode".to_string(), json!(explode));
    }

    Ok(Parameter {
        reference: None,
        name: param.name.clone(),
        location: param.location.clone(),
        description: param.description.clone(),
        required: param.required,
        schema: Some(parameter_value_schema(param)?),
        extensions,
    })
}

fn body_to_request_body(param: &SwaggerParameter, media_types: &[String]) -> RequestBody {
    let schema = param.schema.clone().map(upgrade_schema_keywords);
    let content = media_types
        .iter()
        .map(|media_type| {
            (
                media_type.clone(),
                MediaType {
                    schema: schema.clone(),
                    ..Default::default()
                },
            )
        })
        .collect();

    let mut extensions = parameter_extensions(param);
    if !param.name.is_empty() {
        extensions.insert(ORIGINAL_PARAM_NAME.to_string(), json!(param.name));
    }

    RequestBody {
        reference: None,
        description: param.description.clone(),
        content,
        required: param.required,
        extensions,
    }
}

fn form_to_request_body(
    params: &[SwaggerParameter],
    consumes: &[String],
) -> MigrationResult<RequestBody> {
    let mut schema = Schema::of_type("object");
    for param in params {
        let mut property = parameter_value_schema(param)?;
        if let Some(description) = &param.description {
            property.set_annotation("description", json!(description));
        }
        if param.required == Some(true) {
            schema.required.push(param.name.clone());
        }
        schema.properties.insert(param.name.clone(), property);
    }

    let media_type = if consumes.iter().any(|c| c == MULTIPART)
        || (!consumes.iter().any(|c| c == URL_ENCODED)
            && params.iter().any(|p| p.param_type.as_deref() == Some("file")))
    {
        MULTIPART
    } else {
        URL_ENCODED
    };

    Ok(RequestBody {
        content: [(media_type.to_string(), MediaType::with_schema(schema))].into(),
        required: params.iter().any(|p| p.required == Some(true)).then_some(true),
        ..Default::default()
    })
}

fn upgrade_header(header: &Map<String, JsonValue>) -> MigrationResult<Header> {
    let mut object = header.clone();
    let description = object
        .remove("description")
        .and_then(|d| d.as_str().map(str::to_string));
    let extensions: BTreeMap<String, JsonValue> = object
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    object.retain(|key, _| !key.starts_with("x-"));

    Ok(Header {
        reference: None,
        description,
        schema: Some(DocumentBuilder::from_value(JsonValue::Object(object))?),
        extensions,
    })
}

fn upgrade_response(response: &SwaggerResponse, produces: &[String]) -> MigrationResult<Response> {
    if let Some(reference) = &response.reference {
        return Ok(Response {
            reference: Some(reference.clone()),
            ..Default::default()
        });
    }

    let mut content = BTreeMap::new();
    if let Some(schema) = &response.schema {
        let schema = upgrade_schema_keywords(schema.clone());
        for media_type in produces {
            content.insert(media_type.clone(), MediaType::with_schema(schema.clone()));
        }
    }
    for (media_type, example) in &response.examples {
        content.entry(media_type.clone()).or_default().example = Some(example.clone());
    }

    let mut headers = BTreeMap::new();
    for (name, header) in &response.headers {
        headers.insert(name.clone(), upgrade_header(header)?);
    }

    Ok(Response {
        reference: None,
        description: response.description.clone(),
        headers,
        content,
        extensions: response.extensions.clone(),
    })
}

fn upgrade_security_scheme(name: &str, scheme: &SwaggerSecurityScheme) -> Option<SecurityScheme> {
    let mut converted = SecurityScheme {
        description: scheme.description.clone(),
        extensions: scheme.extensions.clone(),
        ..Default::default()
    };

    match scheme.scheme_type.as_str() {
        "basic" => {
            converted.scheme_type = "http".to_string();
            converted.scheme = Some("basic".to_string());
        }
        "apiKey" => {
            converted.scheme_type = "apiKey".to_string();
            converted.name = scheme.name.clone();
            converted.location = scheme.location.clone();
        }
        "oauth2" => {
            converted.scheme_type = "oauth2".to_string();
            let flow = OAuthFlow {
                authorization_url: scheme.authorization_url.clone(),
                token_url: scheme.token_url.clone(),
                refresh_url: None,
                scopes: scheme.scopes.clone(),
            };
            let mut flows = OAuthFlows::default();
            match scheme.flow.as_deref() {
                Some("implicit") => flows.implicit = Some(flow),
                Some("password") => flows.password = Some(flow),
                Some("application") => flows.client_credentials = Some(flow),
                Some("accessCode") => flows.authorization_code = Some(flow),
                other => {
                    warn!("Dropping security scheme '{}': unknown OAuth2 flow {:?}", name, other);
                    return None;
                }
            }
            converted.flows = Some(flows);
        }
        other => {
            warn!("Dropping security scheme '{}': unknown type '{}'", name, other);
            return None;
        }
    }

    Some(converted)
}

fn upgrade_path_item(item: &SwaggerPathItem, ctx: &UpgradeContext<'_>) -> MigrationResult<PathItem> {
    let mut converted = PathItem {
        reference: item.reference.clone(),
        extensions: item.extensions.clone(),
        ..Default::default()
    };

    // body and formData parameters only exist per operation in OpenAPI 3.0
    let (shared_payload, shared): (Vec<&SwaggerParameter>, Vec<&SwaggerParameter>) = item
        .parameters
        .iter()
        .partition(|p| p.is_body() || p.is_form_data());
    for param in shared {
        converted.parameters.push(upgrade_parameter(param)?);
    }

    for (method, op) in item.operations() {
        let op = upgrade_operation(op, &shared_payload, ctx)?;
        *converted.operation_slot(method) = Some(op);
    }

    Ok(converted)
}

fn upgrade_operation(
    op: &SwaggerOperation,
    shared_payload: &[&SwaggerParameter],
    ctx: &UpgradeContext<'_>,
) -> MigrationResult<Operation> {
    let consumes = ctx.media_types(&op.consumes, ctx.consumes);
    let produces = ctx.media_types(&op.produces, ctx.produces);

    let mut converted = Operation {
        tags: op.tags.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        operation_id: op.operation_id.clone(),
        extensions: op.extensions.clone(),
        ..Default::default()
    };

    let mut form_params = Vec::new();
    let payload = shared_payload.iter().copied().chain(op.parameters.iter());
    for param in payload {
        let resolved = match &param.reference {
            Some(reference) => ctx
                .global_name(reference)
                .and_then(|name| ctx.globals.get(name).map(|global| (name, global))),
            None => None,
        };

        match resolved {
            Some((name, global)) if global.is_body() => {
                converted.request_body = Some(RequestBody {
                    reference: Some(format!("#/parameters/{}", name)),
                    ..Default::default()
                });
            }
            Some((_, global)) if global.is_form_data() => form_params.push(global.clone()),
            _ if param.is_body() => {
                converted.request_body = Some(body_to_request_body(param, &consumes));
            }
            _ if param.is_form_data() => form_params.push(param.clone()),
            _ => converted.parameters.push(upgrade_parameter(param)?),
        }
    }

    if !form_params.is_empty() {
        let form = form_to_request_body(&form_params, &consumes)?;
        match converted.request_body.as_mut() {
            Some(body) if body.reference.is_none() => body.content.extend(form.content),
            _ => converted.request_body = Some(form),
        }
    }

    for (code, response) in &op.responses {
        converted
            .responses
            .insert(code.clone(), upgrade_response(response, &produces)?);
    }
    converted.responses.extensions = op.responses.extensions.clone();

    Ok(converted)
}

// ============================================================================
// OpenAPI 3.0 → Swagger 2.0
// ============================================================================

fn is_form_media_type(media_type: &str) -> bool {
    media_type == MULTIPART || media_type == URL_ENCODED
}

/// The media type whose schema represents a content map
///
/// `application/json` when present, otherwise the first in order.
fn preferred_media_type(content: &BTreeMap<String, MediaType>) -> Option<(&String, &MediaType)> {
    content
        .get_key_value(JSON_MEDIA_TYPE)
        .or_else(|| content.iter().next())
}

/// Split a server URL into scheme, host and base path
pub fn split_server_url(url: &str) -> (Option<&str>, Option<&str>, Option<&str>) {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => match url.strip_prefix("//") {
            Some(rest) => (None, rest),
            None => return (None, None, Some(url).filter(|p| !p.is_empty() && *p != "/")),
        },
    };

    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    let host = Some(host).filter(|h| !h.is_empty());
    let path = Some(path).filter(|p| !p.is_empty() && *p != "/");
    (scheme, host, path)
}

fn downgrade_schema_keywords(mut schema: Schema) -> Schema {
    visit_schema(Some(&mut schema), &mut |s: &mut Schema| {
        if let Some(nullable) = s.nullable.take() {
            s.set_annotation(X_NULLABLE, json!(nullable));
        }
        if let Some(property) = s
            .annotation("discriminator")
            .and_then(|d| d.get("propertyName"))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
        {
            s.set_annotation("discriminator", json!(property));
        }
    });
    schema
}

/// Move a value schema into the inline keywords of a Swagger parameter
fn inline_value_schema(param: &mut SwaggerParameter, schema: &Schema) -> MigrationResult<()> {
    if let Some(reference) = &schema.reference {
        warn!(
            "Parameter '{}' refers to schema {}; Swagger 2.0 needs an inline type",
            param.name, reference
        );
        param.param_type = Some("string".to_string());
        return Ok(());
    }

    let JsonValue::Object(mut object) = DocumentBuilder::to_value(schema)? else {
        return Ok(());
    };

    param.param_type = object
        .remove("type")
        .and_then(|t| t.as_str().map(str::to_string));
    param.format = object
        .remove("format")
        .and_then(|f| f.as_str().map(str::to_string));
    if let Some(items) = object.remove("items") {
        let items: Schema = DocumentBuilder::from_value(items)?;
        param.items = Some(Box::new(downgrade_schema_keywords(items)));
    }
    if let Some(nullable) = object.remove("nullable") {
        param.extensions.insert(X_NULLABLE.to_string(), nullable);
    }
    if let Some(JsonValue::String(description)) = object.remove("description") {
        param.description.get_or_insert(description);
    }
    for key in VALUE_KEYWORDS {
        if let Some(value) = object.remove(*key) {
            param.extensions.insert(key.to_string(), value);
        }
    }
    if !object.is_empty() {
        debug!(
            "Parameter '{}' loses schema keywords {:?}",
            param.name,
            object.keys().collect::<Vec<_>>()
        );
    }
    Ok(())
}

fn downgrade_parameter(param: &Parameter) -> MigrationResult<SwaggerParameter> {
    if let Some(reference) = &param.reference {
        return Ok(SwaggerParameter {
            reference: Some(reference.clone()),
            ..Default::default()
        });
    }

    let mut extensions = param.extensions.clone();
    let style = extensions.remove("style");
    let explode = extensions.remove("explode");

    let mut converted = SwaggerParameter {
        name: param.name.clone(),
        location: param.location.clone(),
        description: param.description.clone(),
        required: param.required,
        extensions,
        ..Default::default()
    };
    if param.location == "cookie" {
        warn!("Parameter '{}' is a cookie parameter; Swagger 2.0 has none", param.name);
    }
    if let Some(schema) = &param.schema {
        inline_value_schema(&mut converted, schema)?;
    }

    if converted.param_type.as_deref() == Some("array") {
        let explode = explode.and_then(|e| e.as_bool());
        converted.collection_format = match style.as_ref().and_then(JsonValue::as_str) {
            Some("spaceDelimited") => Some("ssv".to_string()),
            Some("pipeDelimited") => Some("pipes".to_string()),
            Some("simple") => Some("csv".to_string()),
            Some("form") | None if param.location == "query" || param.location == "cookie" => {
                if explode.unwrap_or(true) {
                    Some("multi".to_string())
                } else {
                    Some("csv".to_string())
                }
            }
            _ => None,
        };
    }

    Ok(converted)
}

/// Turn a request body into Swagger `body` or `formData` parameters
fn downgrade_request_body(body: &RequestBody) -> MigrationResult<(Vec<SwaggerParameter>, Vec<String>)> {
    if let Some(reference) = &body.reference {
        return Ok((
            vec![SwaggerParameter {
                reference: Some(reference.clone()),
                ..Default::default()
            }],
            Vec::new(),
        ));
    }

    let consumes: Vec<String> = body.content.keys().cloned().collect();
    let payload: BTreeMap<String, MediaType> = body
        .content
        .iter()
        .filter(|(media_type, _)| !is_form_media_type(media_type))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if let Some((_, media)) = preferred_media_type(&payload) {
        let mut extensions = body.extensions.clone();
        let name = extensions
            .remove(ORIGINAL_PARAM_NAME)
            .and_then(|n| n.as_str().map(str::to_string))
            .unwrap_or_else(|| "body".to_string());
        let schema = media
            .schema
            .clone()
            .filter(|s| !s.is_binary_string())
            .map(downgrade_schema_keywords);

        let param = SwaggerParameter {
            name,
            location: "body".to_string(),
            description: body.description.clone(),
            required: body.required,
            schema,
            extensions,
            ..Default::default()
        };
        return Ok((vec![param], consumes));
    }

    let mut params = Vec::new();
    if let Some((_, media)) = preferred_media_type(&body.content) {
        let Some(schema) = &media.schema else {
            return Ok((params, consumes));
        };
        for (name, property) in &schema.properties {
            let mut param = SwaggerParameter {
                name: name.clone(),
                location: "formData".to_string(),
                description: property.annotation_str("description").map(str::to_string),
                required: schema.required.contains(name).then_some(true),
                ..Default::default()
            };
            if property.is_binary_string() {
                param.param_type = Some("file".to_string());
            } else {
                inline_value_schema(&mut param, property)?;
            }
            params.push(param);
        }
    }

    Ok((params, consumes))
}

fn downgrade_header(header: &Header) -> MigrationResult<Map<String, JsonValue>> {
    let mut object = match &header.schema {
        Some(schema) => match DocumentBuilder::to_value(&downgrade_schema_keywords(schema.clone()))? {
            JsonValue::Object(object) => object,
            _ => Map::new(),
        },
        None => Map::new(),
    };
    if let Some(description) = &header.description {
        object.insert("description".to_string(), json!(description));
    }
    for (key, value) in &header.extensions {
        object.insert(key.clone(), value.clone());
    }
    Ok(object)
}

fn downgrade_response(response: &Response) -> MigrationResult<(SwaggerResponse, Vec<String>)> {
    if let Some(reference) = &response.reference {
        return Ok((
            SwaggerResponse {
                reference: Some(reference.clone()),
                ..Default::default()
            },
            Vec::new(),
        ));
    }

    let produces: Vec<String> = response.content.keys().cloned().collect();
    let schema = preferred_media_type(&response.content)
        .and_then(|(_, media)| media.schema.clone())
        .map(downgrade_schema_keywords);
    let examples = response
        .content
        .iter()
        .filter_map(|(media_type, media)| Some((media_type.clone(), media.example.clone()?)))
        .collect();

    let mut headers = BTreeMap::new();
    for (name, header) in &response.headers {
        headers.insert(name.clone(), downgrade_header(header)?);
    }

    let converted = SwaggerResponse {
        reference: None,
        description: response.description.clone(),
        schema,
        headers,
        examples,
        extensions: response.extensions.clone(),
    };
    Ok((converted, produces))
}

fn downgrade_security_scheme(name: &str, scheme: &SecurityScheme) -> Option<SwaggerSecurityScheme> {
    let mut converted = SwaggerSecurityScheme {
        description: scheme.description.clone(),
        extensions: scheme.extensions.clone(),
        ..Default::default()
    };

    match (scheme.scheme_type.as_str(), scheme.scheme.as_deref()) {
        ("http", Some(s)) if s.eq_ignore_ascii_case("basic") => {
            converted.scheme_type = "basic".to_string();
        }
        ("http", Some(s)) if s.eq_ignore_ascii_case("bearer") => {
            converted.scheme_type = "apiKey".to_string();
            converted.name = Some("Authorization".to_string());
            converted.location = Some("header".to_string());
        }
        ("apiKey", _) => {
            converted.scheme_type = "apiKey".to_string();
            converted.name = scheme.name.clone();
            converted.location = scheme.location.clone();
        }
        ("oauth2", _) => {
            let flows = scheme.flows.clone().unwrap_or_default();
            let (flow_name, flow) = if let Some(flow) = flows.implicit {
                ("implicit", flow)
            } else if let Some(flow) = flows.password {
                ("password", flow)
            } else if let Some(flow) = flows.client_credentials {
                ("application", flow)
            } else if let Some(flow) = flows.authorization_code {
                ("accessCode", flow)
            } else {
                warn!("Dropping security scheme '{}': no OAuth2 flow", name);
                return None;
            };
            converted.scheme_type = "oauth2".to_string();
            converted.flow = Some(flow_name.to_string());
            converted.authorization_url = flow.authorization_url;
            converted.token_url = flow.token_url;
            converted.scopes = flow.scopes;
        }
        (other, _) => {
            warn!(
                "Dropping security scheme '{}': type '{}' has no Swagger 2.0 equivalent",
                name, other
            );
            return None;
        }
    }

    Some(converted)
}

fn push_unique(list: &mut Vec<String>, values: impl IntoIterator<Item = String>) {
    for value in values {
        if !list.contains(&value) {
            list.push(value);
        }
    }
}

fn downgrade_operation(op: &Operation) -> MigrationResult<SwaggerOperation> {
    let mut converted = SwaggerOperation {
        tags: op.tags.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        operation_id: op.operation_id.clone(),
        extensions: op.extensions.clone(),
        ..Default::default()
    };

    for param in &op.parameters {
        converted.parameters.push(downgrade_parameter(param)?);
    }
    if let Some(body) = &op.request_body {
        let (params, consumes) = downgrade_request_body(body)?;
        converted.parameters.extend(params);
        push_unique(&mut converted.consumes, consumes);
    }
    for (code, response) in &op.responses {
        let (response, produces) = downgrade_response(response)?;
        converted.responses.insert(code.clone(), response);
        push_unique(&mut converted.produces, produces);
    }
    converted.responses.extensions = op.responses.extensions.clone();

    Ok(converted)
}

fn downgrade_path_item(path: &str, item: &PathItem) -> MigrationResult<SwaggerPathItem> {
    let mut converted = SwaggerPathItem {
        reference: item.reference.clone(),
        extensions: item.extensions.clone(),
        ..Default::default()
    };
    for param in &item.parameters {
        converted.parameters.push(downgrade_parameter(param)?);
    }
    for (method, op) in item.operations() {
        if !converted.set_operation(method, downgrade_operation(op)?) {
            warn!("Dropping {} {}: Swagger 2.0 has no {} operations", method, path, HttpMethod::Trace);
        }
    }
    Ok(converted)
}

/// Convert a typed OpenAPI 3.0 document to Swagger 2.0
pub fn openapi_to_swagger(doc: OpenApiDocument) -> MigrationResult<SwaggerDocument> {
    let mut swagger = SwaggerDocument::new();
    swagger.info = doc.info.clone();
    swagger.extensions = doc.extensions.clone();

    if let Some(first) = doc.servers.first() {
        let (_, host, base_path) = split_server_url(&first.url);
        swagger.host = host.map(str::to_string);
        swagger.base_path = base_path.map(str::to_string);
        let schemes = doc.servers.iter().filter_map(|server| {
            let (scheme, h, p) = split_server_url(&server.url);
            (h == host && p == base_path).then_some(scheme?.to_string())
        });
        push_unique(&mut swagger.schemes, schemes);
    }

    if let Some(components) = &doc.components {
        for (name, schema) in &components.schemas {
            swagger
                .definitions
                .insert(name.clone(), downgrade_schema_keywords(schema.clone()));
        }
        for (name, param) in &components.parameters {
            swagger
                .parameters
                .insert(name.clone(), downgrade_parameter(param)?);
        }
        for (name, body) in &components.request_bodies {
            let (params, _) = downgrade_request_body(body)?;
            match params.into_iter().next() {
                Some(param) if param.is_body() => {
                    swagger.parameters.insert(name.clone(), param);
                }
                _ => warn!("Dropping request body '{}': only body payloads can be shared", name),
            }
        }
        for (name, response) in &components.responses {
            let (response, _) = downgrade_response(response)?;
            swagger.responses.insert(name.clone(), response);
        }
        for (name, scheme) in &components.security_schemes {
            if let Some(converted) = downgrade_security_scheme(name, scheme) {
                swagger.security_definitions.insert(name.clone(), converted);
            }
        }
    }

    for (path, item) in &doc.paths {
        swagger
            .paths
            .insert(path.clone(), downgrade_path_item(path, item)?);
    }
    swagger.paths.extensions = doc.paths.extensions.clone();

    let mut value = DocumentBuilder::to_value(&swagger)?;
    rewrite_refs(&mut value, &|target: &str| {
        replace_prefix(target, "#/components/schemas/", "#/definitions/")
            .or_else(|| replace_prefix(target, "#/components/parameters/", "#/parameters/"))
            .or_else(|| replace_prefix(target, "#/components/requestBodies/", "#/parameters/"))
            .or_else(|| replace_prefix(target, "#/components/responses/", "#/responses/"))
    });

    let swagger: SwaggerDocument = DocumentBuilder::from_value(value)?;
    info!(
        "Converted OpenAPI {} document with {} paths to Swagger 2.0",
        doc.openapi,
        swagger.paths.len()
    );
    Ok(swagger)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upgrade(value: JsonValue) -> JsonValue {
        let swagger: SwaggerDocument = serde_json::from_value(value).unwrap();
        let doc = swagger_to_openapi(swagger, &MigrationConfig::default()).unwrap();
        serde_json::to_value(doc).unwrap()
    }

    fn downgrade(value: JsonValue) -> JsonValue {
        let doc: OpenApiDocument = serde_json::from_value(value).unwrap();
        let swagger = openapi_to_swagger(doc).unwrap();
        serde_json::to_value(swagger).unwrap()
    }

    mod server_tests {
        use super::*;

        #[test]
        fn test_servers_from_host() {
            let schemes = vec!["http".to_string(), "https".to_string()];
            let servers = servers_from_host(Some("api.example.com"), Some("/v1"), &schemes);
            let urls: Vec<_> = servers.iter().map(|s| s.url.as_str()).collect();
            assert_eq!(urls, vec!["http://api.example.com/v1", "https://api.example.com/v1"]);

            let servers = servers_from_host(Some("api.example.com"), None, &[]);
            assert_eq!(servers[0].url, "https://api.example.com");

            let servers = servers_from_host(None, Some("/v2"), &[]);
            assert_eq!(servers[0].url, "/v2");

            assert!(servers_from_host(None, None, &schemes).is_empty());
        }

        #[test]
        fn test_split_server_url() {
            assert_eq!(
                split_server_url("https://api.example.com/v1"),
                (Some("https"), Some("api.example.com"), Some("/v1"))
            );
            assert_eq!(
                split_server_url("http://localhost:8080"),
                (Some("http"), Some("localhost:8080"), None)
            );
            assert_eq!(split_server_url("/v2"), (None, None, Some("/v2")));
            assert_eq!(split_server_url("//cdn.example.com/"), (None, Some("cdn.example.com"), None));
        }

        #[test]
        fn test_servers_back_to_host() {
            let out = downgrade(json!({
                "openapi": "3.0.3",
                "servers": [
                    {"url": "http://api.example.com/v1"},
                    {"url": "https://api.example.com/v1"},
                    {"url": "https://staging.example.com/v1"}
                ],
                "paths": {}
            }));
            assert_eq!(out["host"], "api.example.com");
            assert_eq!(out["basePath"], "/v1");
            assert_eq!(out["schemes"], json!(["http", "https"]));
        }
    }

    mod upgrade_tests {
        use super::*;

        #[test]
        fn test_components_and_refs() {
            let out = upgrade(json!({
                "swagger": "2.0",
                "info": {"title": "Pets", "version": "1.0"},
                "host": "pets.example.com",
                "basePath": "/api",
                "schemes": ["https"],
                "consumes": ["application/json"],
                "produces": ["application/json"],
                "definitions": {
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "tag": {"type": "string", "x-nullable": true},
                            "owner": {"$ref": "#/definitions/Owner"}
                        }
                    },
                    "Owner": {"type": "object"}
                },
                "parameters": {
                    "limit": {"name": "limit", "in": "query", "type": "integer", "maximum": 100},
                    "petBody": {"name": "pet", "in": "body", "schema": {"$ref": "#/definitions/Pet"}}
                },
                "responses": {
                    "NotFound": {"description": "missing"}
                },
                "paths": {
                    "/pets": {
                        "get": {
                            "parameters": [{"$ref": "#/parameters/limit"}],
                            "responses": {
                                "200": {"description": "ok", "schema": {"type": "array", "items": {"$ref": "#/definitions/Pet"}}},
                                "404": {"$ref": "#/responses/NotFound"}
                            }
                        },
                        "post": {
                            "parameters": [{"$ref": "#/parameters/petBody"}],
                            "responses": {"201": {"description": "created"}}
                        }
                    }
                }
            }));

            assert_eq!(out["openapi"], "3.0.3");
            assert_eq!(out["servers"], json!([{"url": "https://pets.example.com/api"}]));

            let components = &out["components"];
            assert_eq!(
                components["schemas"]["Pet"]["properties"]["tag"],
                json!({"type": "string", "nullable": true})
            );
            assert_eq!(
                components["schemas"]["Pet"]["properties"]["owner"]["$ref"],
                "#/components/schemas/Owner"
            );
            assert_eq!(
                components["parameters"]["limit"],
                json!({"name": "limit", "in": "query", "schema": {"type": "integer", "maximum": 100}})
            );
            assert_eq!(
                components["requestBodies"]["petBody"]["content"]["application/json"]["schema"]["$ref"],
                "#/components/schemas/Pet"
            );
            assert_eq!(components["responses"]["NotFound"]["description"], "missing");

            let get = &out["paths"]["/pets"]["get"];
            assert_eq!(get["parameters"][0]["$ref"], "#/components/parameters/limit");
            assert_eq!(get["responses"]["404"]["$ref"], "#/components/responses/NotFound");
            assert_eq!(
                get["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
                "#/components/schemas/Pet"
            );

            let post = &out["paths"]["/pets"]["post"];
            assert_eq!(post["requestBody"]["$ref"], "#/components/requestBodies/petBody");
        }

        #[test]
        fn test_body_parameter_per_consumed_type() {
            let out = upgrade(json!({
                "swagger": "2.0",
                "paths": {"/items": {"put": {
                    "consumes": ["application/json", "application/xml"],
                    "parameters": [{
                        "name": "item", "in": "body", "required": true,
                        "schema": {"type": "object"}
                    }],
                    "responses": {"204": {"description": "done"}}
                }}}
            }));

            let body = &out["paths"]["/items"]["put"]["requestBody"];
            assert_eq!(body["required"], true);
            assert_eq!(body["x-originalParamName"], "item");
            assert_eq!(body["content"]["application/json"]["schema"], json!({"type": "object"}));
            assert_eq!(body["content"]["application/xml"]["schema"], json!({"type": "object"}));
        }

        #[test]
        fn test_form_data_becomes_object_schema() {
            let out = upgrade(json!({
                "swagger": "2.0",
                "paths": {"/upload": {"post": {
                    "consumes": ["multipart/form-data"],
                    "parameters": [
                        {"name": "file", "in": "formData", "type": "file", "required": true},
                        {"name": "note", "in": "formData", "type": "string", "description": "free text"}
                    ],
                    "responses": {"200": {"description": "ok"}}
                }}}
            }));

            let schema = &out["paths"]["/upload"]["post"]["requestBody"]["content"]
                ["multipart/form-data"]["schema"];
            assert_eq!(schema["type"], "object");
            assert_eq!(schema["required"], json!(["file"]));
            assert_eq!(
                schema["properties"]["file"],
                json!({"type": "string", "format": "binary"})
            );
            assert_eq!(
                schema["properties"]["note"],
                json!({"type": "string", "description": "free text"})
            );
        }

        #[test]
        fn test_security_definitions() {
            let out = upgrade(json!({
                "swagger": "2.0",
                "paths": {},
                "securityDefinitions": {
                    "basicAuth": {"type": "basic"},
                    "key": {"type": "apiKey", "name": "X-Key", "in": "header"},
                    "oauth": {
                        "type": "oauth2",
                        "flow": "accessCode",
                        "authorizationUrl": "https://auth.example.com/authorize",
                        "tokenUrl": "https://auth.example.com/token",
                        "scopes": {"read": "Read access"}
                    }
                }
            }));

            let schemes = &out["components"]["securitySchemes"];
            assert_eq!(schemes["basicAuth"], json!({"type": "http", "scheme": "basic"}));
            assert_eq!(schemes["key"], json!({"type": "apiKey", "name": "X-Key", "in": "header"}));
            assert_eq!(
                schemes["oauth"]["flows"]["authorizationCode"]["tokenUrl"],
                "https://auth.example.com/token"
            );
        }

        #[test]
        fn test_collection_format() {
            let out = upgrade(json!({
                "swagger": "2.0",
                "paths": {"/search": {"get": {
                    "parameters": [{
                        "name": "ids", "in": "query", "type": "array",
                        "items": {"type": "integer"}, "collectionFormat": "multi"
                    }],
                    "responses": {"200": {"description": "ok"}}
                }}}
            }));

            let param = &out["paths"]["/search"]["get"]["parameters"][0];
            assert_eq!(param["style"], "form");
            assert_eq!(param["explode"], true);
            assert_eq!(param["schema"], json!({"type": "array", "items": {"type": "integer"}}));
        }
    }

    mod downgrade_tests {
        use super::*;

        #[test]
        fn test_body_parameter_and_refs() {
            let out = downgrade(json!({
                "openapi": "3.0.3",
                "paths": {"/pets": {"post": {
                    "requestBody": {
                        "required": true,
                        "x-originalParamName": "pet",
                        "content": {
                            "application/xml": {"schema": {"type": "string"}},
                            "application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}
                        }
                    },
                    "responses": {"200": {
                        "description": "ok",
                        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                    }}
                }}},
                "components": {"schemas": {"Pet": {"type": "object", "nullable": true}}}
            }));

            assert_eq!(out["swagger"], "2.0");
            assert_eq!(out["definitions"]["Pet"], json!({"type": "object", "x-nullable": true}));

            let post = &out["paths"]["/pets"]["post"];
            assert_eq!(
                post["parameters"][0],
                json!({
                    "name": "pet",
                    "in": "body",
                    "required": true,
                    "schema": {"$ref": "#/definitions/Pet"}
                })
            );
            assert_eq!(post["consumes"], json!(["application/json", "application/xml"]));
            assert_eq!(post["produces"], json!(["application/json"]));
            assert_eq!(post["responses"]["200"]["schema"]["$ref"], "#/definitions/Pet");
        }

        #[test]
        fn test_binary_body_has_no_schema() {
            let out = downgrade(json!({
                "openapi": "3.0.3",
                "paths": {"/blob": {"put": {
                    "requestBody": {"content": {
                        "application/octet-stream": {"schema": {"type": "string", "format": "binary"}}
                    }},
                    "responses": {"204": {"description": "stored"}}
                }}}
            }));

            let param = &out["paths"]["/blob"]["put"]["parameters"][0];
            assert_eq!(param, &json!({"name": "body", "in": "body"}));
        }

        #[test]
        fn test_form_content_becomes_form_data() {
            let out = downgrade(json!({
                "openapi": "3.0.3",
                "paths": {"/upload": {"post": {
                    "requestBody": {"content": {"multipart/form-data": {"schema": {
                        "type": "object",
                        "required": ["file"],
                        "properties": {
                            "file": {"type": "string", "format": "binary"},
                            "count": {"type": "integer", "minimum": 1}
                        }
                    }}}},
                    "responses": {"200": {"description": "ok"}}
                }}}
            }));

            let params = out["paths"]["/upload"]["post"]["parameters"].as_array().unwrap().clone();
            assert_eq!(
                params,
                vec![
                    json!({"name": "count", "in": "formData", "type": "integer", "minimum": 1}),
                    json!({"name": "file", "in": "formData", "required": true, "type": "file"}),
                ]
            );
        }

        #[test]
        fn test_security_schemes() {
            let out = downgrade(json!({
                "openapi": "3.0.3",
                "paths": {},
                "components": {"securitySchemes": {
                    "basic": {"type": "http", "scheme": "basic"},
                    "bearer": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"},
                    "oidc": {"type": "openIdConnect", "openIdConnectUrl": "https://id.example.com"},
                    "cc": {"type": "oauth2", "flows": {"clientCredentials": {
                        "tokenUrl": "https://auth.example.com/token", "scopes": {}
                    }}}
                }}
            }));

            let defs = &out["securityDefinitions"];
            assert_eq!(defs["basic"], json!({"type": "basic"}));
            assert_eq!(defs["bearer"], json!({"type": "apiKey", "name": "Authorization", "in": "header"}));
            assert!(defs.get("oidc").is_none());
            assert_eq!(defs["cc"]["flow"], "application");
            assert_eq!(defs["cc"]["tokenUrl"], "https://auth.example.com/token");
        }

        #[test]
        fn test_trace_operation_dropped() {
            let out = downgrade(json!({
                "openapi": "3.0.3",
                "paths": {"/debug": {
                    "trace": {"responses": {"200": {"description": "ok"}}},
                    "get": {"responses": {"200": {"description": "ok"}}}
                }}
            }));

            let item = &out["paths"]["/debug"];
            assert!(item.get("trace").is_none());
            assert!(item.get("get").is_some());
        }
    }
}
