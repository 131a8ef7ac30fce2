//! Schema tree traversal
//!
//! Children are always visited before the fragment that owns them, so a rule
//! that rewrites a fragment's `type` or replaces its `oneOf` never sees its
//! own output. Boolean schemas have nothing to rewrite and are skipped.

use crate::model::{OpenApiDocument, Schema};

/// Apply `rule` to a fragment and all of its descendants, children first
///
/// Order: `properties` (by name), `items`, `allOf`, `oneOf`, `anyOf`, then
/// the fragment itself.
pub fn visit_schema<F>(schema: Option<&mut Schema>, rule: &mut F)
where
    F: FnMut(&mut Schema),
{
    let Some(schema) = schema.filter(|s| !s.is_literal()) else {
        return;
    };

    for property in schema.properties.values_mut() {
        visit_schema(Some(property), rule);
    }
    visit_schema(schema.items.as_deref_mut(), rule);
    for member in schema.all_of.iter_mut() {
        visit_schema(Some(member), rule);
    }
    for member in schema.one_of.iter_mut() {
        visit_schema(Some(member), rule);
    }
    for member in schema.any_of.iter_mut() {
        visit_schema(Some(member), rule);
    }

    rule(schema);
}

/// Apply `rule` to every schema fragment a migration step rewrites
///
/// Roots: `components.schemas`, the schemas of `components.parameters`,
/// request-body media types and response media types of every operation.
pub fn visit_document_schemas<F>(doc: &mut OpenApiDocument, rule: &mut F)
where
    F: FnMut(&mut Schema),
{
    if let Some(components) = doc.components.as_mut() {
        for schema in components.schemas.values_mut() {
            visit_schema(Some(schema), rule);
        }
        for param in components.parameters.values_mut() {
            visit_schema(param.schema.as_mut(), rule);
        }
    }

    for operation in doc.operations_mut() {
        if let Some(body) = operation.request_body.as_mut() {
            for media in body.content.values_mut() {
                visit_schema(media.schema.as_mut(), rule);
            }
        }
        for response in operation.responses.values_mut() {
            for media in response.content.values_mut() {
                visit_schema(media.schema.as_mut(), rule);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Components, MediaType, Operation, Parameter, PathItem, RequestBody, Response};

    fn tag(name: &str) -> Schema {
        Schema::new().with_annotation("title", serde_json::json!(name))
    }

    fn collect_order(schema: &mut Schema) -> Vec<String> {
        let mut seen = Vec::new();
        visit_schema(Some(schema), &mut |s: &mut Schema| {
            seen.push(s.annotation_str("title").unwrap_or("?").to_string());
        });
        seen
    }

    #[test]
    fn test_children_before_self() {
        let mut root = tag("root")
            .with_property("b", tag("prop-b"))
            .with_property("a", tag("prop-a").with_items(tag("nested-item")))
            .with_items(tag("items"));
        root.all_of.push(tag("all"));
        root.one_of.push(tag("one"));
        root.any_of.push(tag("any"));

        assert_eq!(
            collect_order(&mut root),
            vec!["nested-item", "prop-a", "prop-b", "items", "all", "one", "any", "root"]
        );
    }

    #[test]
    fn test_none_is_noop() {
        let mut calls = 0;
        visit_schema(None, &mut |_: &mut Schema| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_boolean_schemas_skipped() {
        let mut root = tag("root")
            .with_property("open", Schema::literal(true))
            .with_items(Schema::literal(false));
        assert_eq!(collect_order(&mut root), vec!["root"]);

        let mut calls = 0;
        visit_schema(Some(&mut Schema::literal(true)), &mut |_: &mut Schema| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_document_roots() {
        let mut doc = OpenApiDocument::new("3.0.3");
        let components = Components {
            schemas: [("Pet".to_string(), tag("component"))].into(),
            parameters: [(
                "limit".to_string(),
                Parameter {
                    name: "limit".to_string(),
                    location: "query".to_string(),
                    schema: Some(tag("parameter")),
                    ..Default::default()
                },
            )]
            .into(),
            ..Default::default()
        };
        doc.components = Some(components);

        let mut op = Operation::default();
        op.request_body = Some(RequestBody {
            content: [("application/json".to_string(), MediaType::with_schema(tag("body")))].into(),
            ..Default::default()
        });
        op.responses.insert(
            "200".to_string(),
            Response {
                description: "ok".to_string(),
                content: [("application/json".to_string(), MediaType::with_schema(tag("response")))]
                    .into(),
                ..Default::default()
            },
        );
        // operation-level parameters are not a root
        op.parameters.push(Parameter {
            name: "q".to_string(),
            location: "query".to_string(),
            schema: Some(tag("skipped")),
            ..Default::default()
        });
        doc.paths.insert(
            "/pets".to_string(),
            PathItem {
                post: Some(op),
                ..Default::default()
            },
        );

        let mut seen = Vec::new();
        visit_document_schemas(&mut doc, &mut |s: &mut Schema| {
            seen.push(s.annotation_str("title").unwrap_or("?").to_string());
        });

        assert_eq!(seen, vec!["component", "parameter", "body", "response"]);
    }
}
