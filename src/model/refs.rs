//! `$ref` target rewriting

use serde_json::Value as JsonValue;

/// Rewrite every `$ref` string in a value tree
///
/// `rewrite` returns the new target, or `None` to keep the current one.
pub fn rewrite_refs<F>(value: &mut JsonValue, rewrite: &F)
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "$ref" {
                    if let JsonValue::String(target) = child {
                        if let Some(new_target) = rewrite(target.as_str()) {
                            *target = new_target;
                        }
                    }
                } else {
                    rewrite_refs(child, rewrite);
                }
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                rewrite_refs(item, rewrite);
            }
        }
        _ => {}
    }
}

/// Replace a prefix of a reference target
pub fn replace_prefix(target: &str, from: &str, to: &str) -> Option<String> {
    target
        .strip_prefix(from)
        .map(|rest| format!("{}{}", to, rest))
}
