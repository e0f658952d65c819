//! Form data records keyed by indexed data-model paths.

use std::collections::BTreeMap;

use serde_json::Value;

/// A submitted record: indexed dotted paths (`Group[1].Field`) mapped to values.
pub type FormData = BTreeMap<String, Value>;

/// Flattens a JSON object into [`FormData`].
///
/// Nested objects become dotted keys and arrays of objects become `[index]` segments.
/// Arrays of scalars are kept whole under their key, and nulls are dropped. Keys that
/// are already flat (`"Group[0].Field"`) pass through unchanged.
pub fn flatten_object(value: &Value) -> FormData {
    let mut out = FormData::new();
    if let Value::Object(object) = value {
        for (key, child) in object {
            flatten_into(key, child, &mut out);
        }
    }
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut FormData) {
    match value {
        Value::Null => {}
        Value::Object(object) => {
            for (key, child) in object {
                flatten_into(&format!("{prefix}.{key}"), child, out);
            }
        }
        Value::Array(items) if items.iter().any(Value::is_object) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(&format!("{prefix}[{index}]"), item, out);
            }
        }
        scalar => {
            out.insert(prefix.to_string(), scalar.clone());
        }
    }
}

/// Renders a record value the way expressions and summaries compare it.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
