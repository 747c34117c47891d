//! Recursive Sanitizer
//!
//! Strips empty attributes from a write payload before validation. A key the
//! caller did not meaningfully fill in ends up entirely absent from the
//! output, rather than present with an empty value. Absent fields mean
//! "leave unchanged" on update, so this distinction carries real semantics
//! downstream.

use serde_json::{Map, Value};

use crate::sanitize::is_empty;

// == Strip ==
/// Builds a new object containing only the meaningfully-provided keys of
/// `input`. Pure and non-mutating.
///
/// Object values are sanitized recursively; if the recursive result has zero
/// remaining keys the key is dropped too, so emptiness propagates upward
/// (`{"a": {"b": ""}}` strips to `{}`). Array values are kept verbatim once
/// non-empty and never recursed into.
pub fn strip(input: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();

    for (key, value) in input {
        if is_empty(value) {
            continue;
        }
        match value {
            Value::Object(inner) => {
                let cleaned = strip(inner);
                if !cleaned.is_empty() {
                    out.insert(key.clone(), Value::Object(cleaned));
                }
            }
            other => {
                out.insert(key.clone(), other.clone());
            }
        }
    }

    out
}

// == Strip Value ==
/// Convenience wrapper for a top-level `Value`.
///
/// Objects are stripped; any other value is returned unchanged.
pub fn strip_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip(&map)),
        other => other,
    }
}
