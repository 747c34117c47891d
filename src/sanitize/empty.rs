//! Emptiness Classifier
//!
//! Decides whether a JSON value counts as "not provided".

use serde_json::Value;

// == Is Empty ==
/// Returns true if `value` counts as "not provided".
///
/// Rules, in order, first match wins:
/// - `null` is empty
/// - a string whose trimmed form is empty is empty (whitespace-only counts,
///   a lone `"."` does not)
/// - an array with zero elements is empty; non-empty arrays never are,
///   regardless of element content
/// - an object with zero keys is empty; objects with at least one key are
///   not, even if every value is empty (child emptiness is resolved by the
///   sanitizer, not here)
/// - everything else (numbers including `0`, booleans including `false`) is
///   not empty
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
