//! # Canonical Serialization
//!
//! Two text forms of a canonical JSON value live here:
//!
//! - [`CanonicalBytes`]: RFC 8785 (JCS) bytes: sorted keys, compact
//!   separators, deterministic number formatting. This is the only input
//!   accepted by [`crate::digest`], so structurally equal schemas always
//!   hash the same.
//! - [`to_json_string`]: the human-facing export form used by
//!   `to_json`: configurable indentation and optional key sorting.
//!
//! Unlike a content-addressing pipeline, floats are *not* rejected here:
//! schema fragments legitimately carry `minimum: 0.5` and the like.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - Object keys are sorted, separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Canonicalization`] if the value cannot be
    /// represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CoreError> {
        let s = serde_jcs::to_string(obj)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serialize a canonical value as JSON text.
///
/// `indent` of `None` produces compact output; `Some(n)` pretty-prints with
/// `n` spaces per level. With `sort_keys` every object in the tree is
/// emitted in lexicographic key order, otherwise insertion order is kept.
pub fn to_json_string(value: &Value, indent: Option<usize>, sort_keys: bool) -> Result<String, CoreError> {
    let sorted;
    let value = if sort_keys {
        sorted = sort_keys_recursive(value);
        &sorted
    } else {
        value
    };

    match indent {
        None => Ok(serde_json::to_string(value)?),
        Some(width) => {
            let indent_bytes = vec![b' '; width];
            let formatter = PrettyFormatter::with_indent(&indent_bytes);
            let mut out = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            value.serialize(&mut ser)?;
            // serde_json only ever writes valid UTF-8.
            Ok(String::from_utf8_lossy(&out).into_owned())
        }
    }
}

fn sort_keys_recursive(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_keys_recursive(v));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys_recursive).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_bytes_sorted_keys() {
        let data = json!({"z": 1, "m": 2, "a": 3});
        let cb = CanonicalBytes::new(&data).expect("should canonicalize");
        assert_eq!(cb.as_bytes(), br#"{"a":3,"m":2,"z":1}"#);
    }

    #[test]
    fn test_canonical_bytes_accepts_floats() {
        let data = json!({"minimum": 0.5});
        let cb = CanonicalBytes::new(&data).expect("floats are allowed in schemas");
        assert_eq!(cb.as_bytes(), br#"{"minimum":0.5}"#);
    }

    #[test]
    fn test_canonical_bytes_nested() {
        let data = json!({"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
        assert!(!cb.is_empty());
    }

    #[test]
    fn test_to_json_string_compact_preserves_order() {
        let data = json!({"b": 1, "a": 2});
        assert_eq!(to_json_string(&data, None, false).unwrap(), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_to_json_string_sorted_and_indented() {
        let data = json!({"b": 1, "a": {"d": 1, "c": 2}});
        let text = to_json_string(&data, Some(2), true).unwrap();
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"c\": 2,\n    \"d\": 1\n  },\n  \"b\": 1\n}"
        );
    }

    #[test]
    fn test_to_json_string_custom_indent() {
        let data = json!([1]);
        assert_eq!(to_json_string(&data, Some(4), true).unwrap(), "[\n    1\n]");
    }
}
