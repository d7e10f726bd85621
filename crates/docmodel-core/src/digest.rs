//! # Structural Schema Digest
//!
//! Defines [`SchemaDigest`], the key of the polymorphic type registry.
//!
//! A schema's digest is SHA-256 over the JCS bytes of the schema with the
//! keys in [`HASH_EXCLUDED_KEYS`] stripped from its top level. Only the top
//! level is stripped: a nested `description` is part of the structure it
//! describes, but a root document's `definitions` block or its `$schema`
//! declaration says nothing about the shape of the value being matched.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// Top-level keys ignored when computing a [`SchemaDigest`].
pub const HASH_EXCLUDED_KEYS: &[&str] = &[
    "definitions",
    "$defs",
    "title",
    "description",
    "$schema",
    "id",
    "$id",
];

/// A SHA-256 digest of a structurally-normalized schema fragment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaDigest([u8; 32]);

impl SchemaDigest {
    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for SchemaDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

impl fmt::Debug for SchemaDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaDigest({})", &self.to_hex()[..16])
    }
}

/// Compute the structural digest of a schema fragment.
///
/// Non-object schemas (`true`, `false`) are hashed as-is.
pub fn schema_digest(schema: &Value) -> Result<SchemaDigest, CoreError> {
    let stripped;
    let normalized = match schema {
        Value::Object(map) => {
            stripped = Value::Object(
                map.iter()
                    .filter(|(k, _)| !HASH_EXCLUDED_KEYS.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
            &stripped
        }
        other => other,
    };
    let cb = CanonicalBytes::new(normalized)?;
    let hash = Sha256::digest(cb.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    Ok(SchemaDigest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_digest_ignores_key_order() {
        let a = json!({"type": "object", "properties": {"x": {}, "y": {}}});
        let b = json!({"properties": {"y": {}, "x": {}}, "type": "object"});
        assert_eq!(schema_digest(&a).unwrap(), schema_digest(&b).unwrap());
    }

    #[test]
    fn test_digest_ignores_volatile_top_level_keys() {
        let plain = json!({"type": "string"});
        let annotated = json!({
            "type": "string",
            "title": "Name",
            "description": "A name",
            "$schema": "http://json-schema.org/draft-07/schema#",
            "definitions": {"Other": {"type": "number"}},
            "id": "urn:name"
        });
        assert_eq!(schema_digest(&plain).unwrap(), schema_digest(&annotated).unwrap());
    }

    #[test]
    fn test_digest_keeps_nested_descriptions() {
        let a = json!({"properties": {"x": {"description": "one"}}});
        let b = json!({"properties": {"x": {"description": "two"}}});
        assert_ne!(schema_digest(&a).unwrap(), schema_digest(&b).unwrap());
    }

    #[test]
    fn test_digest_distinguishes_refs() {
        let a = json!({"$ref": "#/definitions/A"});
        let b = json!({"$ref": "#/definitions/B"});
        assert_ne!(schema_digest(&a).unwrap(), schema_digest(&b).unwrap());
    }

    #[test]
    fn test_known_vector_for_empty_schema() {
        // SHA256("{}")
        let digest = schema_digest(&json!({"title": "ignored"})).unwrap();
        assert_eq!(
            digest.to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        assert!(digest.to_string().starts_with("sha256:"));
    }

    #[test]
    fn test_boolean_schema_digest() {
        assert_ne!(
            schema_digest(&json!(true)).unwrap(),
            schema_digest(&json!(false)).unwrap()
        );
    }
}
