//! # Schema Resolution
//!
//! Follows `$ref` links inside a schema fragment against the root schema
//! that owns all definitions. A fragment is meaningless without its root:
//! `{"$ref": "#/definitions/Color"}` only has a shape once the root's
//! `definitions` block is in hand.
//!
//! Only document-local references (`#` and `#/json/pointer`) are resolved.
//! Anything else is reported as [`SchemaError::UnresolvableReference`]; this
//! crate never fetches remote schemas.
//!
//! A chain that revisits a reference, or grows past the configured depth,
//! fails with [`SchemaError::SchemaCycle`] instead of looping.

use std::sync::OnceLock;

use docmodel_core::max_ref_depth;
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// The schema that accepts anything.
pub fn empty_schema() -> &'static Value {
    static EMPTY: OnceLock<Value> = OnceLock::new();
    EMPTY.get_or_init(|| Value::Object(Map::new()))
}

/// Resolve `schema` until it has no top-level `$ref`.
///
/// Uses the chain limit installed by [`Settings::apply`](docmodel_core::Settings::apply).
pub fn resolve<'a>(schema: &'a Value, root: &'a Value) -> Result<&'a Value, SchemaError> {
    resolve_with_limit(schema, root, max_ref_depth())
}

/// Resolve `schema` with an explicit limit on the length of the `$ref` chain.
pub fn resolve_with_limit<'a>(
    schema: &'a Value,
    root: &'a Value,
    max_depth: usize,
) -> Result<&'a Value, SchemaError> {
    let mut current = schema;
    let mut chain: Vec<String> = Vec::new();

    while let Some(reference) = ref_of(current) {
        if chain.iter().any(|seen| seen == reference) || chain.len() >= max_depth {
            return Err(SchemaError::SchemaCycle {
                reference: reference.to_string(),
                chain,
            });
        }
        chain.push(reference.to_string());
        current = lookup_ref(reference, root)?;
    }

    if !chain.is_empty() {
        tracing::trace!(chain = ?chain, "resolved reference chain");
    }
    Ok(current)
}

/// Resolve the schema of one named property of `schema`.
///
/// Returns the empty schema when the property is not declared.
pub fn resolve_property<'a>(
    schema: &'a Value,
    root: &'a Value,
    name: &str,
) -> Result<&'a Value, SchemaError> {
    let resolved = resolve(schema, root)?;
    match resolved.get("properties").and_then(|props| props.get(name)) {
        Some(prop) => resolve(prop, root),
        None => Ok(empty_schema()),
    }
}

/// The `$ref` string of a schema node, if it has one.
pub(crate) fn ref_of(schema: &Value) -> Option<&str> {
    schema.get("$ref").and_then(Value::as_str)
}

/// Look up one document-local reference in `root`.
pub(crate) fn lookup_ref<'a>(reference: &str, root: &'a Value) -> Result<&'a Value, SchemaError> {
    let unresolvable = || SchemaError::UnresolvableReference {
        reference: reference.to_string(),
    };
    let pointer = reference.strip_prefix('#').ok_or_else(unresolvable)?;
    if pointer.is_empty() {
        return Ok(root);
    }
    root.pointer(pointer).ok_or_else(unresolvable)
}

/// Walk a keyword location such as `/properties/x/$ref/anyOf` from `schema`.
///
/// `$ref` hops are followed against `root`, whether or not the location
/// spells them out as a segment.
pub(crate) fn schema_at<'a>(schema: &'a Value, root: &'a Value, location: &str) -> Option<&'a Value> {
    let mut node = schema;
    for raw in location.split('/').filter(|s| !s.is_empty()) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        node = step(node, root, &segment)?;
    }
    Some(node)
}

fn step<'a>(node: &'a Value, root: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => {
            if segment == "$ref" {
                if let Some(reference) = ref_of(node) {
                    return lookup_ref(reference, root).ok();
                }
            }
            match map.get(segment) {
                Some(child) => Some(child),
                None => {
                    ref_of(node)?;
                    resolve(node, root).ok()?.get(segment)
                }
            }
        }
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
