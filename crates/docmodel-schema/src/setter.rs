//! Fluent per-property setters derived from a type's declared properties.

use serde_json::Value;

use crate::error::SchemaError;
use crate::object::{SchemaObject, SchemaType};
use crate::resolve::resolve;
use crate::value::FieldValue;

/// Sets one named property on a copy of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySetter {
    name: String,
    description: Option<String>,
}

impl PropertySetter {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property's schema description, `__` rendered as `**`.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A copy of `obj` with this property set to `value`.
    pub fn call(&self, obj: &SchemaObject, value: impl Into<FieldValue>) -> Result<SchemaObject, SchemaError> {
        obj.with_property(&self.name, value)
    }
}

/// One setter per property declared by the type's resolved schema, in
/// schema order.
pub fn property_setters(ty: &SchemaType) -> Result<Vec<PropertySetter>, SchemaError> {
    let schema = ty.resolve_references(None)?;
    let root = ty.root_schema()?;
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };
    Ok(properties
        .iter()
        .map(|(name, prop)| PropertySetter {
            name: name.clone(),
            description: describe(prop, root),
        })
        .collect())
}

fn describe(prop: &Value, root: &Value) -> Option<String> {
    let own = prop.get("description").and_then(Value::as_str);
    let text = match own {
        Some(text) => text,
        None => resolve(prop, root).ok()?.get("description")?.as_str()?,
    };
    Some(text.replace("__", "**"))
}
