//! # Document Objects
//!
//! [`SchemaType`] is a named wrapper type bound to a schema fragment and the
//! root schema that fragment resolves against. [`SchemaObject`] is an
//! instance of such a type, holding either:
//!
//! - a single **positional** value (`Color("red")`), or
//! - a set of **named fields** (`Mark({ color: "red", size: 3 })`),
//!
//! never both.
//!
//! ## Construction-time validation
//!
//! While debug mode is on (see [`docmodel_core::debug`]) and the type has not
//! opted out, construction converts the new object to canonical form and
//! validates it, so a bad value is reported where it was introduced.
//!
//! ## Ownership
//!
//! Objects are plain values. Nested objects are owned by their parent;
//! [`SchemaObject::copy`] and `Clone` both produce independent trees.

use std::fmt;
use std::sync::Arc;

use docmodel_core::{debug_mode, to_json_string, Settings};
use serde_json::Value;

use crate::canonical::{canonical_map, to_canonical, to_canonical_with, Context};
use crate::consolidate::{property_names, validate_and_consolidate, RootDefinitions, SchemaValidationError};
use crate::error::SchemaError;
use crate::registry::TypeRegistry;
use crate::resolve::{resolve, resolve_property};
use crate::value::{FieldMap, FieldValue};

static UNDEFINED: FieldValue = FieldValue::Undefined;

/// A named wrapper type bound to a schema.
#[derive(Debug, Clone)]
pub struct SchemaType {
    name: String,
    schema: Option<Value>,
    /// `None` when the schema is its own root.
    root: Option<Arc<Value>>,
    valid_at_instantiation: bool,
}

impl SchemaType {
    /// A type whose schema is also the root schema.
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            root: None,
            valid_at_instantiation: true,
        }
    }

    /// A type bound to a fragment of `root`, typically `{"$ref": "#/definitions/Name"}`.
    pub fn with_root(name: impl Into<String>, schema: Value, root: Arc<Value>) -> Self {
        Self {
            name: name.into(),
            schema: Some(schema),
            root: Some(root),
            valid_at_instantiation: true,
        }
    }

    /// A type with no schema. Instantiating it fails with
    /// [`SchemaError::MissingSchema`].
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            root: None,
            valid_at_instantiation: true,
        }
    }

    /// Opt in or out of construction-time validation.
    pub fn with_instantiation_check(mut self, enabled: bool) -> Self {
        self.valid_at_instantiation = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_valid_at_instantiation(&self) -> bool {
        self.valid_at_instantiation
    }

    /// The bound schema fragment.
    pub fn schema(&self) -> Result<&Value, SchemaError> {
        self.schema.as_ref().ok_or_else(|| SchemaError::MissingSchema {
            type_name: self.name.clone(),
        })
    }

    /// The root schema the bound fragment resolves against.
    pub fn root_schema(&self) -> Result<&Value, SchemaError> {
        match &self.root {
            Some(root) => Ok(root),
            None => self.schema(),
        }
    }

    fn root_or<'a>(&'a self, schema: &'a Value) -> &'a Value {
        match (&self.root, &self.schema) {
            (Some(root), _) => root,
            (None, Some(own)) => own,
            (None, None) => schema,
        }
    }

    /// `schema` (or the bound schema) with its top-level `$ref` chain followed.
    pub fn resolve_references<'a>(&'a self, schema: Option<&'a Value>) -> Result<&'a Value, SchemaError> {
        let schema = match schema {
            Some(schema) => schema,
            None => self.schema()?,
        };
        resolve(schema, self.root_or(schema))
    }

    /// Declared property names of the resolved schema, in schema order.
    pub fn field_names(&self) -> Vec<String> {
        self.resolve_references(None)
            .map(property_names)
            .unwrap_or_default()
    }

    /// Validate a canonical instance against the bound schema or `schema`.
    pub fn validate(&self, instance: &Value, schema: Option<&Value>) -> Result<(), SchemaError> {
        self.validate_with(instance, schema, &Settings::default())
    }

    /// [`validate`](Self::validate) with explicit rendering settings.
    pub fn validate_with(
        &self,
        instance: &Value,
        schema: Option<&Value>,
        settings: &Settings,
    ) -> Result<(), SchemaError> {
        let schema = match schema {
            Some(schema) => schema,
            None => self.schema()?,
        };
        let root = self.root_or(schema);
        let groups = validate_and_consolidate(instance, schema, root)?;
        if groups.is_empty() {
            return Ok(());
        }
        tracing::debug!(type_name = %self.name, groups = groups.len(), "validation failed");
        let fields = self.field_names();
        Err(SchemaValidationError::new(groups, &RootDefinitions(root), &self.name, &fields, settings).into())
    }

    /// Validate one value against the schema of property `name`.
    ///
    /// An undeclared property accepts anything.
    pub fn validate_property(&self, name: &str, value: &FieldValue) -> Result<(), SchemaError> {
        let schema = self.schema()?;
        let root = self.root_or(schema);
        let property = resolve_property(schema, root, name)?;
        let instance = to_canonical(value);
        let groups = validate_and_consolidate(&instance, property, root)?;
        if groups.is_empty() {
            return Ok(());
        }
        let fields = property_names(property);
        Err(SchemaValidationError::new(groups, &RootDefinitions(root), &self.name, &fields, &Settings::default()).into())
    }

    /// Rebuild a typed object from its canonical form.
    ///
    /// With `validate`, the input is checked against this type first; nested
    /// sub-documents are matched against `registry`.
    pub fn from_dict(
        self: &Arc<Self>,
        registry: &TypeRegistry,
        value: &Value,
        validate: bool,
    ) -> Result<SchemaObject, SchemaError> {
        self.from_dict_with(registry, value, validate, &Settings::default())
    }

    /// [`from_dict`](Self::from_dict) with explicit rendering settings.
    pub fn from_dict_with(
        self: &Arc<Self>,
        registry: &TypeRegistry,
        value: &Value,
        validate: bool,
        settings: &Settings,
    ) -> Result<SchemaObject, SchemaError> {
        if validate {
            self.validate_with(value, None, settings)?;
        }
        match registry.from_dict_typed(FieldValue::from(value), self)? {
            FieldValue::Object(obj) => Ok(obj),
            other => SchemaObject::positional(self, other),
        }
    }

    /// Parse JSON text and rebuild a typed object from it.
    pub fn from_json(
        self: &Arc<Self>,
        registry: &TypeRegistry,
        text: &str,
        validate: bool,
    ) -> Result<SchemaObject, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        self.from_dict(registry, &value, validate)
    }
}

impl PartialEq for SchemaType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.schema == other.schema
    }
}

#[derive(Debug, Clone)]
enum ObjectData {
    Positional(Box<FieldValue>),
    Fields(FieldMap),
}

impl PartialEq for ObjectData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ObjectData::Positional(a), ObjectData::Positional(b)) => a == b,
            (ObjectData::Fields(a), ObjectData::Fields(b)) => {
                let defined = |m: &FieldMap| m.values().filter(|v| !v.is_undefined()).count();
                defined(a) == defined(b)
                    && a.iter()
                        .filter(|(_, v)| !v.is_undefined())
                        .all(|(k, v)| b.get(k) == Some(v))
            }
            _ => false,
        }
    }
}

/// Options for [`SchemaObject::to_dict_with`].
#[derive(Debug, Clone)]
pub struct ToDictOptions {
    /// Validate the result against the object's schema.
    pub validate: bool,
    /// Top-level field names to leave out. Not applied to nested objects.
    pub ignore: Vec<String>,
    /// Passed unchanged to every nested conversion.
    pub context: Context,
    /// Rendering settings for a validation failure.
    pub settings: Settings,
}

impl Default for ToDictOptions {
    fn default() -> Self {
        Self {
            validate: true,
            ignore: Vec::new(),
            context: Context::new(),
            settings: Settings::default(),
        }
    }
}

/// An instance of a [`SchemaType`].
#[derive(Debug, Clone)]
pub struct SchemaObject {
    ty: Arc<SchemaType>,
    data: ObjectData,
}

impl SchemaObject {
    /// Construct from positional `args` or named `kwds`.
    ///
    /// Accepts zero or one positional value with no named fields, or any
    /// number of named fields with no positional value.
    pub fn new(ty: &Arc<SchemaType>, args: Vec<FieldValue>, kwds: FieldMap) -> Result<Self, SchemaError> {
        ty.schema()?;
        if !args.is_empty() && !kwds.is_empty() {
            return Err(SchemaError::structural(
                ty.name(),
                "cannot combine a positional value with named fields",
            ));
        }
        if args.len() > 1 {
            return Err(SchemaError::structural(
                ty.name(),
                format!("expected at most one positional value, got {}", args.len()),
            ));
        }
        let data = match args.into_iter().next() {
            Some(value) => ObjectData::Positional(Box::new(value)),
            None => ObjectData::Fields(kwds),
        };
        let obj = Self { ty: Arc::clone(ty), data };
        if debug_mode() && ty.valid_at_instantiation {
            obj.to_dict(true)?;
        }
        Ok(obj)
    }

    /// Construct the positional form.
    pub fn positional(ty: &Arc<SchemaType>, value: impl Into<FieldValue>) -> Result<Self, SchemaError> {
        Self::new(ty, vec![value.into()], FieldMap::new())
    }

    /// Construct the named-field form.
    pub fn with_fields<K, V>(ty: &Arc<SchemaType>, fields: impl IntoIterator<Item = (K, V)>) -> Result<Self, SchemaError>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let kwds = fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self::new(ty, Vec::new(), kwds)
    }

    pub fn schema_type(&self) -> &Arc<SchemaType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// The positional value, if constructed positionally.
    pub fn positional_value(&self) -> Option<&FieldValue> {
        match &self.data {
            ObjectData::Positional(value) => Some(value.as_ref()),
            ObjectData::Fields(_) => None,
        }
    }

    /// The named fields, if constructed with them.
    pub fn fields(&self) -> Option<&FieldMap> {
        match &self.data {
            ObjectData::Fields(fields) => Some(fields),
            ObjectData::Positional(_) => None,
        }
    }

    fn fields_mut(&mut self, operation: &str) -> Result<&mut FieldMap, SchemaError> {
        match &mut self.data {
            ObjectData::Fields(fields) => Ok(fields),
            ObjectData::Positional(_) => Err(SchemaError::structural(
                self.ty.name(),
                format!("cannot {operation} a named field on a positional instance"),
            )),
        }
    }

    /// Read a field. Unset fields read as [`FieldValue::Undefined`].
    pub fn get_field(&self, name: &str) -> Result<&FieldValue, SchemaError> {
        match &self.data {
            ObjectData::Fields(fields) => Ok(fields.get(name).unwrap_or(&UNDEFINED)),
            ObjectData::Positional(_) => Err(SchemaError::structural(
                self.ty.name(),
                "cannot read a named field on a positional instance",
            )),
        }
    }

    /// Read a field, substituting `default` when it is unset.
    pub fn get_or(&self, name: &str, default: impl Into<FieldValue>) -> Result<FieldValue, SchemaError> {
        let value = self.get_field(name)?;
        if value.is_undefined() {
            Ok(default.into())
        } else {
            Ok(value.clone())
        }
    }

    /// Write a field. The new value is not validated.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), SchemaError> {
        self.fields_mut("write")?.insert(name.to_string(), value.into());
        Ok(())
    }

    /// A copy of this object with one field replaced.
    pub fn with_property(&self, name: &str, value: impl Into<FieldValue>) -> Result<Self, SchemaError> {
        let mut copy = self.copy(true, &[]);
        copy.set_field(name, value)?;
        Ok(copy)
    }

    /// Canonical form, validated against the object's schema.
    pub fn to_dict(&self, validate: bool) -> Result<Value, SchemaError> {
        self.to_dict_with(&ToDictOptions {
            validate,
            ..ToDictOptions::default()
        })
    }

    /// Canonical form with explicit options.
    ///
    /// Nested objects are never validated individually; only the result as a
    /// whole is checked, so each problem is reported once.
    pub fn to_dict_with(&self, options: &ToDictOptions) -> Result<Value, SchemaError> {
        let result = self.canonicalize(&options.ignore, &options.context);
        if options.validate {
            self.ty.validate_with(&result, None, &options.settings)?;
        }
        Ok(result)
    }

    pub(crate) fn to_canonical_unvalidated(&self, context: &Context) -> Value {
        self.canonicalize(&[], context)
    }

    fn canonicalize(&self, ignore: &[String], context: &Context) -> Value {
        match &self.data {
            ObjectData::Positional(value) => to_canonical_with(value, context),
            ObjectData::Fields(fields) if ignore.is_empty() => Value::Object(canonical_map(fields, context)),
            ObjectData::Fields(fields) => {
                let kept: FieldMap = fields
                    .iter()
                    .filter(|(k, _)| !ignore.contains(*k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Value::Object(canonical_map(&kept, context))
            }
        }
    }

    /// Canonical form serialized as JSON text.
    ///
    /// `indent` of `None` produces compact output.
    pub fn to_json(&self, validate: bool, indent: Option<usize>, sort_keys: bool) -> Result<String, SchemaError> {
        let value = self.to_dict(validate)?;
        Ok(to_json_string(&value, indent, sort_keys)?)
    }

    /// Copy this object.
    ///
    /// A shallow copy clones the top-level container. A deep copy rebuilds
    /// every nested object, without construction-time validation. Fields
    /// named in `ignore` are carried over as-is in both cases. The result
    /// never aliases mutable state with `self`.
    pub fn copy(&self, deep: bool, ignore: &[&str]) -> Self {
        if deep {
            deep_copy_object(self, ignore)
        } else {
            self.clone()
        }
    }
}

fn deep_copy_object(obj: &SchemaObject, ignore: &[&str]) -> SchemaObject {
    let data = match &obj.data {
        ObjectData::Positional(value) => ObjectData::Positional(Box::new(deep_copy(value, &[]))),
        ObjectData::Fields(fields) => ObjectData::Fields(deep_copy_fields(fields, ignore)),
    };
    SchemaObject {
        ty: Arc::clone(&obj.ty),
        data,
    }
}

fn deep_copy_fields(fields: &FieldMap, ignore: &[&str]) -> FieldMap {
    fields
        .iter()
        .map(|(k, v)| {
            let copied = if ignore.contains(&k.as_str()) {
                v.clone()
            } else {
                deep_copy(v, ignore)
            };
            (k.clone(), copied)
        })
        .collect()
}

fn deep_copy(value: &FieldValue, ignore: &[&str]) -> FieldValue {
    match value {
        FieldValue::Object(obj) => FieldValue::Object(deep_copy_object(obj, ignore)),
        FieldValue::Array(items) => FieldValue::Array(items.iter().map(|v| deep_copy(v, ignore)).collect()),
        FieldValue::Map(map) => FieldValue::Map(deep_copy_fields(map, ignore)),
        other => other.clone(),
    }
}

impl PartialEq for SchemaObject {
    fn eq(&self, other: &Self) -> bool {
        (Arc::ptr_eq(&self.ty, &other.ty) || self.ty == other.ty) && self.data == other.data
    }
}

impl fmt::Display for SchemaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            ObjectData::Positional(value) => write!(f, "{}({value})", self.ty.name()),
            ObjectData::Fields(fields) => {
                let mut set: Vec<(&String, &FieldValue)> = fields.iter().filter(|(_, v)| !v.is_undefined()).collect();
                if set.is_empty() {
                    return write!(f, "{}({{}})", self.ty.name());
                }
                set.sort_by(|a, b| a.0.cmp(b.0));
                write!(f, "{}({{ ", self.ty.name())?;
                for (i, (k, v)) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, " }})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmodel_core::{with_debug_mode, DebugModeGuard};
    use serde_json::json;

    fn root() -> Arc<Value> {
        Arc::new(json!({
            "definitions": {
                "Color": {"type": "string", "enum": ["red", "blue"]},
                "Mark": {
                    "type": "object",
                    "properties": {
                        "color": {"$ref": "#/definitions/Color"},
                        "size": {"type": "number", "description": "Mark __size__ in pixels."}
                    },
                    "additionalProperties": false
                }
            }
        }))
    }

    fn mark() -> Arc<SchemaType> {
        Arc::new(SchemaType::with_root("Mark", json!({"$ref": "#/definitions/Mark"}), root()))
    }

    fn color() -> Arc<SchemaType> {
        Arc::new(SchemaType::with_root("Color", json!({"$ref": "#/definitions/Color"}), root()))
    }

    #[test]
    fn test_named_fields_to_dict() {
        let obj = SchemaObject::with_fields(&mark(), [("color", "red")]).unwrap();
        assert_eq!(obj.to_dict(true).unwrap(), json!({"color": "red"}));
    }

    #[test]
    fn test_positional_to_dict() {
        let obj = SchemaObject::positional(&color(), "blue").unwrap();
        assert_eq!(obj.to_dict(true).unwrap(), json!("blue"));
    }

    #[test]
    fn test_unset_field_omitted() {
        let fields: FieldMap = [
            ("color".to_string(), FieldValue::from("red")),
            ("size".to_string(), FieldValue::Undefined),
        ]
        .into_iter()
        .collect();
        let obj = SchemaObject::new(&mark(), Vec::new(), fields).unwrap();
        let dict = obj.to_dict(true).unwrap();
        assert!(dict.get("size").is_none());
    }

    #[test]
    fn test_mixed_construction_is_structural_error() {
        let mut kwds = FieldMap::new();
        kwds.insert("size".into(), 3.into());
        let err = SchemaObject::new(&mark(), vec!["red".into()], kwds).unwrap_err();
        assert!(matches!(err, SchemaError::StructuralConstraint { .. }));

        let err = SchemaObject::new(&color(), vec!["red".into(), "blue".into()], FieldMap::new()).unwrap_err();
        assert!(matches!(err, SchemaError::StructuralConstraint { .. }));
    }

    #[test]
    fn test_unbound_type_is_missing_schema() {
        let ty = Arc::new(SchemaType::unbound("Loose"));
        let err = SchemaObject::positional(&ty, 1).unwrap_err();
        assert!(matches!(err, SchemaError::MissingSchema { type_name } if type_name == "Loose"));
    }

    #[test]
    fn test_eager_validation_in_debug_mode() {
        let _debug = DebugModeGuard::set(true);
        let err = SchemaObject::positional(&color(), "green").unwrap_err();
        assert!(err.as_validation().is_some());

        let obj = with_debug_mode(false, || SchemaObject::positional(&color(), "green")).unwrap();
        assert!(obj.to_dict(true).is_err());
        assert_eq!(obj.to_dict(false).unwrap(), json!("green"));
    }

    #[test]
    fn test_type_can_opt_out_of_instantiation_check() {
        let ty = Arc::new(
            SchemaType::with_root("Color", json!({"$ref": "#/definitions/Color"}), root()).with_instantiation_check(false),
        );
        assert!(SchemaObject::positional(&ty, "green").is_ok());
    }

    #[test]
    fn test_validation_error_is_consolidated() {
        let obj = with_debug_mode(false, || SchemaObject::with_fields(&mark(), [("color", "green")])).unwrap();
        let err = obj.to_dict(true).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'green' is an invalid value for `color`"), "{message}");
        assert!(message.contains("one of ['red', 'blue']"), "{message}");
        let groups = err.as_validation().unwrap().groups();
        assert!(groups.contains_key("$.color"));
    }

    #[test]
    fn test_unknown_field_lists_parameters() {
        let obj = with_debug_mode(false, || SchemaObject::with_fields(&mark(), [("colour", "red")])).unwrap();
        let message = obj.to_dict(true).unwrap_err().to_string();
        assert!(message.starts_with("`Mark` has no parameter named 'colour'"), "{message}");
        assert!(message.contains("color   size   "), "{message}");
    }

    #[test]
    fn test_field_access() {
        let mut obj = SchemaObject::with_fields(&mark(), [("color", "red")]).unwrap();
        assert_eq!(obj.get_field("color").unwrap(), &FieldValue::from("red"));
        assert!(obj.get_field("size").unwrap().is_undefined());
        assert_eq!(obj.get_or("size", 1).unwrap(), FieldValue::Int(1));
        obj.set_field("size", 4).unwrap();
        assert_eq!(obj.get_field("size").unwrap(), &FieldValue::Int(4));
    }

    #[test]
    fn test_field_access_on_positional_is_error() {
        let mut obj = SchemaObject::positional(&color(), "red").unwrap();
        assert!(matches!(obj.get_field("x"), Err(SchemaError::StructuralConstraint { .. })));
        assert!(matches!(obj.set_field("x", 1), Err(SchemaError::StructuralConstraint { .. })));
    }

    #[test]
    fn test_ignore_applies_to_top_level_only() {
        let inner = SchemaObject::with_fields(&mark(), [("color", "red")]).unwrap();
        let wrapper_ty = Arc::new(SchemaType::new("Wrapper", json!({"type": "object"})));
        let outer = SchemaObject::with_fields(
            &wrapper_ty,
            [("color", FieldValue::from("blue")), ("inner", inner.into())],
        )
        .unwrap();
        let options = ToDictOptions {
            ignore: vec!["color".into()],
            ..ToDictOptions::default()
        };
        let dict = outer.to_dict_with(&options).unwrap();
        assert!(dict.get("color").is_none());
        assert_eq!(dict["inner"]["color"], "red");
    }

    #[test]
    fn test_to_json_sorted_and_indented() {
        let obj = SchemaObject::with_fields(&mark(), [("size", FieldValue::from(2)), ("color", "red".into())]).unwrap();
        assert_eq!(
            obj.to_json(true, Some(2), true).unwrap(),
            "{\n  \"color\": \"red\",\n  \"size\": 2\n}"
        );
        assert_eq!(obj.to_json(true, None, false).unwrap(), r#"{"size":2,"color":"red"}"#);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let wrapper_ty = Arc::new(SchemaType::new("Wrapper", json!({"type": "object"})));
        let inner = SchemaObject::with_fields(&mark(), [("color", "red")]).unwrap();
        let original = SchemaObject::with_fields(&wrapper_ty, [("mark", inner)]).unwrap();
        let mut copy = original.copy(true, &[]);
        assert_eq!(copy, original);
        copy.set_field("extra", 1).unwrap();
        assert_ne!(copy, original);
        assert!(original.get_field("extra").unwrap().is_undefined());
    }

    #[test]
    fn test_copy_does_not_validate_and_restores_debug_mode() {
        let obj = with_debug_mode(false, || SchemaObject::positional(&color(), "green")).unwrap();
        let copy = obj.copy(true, &[]);
        assert_eq!(copy, obj);
        assert!(debug_mode());
    }

    #[test]
    fn test_with_property_returns_copy() {
        let obj = SchemaObject::with_fields(&mark(), [("color", "red")]).unwrap();
        let changed = obj.with_property("color", "blue").unwrap();
        assert_eq!(changed.get_field("color").unwrap(), &FieldValue::from("blue"));
        assert_eq!(obj.get_field("color").unwrap(), &FieldValue::from("red"));
    }

    #[test]
    fn test_equality_ignores_unset_fields() {
        let a = SchemaObject::with_fields(&mark(), [("color", FieldValue::from("red")), ("size", FieldValue::Undefined)]).unwrap();
        let b = SchemaObject::with_fields(&mark(), [("color", "red")]).unwrap();
        assert_eq!(a, b);
        let c = SchemaObject::positional(&color(), "red").unwrap();
        let d = SchemaObject::positional(&color(), "red").unwrap();
        assert_eq!(c, d);
        let e = SchemaObject::with_fields(&mark(), Vec::<(String, FieldValue)>::new()).unwrap();
        assert_ne!(b, e);
    }

    #[test]
    fn test_display() {
        let obj = SchemaObject::with_fields(&mark(), [("size", FieldValue::from(3)), ("color", "red".into())]).unwrap();
        assert_eq!(obj.to_string(), r#"Mark({ color: "red", size: 3 })"#);
        let pos = SchemaObject::positional(&color(), "red").unwrap();
        assert_eq!(pos.to_string(), r#"Color("red")"#);
        let empty = SchemaObject::with_fields(&mark(), Vec::<(String, FieldValue)>::new()).unwrap();
        assert_eq!(empty.to_string(), "Mark({})");
    }

    #[test]
    fn test_validate_property() {
        let ty = mark();
        assert!(ty.validate_property("color", &"red".into()).is_ok());
        let err = ty.validate_property("color", &"green".into()).unwrap_err();
        assert!(err.to_string().contains("one of ['red', 'blue']"));
        assert!(ty.validate_property("anything", &FieldValue::from(json!({"x": 1}))).is_ok());
    }

    #[test]
    fn test_resolve_references_and_field_names() {
        let ty = mark();
        let resolved = ty.resolve_references(None).unwrap();
        assert_eq!(resolved["type"], "object");
        assert_eq!(ty.field_names(), vec!["color".to_string(), "size".to_string()]);
        let explicit = json!({"$ref": "#/definitions/Color"});
        assert_eq!(ty.resolve_references(Some(&explicit)).unwrap()["type"], "string");
    }

    #[test]
    fn test_validate_with_override_schema() {
        let ty = color();
        assert!(ty.validate(&json!(5), Some(&json!({"type": "integer"}))).is_ok());
        assert!(ty.validate(&json!(5), None).is_err());
    }
}
