//! # Type Registry and Polymorphic Reconstruction
//!
//! [`TypeRegistry`] indexes wrapper types by the [`SchemaDigest`] of their
//! bound schema, in registration order. Registration order is discovery
//! order: when several types share a digest, the first registered (the most
//! general) wins.
//!
//! [`TypeRegistry::from_dict`] rebuilds a typed tree from canonical JSON:
//!
//! - an already-typed object is returned unchanged;
//! - a union schema (`anyOf`/`oneOf`) picks the **first** alternative the
//!   value validates against, in schema order, not the best one;
//! - a mapping rebuilds each declared property against its own schema and
//!   passes undeclared entries through;
//! - a sequence rebuilds each element against `items`;
//! - a scalar becomes the positional value.
//!
//! With no matching type and no default, the rebuilt value is returned as a
//! plain mapping, sequence, or scalar.

use std::collections::HashMap;
use std::sync::Arc;

use docmodel_core::{schema_digest, SchemaDigest};
use serde_json::{json, Value};

use crate::canonical::to_canonical;
use crate::consolidate::TypeLookup;
use crate::error::SchemaError;
use crate::object::{SchemaObject, SchemaType};
use crate::resolve::{empty_schema, resolve};
use crate::validate::CompiledSchemas;
use crate::value::{FieldMap, FieldValue};

/// Wrapper types indexed by structural schema digest.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Vec<Arc<SchemaType>>,
    by_digest: HashMap<SchemaDigest, Vec<usize>>,
    by_name: HashMap<String, usize>,
}

impl TypeRegistry {
    /// Register `types` in the given order.
    pub fn new(types: impl IntoIterator<Item = Arc<SchemaType>>) -> Result<Self, SchemaError> {
        let mut registry = Self::default();
        for ty in types {
            registry.register(ty)?;
        }
        Ok(registry)
    }

    /// One type for the root schema, then one per `definitions`/`$defs`
    /// entry bound to a `$ref` into the root, in document order.
    ///
    /// The root type is named after the root's `title`, else `Root`.
    pub fn from_root_definitions(root: Value) -> Result<Self, SchemaError> {
        let root = Arc::new(root);
        let root_name = root
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Root")
            .to_string();

        let mut types = vec![Arc::new(SchemaType::new(root_name, (*root).clone()))];
        for key in ["definitions", "$defs"] {
            let Some(defs) = root.get(key).and_then(Value::as_object) else {
                continue;
            };
            for name in defs.keys() {
                let pointer = format!("#/{key}/{}", escape_pointer(name));
                types.push(Arc::new(SchemaType::with_root(
                    name.clone(),
                    json!({ "$ref": pointer }),
                    Arc::clone(&root),
                )));
            }
        }
        tracing::debug!(count = types.len(), "registered root definitions");
        Self::new(types)
    }

    /// Append one type. Types without a schema are kept by name only.
    pub fn register(&mut self, ty: Arc<SchemaType>) -> Result<(), SchemaError> {
        let index = self.types.len();
        if let Ok(schema) = ty.schema() {
            let digest = schema_digest(schema)?;
            self.by_digest.entry(digest).or_default().push(index);
        }
        self.by_name.entry(ty.name().to_string()).or_insert(index);
        self.types.push(ty);
        Ok(())
    }

    /// All registered types, in registration order.
    pub fn types(&self) -> &[Arc<SchemaType>] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The first type registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<SchemaType>> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    /// Types whose bound schema has the same digest as `schema`.
    pub fn candidates(&self, schema: &Value) -> Result<Vec<&Arc<SchemaType>>, SchemaError> {
        let digest = schema_digest(schema)?;
        Ok(self
            .by_digest
            .get(&digest)
            .map(|indices| indices.iter().map(|&i| &self.types[i]).collect())
            .unwrap_or_default())
    }

    /// The most general type for `schema`, trying the unresolved fragment
    /// first and its resolved form second.
    fn lookup(&self, schema: &Value, resolved: &Value) -> Result<Option<Arc<SchemaType>>, SchemaError> {
        if let Some(ty) = self.candidates(schema)?.first() {
            return Ok(Some(Arc::clone(ty)));
        }
        if std::ptr::eq(schema, resolved) {
            return Ok(None);
        }
        Ok(self.candidates(resolved)?.first().map(|ty| Arc::clone(ty)))
    }

    /// Rebuild a typed tree from `value` against `schema`.
    ///
    /// `default` is used when no registered type matches the schema.
    pub fn from_dict(
        &self,
        value: FieldValue,
        schema: &Value,
        root: &Value,
        default: Option<&Arc<SchemaType>>,
    ) -> Result<FieldValue, SchemaError> {
        self.rebuild(value, schema, &mut CompiledSchemas::new(root), None, default)
    }

    /// Rebuild `value` as an instance of `ty`, bypassing the digest lookup at
    /// the top level.
    pub fn from_dict_typed(&self, value: FieldValue, ty: &Arc<SchemaType>) -> Result<FieldValue, SchemaError> {
        let mut schemas = CompiledSchemas::new(ty.root_schema()?);
        self.rebuild(value, ty.schema()?, &mut schemas, Some(ty), None)
    }

    fn rebuild(
        &self,
        value: FieldValue,
        schema: &Value,
        schemas: &mut CompiledSchemas<'_>,
        exact: Option<&Arc<SchemaType>>,
        default: Option<&Arc<SchemaType>>,
    ) -> Result<FieldValue, SchemaError> {
        if matches!(value, FieldValue::Object(_)) {
            return Ok(value);
        }
        let root = schemas.root();

        let resolved = resolve(schema, root)?;
        let chosen = match exact {
            Some(ty) => Some(Arc::clone(ty)),
            None => self.lookup(schema, resolved)?.or_else(|| default.cloned()),
        };

        let alternatives = ["anyOf", "oneOf"]
            .iter()
            .filter_map(|key| resolved.get(key).and_then(Value::as_array))
            .flatten();
        let mut canonical = None;
        for alternative in alternatives {
            let instance = canonical.get_or_insert_with(|| to_canonical(&value));
            if schemas.is_valid(instance, alternative)? {
                tracing::trace!(
                    default = ?chosen.as_ref().map(|t| t.name()),
                    "union resolved to first matching alternative"
                );
                return self.rebuild(value, alternative, schemas, None, chosen.as_ref());
            }
        }

        match value {
            FieldValue::Map(map) => {
                let properties = resolved.get("properties");
                let mut fields = FieldMap::with_capacity(map.len());
                for (key, val) in map {
                    let rebuilt = match properties.and_then(|p| p.get(&key)) {
                        Some(prop_schema) => self.rebuild(val, prop_schema, schemas, None, None)?,
                        None => val,
                    };
                    fields.insert(key, rebuilt);
                }
                match chosen {
                    Some(ty) => construct(&ty, Vec::new(), fields),
                    None => Ok(FieldValue::Map(fields)),
                }
            }
            FieldValue::Array(items) => {
                let item_schema = resolved.get("items").unwrap_or(empty_schema());
                let rebuilt = items
                    .into_iter()
                    .map(|item| self.rebuild(item, item_schema, schemas, None, None))
                    .collect::<Result<Vec<_>, _>>()?;
                match chosen {
                    Some(ty) => construct(&ty, vec![FieldValue::Array(rebuilt)], FieldMap::new()),
                    None => Ok(FieldValue::Array(rebuilt)),
                }
            }
            scalar => match chosen {
                Some(ty) => construct(&ty, vec![scalar], FieldMap::new()),
                None => Ok(scalar),
            },
        }
    }
}

fn construct(ty: &Arc<SchemaType>, args: Vec<FieldValue>, kwds: FieldMap) -> Result<FieldValue, SchemaError> {
    tracing::trace!(type_name = ty.name(), "rebuilding typed object");
    SchemaObject::new(ty, args, kwds).map(FieldValue::Object)
}

fn escape_pointer(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

impl TypeLookup for TypeRegistry {
    fn field_names(&self, name: &str) -> Option<Vec<String>> {
        self.get(name).map(|ty| ty.field_names())
    }
}
