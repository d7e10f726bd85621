//! # Instance Validation
//!
//! Validates a canonical instance against a schema fragment in the context
//! of its root schema, producing a flat list of [`RawValidationError`]s.
//!
//! ## Draft selection
//!
//! The validation draft comes from the root schema's `$schema` declaration,
//! falling back to the fragment's own, and finally to Draft 2020-12.
//!
//! ## Reference resolution
//!
//! Every local `$ref` means a location in the root schema, even inside a
//! fragment: `#` is the root itself, not the fragment. The root is
//! registered with the backend under [`ROOT_URI`] and each fragment's local
//! references are rewritten to point into it before compiling. Remote
//! references are never fetched: the retriever answers every URI with the
//! permissive schema and logs a warning.
//!
//! Compiled validators are cached per fragment in [`CompiledSchemas`], so
//! union expansion and repeated checks against one root compile each
//! fragment once.
//!
//! ## Union branches
//!
//! The backend reports a failed `anyOf`/`oneOf` as a single error. Each such
//! error is expanded here by validating the offending sub-instance against
//! every branch; the branch errors become the error's `context`, each
//! carrying a [`ParentRef`] back to the union that produced it.
//!
//! The schema document itself is trusted and never validated.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::{json, Value};

use crate::error::SchemaError;
use crate::resolve::schema_at;

/// One step of an instance location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member name.
    Key(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{k}"),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// The union error a branch error was produced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    /// Identifies the union error within one validation run.
    pub id: usize,
    /// `anyOf` or `oneOf`.
    pub rule: String,
}

/// A single validator error, before consolidation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawValidationError {
    /// Location of the offending node from the document root.
    pub path: Vec<PathSegment>,
    /// The violated keyword (`enum`, `type`, `additionalProperties`, ...).
    pub rule: String,
    /// The keyword's value in the schema.
    pub rule_value: Value,
    /// The offending instance node.
    pub instance: Value,
    /// Backend message.
    pub message: String,
    /// Keyword location within the schema the error was found under.
    pub schema_path: String,
    /// The union error this one was found under, if any.
    pub parent: Option<ParentRef>,
    /// Branch errors of a failed union.
    pub context: Vec<RawValidationError>,
}

impl RawValidationError {
    /// The location rendered as `$`, `$.encoding.x`, `$.layer[0].mark`.
    pub fn json_path(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            match segment {
                PathSegment::Key(k) => {
                    out.push('.');
                    out.push_str(k);
                }
                PathSegment::Index(i) => {
                    out.push_str(&format!("[{i}]"));
                }
            }
        }
        out
    }
}

/// Retriever that keeps validation offline.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        tracing::warn!(uri = uri.as_str(), "remote schema reference treated as permissive");
        Ok(json!({}))
    }
}

/// Pick the validation draft declared by the root schema, else the fragment.
pub fn draft_for(schema: &Value, root: &Value) -> Draft {
    let declared = root
        .get("$schema")
        .or_else(|| schema.get("$schema"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if declared.contains("draft-04") {
        Draft::Draft4
    } else if declared.contains("draft-06") {
        Draft::Draft6
    } else if declared.contains("draft-07") {
        Draft::Draft7
    } else if declared.contains("2019-09") {
        Draft::Draft201909
    } else {
        Draft::Draft202012
    }
}

/// Base URI the root schema is registered under while compiling.
pub const ROOT_URI: &str = "urn:docmodel:root";

/// Keywords whose values are instance data, not subschemas.
const DATA_KEYWORDS: [&str; 4] = ["const", "default", "enum", "examples"];

/// Rewrite every local `$ref` in `schema` to an absolute reference into the
/// registered root.
fn anchor_local_refs(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let anchored = match (key.as_str(), value) {
                        ("$ref", Value::String(reference)) if reference.starts_with('#') => {
                            Value::String(format!("{ROOT_URI}{reference}"))
                        }
                        (keyword, _) if DATA_KEYWORDS.contains(&keyword) => value.clone(),
                        _ => anchor_local_refs(value),
                    };
                    (key.clone(), anchored)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(anchor_local_refs).collect()),
        other => other.clone(),
    }
}

fn compile(schema: &Value, root: &Value) -> Result<Validator, SchemaError> {
    let draft = draft_for(schema, root);
    jsonschema::options()
        .with_draft(draft)
        .with_resource(ROOT_URI, draft.create_resource(root.clone()))
        .with_retriever(OfflineRetriever)
        .should_validate_formats(false)
        .build(&anchor_local_refs(schema))
        .map_err(|e| SchemaError::Compile {
            reason: e.to_string(),
        })
}

/// Compiled validators for fragments of one root schema.
pub struct CompiledSchemas<'r> {
    root: &'r Value,
    validators: HashMap<String, Rc<Validator>>,
}

impl<'r> CompiledSchemas<'r> {
    pub fn new(root: &'r Value) -> Self {
        Self {
            root,
            validators: HashMap::new(),
        }
    }

    pub fn root(&self) -> &'r Value {
        self.root
    }

    /// Number of distinct fragments compiled so far.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    fn get(&mut self, schema: &Value) -> Result<Rc<Validator>, SchemaError> {
        let key = if std::ptr::eq(schema, self.root) {
            String::new()
        } else {
            schema.to_string()
        };
        if let Some(validator) = self.validators.get(&key) {
            return Ok(Rc::clone(validator));
        }
        let validator = Rc::new(compile(schema, self.root)?);
        self.validators.insert(key, Rc::clone(&validator));
        Ok(validator)
    }

    /// Whether `instance` conforms to `schema`.
    pub fn is_valid(&mut self, instance: &Value, schema: &Value) -> Result<bool, SchemaError> {
        Ok(self.get(schema)?.is_valid(instance))
    }

    /// Raw errors of `instance` against `schema`, union branches expanded.
    pub fn validate(&mut self, instance: &Value, schema: &Value) -> Result<Vec<RawValidationError>, SchemaError> {
        let mut collector = Collector {
            schemas: self,
            next_id: 0,
        };
        let errors = collector.collect(instance, schema, &[], None)?;
        tracing::debug!(count = errors.len(), draft = ?draft_for(schema, self.root), "raw validation errors");
        Ok(errors)
    }
}

/// Whether `instance` conforms to `schema` in the context of `root`.
pub fn is_valid(instance: &Value, schema: &Value, root: &Value) -> Result<bool, SchemaError> {
    CompiledSchemas::new(root).is_valid(instance, schema)
}

/// Validate `instance` against `schema`, resolving references in `root`.
///
/// Returns an empty list when the instance is valid. Union failures carry
/// their branch errors in [`RawValidationError::context`].
pub fn validate(
    instance: &Value,
    schema: &Value,
    root: &Value,
) -> Result<Vec<RawValidationError>, SchemaError> {
    CompiledSchemas::new(root).validate(instance, schema)
}

struct Collector<'c, 'r> {
    schemas: &'c mut CompiledSchemas<'r>,
    next_id: usize,
}

impl Collector<'_, '_> {
    fn collect(
        &mut self,
        instance: &Value,
        schema: &Value,
        prefix: &[PathSegment],
        parent: Option<&ParentRef>,
    ) -> Result<Vec<RawValidationError>, SchemaError> {
        let validator = self.schemas.get(schema)?;
        let mut out = Vec::new();

        for err in validator.iter_errors(instance) {
            let message = err.to_string();
            let schema_path = err.schema_path.to_string();
            let instance_path = err.instance_path.to_string();
            let offending = err.instance.clone().into_owned();

            let rule = keyword_of(&schema_path);
            let rule_value = schema_at(schema, self.schemas.root, &schema_path)
                .cloned()
                .unwrap_or(Value::Null);
            let mut path = prefix.to_vec();
            path.extend(path_segments(&instance_path, instance));

            let mut raw = RawValidationError {
                path,
                rule,
                rule_value,
                instance: offending,
                message,
                schema_path,
                parent: parent.cloned(),
                context: Vec::new(),
            };

            if raw.rule == "anyOf" || raw.rule == "oneOf" {
                raw.context = self.expand_union(&raw)?;
            }
            out.push(raw);
        }
        Ok(out)
    }

    /// Branch errors of a failed union, or none if any branch accepts.
    fn expand_union(&mut self, union: &RawValidationError) -> Result<Vec<RawValidationError>, SchemaError> {
        let Value::Array(branches) = &union.rule_value else {
            return Ok(Vec::new());
        };
        let me = ParentRef {
            id: self.next_id,
            rule: union.rule.clone(),
        };
        self.next_id += 1;

        let mut context = Vec::new();
        for branch in branches {
            let branch_errors = self.collect(&union.instance, branch, &union.path, Some(&me))?;
            if branch_errors.is_empty() {
                // A `oneOf` that matched several branches: nothing to explain.
                return Ok(Vec::new());
            }
            context.extend(branch_errors);
        }
        Ok(context)
    }
}

/// The keyword a schema location ends in.
fn keyword_of(schema_path: &str) -> String {
    match schema_path.rsplit('/').find(|s| !s.is_empty()) {
        Some(last) => last.replace("~1", "/").replace("~0", "~"),
        None => "false".to_string(),
    }
}

/// Split a JSON Pointer into path segments, using `instance` to tell array
/// indices from numeric-looking object keys.
fn path_segments(pointer: &str, instance: &Value) -> Vec<PathSegment> {
    let mut node = Some(instance);
    let mut out = Vec::new();
    for raw in pointer.split('/').skip(1) {
        let key = raw.replace("~1", "/").replace("~0", "~");
        match node {
            Some(Value::Array(items)) => match key.parse::<usize>() {
                Ok(i) => {
                    node = items.get(i);
                    out.push(PathSegment::Index(i));
                }
                Err(_) => {
                    node = None;
                    out.push(PathSegment::Key(key));
                }
            },
            Some(Value::Object(map)) => {
                node = map.get(&key);
                out.push(PathSegment::Key(key));
            }
            _ => {
                node = None;
                out.push(PathSegment::Key(key));
            }
        }
    }
    out
}
