//! # Field Values
//!
//! [`FieldValue`] is the tagged union stored in a document object's fields.
//! It is tri-state with respect to presence:
//!
//! - [`FieldValue::Undefined`]: the field was not supplied,
//! - [`FieldValue::Null`]: the field was explicitly set to null,
//! - anything else: the field holds a value.
//!
//! `Undefined` never survives canonicalization: fields and mapping entries
//! holding it are omitted from the output.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use docmodel_core::Temporal;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::object::SchemaObject;

/// A value that knows its own canonical JSON form.
///
/// Implemented by caller-defined types that want to appear inside a
/// document without being wrapper objects themselves.
pub trait ToCanonical: fmt::Debug + Send + Sync {
    /// The canonical JSON representation of this value.
    fn to_canonical(&self) -> Value;
}

/// An ordered field-name to value mapping.
pub type FieldMap = IndexMap<String, FieldValue>;

/// A value held by a document object field, sequence element, or mapping entry.
#[derive(Debug, Clone, Default)]
pub enum FieldValue {
    /// Not supplied.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Extended-precision number; canonicalized to a JSON float.
    Decimal(Decimal),
    String(String),
    /// Timestamp-like value; canonicalized to an ISO-8601 string.
    Temporal(Temporal),
    Array(Vec<FieldValue>),
    Map(FieldMap),
    /// A nested document object.
    Object(SchemaObject),
    /// A caller-defined value with its own canonical form.
    Custom(Arc<dyn ToCanonical>),
}

impl FieldValue {
    /// True for [`FieldValue::Undefined`].
    pub fn is_undefined(&self) -> bool {
        matches!(self, FieldValue::Undefined)
    }

    /// The nested document object, if this is one.
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            FieldValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The string slice, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        use FieldValue::*;
        match (self, other) {
            (Undefined, Undefined) | (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Temporal(a), Temporal(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Custom(a), Custom(b)) => Arc::ptr_eq(a, b) || a.to_canonical() == b.to_canonical(),
            _ => false,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    FieldValue::UInt(u)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => FieldValue::Array(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(map) => {
                FieldValue::Map(map.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        FieldValue::from(value.clone())
    }
}

impl From<SchemaObject> for FieldValue {
    fn from(obj: SchemaObject) -> Self {
        FieldValue::Object(obj)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        FieldValue::Decimal(d)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<Temporal> for FieldValue {
    fn from(t: Temporal) -> Self {
        FieldValue::Temporal(t)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::Temporal(dt.into())
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        FieldValue::Temporal(dt.into())
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(dt: NaiveDateTime) -> Self {
        FieldValue::Temporal(dt.into())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Temporal(d.into())
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<FieldMap> for FieldValue {
    fn from(map: FieldMap) -> Self {
        FieldValue::Map(map)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    /// `None` maps to [`FieldValue::Undefined`], not to null.
    fn from(opt: Option<T>) -> Self {
        opt.map_or(FieldValue::Undefined, Into::into)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Undefined => write!(f, "Undefined"),
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::UInt(u) => write!(f, "{u}"),
            FieldValue::Float(x) => write!(f, "{x:?}"),
            FieldValue::Decimal(d) => write!(f, "{d}"),
            FieldValue::String(s) => write!(f, "{s:?}"),
            FieldValue::Temporal(t) => write!(f, "{}", t.to_iso8601()),
            FieldValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            FieldValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
            FieldValue::Object(obj) => write!(f, "{obj}"),
            FieldValue::Custom(c) => write!(f, "{}", c.to_canonical()),
        }
    }
}
