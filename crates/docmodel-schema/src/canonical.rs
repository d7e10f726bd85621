//! # Canonicalization
//!
//! Converts a [`FieldValue`] tree into the schema-agnostic canonical form:
//! nested JSON objects, arrays, strings, numbers, booleans, and null.
//!
//! | input                    | canonical form                               |
//! |--------------------------|----------------------------------------------|
//! | document object          | its `to_dict` with validation off            |
//! | array                    | array of canonicalized elements              |
//! | mapping                  | object, `Undefined` entries dropped          |
//! | custom value             | its own [`ToCanonical`] output               |
//! | decimal                  | JSON float                                   |
//! | temporal                 | ISO-8601 string                              |
//! | everything else          | unchanged                                    |
//!
//! The conversion is total. Values with no JSON spelling (non-finite
//! floats, a bare top-level `Undefined`) become `null`; `Undefined` array
//! elements are dropped like mapping entries.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Number, Value};

use crate::value::{FieldMap, FieldValue, ToCanonical};

/// Caller context threaded through nested `to_dict` calls.
pub type Context = Map<String, Value>;

/// Canonicalize a value with an empty context.
pub fn to_canonical(value: &FieldValue) -> Value {
    to_canonical_with(value, &Context::new())
}

/// Canonicalize a value, passing `context` to nested document objects.
pub fn to_canonical_with(value: &FieldValue, context: &Context) -> Value {
    match value {
        FieldValue::Undefined | FieldValue::Null => Value::Null,
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(i) => Value::Number((*i).into()),
        FieldValue::UInt(u) => Value::Number((*u).into()),
        FieldValue::Float(f) => float(*f),
        FieldValue::Decimal(d) => d.to_f64().map_or(Value::Null, float),
        FieldValue::String(s) => Value::String(s.clone()),
        FieldValue::Temporal(t) => Value::String(t.to_iso8601()),
        FieldValue::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| !item.is_undefined())
                .map(|item| to_canonical_with(item, context))
                .collect(),
        ),
        FieldValue::Map(map) => Value::Object(canonical_map(map, context)),
        FieldValue::Object(obj) => obj.to_canonical_unvalidated(context),
        FieldValue::Custom(custom) => custom.to_canonical(),
    }
}

/// Canonicalize a field mapping, omitting `Undefined` entries.
pub(crate) fn canonical_map(map: &FieldMap, context: &Context) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_undefined())
        .map(|(k, v)| (k.clone(), to_canonical_with(v, context)))
        .collect()
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

impl ToCanonical for Value {
    fn to_canonical(&self) -> Value {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    #[test]
    fn test_scalars_unchanged() {
        assert_eq!(to_canonical(&FieldValue::Int(-3)), json!(-3));
        assert_eq!(to_canonical(&"x".into()), json!("x"));
        assert_eq!(to_canonical(&FieldValue::Bool(false)), json!(false));
        assert_eq!(to_canonical(&FieldValue::Null), Value::Null);
    }

    #[test]
    fn test_mapping_drops_undefined() {
        let mut map = FieldMap::new();
        map.insert("keep".into(), FieldValue::Int(1));
        map.insert("null".into(), FieldValue::Null);
        map.insert("gone".into(), FieldValue::Undefined);
        assert_eq!(
            to_canonical(&FieldValue::Map(map)),
            json!({"keep": 1, "null": null})
        );
    }

    #[test]
    fn test_sequence_drops_undefined() {
        let v = FieldValue::Array(vec![FieldValue::Int(1), FieldValue::Undefined, FieldValue::Null]);
        assert_eq!(to_canonical(&v), json!([1, null]));
    }

    #[test]
    fn test_decimal_narrowed_to_float() {
        let d = Decimal::from_str("2.5").unwrap();
        assert_eq!(to_canonical(&FieldValue::Decimal(d)), json!(2.5));
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(to_canonical(&FieldValue::Float(f64::NAN)), Value::Null);
        assert_eq!(to_canonical(&FieldValue::Float(f64::INFINITY)), Value::Null);
    }

    #[test]
    fn test_temporal_to_iso_string() {
        let dt = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(to_canonical(&dt.into()), json!("2021-06-01T12:00:00+00:00"));
        let d = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        assert_eq!(to_canonical(&d.into()), json!("2021-06-01T00:00:00"));
    }

    #[test]
    fn test_custom_delegates() {
        let v = FieldValue::Custom(Arc::new(json!({"pre": "built"})));
        assert_eq!(to_canonical(&v), json!({"pre": "built"}));
    }

    #[test]
    fn test_top_level_undefined_is_null() {
        assert_eq!(to_canonical(&FieldValue::Undefined), Value::Null);
    }
}
