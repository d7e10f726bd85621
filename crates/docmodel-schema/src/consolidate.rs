//! # Error Consolidation
//!
//! A single invalid value in a deeply unioned schema can yield dozens of raw
//! validator errors. This module reduces them to a handful of actionable
//! diagnostics:
//!
//! 1. **Leaves**: a union error ("matched none of the alternatives") is
//!    replaced by the leaves of its branch-error tree.
//! 2. **Group**: leaves are grouped by JSON path, first-seen order.
//! 3. **Specificity**: a group whose path is a strict string prefix of
//!    another group's path is dropped.
//! 4. **Deduplicate**: within a group, per rule:
//!    - `enum`: keep only maximal allowed-value sets;
//!    - `additionalProperties`: under one shared `anyOf`, keep the shortest
//!      message (it names the fewest unexpected fields);
//!    - everything: drop repeated messages, keeping the first;
//!    - drop `required` errors whose required list is exactly `["value"]`,
//!      a false positive from alternate-branch validation.
//! 5. **Render**: see [`SchemaValidationError`].

use docmodel_core::Settings;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::error::SchemaError;
use crate::message::{self, group_by_rule, FallbackType};
use crate::resolve::resolve;
use crate::validate::{validate, RawValidationError};

/// Raw errors keyed by JSON path, in first-seen order.
pub type ErrorGroups = IndexMap<String, Vec<RawValidationError>>;

/// Lookup of wrapper types by name, used to name the type an unknown-field
/// error belongs to.
pub trait TypeLookup {
    /// Declared field names of the wrapper type called `name`, if known.
    fn field_names(&self, name: &str) -> Option<Vec<String>>;
}

/// Treats every entry of a root schema's `definitions`/`$defs` as a known
/// wrapper type.
#[derive(Debug, Clone, Copy)]
pub struct RootDefinitions<'a>(pub &'a Value);

impl TypeLookup for RootDefinitions<'_> {
    fn field_names(&self, name: &str) -> Option<Vec<String>> {
        let definition = ["definitions", "$defs"]
            .iter()
            .find_map(|key| self.0.get(key).and_then(|defs| defs.get(name)))?;
        let resolved = resolve(definition, self.0).ok()?;
        Some(property_names(resolved))
    }
}

/// Declared property names of an already-resolved schema, in schema order.
pub(crate) fn property_names(schema: &Value) -> Vec<String> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

/// A consolidated, user-facing validation failure.
///
/// `Display` is the ranked diagnostic; the grouped raw errors it was built
/// from stay available through [`groups`](Self::groups).
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct SchemaValidationError {
    type_name: String,
    message: String,
    groups: ErrorGroups,
}

impl SchemaValidationError {
    /// Render consolidated `groups` for a value of type `type_name`.
    ///
    /// `field_names` are the type's own fields, used when no more specific
    /// type can be found along an unknown-field error's path.
    pub fn new(
        groups: ErrorGroups,
        lookup: &dyn TypeLookup,
        type_name: &str,
        field_names: &[String],
        settings: &Settings,
    ) -> Self {
        let fallback = FallbackType {
            name: type_name,
            field_names,
        };
        let message = message::render(&groups, lookup, &fallback, settings);
        Self {
            type_name: type_name.to_string(),
            message,
            groups,
        }
    }

    /// The rendered diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the type whose validation failed.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The consolidated raw errors, keyed by JSON path.
    pub fn groups(&self) -> &ErrorGroups {
        &self.groups
    }

    /// Consumes self and returns the grouped raw errors.
    pub fn into_groups(self) -> ErrorGroups {
        self.groups
    }
}

/// Run the full consolidation pipeline over raw validator output.
pub fn consolidate(errors: Vec<RawValidationError>) -> ErrorGroups {
    let raw_count = errors.len();
    let leaves = leaves(errors);
    let grouped = group_by_json_path(leaves);
    let specific = subset_to_most_specific_paths(grouped);
    let deduplicated = deduplicate(specific.clone());

    let result = if deduplicated.is_empty() && !specific.is_empty() {
        // Every error was filtered as noise; report the undeduplicated
        // groups rather than turning a failure into silence.
        specific
    } else {
        deduplicated
    };
    tracing::debug!(raw_count, groups = result.len(), "consolidated validation errors");
    result
}

/// Validate and consolidate. Empty groups mean the instance is valid.
pub fn validate_and_consolidate(
    instance: &Value,
    schema: &Value,
    root: &Value,
) -> Result<ErrorGroups, SchemaError> {
    let errors = validate(instance, schema, root)?;
    if errors.is_empty() {
        return Ok(ErrorGroups::new());
    }
    Ok(consolidate(errors))
}

/// Validate `instance` against a bare schema document, with no wrapper type.
///
/// Unknown-field diagnostics name types after the root's definitions and
/// otherwise after the schema's `title` (or `Document`).
pub fn validate_document(
    instance: &Value,
    schema: &Value,
    root: &Value,
    settings: &Settings,
) -> Result<(), SchemaError> {
    let groups = validate_and_consolidate(instance, schema, root)?;
    if groups.is_empty() {
        return Ok(());
    }
    let resolved = resolve(schema, root)?;
    let type_name = resolved
        .get("title")
        .or_else(|| schema.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("Document");
    let fields = property_names(resolved);
    Err(SchemaValidationError::new(groups, &RootDefinitions(root), type_name, &fields, settings).into())
}

/// Replace every error carrying branch errors with the leaves beneath it.
pub fn leaves(errors: Vec<RawValidationError>) -> Vec<RawValidationError> {
    let mut out = Vec::new();
    for mut err in errors {
        if err.context.is_empty() {
            out.push(err);
        } else {
            let context = std::mem::take(&mut err.context);
            out.extend(leaves(context));
        }
    }
    out
}

/// Group errors by JSON path, preserving first-seen order.
pub fn group_by_json_path(errors: Vec<RawValidationError>) -> ErrorGroups {
    let mut groups = ErrorGroups::new();
    for err in errors {
        groups.entry(err.json_path()).or_default().push(err);
    }
    groups
}

/// Drop groups whose path is a strict string prefix of another group's path.
pub fn subset_to_most_specific_paths(groups: ErrorGroups) -> ErrorGroups {
    let paths: Vec<String> = groups.keys().cloned().collect();
    groups
        .into_iter()
        .filter(|(path, _)| !contained_at_start_of_another(path, &paths))
        .collect()
}

fn contained_at_start_of_another(x: &str, values: &[String]) -> bool {
    values.iter().any(|v| v != x && v.starts_with(x))
}

/// Apply the per-rule deduplication to every group; groups left empty are
/// dropped.
pub fn deduplicate(groups: ErrorGroups) -> ErrorGroups {
    groups
        .into_iter()
        .filter_map(|(path, errors)| {
            let deduplicated = deduplicate_group(errors);
            (!deduplicated.is_empty()).then_some((path, deduplicated))
        })
        .collect()
}

fn deduplicate_group(errors: Vec<RawValidationError>) -> Vec<RawValidationError> {
    let mut by_rule: IndexMap<String, Vec<RawValidationError>> = IndexMap::new();
    for err in errors {
        by_rule.entry(err.rule.clone()).or_default().push(err);
    }

    let mut out = Vec::new();
    for (rule, errs) in by_rule {
        let errs = match rule.as_str() {
            "enum" => deduplicate_enum_errors(errs),
            "additionalProperties" => deduplicate_additional_properties_errors(errs),
            _ => errs,
        };
        out.extend(deduplicate_by_message(errs));
    }
    out.retain(|e| !is_required_value_error(e));
    out
}

/// Keep only enum errors whose allowed values are not a prefix of another's.
fn deduplicate_enum_errors(errors: Vec<RawValidationError>) -> Vec<RawValidationError> {
    if errors.len() <= 1 {
        return errors;
    }
    let joined: Vec<String> = errors.iter().map(|e| join_enum_values(&e.rule_value)).collect();
    errors
        .into_iter()
        .zip(joined.iter())
        .filter(|(_, value)| !contained_at_start_of_another(value, &joined))
        .map(|(e, _)| e)
        .collect()
}

fn join_enum_values(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Under one shared `anyOf`, several unknown-field errors for the same
/// instance differ only in how many names they list; keep the shortest.
fn deduplicate_additional_properties_errors(errors: Vec<RawValidationError>) -> Vec<RawValidationError> {
    if errors.len() <= 1 {
        return errors;
    }
    let shared_any_of = match &errors[0].parent {
        Some(parent) => parent.rule == "anyOf" && errors[1..].iter().all(|e| e.parent.as_ref() == Some(parent)),
        None => false,
    };
    if !shared_any_of {
        return errors;
    }
    let mut shortest = 0;
    for (i, e) in errors.iter().enumerate() {
        if e.message.len() < errors[shortest].message.len() {
            shortest = i;
        }
    }
    errors.into_iter().nth(shortest).into_iter().collect()
}

fn deduplicate_by_message(errors: Vec<RawValidationError>) -> Vec<RawValidationError> {
    let mut seen: Vec<String> = Vec::new();
    errors
        .into_iter()
        .filter(|e| {
            if seen.contains(&e.message) {
                false
            } else {
                seen.push(e.message.clone());
                true
            }
        })
        .collect()
}

fn is_required_value_error(err: &RawValidationError) -> bool {
    err.rule == "required" && err.rule_value == Value::Array(vec![Value::String("value".into())])
}

/// The distinct rules present in a group, first-seen order.
pub fn rules_in(errors: &[RawValidationError]) -> Vec<&str> {
    group_by_rule(errors).keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{ParentRef, PathSegment};
    use serde_json::json;

    fn raw(path: &[&str], rule: &str, rule_value: Value, instance: Value, message: &str) -> RawValidationError {
        RawValidationError {
            path: path.iter().map(|p| PathSegment::Key(p.to_string())).collect(),
            rule: rule.to_string(),
            rule_value,
            instance,
            message: message.to_string(),
            schema_path: String::new(),
            parent: None,
            context: Vec::new(),
        }
    }

    struct NoTypes;
    impl TypeLookup for NoTypes {
        fn field_names(&self, _name: &str) -> Option<Vec<String>> {
            None
        }
    }

    fn render(groups: ErrorGroups) -> String {
        SchemaValidationError::new(groups, &NoTypes, "Chart", &[], &Settings::default())
            .message()
            .to_string()
    }

    #[test]
    fn test_leaves_flatten_nested_context() {
        let mut inner = raw(&["a"], "anyOf", json!([]), json!(1), "inner union");
        inner.context = vec![
            raw(&["a"], "type", json!("string"), json!(1), "not a string"),
            raw(&["a"], "enum", json!(["x"]), json!(1), "not x"),
        ];
        let mut outer = raw(&[], "anyOf", json!([]), json!({}), "outer union");
        outer.context = vec![inner, raw(&[], "required", json!(["b"]), json!({}), "b missing")];
        let out = leaves(vec![outer]);
        let messages: Vec<&str> = out.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["not a string", "not x", "b missing"]);
    }

    #[test]
    fn test_path_specificity() {
        let groups = group_by_json_path(vec![
            raw(&["encoding", "x"], "type", json!("object"), json!(1), "parent"),
            raw(&["encoding", "x", "type"], "enum", json!(["a"]), json!("b"), "child"),
        ]);
        let specific = subset_to_most_specific_paths(groups);
        assert_eq!(specific.keys().collect::<Vec<_>>(), ["$.encoding.x.type"]);
    }

    #[test]
    fn test_enum_dedup_keeps_maximal_set() {
        let errors = vec![
            raw(&["mark"], "enum", json!(["A", "B"]), json!("Z"), "short"),
            raw(&["mark"], "enum", json!(["A", "B", "C"]), json!("Z"), "long"),
        ];
        let groups = consolidate(errors);
        let kept = &groups["$.mark"];
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rule_value, json!(["A", "B", "C"]));
        let message = render(groups);
        assert!(message.contains("one of ['A', 'B', 'C']"), "{message}");
        assert!(!message.contains("one of ['A', 'B']"), "{message}");
    }

    #[test]
    fn test_additional_properties_dedup_under_shared_any_of() {
        let parent = ParentRef { id: 7, rule: "anyOf".into() };
        let mut errors = vec![
            raw(&["x"], "additionalProperties", json!(false), json!({}), "Additional properties are not allowed ('field', 'unknown' were unexpected)"),
            raw(&["x"], "additionalProperties", json!(false), json!({}), "Additional properties are not allowed ('unknown' was unexpected)"),
            raw(&["x"], "additionalProperties", json!(false), json!({}), "Additional properties are not allowed ('field', 'type', 'unknown' were unexpected)"),
        ];
        for e in &mut errors {
            e.parent = Some(parent.clone());
        }
        let groups = consolidate(errors);
        assert_eq!(groups["$.x"].len(), 1);
        assert!(groups["$.x"][0].message.contains("('unknown' was unexpected)"));
    }

    #[test]
    fn test_additional_properties_without_shared_parent_kept() {
        let errors = vec![
            raw(&["x"], "additionalProperties", json!(false), json!({}), "Additional properties are not allowed ('a' was unexpected)"),
            raw(&["x"], "additionalProperties", json!(false), json!({}), "Additional properties are not allowed ('b' was unexpected)"),
        ];
        assert_eq!(consolidate(errors)["$.x"].len(), 2);
    }

    #[test]
    fn test_message_dedup_keeps_first() {
        let errors = vec![
            raw(&["x"], "minimum", json!(0), json!(-1), "-1 is less than the minimum of 0"),
            raw(&["x"], "minimum", json!(0), json!(-1), "-1 is less than the minimum of 0"),
        ];
        assert_eq!(consolidate(errors)["$.x"].len(), 1);
    }

    #[test]
    fn test_required_value_false_positive_dropped() {
        let errors = vec![
            raw(&["color"], "required", json!(["value"]), json!({}), "\"value\" is a required property"),
            raw(&["color"], "type", json!("string"), json!({}), "{} is not of type \"string\""),
        ];
        let groups = consolidate(errors);
        assert_eq!(rules_in(&groups["$.color"]), ["type"]);
    }

    #[test]
    fn test_other_required_errors_kept() {
        let errors = vec![raw(&[], "required", json!(["value", "field"]), json!({}), "\"field\" is a required property")];
        assert_eq!(consolidate(errors)["$"].len(), 1);
    }

    #[test]
    fn test_fully_filtered_failure_is_not_silent() {
        let errors = vec![raw(&["c"], "required", json!(["value"]), json!({}), "\"value\" is a required property")];
        let groups = consolidate(errors);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_cap_at_three_sections() {
        let errors: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|p| raw(&[p], "type", json!("string"), json!(1), "1 is not of type \"string\""))
            .collect();
        let groups = consolidate(errors);
        assert_eq!(groups.len(), 5);
        let message = render(groups);
        assert!(message.starts_with("Multiple errors were found.\n\n"));
        assert!(message.contains("Error 3: "));
        assert!(!message.contains("Error 4: "));
        assert_eq!(message.matches("is an invalid value").count(), 3);
    }

    #[test]
    fn test_default_message_shape() {
        let errors = vec![
            raw(&["mark", "type"], "enum", json!(["bar", "line"]), json!("pie"), "\"pie\" is not one of [\"bar\",\"line\"]"),
            raw(&["mark", "type"], "type", json!("object"), json!("pie"), "\"pie\" is not of type \"object\""),
        ];
        let message = render(consolidate(errors));
        assert_eq!(
            message,
            "'pie' is an invalid value for `type`. Valid values are:\n\n\
             - one of ['bar', 'line']\n\
             - of type 'object'"
        );
    }

    #[test]
    fn test_type_points_joined() {
        let errors = vec![
            raw(&["v"], "type", json!("string"), json!([]), "a"),
            raw(&["v"], "type", json!("number"), json!([]), "b"),
            raw(&["v"], "type", json!("null"), json!([]), "c"),
        ];
        let message = render(consolidate(errors));
        assert!(message.ends_with("Valid values are of type 'string', 'number', or 'null'."), "{message}");
    }

    #[test]
    fn test_fallback_rule_message_appended() {
        let errors = vec![raw(&["size"], "minimum", json!(0), json!(-5), "-5 is less than the minimum of 0")];
        let message = render(consolidate(errors));
        assert_eq!(message, "'-5' is an invalid value for `size`.\n\n-5 is less than the minimum of 0");
    }

    #[test]
    fn test_unknown_field_uses_path_type() {
        struct Known;
        impl TypeLookup for Known {
            fn field_names(&self, name: &str) -> Option<Vec<String>> {
                (name == "Encoding").then(|| vec!["x".to_string(), "y".to_string()])
            }
        }
        let errors = vec![raw(
            &["encoding"],
            "additionalProperties",
            json!(false),
            json!({"z": 1}),
            "Additional properties are not allowed ('z' was unexpected)",
        )];
        let err = SchemaValidationError::new(consolidate(errors), &Known, "Chart", &[], &Settings::default());
        let message = err.message();
        assert!(message.starts_with("`Encoding` has no parameter named 'z'"), "{message}");
        assert!(message.contains("Existing parameter names are:\nx   y   \n"), "{message}");
        assert!(message.ends_with("See the help for `Encoding` to read the full description of these parameters"));
        assert_eq!(err.type_name(), "Chart");
    }

    #[test]
    fn test_root_definitions_lookup() {
        let root = json!({
            "definitions": {
                "Encoding": {"type": "object", "properties": {"x": {}, "color": {}}},
                "Alias": {"$ref": "#/definitions/Encoding"}
            }
        });
        let lookup = RootDefinitions(&root);
        assert_eq!(lookup.field_names("Encoding"), Some(vec!["x".to_string(), "color".to_string()]));
        assert_eq!(lookup.field_names("Alias").map(|f| f.len()), Some(2));
        assert_eq!(lookup.field_names("Missing"), None);
    }

    #[test]
    fn test_enum_scenario_end_to_end() {
        let schema = json!({"enum": ["a", "b"]});
        let err = validate_document(&json!("c"), &schema, &schema, &Settings::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("one of ['a', 'b']"), "{message}");
        assert!(message.starts_with("'c' is an invalid value"), "{message}");
    }

    #[test]
    fn test_additional_properties_scenario_end_to_end() {
        let schema = json!({"title": "Point", "additionalProperties": false, "properties": {"x": {}}});
        let err = validate_document(&json!({"x": 1, "y": 2}), &schema, &schema, &Settings::default()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("has no parameter named 'y'"), "{message}");
        assert!(message.contains("Existing parameter names are:\nx"), "{message}");
        assert!(message.contains("`Point`"), "{message}");
    }

    #[test]
    fn test_valid_document_passes() {
        let schema = json!({"type": "object"});
        assert!(validate_document(&json!({}), &schema, &schema, &Settings::default()).is_ok());
    }
}
