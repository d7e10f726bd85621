//! Rendering of consolidated error groups into the user-facing diagnostic.

use docmodel_core::Settings;
use indexmap::IndexMap;
use serde_json::Value;

use crate::consolidate::{ErrorGroups, TypeLookup};
use crate::validate::{PathSegment, RawValidationError};

/// The type an error is reported against when no better one is found.
pub(crate) struct FallbackType<'a> {
    pub name: &'a str,
    pub field_names: &'a [String],
}

/// Render at most `settings.max_error_groups` groups, numbering them when
/// more than one survives.
pub(crate) fn render(
    groups: &ErrorGroups,
    lookup: &dyn TypeLookup,
    fallback: &FallbackType<'_>,
    settings: &Settings,
) -> String {
    let sections: Vec<String> = groups
        .values()
        .filter(|errors| !errors.is_empty())
        .take(settings.max_error_groups)
        .map(|errors| group_message(errors, lookup, fallback, settings))
        .collect();

    if sections.len() > 1 {
        let numbered: Vec<String> = sections
            .iter()
            .enumerate()
            .map(|(i, m)| indent_second_line_onwards(&format!("Error {}: {m}", i + 1), 4))
            .collect();
        format!("Multiple errors were found.\n\n{}", numbered.join("\n\n"))
    } else {
        sections.join("\n\n")
    }
}

fn group_message(
    errors: &[RawValidationError],
    lookup: &dyn TypeLookup,
    fallback: &FallbackType<'_>,
    settings: &Settings,
) -> String {
    // Only the first error is consulted: an unknown field is reported alone
    // for its path.
    let message = if errors[0].rule == "additionalProperties" {
        additional_properties_message(&errors[0], lookup, fallback, settings)
    } else {
        default_message(errors)
    };
    message.trim().to_string()
}

fn additional_properties_message(
    error: &RawValidationError,
    lookup: &dyn TypeLookup,
    fallback: &FallbackType<'_>,
    settings: &Settings,
) -> String {
    let (type_name, field_names) = type_for_error(error, lookup)
        .unwrap_or_else(|| (fallback.name.to_string(), fallback.field_names.to_vec()));
    let table = format_names_as_table(&field_names, settings.table_width);
    let parameter = unexpected_name(error, &field_names);
    format!(
        "`{type_name}` has no parameter named '{parameter}'\n\n\
         Existing parameter names are:\n\
         {table}\n\
         See the help for `{type_name}` to read the full description of these parameters"
    )
}

/// Walk the path from the leaf upwards to the nearest segment naming a
/// known wrapper type (`encoding` names `Encoding`).
fn type_for_error(error: &RawValidationError, lookup: &dyn TypeLookup) -> Option<(String, Vec<String>)> {
    error.path.iter().rev().find_map(|segment| {
        let PathSegment::Key(key) = segment else {
            return None;
        };
        let candidate = capitalize(key)?;
        lookup.field_names(&candidate).map(|fields| (candidate, fields))
    })
}

fn capitalize(key: &str) -> Option<String> {
    let mut chars = key.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// The offending field name from "Additional properties are not allowed
/// ('name' was unexpected)", else the first instance key the type lacks.
fn unexpected_name(error: &RawValidationError, field_names: &[String]) -> String {
    if let Some((_, tail)) = error.message.rsplit_once("('") {
        if let Some(name) = tail.split('\'').next() {
            return name.to_string();
        }
    }
    error
        .instance
        .as_object()
        .and_then(|map| map.keys().find(|k| !field_names.contains(k)))
        .cloned()
        .unwrap_or_default()
}

fn default_message(errors: &[RawValidationError]) -> String {
    let by_rule = group_by_rule(errors);
    let mut points: Vec<String> = Vec::new();

    if let Some(enums) = by_rule.get("enum") {
        for e in enums {
            points.push(format!("one of {}", quoted_repr(&e.rule_value)));
        }
    }

    if let Some(types) = by_rule.get("type") {
        let types: Vec<String> = types
            .iter()
            .map(|e| format!("'{}'", plain_str(&e.rule_value)))
            .collect();
        let listed = match types.as_slice() {
            [one] => one.clone(),
            [a, b] => format!("{a} or {b}"),
            [init @ .., last] => format!("{}, or {last}", init.join(", ")),
            [] => String::new(),
        };
        points.push(format!("of type {listed}"));
    }

    let error = &errors[0];
    let mut message = format!("'{}' is an invalid value", plain_str(&error.instance));
    if let Some(last) = error.path.last() {
        message.push_str(&format!(" for `{last}`"));
    }

    match points.as_slice() {
        [] => message.push_str(".\n\n"),
        [point] => message.push_str(&format!(". Valid values are {point}.\n\n")),
        _ => {
            message.push_str(". Valid values are:\n\n");
            let bullets: Vec<String> = points.iter().map(|p| format!("- {p}")).collect();
            message.push_str(&bullets.join("\n"));
            message.push_str("\n\n");
        }
    }

    // Anything else is passed through verbatim.
    for (rule, errs) in &by_rule {
        if *rule != "enum" && *rule != "type" {
            let raw: Vec<&str> = errs.iter().map(|e| e.message.as_str()).collect();
            message.push_str(&raw.join("\n"));
        }
    }
    message
}

pub(crate) fn group_by_rule(errors: &[RawValidationError]) -> IndexMap<&str, Vec<&RawValidationError>> {
    let mut by_rule: IndexMap<&str, Vec<&RawValidationError>> = IndexMap::new();
    for e in errors {
        by_rule.entry(e.rule.as_str()).or_default().push(e);
    }
    by_rule
}

/// Lay names out in near-square columns: `min(width / longest, ceil(sqrt(n)))`
/// columns of roughly equal height, each padded to its widest name plus 3.
pub(crate) fn format_names_as_table(names: &[String], max_width: usize) -> String {
    if names.is_empty() {
        return String::new();
    }
    let longest = names.iter().map(|n| n.chars().count()).max().unwrap_or(1).max(1);
    let count = names.len();
    let square = (count as f64).sqrt().ceil() as usize;
    let columns = (max_width / longest).min(square).max(1);

    let heights: Vec<usize> = (0..columns)
        .map(|c| count / columns + usize::from(c < count % columns))
        .collect();

    let mut cols: Vec<&[String]> = Vec::with_capacity(columns);
    let mut start = 0;
    for h in &heights {
        cols.push(&names[start..start + h]);
        start += h;
    }
    let widths: Vec<usize> = cols
        .iter()
        .map(|col| col.iter().map(|n| n.chars().count()).max().unwrap_or(0))
        .collect();

    let mut table = String::new();
    for row in 0..heights[0] {
        for (c, col) in cols.iter().enumerate() {
            let name = col.get(row).map(String::as_str).unwrap_or("");
            table.push_str(&format!("{name:<width$}", width = widths[c] + 3));
        }
        table.push('\n');
    }
    table
}

fn indent_second_line_onwards(message: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    message
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i > 0 && !line.is_empty() {
                format!("{pad}{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a value the way the diagnostics quote it: `['a', 'b']`, `True`, `None`.
pub(crate) fn quoted_repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(quoted_repr).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", quote(k), quoted_repr(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

/// Like [`quoted_repr`], but strings are left unquoted.
pub(crate) fn plain_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => quoted_repr(other),
    }
}

fn quote(s: &str) -> String {
    if s.contains('\'') && !s.contains('"') {
        format!("\"{s}\"")
    } else {
        format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_single_name() {
        assert_eq!(format_names_as_table(&names(&["x"]), 80), "x   \n");
    }

    #[test]
    fn test_table_near_square() {
        // 5 names -> ceil(sqrt(5)) = 3 columns with heights 2, 2, 1.
        let table = format_names_as_table(&names(&["a", "bb", "c", "d", "eee"]), 80);
        let expected = format!("a    c   eee   \nbb   d   {}\n", " ".repeat(6));
        assert_eq!(table, expected);
    }

    #[test]
    fn test_table_width_limits_columns() {
        // Longest name 10 wide, width 20 -> at most 2 columns.
        let list = names(&["aaaaaaaaaa", "b", "c", "d", "e", "f", "g", "h", "i"]);
        let table = format_names_as_table(&list, 20);
        let first_row = table.lines().next().unwrap();
        assert_eq!(first_row.split_whitespace().count(), 2);
        assert_eq!(table.lines().count(), 5);
    }

    #[test]
    fn test_quoted_repr() {
        assert_eq!(quoted_repr(&json!(["a", "b"])), "['a', 'b']");
        assert_eq!(quoted_repr(&json!([null, true, 1.5])), "[None, True, 1.5]");
        assert_eq!(quoted_repr(&json!({"k": "it's"})), "{'k': \"it's\"}");
        assert_eq!(plain_str(&json!("plain")), "plain");
    }

    #[test]
    fn test_indent_second_line_onwards() {
        assert_eq!(indent_second_line_onwards("a\nb\n\nc", 2), "a\n  b\n\n  c");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("encoding").as_deref(), Some("Encoding"));
        assert_eq!(capitalize(""), None);
    }
}
