//! Rendering helpers for the Python emitters.
//!
//! This module plays the role of the per-target template environment: it
//! exposes exactly the filters the emitters need (comment and docstring
//! formatting, string literals, type representations) and sees nothing of
//! the schema beyond what it is passed.

use graphable_core::{Property, Py, PyPathAs, PyTimezoneAs, ValueType};
use indexmap::IndexMap;

use super::naming;

pub(crate) const WARNING: &str =
    "# File automatically generated by graphable. DO NOT EDIT OR APPEND!";

/// Comment out the given text.
pub(crate) fn comment(text: &str) -> String {
    let mut comment_lines = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            comment_lines.push("#".to_string());
        } else {
            comment_lines.push(format!("# {line}"));
        }
    }

    comment_lines.join("\n")
}

/// Translate the text into a Python docstring literal.
pub(crate) fn docstring(text: &str) -> String {
    assert!(!text.is_empty(), "Expected a non-empty docstring text");

    let has_backslash = text.contains('\\');
    let has_triple_quote = text.contains("\"\"\"");

    let (is_raw, content) = if has_triple_quote {
        (
            false,
            text.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\""),
        )
    } else {
        (has_backslash, text.to_string())
    };

    let mut parts = String::new();
    if is_raw {
        parts.push('r');
    }

    if content.lines().count() > 1 {
        parts.push_str("\"\"\"\n");
        parts.push_str(&content);
        parts.push_str("\n\"\"\"");
    } else {
        parts.push_str(&format!("\"\"\"{content}\"\"\""));
    }

    parts
}

/// Translate the text into a Python string literal.
///
/// Mirrors Python's own `repr`: single quotes by default, double quotes
/// when the text contains a single quote but no double quote.
pub(crate) fn string_literal(text: &str) -> String {
    let use_double = text.contains('\'') && !text.contains('"');
    let quote = if use_double { '"' } else { '\'' };

    let mut result = String::with_capacity(text.len() + 2);
    result.push(quote);
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c == quote => {
                result.push('\\');
                result.push(c);
            }
            c => result.push(c),
        }
    }
    result.push(quote);

    result
}

/// Generate the Python type annotation of the given value type.
pub(crate) fn type_repr(value_type: &ValueType, py: &Py) -> String {
    match value_type {
        ValueType::Boolean => "bool".to_string(),
        ValueType::Integer { .. } => "int".to_string(),
        ValueType::Float { .. } => "float".to_string(),
        ValueType::String { .. } => "str".to_string(),
        ValueType::Path { .. } => match py.path_as {
            PyPathAs::Str => "str".to_string(),
            PyPathAs::PathlibPath => "pathlib.Path".to_string(),
        },
        ValueType::Date { .. } => "datetime.date".to_string(),
        ValueType::Time { .. } => "datetime.time".to_string(),
        ValueType::Datetime { .. } => "datetime.datetime".to_string(),
        ValueType::TimeZone => match py.timezone_as {
            PyTimezoneAs::Str => "str".to_string(),
            PyTimezoneAs::PytzTimezone => "datetime.tzinfo".to_string(),
        },
        ValueType::Duration => "datetime.timedelta".to_string(),
        ValueType::Array { values, .. } => {
            format!("typing.List[{}]", type_repr(values, py))
        }
        ValueType::Map { values } => {
            format!("typing.MutableMapping[str, {}]", type_repr(values, py))
        }
        ValueType::ClassRef { name } | ValueType::EmbedRef { name } => {
            format!("{}.{}", py.module_name, naming::as_composite(name))
        }
    }
}

/// Stable-sort the properties of a composite by their `optional` flag,
/// required properties first.
pub(crate) fn order_by_optional(
    properties: &IndexMap<String, Property>,
) -> Vec<&Property> {
    let mut result: Vec<&Property> = properties.values().collect();
    result.sort_by_key(|prop| prop.optional);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment() {
        assert_eq!(comment("hello\nworld"), "# hello\n# world");
        assert_eq!(comment("hello\n\nworld"), "# hello\n#\n# world");
    }

    #[test]
    fn test_docstring_single_line() {
        assert_eq!(docstring("does something."), "\"\"\"does something.\"\"\"");
    }

    #[test]
    fn test_docstring_multi_line() {
        assert_eq!(
            docstring("does something.\n\nmore."),
            "\"\"\"\ndoes something.\n\nmore.\n\"\"\""
        );
    }

    #[test]
    fn test_docstring_raw() {
        assert_eq!(
            docstring("matches \\d."),
            "r\"\"\"matches \\d.\"\"\""
        );
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(string_literal("abc"), "'abc'");
        assert_eq!(string_literal("a'b"), "\"a'b\"");
        assert_eq!(string_literal("a\nb"), "'a\\nb'");
        assert_eq!(string_literal("a\\b"), "'a\\\\b'");
    }
}
