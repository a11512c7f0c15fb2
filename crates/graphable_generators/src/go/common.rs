//! Rendering helpers for the Go emitters.

use std::collections::BTreeSet;

use graphable_core::{ValueType, naming};

pub(crate) const WARNING: &str =
    "// File automatically generated by graphable. DO NOT EDIT OR APPEND!";

/// Comment out the given text.
pub(crate) fn comment(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                "//".to_string()
            } else {
                format!("// {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate the import declaration for the given import set.
///
/// The imports are emitted sorted; an empty set yields an empty string.
pub(crate) fn import_declarations(import_set: &BTreeSet<&str>) -> String {
    match import_set.len() {
        0 => String::new(),
        1 => {
            let import = import_set.iter().next().unwrap_or(&"");
            format!("import \"{import}\"")
        }
        _ => {
            let mut code = "import (\n".to_string();
            for import in import_set {
                code.push_str(&format!("    \"{import}\"\n"));
            }
            code.push(')');
            code
        }
    }
}

/// Translate the text into a double-quoted Go string literal.
pub(crate) fn escaped_str(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    result.push('"');
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c => result.push(c),
        }
    }
    result.push('"');

    result
}

/// Translate the text into a backtick-quoted Go string literal, falling
/// back to a double-quoted literal when the text contains a backtick.
pub(crate) fn ticked_str(text: &str) -> String {
    if text.contains('`') {
        escaped_str(text)
    } else {
        format!("`{text}`")
    }
}

/// Generate the Go type of the given value type.
pub(crate) fn type_repr(value_type: &ValueType) -> String {
    match value_type {
        ValueType::Boolean => "bool".to_string(),
        ValueType::Integer { .. } => "int64".to_string(),
        ValueType::Float { .. } => "float64".to_string(),
        ValueType::String { .. } | ValueType::Path { .. } => "string".to_string(),
        ValueType::Date { .. } | ValueType::Time { .. } | ValueType::Datetime { .. } => {
            "time.Time".to_string()
        }
        ValueType::TimeZone => "*time.Location".to_string(),
        ValueType::Duration => "time.Duration".to_string(),
        ValueType::Array { values, .. } => format!("[]{}", type_repr(values)),
        ValueType::Map { values } => format!("map[string]{}", type_repr(values)),
        ValueType::ClassRef { name } => format!("*{}", naming::upper_camel(name)),
        ValueType::EmbedRef { name } => naming::upper_camel(name),
    }
}

/// Check whether the Go representation of the type already is a pointer.
///
/// Optional properties of pointer types are stored as-is; the other
/// optional properties are wrapped in a pointer.
pub(crate) fn is_pointer_type(value_type: &ValueType) -> bool {
    matches!(value_type, ValueType::ClassRef { .. } | ValueType::TimeZone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_declarations() {
        assert_eq!(import_declarations(&BTreeSet::new()), "");
        assert_eq!(
            import_declarations(&BTreeSet::from(["time"])),
            "import \"time\""
        );
        assert_eq!(
            import_declarations(&BTreeSet::from(["strings", "fmt"])),
            "import (\n    \"fmt\"\n    \"strings\"\n)"
        );
    }

    #[test]
    fn test_escaped_str() {
        assert_eq!(escaped_str("abc"), "\"abc\"");
        assert_eq!(escaped_str("a\"b"), "\"a\\\"b\"");
        assert_eq!(escaped_str("a\\d"), "\"a\\\\d\"");
    }

    #[test]
    fn test_ticked_str() {
        assert_eq!(ticked_str("^[a-z]+$"), "`^[a-z]+$`");
        assert_eq!(ticked_str("a`b"), "\"a`b\"");
    }
}
