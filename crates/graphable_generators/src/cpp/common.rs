//! Rendering helpers for the C++ emitters.

use graphable_core::{Cpp, CppDatetimeLibrary, CppOptionalAs, CppPathAs, Graph, ValueType};

use super::naming;

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

/// Translate the text into a double-quoted C++ string literal.
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

/// Translate the text into a raw C++ string literal.
///
/// Used for regular expressions so that the pattern reads without double
/// escaping. The delimiter is chosen so that it can not occur in a
/// pattern terminator.
pub(crate) fn raw_string_literal(text: &str) -> String {
    if text.contains(")v0g0n(") {
        escaped_str(text)
    } else {
        format!("R\"v0g0n({text})v0g0n\"")
    }
}

/// The C++ type of the path representation.
pub(crate) fn path_type(cpp: &Cpp) -> &'static str {
    match cpp.path_as {
        CppPathAs::StdFilesystemPath => "std::filesystem::path",
        CppPathAs::BoostFilesystemPath => "boost::filesystem::path",
    }
}

/// The C++ template wrapping optional properties.
pub(crate) fn optional_type(cpp: &Cpp) -> &'static str {
    match cpp.optional_as {
        CppOptionalAs::BoostOptional => "boost::optional",
        CppOptionalAs::StdOptional => "std::optional",
        CppOptionalAs::ExperimentalOptional => "std::experimental::optional",
    }
}

/// Generate the C++ type of the given value type.
pub(crate) fn type_repr(value_type: &ValueType, cpp: &Cpp) -> String {
    match value_type {
        ValueType::Boolean => "bool".to_string(),
        ValueType::Integer { .. } => "int64_t".to_string(),
        ValueType::Float { .. } => "double".to_string(),
        ValueType::String { .. } => "std::string".to_string(),
        ValueType::Path { .. } => path_type(cpp).to_string(),
        ValueType::Date { .. } => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => "struct tm".to_string(),
            CppDatetimeLibrary::DateH => "date::local_days".to_string(),
        },
        ValueType::Time { .. } => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => "struct tm".to_string(),
            CppDatetimeLibrary::DateH => {
                "date::time_of_day<std::chrono::seconds>".to_string()
            }
        },
        ValueType::Datetime { .. } => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => "struct tm".to_string(),
            CppDatetimeLibrary::DateH => "date::local_seconds".to_string(),
        },
        ValueType::TimeZone => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => "std::string".to_string(),
            CppDatetimeLibrary::DateH => "const date::time_zone*".to_string(),
        },
        ValueType::Duration => "std::chrono::nanoseconds".to_string(),
        ValueType::Array { values, .. } => {
            format!("std::vector<{}>", type_repr(values, cpp))
        }
        ValueType::Map { values } => {
            format!("std::map<std::string, {}>", type_repr(values, cpp))
        }
        ValueType::ClassRef { name } => format!("{}*", naming::as_composite(name)),
        ValueType::EmbedRef { name } => naming::as_composite(name),
    }
}

/// Check whether any property of the graph is optional.
pub(crate) fn has_optional(graph: &Graph) -> bool {
    graph.all_properties().any(|prop| prop.optional)
}

/// Render the opening of the configured namespace, one line per part.
pub(crate) fn namespace_opening(cpp: &Cpp) -> String {
    cpp.namespace
        .split("::")
        .map(|part| format!("namespace {part} {{"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the closing of the configured namespace.
pub(crate) fn namespace_closing(cpp: &Cpp) -> String {
    cpp.namespace
        .split("::")
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .map(|part| format!("}}  // namespace {part}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_str() {
        assert_eq!(escaped_str("abc"), "\"abc\"");
        assert_eq!(escaped_str("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_raw_string_literal() {
        assert_eq!(raw_string_literal("^[a-z]+$"), "R\"v0g0n(^[a-z]+$)v0g0n\"");
    }

    #[test]
    fn test_comment() {
        assert_eq!(comment("does this.\nand that."), "// does this.\n// and that.");
    }
}
