//! Validation of the schema against the constraints of C++.

use graphable_core::{Property, Schema, SchemaError, naming};
use indexmap::IndexMap;

use super::naming as cpp_naming;

/// Keywords of C++17 which must not appear as generated identifiers.
const KEYWORDS: &[&str] = &[
    "alignas",
    "alignof",
    "and",
    "and_eq",
    "asm",
    "auto",
    "bitand",
    "bitor",
    "bool",
    "break",
    "case",
    "catch",
    "char",
    "char16_t",
    "char32_t",
    "class",
    "compl",
    "const",
    "const_cast",
    "constexpr",
    "continue",
    "decltype",
    "default",
    "delete",
    "do",
    "double",
    "dynamic_cast",
    "else",
    "enum",
    "explicit",
    "export",
    "extern",
    "false",
    "float",
    "for",
    "friend",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "mutable",
    "namespace",
    "new",
    "noexcept",
    "not",
    "not_eq",
    "nullptr",
    "operator",
    "or",
    "or_eq",
    "private",
    "protected",
    "public",
    "register",
    "reinterpret_cast",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "static_cast",
    "struct",
    "switch",
    "template",
    "this",
    "thread_local",
    "throw",
    "true",
    "try",
    "typedef",
    "typeid",
    "typename",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "while",
    "xor",
    "xor_eq",
];

fn is_keyword(identifier: &str) -> bool {
    KEYWORDS.contains(&identifier)
}

/// Validate that the schema can be expressed in C++.
pub fn validate_schema(schema: &Schema) -> Vec<SchemaError> {
    let graph = &schema.graph;
    let mut errors = Vec::new();

    for cls in graph.classes.values() {
        errors.extend(validate_properties(&cls.properties, true));
    }

    for embed in graph.embeds.values() {
        errors.extend(validate_properties(&embed.properties, false));
    }

    errors.extend(validate_properties(&graph.properties, false));

    // The registry of each class appears as a field of the graph named
    // after the plural of the class.
    for cls in graph.classes.values() {
        let registry_field = cpp_naming::as_field(&cls.plural);

        if is_keyword(&registry_field) {
            errors.push(SchemaError::new(
                &cls.ref_path,
                format!(
                    "The C++ field identifier '{registry_field}' corresponding to \
                     the registry of the class '{}' in the object graph \
                     is a reserved keyword in C++",
                    cls.name
                ),
            ));
        }

        for prop in graph.properties.values() {
            if cpp_naming::as_field(&prop.name) == registry_field {
                errors.push(SchemaError::new(
                    &cls.ref_path,
                    format!(
                        "The C++ field identifier '{registry_field}' corresponding \
                         to the registry of the class '{}' in the object graph \
                         conflicts with another C++ field corresponding to \
                         a property of the object graph ({})",
                        cls.name, prop.ref_path
                    ),
                ));
            }
        }
    }

    // Composite names must not collapse under the C++ casing either.
    let mut seen_composites: IndexMap<String, &str> = IndexMap::new();
    let composite_names = graph
        .classes
        .values()
        .map(|cls| (&cls.name, &cls.ref_path))
        .chain(graph.embeds.values().map(|embed| (&embed.name, &embed.ref_path)));
    for (name, ref_path) in composite_names {
        let composite = naming::upper_camel(name);
        if let Some(first_ref) = seen_composites.get(&composite) {
            errors.push(SchemaError::new(
                *first_ref,
                format!(
                    "The C++ type identifier '{composite}' conflicts \
                     another type ({ref_path})"
                ),
            ));
        } else {
            seen_composites.insert(composite, ref_path);
        }
    }

    errors
}

/// Check the properties of a single composite.
fn validate_properties(
    properties: &IndexMap<String, Property>,
    in_class: bool,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen: IndexMap<String, &str> = IndexMap::new();

    for prop in properties.values() {
        let field = cpp_naming::as_field(&prop.name);

        if is_keyword(&field) {
            errors.push(SchemaError::new(
                &prop.ref_path,
                format!("The C++ field identifier '{field}' is a keyword in C++"),
            ));
        }

        if in_class && field == "id" {
            errors.push(SchemaError::new(
                &prop.ref_path,
                "The C++ field identifier 'id' is reserved for class identifiers \
                 and used by the autogenerated code",
            ));
        }

        if let Some(first_ref) = seen.get(&field) {
            errors.push(SchemaError::new(
                *first_ref,
                format!(
                    "The C++ field identifier '{field}' conflicts \
                     another field ({})",
                    prop.ref_path
                ),
            ));
        } else {
            seen.insert(field, &prop.ref_path);
        }
    }

    errors
}
