//! Validation of the schema against the constraints of Python.

use graphable_core::{Property, Schema, SchemaError};
use indexmap::IndexMap;

use super::naming;

/// Keywords of Python 3 which must not appear as generated identifiers.
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

fn is_keyword(identifier: &str) -> bool {
    KEYWORDS.contains(&identifier)
}

/// Validate that the schema can be expressed in Python.
///
/// Checks that no generated attribute collides with a Python keyword, with
/// the reserved `id` attribute of a class or with another attribute once
/// the identifiers are normalized to Python casing.
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

    // The registry of each class appears as an attribute of the graph
    // named after the plural of the class.
    for cls in graph.classes.values() {
        let registry_attribute = naming::as_attribute(&cls.plural);

        if is_keyword(&registry_attribute) {
            errors.push(SchemaError::new(
                &cls.ref_path,
                format!(
                    "The Python attribute {registry_attribute:?} corresponding to \
                     the registry of the class {:?} in the object graph \
                     is a reserved keyword in Python",
                    cls.name
                ),
            ));
        }

        for prop in graph.properties.values() {
            if naming::as_attribute(&prop.name) == registry_attribute {
                errors.push(SchemaError::new(
                    &cls.ref_path,
                    format!(
                        "The Python attribute {registry_attribute:?} corresponding \
                         to the registry of the class {:?} in the object graph \
                         conflicts with another Python attribute corresponding to \
                         a property of the object graph ({})",
                        cls.name, prop.ref_path
                    ),
                ));
            }
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
        let attribute = naming::as_attribute(&prop.name);

        if is_keyword(&attribute) {
            errors.push(SchemaError::new(
                &prop.ref_path,
                format!("The Python attribute {attribute:?} is a keyword in Python"),
            ));
        }

        if in_class && attribute == "id" {
            errors.push(SchemaError::new(
                &prop.ref_path,
                "The Python attribute \"id\" is reserved for class identifiers \
                 and used by the autogenerated code",
            ));
        }

        if let Some(first_ref) = seen.get(&attribute) {
            errors.push(SchemaError::new(
                *first_ref,
                format!(
                    "The Python attribute {attribute:?} conflicts \
                     another attribute ({})",
                    prop.ref_path
                ),
            ));
        } else {
            seen.insert(attribute, &prop.ref_path);
        }
    }

    errors
}
