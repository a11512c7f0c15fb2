//! Validation of the schema against the constraints of Go.

use graphable_core::{Property, Schema, SchemaError, naming};
use indexmap::IndexMap;

/// Validate that the schema can be expressed in Go.
///
/// The generated struct fields are exported (UpperCamelCase), so keywords
/// are not an issue; what can break is two identifiers collapsing to the
/// same field name and the reserved `ID` field of a class.
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

    // The registry of each class appears as a field of the graph struct
    // named after the plural of the class.
    for cls in graph.classes.values() {
        let registry_field = naming::upper_camel(&cls.plural);

        for prop in graph.properties.values() {
            if naming::upper_camel(&prop.name) == registry_field {
                errors.push(SchemaError::new(
                    &cls.ref_path,
                    format!(
                        "The Go field identifier {registry_field:?} corresponding \
                         to the registry of the class {:?} in the object graph \
                         conflicts with another Go field corresponding to \
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
        let field = naming::upper_camel(&prop.name);

        if in_class && field == "ID" {
            errors.push(SchemaError::new(
                &prop.ref_path,
                "The Go field identifier \"ID\" is reserved for class identifiers \
                 and used by the autogenerated code",
            ));
        }

        if let Some(first_ref) = seen.get(&field) {
            errors.push(SchemaError::new(
                *first_ref,
                format!(
                    "The Go field identifier {field:?} conflicts \
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
