//! Integration tests for the schema loader and validators.

use graphable_core::schema::{referenced_classes, validate};
use graphable_core::{LoadError, ValueType, schema_from_value};
use serde_json::json;

fn assert_single_error(value: &serde_json::Value, ref_path: &str, message_prefix: &str) {
    let errors = validate::validate(value, "#");
    assert_eq!(errors.len(), 1, "expected a single error, got: {errors:?}");
    assert_eq!(errors[0].ref_path, ref_path);
    assert!(
        errors[0].message.starts_with(message_prefix),
        "expected the message to start with {message_prefix:?}, got: {:?}",
        errors[0].message
    );
}

#[test]
fn test_empty_graph() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph."
    });

    let schema = schema_from_value(&value, "#").unwrap();
    assert_eq!(schema.graph.name, "Some_graph");
    assert_eq!(schema.graph.description, "defines some object graph.");
    assert!(schema.graph.classes.is_empty());
    assert!(schema.graph.embeds.is_empty());
    assert!(schema.graph.properties.is_empty());
    assert!(schema.cpp.is_none());
    assert!(schema.go.is_none());
    assert!(schema.py.is_none());
}

#[test]
fn test_loads_classes_embeds_and_properties_in_order() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Some_URL",
                "description": "defines a class.",
                "properties": {
                    "zulu": {
                        "type": "boolean",
                        "description": "comes last in the code, first here."
                    },
                    "alpha": {
                        "type": "integer",
                        "description": "comes first in the code, last here."
                    }
                }
            }
        ],
        "embeds": [
            {
                "name": "Some_embed",
                "description": "defines an embeddable structure."
            }
        ],
        "properties": {
            "beta": {
                "type": "float",
                "description": "gives some number."
            }
        }
    });

    let schema = schema_from_value(&value, "#").unwrap();
    let graph = &schema.graph;

    let cls = &graph.classes["Some_URL"];
    assert_eq!(cls.plural, "Some_URLs");
    assert_eq!(cls.ref_path, "#/classes/0");

    // Insertion order of the document is preserved
    let property_names: Vec<&String> = cls.properties.keys().collect();
    assert_eq!(property_names, vec!["zulu", "alpha"]);

    assert!(graph.embeds.contains_key("Some_embed"));

    let beta = &graph.properties["beta"];
    assert_eq!(beta.ref_path, "#/beta");
    assert_eq!(beta.json, "beta");
    assert!(!beta.optional);
    assert_eq!(beta.owner, "Some_graph");
}

#[test]
fn test_forward_reference_between_composites() {
    // Alpha refers to Beta which is defined later in the document.
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Alpha",
                "description": "defines a class.",
                "properties": {
                    "next": {
                        "type": "Beta",
                        "description": "references an instance defined later."
                    }
                }
            },
            {
                "name": "Beta",
                "description": "defines another class."
            }
        ]
    });

    let schema = schema_from_value(&value, "#").unwrap();
    let alpha = &schema.graph.classes["Alpha"];

    match &alpha.properties["next"].value_type {
        ValueType::ClassRef { name } => assert_eq!(name, "Beta"),
        other => panic!("expected a class reference, got: {other:?}"),
    }

    let references = referenced_classes(&schema.graph, &alpha.properties);
    assert_eq!(
        references.iter().map(|cls| cls.name.as_str()).collect::<Vec<_>>(),
        vec!["Beta"]
    );
}

#[test]
fn test_transitive_references_are_sorted() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Zulu",
                "description": "defines a class."
            },
            {
                "name": "Alpha",
                "description": "defines a class referring to Zulu.",
                "properties": {
                    "zulu": {
                        "type": "Zulu",
                        "description": "references an instance."
                    }
                }
            }
        ],
        "embeds": [
            {
                "name": "Wrapper",
                "description": "defines an embed referring to Alpha.",
                "properties": {
                    "alpha": {
                        "type": "Alpha",
                        "description": "references an instance."
                    }
                }
            }
        ]
    });

    let schema = schema_from_value(&value, "#").unwrap();
    let wrapper = &schema.graph.embeds["Wrapper"];

    // Alpha is referenced directly, Zulu transitively; sorted by name.
    let references = referenced_classes(&schema.graph, &wrapper.properties);
    assert_eq!(
        references.iter().map(|cls| cls.name.as_str()).collect::<Vec<_>>(),
        vec!["Alpha", "Zulu"]
    );
}

#[test]
fn test_settings_are_parsed() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "cpp": {
            "namespace": "some::graph",
            "path_as": "std::filesystem::path",
            "optional_as": "std::optional",
            "datetime_library": "ctime"
        },
        "go": {
            "package": "somegraph"
        },
        "py": {
            "module_name": "some_graph",
            "path_as": "pathlib.Path",
            "timezone_as": "pytz.timezone"
        }
    });

    let schema = schema_from_value(&value, "#").unwrap();

    let cpp = schema.cpp.unwrap();
    assert_eq!(cpp.namespace, "some::graph");
    assert_eq!(cpp.indention, "  ");

    assert_eq!(schema.go.unwrap().package, "somegraph");

    let py = schema.py.unwrap();
    assert_eq!(py.module_name, "some_graph");
    assert_eq!(py.indention, "    ");
}

#[test]
fn test_json_decode_error() {
    let result = graphable_core::schema_from_str("{\"name\": ");
    match result {
        Err(LoadError::Json { line, .. }) => assert_eq!(line, 1),
        other => panic!("expected a json error, got: {other:?}"),
    }
}

#[test]
fn test_structural_violation() {
    let value = json!({
        "name": "lowercase",
        "description": "defines some object graph."
    });

    let errors = validate::validate(&value, "#");
    assert!(!errors.is_empty());
    assert!(errors[0].message.starts_with("Does not follow json schema:"));
}

#[test]
fn test_name_must_come_first() {
    let value = json!({
        "description": "defines some object graph.",
        "name": "Some_graph"
    });

    let errors = validate::validate(&value, "#");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].ref_path, "#/name");
    assert!(
        errors[0]
            .message
            .starts_with("Expected name to be the first property")
    );
}

#[test]
fn test_duplicate_names() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {"name": "Thing", "description": "defines a thing."}
        ],
        "embeds": [
            {"name": "Thing", "description": "defines a conflicting thing."}
        ]
    });

    assert_single_error(&value, "#/embeds/0/name", "Duplicate names: \"Thing\"");
}

#[test]
fn test_id_is_reserved() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Thing",
                "description": "defines a thing.",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "conflicts with the implicit identifier."
                    }
                }
            }
        ]
    });

    assert_single_error(
        &value,
        "#/classes/0/properties",
        "'id' is a reserved property of the class.",
    );
}

#[test]
fn test_integer_bounds() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "count": {
                "type": "integer",
                "description": "holds an impossible constraint.",
                "minimum": 3,
                "maximum": 1
            }
        }
    });

    assert_single_error(&value, "#/properties/count", "minimum (== 3) > maximum (== 1)");
}

#[test]
fn test_exclusive_bounds_on_equal_minimum_maximum() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "count": {
                "type": "integer",
                "description": "holds an impossible constraint.",
                "minimum": 3,
                "maximum": 3,
                "exclusive_minimum": true
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/count",
        "minimum (== 3) == maximum and minimum is set to exclusive",
    );
}

#[test]
fn test_array_size_bounds() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "items": {
                "type": "array",
                "description": "holds an impossible constraint.",
                "values": {"type": "string"},
                "minimum_size": 5,
                "maximum_size": 2
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/items/minimum_size",
        "Minimum size is larger than the maximum size: 5 > 2",
    );
}

#[test]
fn test_invalid_pattern() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "label": {
                "type": "string",
                "description": "holds a broken pattern.",
                "pattern": "["
            }
        }
    });

    let errors = validate::validate(&value, "#");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].ref_path, "#/properties/label/pattern");
}

#[test]
fn test_date_format_rejects_time_directives() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "day": {
                "type": "date",
                "description": "holds a mixed-up format.",
                "format": "%Y-%m-%d %H"
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/day/format",
        "Unexpected directive \"%H\" in a date format",
    );
}

#[test]
fn test_unsupported_directive() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "day": {
                "type": "date",
                "description": "holds an unsupported directive.",
                "format": "%j"
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/day/format",
        "unsupported directive(s): %j",
    );
}

#[test]
fn test_unknown_type() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "thing": {
                "type": "Unknown_thing",
                "description": "refers to an undefined composite."
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/thing/type",
        "Invalid type: Unknown_thing",
    );
}

#[test]
fn test_type_must_come_first() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "flag": {
                "description": "comes before the type tag.",
                "type": "boolean"
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/flag/type",
        "Expected 'type' at the top of the definition, but got description",
    );
}

#[test]
fn test_additional_property_rejected() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "flag": {
                "type": "boolean",
                "description": "carries an unexpected key.",
                "range": 3
            }
        }
    });

    assert_single_error(
        &value,
        "#/properties/flag",
        "Additional properties are not allowed (\"range\" was unexpected)",
    );
}

#[test]
fn test_plural_conflict_with_graph_property() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Thing",
                "description": "defines a thing."
            }
        ],
        "properties": {
            "things": {
                "type": "boolean",
                "description": "conflicts with the registry of Thing."
            }
        }
    });

    assert_single_error(
        &value,
        "#/things",
        "Graph property \"things\" conflicts with the plural necessary \
         for the registry of class \"Thing\"",
    );
}

#[test]
fn test_all_errors_are_collected() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Thing",
                "description": "defines a thing.",
                "id_pattern": "["
            }
        ],
        "properties": {
            "count": {
                "type": "integer",
                "description": "holds an impossible constraint.",
                "minimum": 3,
                "maximum": 1
            },
            "things": {
                "type": "boolean",
                "description": "conflicts with the registry of Thing."
            }
        }
    });

    let errors = validate::validate(&value, "#");
    assert_eq!(errors.len(), 3, "expected all violations, got: {errors:?}");
}

#[test]
fn test_invalid_schema_does_not_load() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "thing": {
                "type": "Unknown_thing",
                "description": "refers to an undefined composite."
            }
        }
    });

    match schema_from_value(&value, "#") {
        Err(LoadError::Invalid(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected the schema to be invalid, got: {other:?}"),
    }
}
