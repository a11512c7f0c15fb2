//! Integration tests for the target emitters.

use graphable_core::{Schema, schema_from_value};
use graphable_generators::{GenerateError, cpp, go, py};
use serde_json::json;

/// A schema covering every value type and all three targets.
fn pipeline_schema() -> Schema {
    let value = json!({
        "name": "Pipeline",
        "description": "defines a data processing pipeline.",
        "classes": [
            {
                "name": "Node",
                "description": "defines a processing node.",
                "id_pattern": "^[a-z]+$",
                "properties": {
                    "successor": {
                        "type": "Node",
                        "description": "references the next node.",
                        "optional": true
                    },
                    "tags": {
                        "type": "array",
                        "description": "lists the tags of the node.",
                        "values": {"type": "string"},
                        "minimum_size": 1
                    }
                }
            }
        ],
        "embeds": [
            {
                "name": "Window",
                "description": "defines a time window.",
                "properties": {
                    "start": {
                        "type": "time",
                        "description": "indicates the start of the window."
                    },
                    "length": {
                        "type": "duration",
                        "description": "indicates the length of the window."
                    }
                }
            }
        ],
        "properties": {
            "version": {
                "type": "integer",
                "description": "indicates the version.",
                "minimum": 0
            },
            "created": {
                "type": "datetime",
                "description": "indicates the creation time."
            },
            "workdir": {
                "type": "path",
                "description": "indicates the working directory."
            },
            "zone": {
                "type": "time_zone",
                "description": "indicates the time zone.",
                "optional": true
            },
            "limits": {
                "type": "map",
                "description": "maps resource names to limits.",
                "values": {"type": "float"}
            },
            "window": {
                "type": "Window",
                "description": "defines the observation window."
            },
            "root": {
                "type": "Node",
                "description": "references the root node.",
                "optional": true
            },
            "label": {
                "type": "string",
                "description": "labels the pipeline.",
                "pattern": "^[a-z]+$"
            },
            "ratio": {
                "type": "float",
                "description": "indicates some ratio.",
                "minimum": 0,
                "exclusive_minimum": true
            }
        },
        "cpp": {
            "namespace": "pipeline",
            "path_as": "std::filesystem::path",
            "optional_as": "std::optional",
            "datetime_library": "ctime"
        },
        "go": {
            "package": "pipeline"
        },
        "py": {
            "module_name": "pipeline",
            "path_as": "str",
            "timezone_as": "str"
        }
    });

    schema_from_value(&value, "#").unwrap()
}

fn content<'a>(files: &'a [graphable_generators::GeneratedFile], name: &str) -> &'a str {
    files
        .iter()
        .find(|file| file.name == name)
        .unwrap_or_else(|| panic!("expected the file {name} to be generated"))
        .content
        .as_str()
}

#[test]
fn test_py_file_set() {
    let schema = pipeline_schema();
    let files = py::generate(&schema).unwrap();

    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["__init__.py", "parse.py", "fromjsonable.py", "tojsonable.py"]
    );
}

#[test]
fn test_py_types() {
    let schema = pipeline_schema();
    let files = py::generate(&schema).unwrap();
    let types = content(&files, "__init__.py");

    assert!(types.contains("class Node:"));
    assert!(types.contains("class Window:"));
    assert!(types.contains("class Pipeline:"));
    assert!(types.contains("self.id = id"));
    assert!(types.contains("self.nodes = collections.OrderedDict()"));
    assert!(types.starts_with(
        "# File automatically generated by graphable. DO NOT EDIT OR APPEND!"
    ));
}

#[test]
fn test_py_parse() {
    let schema = pipeline_schema();
    let files = py::generate(&schema).unwrap();
    let parse = content(&files, "parse.py");

    assert!(parse.contains("class Error:"));
    assert!(parse.contains("class Errors:"));
    assert!(parse.contains("def placeholder_node(\n        id: str) -> pipeline.Node:"));
    assert!(parse.contains("def placeholder_window() -> pipeline.Window:"));
    assert!(parse.contains("def placeholder_pipeline() -> pipeline.Pipeline:"));
}

#[test]
fn test_py_fromjsonable() {
    let schema = pipeline_schema();
    let files = py::generate(&schema).unwrap();
    let fromjsonable = content(&files, "fromjsonable.py");

    assert!(fromjsonable.contains("def _node_from("));
    assert!(fromjsonable.contains("def node_from("));
    assert!(fromjsonable.contains("def pipeline_from("));
    assert!(fromjsonable.contains("nodes_registry"));

    // Two-phase parsing: registries are pre-allocated before any instance
    // is parsed, and pre-allocation errors are critical.
    assert!(fromjsonable.contains("# Pre-allocate nodes"));
    assert!(fromjsonable.contains("# Errors from pre-allocation are considered critical."));
    assert!(
        fromjsonable.contains("'Expected ID to match ^[a-z]+$, but got: ' + id")
    );

    assert!(
        fromjsonable.contains("'Reference to an instance of class Node not found: {}'")
    );
    assert!(fromjsonable.contains("_duration_from_string"));
    assert!(fromjsonable.contains("'Property is missing: version'"));
    assert!(fromjsonable.contains("if errors.full():"));

    // The pattern constraint of the label property
    assert!(fromjsonable.contains("'Expected to match ^[a-z]+$, but got: {}'"));
}

#[test]
fn test_py_tojsonable() {
    let schema = pipeline_schema();
    let files = py::generate(&schema).unwrap();
    let tojsonable = content(&files, "tojsonable.py");

    assert!(tojsonable.contains("def serialize_node("));
    assert!(tojsonable.contains("def serialize_window("));
    assert!(tojsonable.contains("def serialize_pipeline("));
    assert!(tojsonable.contains("_duration_to_string"));
    assert!(
        tojsonable
            .contains("'Expected ID {!r} of the instance of Node, but got: {!r}'")
    );
    assert!(tojsonable.contains("target['nodes'] = target_nodes"));
}

#[test]
fn test_go_file_set() {
    let schema = pipeline_schema();
    let files = go::generate(&schema).unwrap();

    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "types.go",
            "parse.go",
            "from_jsonable.go",
            "from_jsonable_test.go",
            "to_jsonable.go",
            "to_jsonable_test.go"
        ]
    );
}

#[test]
fn test_go_types() {
    let schema = pipeline_schema();
    let files = go::generate(&schema).unwrap();
    let types = content(&files, "types.go");

    assert!(types.starts_with("package pipeline\n"));
    assert!(types.contains("type Node struct {"));
    assert!(types.contains("type Window struct {"));
    assert!(types.contains("type Pipeline struct {"));
    assert!(types.contains("\tID string"));
    assert!(types.contains("\tNodes map[string]*Node"));
    // Optional non-pointer properties are emitted behind a pointer,
    // while pointer types stay as they are
    assert!(types.contains("\tRoot *Node"));
    assert!(types.contains("\tZone *time.Location"));
}

#[test]
fn test_go_fromjsonable() {
    let schema = pipeline_schema();
    let files = go::generate(&schema).unwrap();
    let fromjsonable = content(&files, "from_jsonable.go");

    assert!(fromjsonable.contains("func NodeFromJSONable("));
    assert!(fromjsonable.contains("func WindowFromJSONable("));
    assert!(fromjsonable.contains("func PipelineFromJSONable("));
    assert!(fromjsonable.contains("func durationFromString("));
    assert!(fromjsonable.contains("var pattern0 = regexp.MustCompile("));
    assert!(fromjsonable.contains("expected ID to match ^[a-z]+$, but got: %s"));
    assert!(
        fromjsonable.contains("reference to an instance of class Node not found: %s")
    );
    assert!(fromjsonable.contains("// Pre-allocating class instances is critical."));
}

#[test]
fn test_go_parse_and_duration_tests() {
    let schema = pipeline_schema();
    let files = go::generate(&schema).unwrap();

    let parse = content(&files, "parse.go");
    assert!(parse.contains("func NewErrors(cap uint64) (e *Errors) {"));
    assert!(parse.contains("func (e *Errors) Full() bool {"));

    let from_test = content(&files, "from_jsonable_test.go");
    assert!(from_test.contains("func ExampleDurationFromString_overflow() {"));
    assert!(from_test.contains("// Output: overflows in nanoseconds: P300Y"));

    let to_test = content(&files, "to_jsonable_test.go");
    assert!(to_test.contains("func ExampleDurationToString_nanoseconds() {"));
    assert!(to_test.contains("// Output: PT0.000000001S"));
}

#[test]
fn test_cpp_file_set() {
    let schema = pipeline_schema();
    let files = cpp::generate(&schema).unwrap();

    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["types.h", "parse.h", "parse.cpp", "jsoncpp.h", "jsoncpp.cpp"]
    );
}

#[test]
fn test_cpp_types_header() {
    let schema = pipeline_schema();
    let files = cpp::generate(&schema).unwrap();
    let types = content(&files, "types.h");

    assert!(types.starts_with("#pragma once\n"));
    assert!(types.contains("namespace pipeline {"));
    assert!(types.contains("class Node {"));
    assert!(types.contains("struct Window {"));
    assert!(types.contains("struct Pipeline {"));
    assert!(types.contains("std::map<std::string, std::unique_ptr<Node>> nodes;"));
    assert!(types.contains("std::optional<Node*> root;"));
    // The configured two-space indention
    assert!(types.contains("\n  std::string id;"));
}

#[test]
fn test_cpp_jsoncpp_impl() {
    let schema = pipeline_schema();
    let files = cpp::generate(&schema).unwrap();
    let implementation = content(&files, "jsoncpp.cpp");

    assert!(implementation.contains("void pipeline_from("));
    assert!(implementation.contains("void node_from("));
    assert!(implementation.contains("void window_from("));
    assert!(implementation.contains("duration_from_string"));
    assert!(implementation.contains("\"Expected ID to match \""));
    assert!(implementation.contains("\"Reference to an instance of class \""));
    assert!(implementation.contains("Json::Value serialize_pipeline("));
    assert!(implementation.contains("}  // namespace jsoncpp"));
    assert!(implementation.contains("}  // namespace pipeline"));
}

#[test]
fn test_generation_is_deterministic() {
    let schema = pipeline_schema();

    let py_first = py::generate(&schema).unwrap();
    let py_second = py::generate(&schema).unwrap();
    assert_eq!(py_first, py_second);

    let go_first = go::generate(&schema).unwrap();
    let go_second = go::generate(&schema).unwrap();
    assert_eq!(go_first, go_second);

    let cpp_first = cpp::generate(&schema).unwrap();
    let cpp_second = cpp::generate(&schema).unwrap();
    assert_eq!(cpp_first, cpp_second);
}

#[test]
fn test_missing_settings() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "py": {
            "module_name": "some_graph",
            "path_as": "str",
            "timezone_as": "str"
        }
    });
    let schema = schema_from_value(&value, "#").unwrap();

    match go::generate(&schema) {
        Err(GenerateError::MissingSettings("go")) => {}
        other => panic!("expected the go settings to be missing, got: {other:?}"),
    }
}

#[test]
fn test_empty_graph_generates() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "cpp": {
            "namespace": "some_graph",
            "path_as": "std::filesystem::path",
            "optional_as": "std::optional",
            "datetime_library": "ctime"
        },
        "go": {
            "package": "somegraph"
        },
        "py": {
            "module_name": "some_graph",
            "path_as": "str",
            "timezone_as": "str"
        }
    });
    let schema = schema_from_value(&value, "#").unwrap();

    let py_files = py::generate(&schema).unwrap();
    let fromjsonable = content(&py_files, "fromjsonable.py");
    assert!(fromjsonable.contains("def some_graph_from("));

    let go_files = go::generate(&schema).unwrap();
    assert!(content(&go_files, "types.go").contains("type SomeGraph struct {"));

    let cpp_files = cpp::generate(&schema).unwrap();
    assert!(content(&cpp_files, "types.h").contains("struct SomeGraph {"));
}

#[test]
fn test_plural_collision_under_target_casing() {
    // The class URL pluralizes to URLs whose registry appears as `urls` in
    // the serialized graph; the graph property `URLs` does not collide in
    // the schema itself, but collapses with the registry under the Python
    // and C++ casing.
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "URL",
                "description": "defines a url."
            }
        ],
        "properties": {
            "URLs": {
                "type": "boolean",
                "description": "conflicts with the registry under target casing."
            }
        }
    });
    let schema = schema_from_value(&value, "#").unwrap();

    match py::generate(&schema) {
        Err(GenerateError::TargetValidation(errors)) => {
            assert!(errors.iter().any(|err| {
                err.message.contains("corresponding to the registry of the class")
            }));
        }
        other => panic!("expected a plural collision, got: {other:?}"),
    }

    assert!(cpp::generate(&schema).is_err());
    assert!(go::generate(&schema).is_err());
}

#[test]
fn test_property_casing_collapse() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "some_urls": {
                "type": "boolean",
                "description": "conflicts with another property."
            },
            "some_URLs": {
                "type": "boolean",
                "description": "conflicts with another property."
            }
        }
    });
    let schema = schema_from_value(&value, "#").unwrap();

    match py::generate(&schema) {
        Err(GenerateError::TargetValidation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].ref_path, "#/some_urls");
            assert!(errors[0].message.contains("conflicts another attribute"));
            assert!(errors[0].message.contains("#/some_URLs"));
        }
        other => panic!("expected a casing collapse, got: {other:?}"),
    }
}

#[test]
fn test_cpp_keyword_rejected() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "properties": {
            "goto": {
                "type": "boolean",
                "description": "conflicts with a keyword."
            }
        }
    });
    let schema = schema_from_value(&value, "#").unwrap();

    match cpp::generate(&schema) {
        Err(GenerateError::TargetValidation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors[0].to_string(),
                "#/goto: The C++ field identifier 'goto' is a keyword in C++"
            );
        }
        other => panic!("expected a keyword rejection, got: {other:?}"),
    }
}

#[test]
fn test_cpp_reserved_id_field() {
    let value = json!({
        "name": "Some_graph",
        "description": "defines some object graph.",
        "classes": [
            {
                "name": "Some_class",
                "description": "defines a class with a reserved property name.",
                "properties": {
                    "ID": {
                        "type": "boolean",
                        "description": "collapses to the reserved id field."
                    }
                }
            }
        ]
    });
    let schema = schema_from_value(&value, "#").unwrap();

    match cpp::generate(&schema) {
        Err(GenerateError::TargetValidation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].ref_path, "#/classes/0/ID");
            assert!(errors[0].message.contains("reserved for class identifiers"));
        }
        other => panic!("expected the reserved id rejection, got: {other:?}"),
    }
}
