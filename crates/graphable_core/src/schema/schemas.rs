//! Embedded JSON-Schema documents for the structural (Stage A) validation.

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde_json::{Value, json};

/// The schema-of-schemas covering the top-level shape of a graph document.
pub static GRAPH: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "definitions": {
            "Graph": {
                "type": "object",
                "description": "defines a schema of an object graph.",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "gives the name of the object graph.",
                        "pattern": "^[A-Z][A-Za-z0-9]*"
                    },
                    "description": {
                        "type": "string",
                        "description": "describes the object graph \
                            (starts with a verb and ends with a dot).",
                        "pattern": "^[a-z]+.*\\.$"
                    },
                    "cpp": {"$ref": "#/definitions/Cpp"},
                    "go": {"$ref": "#/definitions/Go"},
                    "py": {"$ref": "#/definitions/Py"},
                    "classes": {
                        "type": "array",
                        "description": "defines the classes, \
                            i.e. referenceable data structures.",
                        "items": {"$ref": "#/definitions/Class"}
                    },
                    "embeds": {
                        "type": "array",
                        "description": "defines the embeddable data structures.",
                        "items": {"$ref": "#/definitions/Embed"}
                    },
                    "properties": {
                        "type": "object",
                        "description": "defines the properties of the object graph.",
                        "additionalProperties": {"$ref": "#/definitions/Property"}
                    }
                },
                "required": ["name", "description"],
                "additionalProperties": false
            },
            "Cpp": {
                "type": "object",
                "description": "specifies parameters for generating C++ code.",
                "properties": {
                    "namespace": {
                        "type": "string",
                        "description": "indicates the namespace of the generated code.",
                        "pattern": "^[a-zA-Z][a-zA-Z0-9_]*(::[a-zA-Z][a-zA-Z0-9_]*)*$"
                    },
                    "path_as": {
                        "type": "string",
                        "description": "defines the type of the paths \
                            in the generated code.",
                        "enum": ["std::filesystem::path", "boost::filesystem::path"]
                    },
                    "optional_as": {
                        "type": "string",
                        "description": "defines the type of the optional properties \
                            in the generated code.",
                        "enum": [
                            "boost::optional",
                            "std::optional",
                            "std::experimental::optional"
                        ]
                    },
                    "datetime_library": {
                        "type": "string",
                        "description": "defines the date/time library to use for \
                            date, datetime, time and time zone manipulation.",
                        "enum": ["ctime", "date.h"]
                    },
                    "indention": {
                        "type": "string",
                        "description": "defines the indention of the generated code. \
                            Defaults to two spaces.",
                        "pattern": "^[ \t]*$"
                    }
                },
                "required": ["namespace", "path_as", "optional_as", "datetime_library"],
                "additionalProperties": false
            },
            "Go": {
                "type": "object",
                "description": "specifies parameters for generating Go code.",
                "properties": {
                    "package": {
                        "type": "string",
                        "description": "indicates the package of the generated code.",
                        "pattern": "^[a-zA-Z][a-zA-Z0-9_]*"
                    }
                },
                "required": ["package"],
                "additionalProperties": false
            },
            "Py": {
                "type": "object",
                "description": "specifies parameters for generating Python code.",
                "properties": {
                    "module_name": {
                        "type": "string",
                        "description": "specifies the fully qualified base module name \
                            of the generated code.",
                        "pattern": "^[a-zA-Z][a-zA-Z0-9_]*(\\.[a-zA-Z][a-zA-Z0-9_]*)*$"
                    },
                    "path_as": {
                        "type": "string",
                        "description": "defines the type of the paths \
                            in the generated code.",
                        "enum": ["str", "pathlib.Path"]
                    },
                    "timezone_as": {
                        "type": "string",
                        "description": "defines the type of the time zones \
                            in the generated code.",
                        "enum": ["str", "pytz.timezone"]
                    },
                    "indention": {
                        "type": "string",
                        "description": "defines the indention of the generated code. \
                            Defaults to four spaces.",
                        "pattern": "^[ \t]*$"
                    }
                },
                "required": ["module_name", "path_as", "timezone_as"],
                "additionalProperties": false
            },
            "Class": {
                "type": "object",
                "description": "defines a class, i.e. a referenceable data structure.",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "gives the name of the class in Snake_case.",
                        "pattern": "^[A-Z]([a-zA-Z0-9_]*[a-zA-Z0-9])?$"
                    },
                    "description": {
                        "type": "string",
                        "description": "describes the class \
                            (starts with a verb and ends with a dot).",
                        "pattern": "^[a-z]+.*\\.$"
                    },
                    "plural": {
                        "type": "string",
                        "description": "gives the plural of the class in Snake_case. \
                            If omitted, automatically inferred.",
                        "pattern": "^[A-Z]([a-zA-Z0-9_]*[a-zA-Z0-9])?$"
                    },
                    "id_pattern": {
                        "type": "string",
                        "description": "defines the regular expression for \
                            the identifiers of the class instances."
                    },
                    "properties": {
                        "type": "object",
                        "description": "defines the properties of the class.",
                        "additionalProperties": {"$ref": "#/definitions/Property"}
                    }
                },
                "required": ["name", "description"],
                "additionalProperties": false
            },
            "Embed": {
                "type": "object",
                "description": "defines an embeddable data structure.",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "gives the name of the embeddable data structure.",
                        "pattern": "^[A-Z]([A-Za-z0-9_]*[a-zA-Z0-9])?"
                    },
                    "description": {
                        "type": "string",
                        "description": "describes the embeddable data structure \
                            (starts with a verb and ends with a dot).",
                        "pattern": "^[a-z]+.*\\.$"
                    },
                    "properties": {
                        "type": "object",
                        "description": "defines the properties of \
                            the embeddable structure.",
                        "additionalProperties": {"$ref": "#/definitions/Property"}
                    }
                },
                "required": ["name", "description"],
                "additionalProperties": false
            },
            "Property": {
                "type": "object",
                "description": "defines a property of a data structure.",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "describes the property."
                    },
                    "type": {
                        "type": "string",
                        "description": "indicates the type of the property.",
                        "pattern": "[A-Za-z][A-Za-z_0-9]*"
                    },
                    "json": {
                        "type": "string",
                        "description": "defines the property name \
                            in the JSONable object."
                    },
                    "optional": {
                        "type": "boolean",
                        "description": "defines whether the property is optional. \
                            The default value is false."
                    }
                },
                "required": ["description", "type"],
                "additionalProperties": true
            }
        },
        "$ref": "#/definitions/Graph"
    })
});

fn common_type_properties() -> Value {
    json!({
        "type": {
            "type": "string",
            "description": "indicates the type of the value."
        },
        "description": {
            "type": "string",
            "description": "describes the value."
        }
    })
}

fn type_schema(extra_properties: Value, required: &[&str]) -> Value {
    let mut properties = common_type_properties();
    if let (Value::Object(base), Value::Object(extra)) =
        (&mut properties, extra_properties)
    {
        base.extend(extra);
    }

    let mut schema = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "type": "object",
        "properties": properties
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }

    schema
}

/// JSON-Schema documents per non-composite type tag.
pub static TYPE_TO_SCHEMA: LazyLock<IndexMap<&'static str, Value>> = LazyLock::new(|| {
    let mut map = IndexMap::new();

    map.insert("boolean", type_schema(json!({}), &[]));

    map.insert(
        "integer",
        type_schema(
            json!({
                "minimum": {
                    "type": "integer",
                    "description": "indicates the minimum allowed value."
                },
                "exclusive_minimum": {
                    "type": "boolean",
                    "description": "indicates whether the minimum is exclusive; \
                        if unspecified, defaults to false."
                },
                "maximum": {
                    "type": "integer",
                    "description": "indicates the maximum allowed value."
                },
                "exclusive_maximum": {
                    "type": "boolean",
                    "description": "indicates whether the maximum is exclusive; \
                        if unspecified, defaults to false."
                }
            }),
            &[],
        ),
    );

    map.insert(
        "float",
        type_schema(
            json!({
                "minimum": {
                    "type": "number",
                    "description": "indicates the minimum allowed value."
                },
                "exclusive_minimum": {
                    "type": "boolean",
                    "description": "indicates whether the minimum is exclusive."
                },
                "maximum": {
                    "type": "number",
                    "description": "indicates the maximum allowed value."
                },
                "exclusive_maximum": {
                    "type": "boolean",
                    "description": "indicates whether the maximum is exclusive."
                }
            }),
            &[],
        ),
    );

    map.insert(
        "string",
        type_schema(
            json!({
                "pattern": {
                    "type": "string",
                    "description": "gives the expected string pattern."
                }
            }),
            &[],
        ),
    );

    map.insert(
        "path",
        type_schema(
            json!({
                "pattern": {
                    "type": "string",
                    "description": "gives the expected path pattern."
                }
            }),
            &[],
        ),
    );

    map.insert(
        "date",
        type_schema(
            json!({
                "format": {
                    "type": "string",
                    "description": "gives the expected date format."
                }
            }),
            &[],
        ),
    );

    map.insert(
        "time",
        type_schema(
            json!({
                "format": {
                    "type": "string",
                    "description": "gives the expected time format."
                }
            }),
            &[],
        ),
    );

    map.insert(
        "datetime",
        type_schema(
            json!({
                "format": {
                    "type": "string",
                    "description": "gives the expected date-time format."
                }
            }),
            &[],
        ),
    );

    map.insert("time_zone", type_schema(json!({}), &[]));
    map.insert("duration", type_schema(json!({}), &[]));

    map.insert(
        "array",
        type_schema(
            json!({
                "values": {
                    "type": "object",
                    "description": "gives the type of the array values."
                },
                "minimum_size": {
                    "type": "integer",
                    "description": "indicates the inclusive minimum size of the array.",
                    "minimum": 0
                },
                "maximum_size": {
                    "type": "integer",
                    "description": "indicates the inclusive maximum size of the array.",
                    "minimum": 0
                }
            }),
            &["values"],
        ),
    );

    map.insert(
        "map",
        type_schema(
            json!({
                "values": {
                    "type": "object",
                    "description": "gives the type of the map values."
                }
            }),
            &["values"],
        ),
    );

    map
});
