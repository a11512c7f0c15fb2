//! Loading of a schema document into the model.
//!
//! The loader validates the document first (Stage A + Stage B, see
//! [`super::validate`]) and only then constructs the model, so that the
//! construction can rely on the verified shape. Classes and embeds are
//! loaded in two passes: the first pass registers all the composite names
//! (enabling forward references), the second pass populates the properties.

use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{LoadError, SchemaError};
use crate::naming;

use super::{
    Class, Cpp, DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT, DEFAULT_TIME_FORMAT,
    Embed, Go, Graph, Property, Py, Schema, ValueType, validate,
};

/// Parse and validate a schema from a JSON-encoded document.
///
/// The reported reference paths are anchored at `#`.
pub fn schema_from_str(text: &str) -> Result<Schema, LoadError> {
    let value: Value = serde_json::from_str(text).map_err(|err| LoadError::Json {
        line: err.line(),
        column: err.column(),
        message: err.to_string(),
    })?;

    schema_from_value(&value, "#")
}

/// Parse and validate a schema from a JSON value tree.
///
/// `ref_path` anchors the reference paths of the reported errors
/// (*e.g.*, `#` or `some/path.json#`).
pub fn schema_from_value(value: &Value, ref_path: &str) -> Result<Schema, LoadError> {
    let errors = validate::validate(value, ref_path);
    if !errors.is_empty() {
        return Err(LoadError::Invalid(errors));
    }

    let obj = value
        .as_object()
        .expect("the validated schema document is an object");

    let mut graph = Graph {
        ref_path: ref_path.to_string(),
        name: str_field(obj, "name"),
        description: str_field(obj, "description"),
        classes: IndexMap::new(),
        embeds: IndexMap::new(),
        properties: IndexMap::new(),
    };

    // Pass 1: register all the class and embed shells so that property
    // types can refer to composites in any order.
    let mut class_names: HashSet<String> = HashSet::new();
    let mut embed_names: HashSet<String> = HashSet::new();

    if let Some(classes) = obj.get("classes").and_then(Value::as_array) {
        for (i, cls_value) in classes.iter().enumerate() {
            let cls_obj = cls_value
                .as_object()
                .expect("the validated class definition is an object");
            let cls = class_shell(cls_obj, format!("{ref_path}/classes/{i}"))?;

            class_names.insert(cls.name.clone());
            graph.classes.insert(cls.name.clone(), cls);
        }
    }

    if let Some(embeds) = obj.get("embeds").and_then(Value::as_array) {
        for (i, embed_value) in embeds.iter().enumerate() {
            let embed_obj = embed_value
                .as_object()
                .expect("the validated embed definition is an object");

            let embed = Embed {
                ref_path: format!("{ref_path}/embeds/{i}"),
                name: str_field(embed_obj, "name"),
                description: str_field(embed_obj, "description"),
                properties: IndexMap::new(),
            };

            embed_names.insert(embed.name.clone());
            graph.embeds.insert(embed.name.clone(), embed);
        }
    }

    // Pass 2: populate the properties, resolving type references against
    // the registered names.
    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        let graph_name = graph.name.clone();
        graph.properties = properties_from_obj(
            properties,
            &class_names,
            &embed_names,
            ref_path,
            &graph_name,
        )?;
    }

    if let Some(classes) = obj.get("classes").and_then(Value::as_array) {
        for (i, cls_value) in classes.iter().enumerate() {
            let cls_obj = cls_value
                .as_object()
                .expect("the validated class definition is an object");
            let Some(properties) =
                cls_obj.get("properties").and_then(Value::as_object)
            else {
                continue;
            };

            let name = cls_obj["name"]
                .as_str()
                .expect("the validated class name is a string");
            let parsed = properties_from_obj(
                properties,
                &class_names,
                &embed_names,
                &format!("{ref_path}/classes/{i}"),
                name,
            )?;

            graph
                .classes
                .get_mut(name)
                .expect("the class was registered in the first pass")
                .properties = parsed;
        }
    }

    if let Some(embeds) = obj.get("embeds").and_then(Value::as_array) {
        for (i, embed_value) in embeds.iter().enumerate() {
            let embed_obj = embed_value
                .as_object()
                .expect("the validated embed definition is an object");
            let Some(properties) =
                embed_obj.get("properties").and_then(Value::as_object)
            else {
                continue;
            };

            let name = embed_obj["name"]
                .as_str()
                .expect("the validated embed name is a string");
            let parsed = properties_from_obj(
                properties,
                &class_names,
                &embed_names,
                &format!("{ref_path}/embeds/{i}"),
                name,
            )?;

            graph
                .embeds
                .get_mut(name)
                .expect("the embed was registered in the first pass")
                .properties = parsed;
        }
    }

    Ok(Schema {
        graph,
        cpp: settings_from_obj::<Cpp>(obj, "cpp", ref_path)?,
        go: settings_from_obj::<Go>(obj, "go", ref_path)?,
        py: settings_from_obj::<Py>(obj, "py", ref_path)?,
    })
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Parse a class shell (everything except the properties).
fn class_shell(obj: &Map<String, Value>, ref_path: String) -> Result<Class, LoadError> {
    let name = str_field(obj, "name");

    let plural = match obj.get("plural").and_then(Value::as_str) {
        Some(plural) => plural.to_string(),
        None => naming::plural(&name),
    };

    let id_pattern = match obj.get("id_pattern").and_then(Value::as_str) {
        Some(pattern) => Some(compile_pattern(
            pattern,
            &format!("{ref_path}/id_pattern"),
        )?),
        None => None,
    };

    Ok(Class {
        ref_path,
        name,
        plural,
        description: str_field(obj, "description"),
        properties: IndexMap::new(),
        id_pattern,
    })
}

/// Parse the properties of a composite, preserving the document order.
fn properties_from_obj(
    properties: &Map<String, Value>,
    class_names: &HashSet<String>,
    embed_names: &HashSet<String>,
    composite_ref: &str,
    owner: &str,
) -> Result<IndexMap<String, Property>, LoadError> {
    let mut result = IndexMap::new();

    for (name, property_value) in properties {
        let property_obj = property_value
            .as_object()
            .expect("the validated property definition is an object");
        let ref_path = format!("{composite_ref}/{name}");

        let value_type = type_from_obj(
            property_obj,
            class_names,
            embed_names,
            &ref_path,
        )?;

        result.insert(
            name.clone(),
            Property {
                ref_path,
                name: name.clone(),
                description: str_field(property_obj, "description"),
                json: property_obj
                    .get("json")
                    .and_then(Value::as_str)
                    .unwrap_or(name)
                    .to_string(),
                value_type,
                optional: property_obj
                    .get("optional")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                owner: owner.to_string(),
            },
        );
    }

    Ok(result)
}

/// Parse a type definition recursively.
fn type_from_obj(
    obj: &Map<String, Value>,
    class_names: &HashSet<String>,
    embed_names: &HashSet<String>,
    ref_path: &str,
) -> Result<ValueType, LoadError> {
    let tag = obj["type"]
        .as_str()
        .expect("the validated type tag is a string");

    let value_type = match tag {
        "boolean" => ValueType::Boolean,
        "integer" => ValueType::Integer {
            minimum: obj.get("minimum").and_then(Value::as_i64),
            exclusive_minimum: bool_field(obj, "exclusive_minimum"),
            maximum: obj.get("maximum").and_then(Value::as_i64),
            exclusive_maximum: bool_field(obj, "exclusive_maximum"),
        },
        // Integer literals in the schema are promoted to double precision
        "float" => ValueType::Float {
            minimum: obj.get("minimum").and_then(Value::as_f64),
            exclusive_minimum: bool_field(obj, "exclusive_minimum"),
            maximum: obj.get("maximum").and_then(Value::as_f64),
            exclusive_maximum: bool_field(obj, "exclusive_maximum"),
        },
        "string" => ValueType::String {
            pattern: pattern_field(obj, ref_path)?,
        },
        "path" => ValueType::Path {
            pattern: pattern_field(obj, ref_path)?,
        },
        "date" => ValueType::Date {
            format: format_field(obj, DEFAULT_DATE_FORMAT),
        },
        "time" => ValueType::Time {
            format: format_field(obj, DEFAULT_TIME_FORMAT),
        },
        "datetime" => ValueType::Datetime {
            format: format_field(obj, DEFAULT_DATETIME_FORMAT),
        },
        "time_zone" => ValueType::TimeZone,
        "duration" => ValueType::Duration,
        "array" => ValueType::Array {
            values: Box::new(type_from_obj(
                obj["values"]
                    .as_object()
                    .expect("the validated array values is an object"),
                class_names,
                embed_names,
                &format!("{ref_path}/values"),
            )?),
            minimum_size: obj
                .get("minimum_size")
                .and_then(Value::as_u64)
                .map(|size| size as usize),
            maximum_size: obj
                .get("maximum_size")
                .and_then(Value::as_u64)
                .map(|size| size as usize),
        },
        "map" => ValueType::Map {
            values: Box::new(type_from_obj(
                obj["values"]
                    .as_object()
                    .expect("the validated map values is an object"),
                class_names,
                embed_names,
                &format!("{ref_path}/values"),
            )?),
        },
        composite if class_names.contains(composite) => ValueType::ClassRef {
            name: composite.to_string(),
        },
        composite if embed_names.contains(composite) => ValueType::EmbedRef {
            name: composite.to_string(),
        },
        unhandled => unreachable!(
            "Unhandled type identifier after validation: {unhandled:?}"
        ),
    };

    Ok(value_type)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn format_field(obj: &Map<String, Value>, default: &str) -> String {
    obj.get("format")
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn pattern_field(
    obj: &Map<String, Value>,
    ref_path: &str,
) -> Result<Option<Regex>, LoadError> {
    match obj.get("pattern").and_then(Value::as_str) {
        Some(pattern) => Ok(Some(compile_pattern(
            pattern,
            &format!("{ref_path}/pattern"),
        )?)),
        None => Ok(None),
    }
}

fn compile_pattern(pattern: &str, ref_path: &str) -> Result<Regex, LoadError> {
    Regex::new(pattern).map_err(|err| {
        LoadError::Invalid(vec![SchemaError::new(ref_path, err.to_string())])
    })
}

/// Deserialize the settings of a target, if present.
fn settings_from_obj<T: serde::de::DeserializeOwned>(
    obj: &Map<String, Value>,
    key: &str,
    ref_path: &str,
) -> Result<Option<T>, LoadError> {
    match obj.get(key) {
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|err| {
                LoadError::Invalid(vec![SchemaError::new(
                    format!("{ref_path}/{key}"),
                    err.to_string(),
                )])
            }),
        None => Ok(None),
    }
}
