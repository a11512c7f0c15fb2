//! Structural and semantic validation of a schema document.
//!
//! Validation is two-stage: Stage A checks the document against the
//! embedded JSON-Schema documents ([`super::schemas`]); Stage B walks the
//! document and checks the semantic invariants (key ordering, duplicate
//! names, bound orderings, pattern compilation, format tokenization,
//! plural conflicts). All violations are collected; validation never stops
//! at the first error.

use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use jsonschema::Validator;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::naming;
use crate::strftime;

use super::schemas;

static GRAPH_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    jsonschema::validator_for(&schemas::GRAPH)
        .expect("the embedded graph schema document is valid")
});

static TYPE_VALIDATORS: LazyLock<IndexMap<&'static str, Validator>> =
    LazyLock::new(|| {
        schemas::TYPE_TO_SCHEMA
            .iter()
            .map(|(tag, schema)| {
                let validator = jsonschema::validator_for(schema)
                    .expect("the embedded type schema documents are valid");
                (*tag, validator)
            })
            .collect()
    });

static PROPERTY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]([a-zA-Z0-9_]*[a-zA-Z0-9])?$")
        .expect("the property name pattern is valid")
});

/// Type tags that do not refer to a class or an embed.
pub const NONCOMPOSITE_TYPES: &[&str] = &[
    "boolean",
    "integer",
    "float",
    "string",
    "path",
    "date",
    "time",
    "datetime",
    "duration",
    "time_zone",
    "array",
    "map",
];

/// Universal property keys admitted at depth 0 of a type definition.
const PROPERTY_KEYS: &[&str] = &["description", "type", "json", "optional"];

/// Validate the given document as a schema of an object graph.
///
/// `ref_path` anchors the reported reference paths (*e.g.*, `#`).
/// An empty result means the document is valid.
pub fn validate(mapping: &Value, ref_path: &str) -> Vec<SchemaError> {
    // Stage A: structural. Stage B assumes the shape verified here, so a
    // structurally broken document is reported as-is and not walked.
    if let jsonschema::BasicOutput::Invalid(violations) =
        GRAPH_VALIDATOR.apply(mapping).basic()
    {
        return violations
            .iter()
            .map(|violation| {
                SchemaError::new(
                    format!("{ref_path}{}", violation.instance_location()),
                    format!(
                        "Does not follow json schema: {}",
                        violation.error_description()
                    ),
                )
            })
            .collect();
    }

    let mut errors = Vec::new();

    let obj = match mapping.as_object() {
        Some(obj) => obj,
        None => return errors,
    };

    // Enforce name and description to be at the top of the schema
    let keys: Vec<&String> = obj.keys().collect();
    if keys.first().map(|key| key.as_str()) != Some("name") {
        errors.push(SchemaError::new(
            format!("{ref_path}/name"),
            format!(
                "Expected name to be the first property of the schema, but got {}",
                keys.first().map(|key| key.as_str()).unwrap_or("nothing")
            ),
        ));
    }
    if keys.get(1).map(|key| key.as_str()) != Some("description") {
        errors.push(SchemaError::new(
            format!("{ref_path}/description"),
            format!(
                "Expected description to be the second property of the schema, but got {}",
                keys.get(1).map(|key| key.as_str()).unwrap_or("nothing")
            ),
        ));
    }

    // Register composite names and check for duplicates
    let (name_set, name_errors) = validate_names(obj, ref_path);
    errors.extend(name_errors);

    // Validate class fields except properties
    if let Some(classes) = obj.get("classes").and_then(Value::as_array) {
        for (i, cls_value) in classes.iter().enumerate() {
            if let Some(cls_obj) = cls_value.as_object() {
                errors.extend(validate_class(
                    cls_obj,
                    &format!("{ref_path}/classes/{i}"),
                ));
            }
        }
    }

    // The set of admissible type tags includes the composite names
    let mut types: HashSet<&str> =
        NONCOMPOSITE_TYPES.iter().copied().collect();
    types.extend(name_set.iter().map(String::as_str));

    // Check the properties of the graph itself
    errors.extend(validate_properties(obj, ref_path, &types));

    // Check the properties of the classes
    if let Some(classes) = obj.get("classes").and_then(Value::as_array) {
        for (i, cls_value) in classes.iter().enumerate() {
            if let Some(cls_obj) = cls_value.as_object() {
                errors.extend(validate_properties(
                    cls_obj,
                    &format!("{ref_path}/classes/{i}"),
                    &types,
                ));
            }
        }
    }

    // Check the properties of the embeds
    if let Some(embeds) = obj.get("embeds").and_then(Value::as_array) {
        for (i, embed_value) in embeds.iter().enumerate() {
            if let Some(embed_obj) = embed_value.as_object() {
                errors.extend(validate_properties(
                    embed_obj,
                    &format!("{ref_path}/embeds/{i}"),
                    &types,
                ));
            }
        }
    }

    // Check that no class plural conflicts with a graph property
    errors.extend(validate_plurals(obj, ref_path));

    errors
}

/// Collect the composite names and report duplicates.
fn validate_names(
    obj: &Map<String, Value>,
    ref_path: &str,
) -> (HashSet<String>, Vec<SchemaError>) {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    if let Some(name) = obj.get("name").and_then(Value::as_str) {
        names.insert(name.to_string());
    }

    for section in ["classes", "embeds"] {
        let Some(composites) = obj.get(section).and_then(Value::as_array) else {
            continue;
        };

        for (i, composite) in composites.iter().enumerate() {
            let Some(name) = composite.get("name").and_then(Value::as_str) else {
                continue;
            };

            if !names.insert(name.to_string()) {
                errors.push(SchemaError::new(
                    format!("{ref_path}/{section}/{i}/name"),
                    format!("Duplicate names: {name:?}"),
                ));
            }
        }
    }

    (names, errors)
}

/// Check the class-specific fields (everything except the properties).
fn validate_class(cls: &Map<String, Value>, ref_path: &str) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    if let Some(id_pattern) = cls.get("id_pattern").and_then(Value::as_str) {
        if let Err(err) = Regex::new(id_pattern) {
            errors.push(SchemaError::new(
                format!("{ref_path}/id_pattern"),
                format!("Invalid regular expression: {err}"),
            ));
        }
    }

    if let Some(properties) = cls.get("properties").and_then(Value::as_object) {
        if properties.contains_key("id") {
            errors.push(SchemaError::new(
                format!("{ref_path}/properties"),
                "'id' is a reserved property of the class. If you want a pattern \
                 for class identifiers, use 'id_pattern'.",
            ));
        }
    }

    errors
}

/// Validate the `properties` object of a composite, if present.
fn validate_properties(
    composite: &Map<String, Value>,
    ref_path: &str,
    types: &HashSet<&str>,
) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    let Some(properties) = composite.get("properties").and_then(Value::as_object)
    else {
        return errors;
    };

    for (name, property) in properties {
        if !PROPERTY_NAME_RE.is_match(name) {
            errors.push(SchemaError::new(
                format!("{ref_path}/properties"),
                format!(
                    "Property name invalid, expected {}, got {}",
                    PROPERTY_NAME_RE.as_str(),
                    name
                ),
            ));
        }

        if let Some(err) = validate_type_recursively(
            property,
            &format!("{ref_path}/properties/{name}"),
            types,
            0,
        ) {
            errors.push(err);
        }
    }

    errors
}

/// Validate a type definition and its nested element types.
///
/// `depth` starts with 0 at the property definition itself.
fn validate_type_recursively(
    value: &Value,
    ref_path: &str,
    types: &HashSet<&str>,
    depth: usize,
) -> Option<SchemaError> {
    let obj = value.as_object()?;

    if depth == 0 {
        // Enforce the type tag and the description at the top of the definition
        let keys: Vec<&String> = obj.keys().collect();

        if keys.first().map(|key| key.as_str()) != Some("type") {
            return Some(SchemaError::new(
                format!("{ref_path}/type"),
                format!(
                    "Expected 'type' at the top of the definition, but got {}",
                    keys.first().map(|key| key.as_str()).unwrap_or("nothing")
                ),
            ));
        }

        if obj.contains_key("description")
            && keys.get(1).map(|key| key.as_str()) != Some("description")
        {
            return Some(SchemaError::new(
                format!("{ref_path}/description"),
                format!(
                    "Expected 'description' just after 'type' in the definition, \
                     but got {}",
                    keys.get(1).map(|key| key.as_str()).unwrap_or("nothing")
                ),
            ));
        }
    }

    let Some(tag) = obj.get("type").and_then(Value::as_str) else {
        return Some(SchemaError::new(
            format!("{ref_path}/type"),
            "Expected 'type' in the definition",
        ));
    };

    if !types.contains(tag) {
        return Some(SchemaError::new(
            format!("{ref_path}/type"),
            format!("Invalid type: {tag}"),
        ));
    }

    // Validate against the type schema
    if let Some(validator) = TYPE_VALIDATORS.get(tag) {
        if let jsonschema::BasicOutput::Invalid(violations) =
            validator.apply(value).basic()
        {
            if let Some(violation) = violations.iter().next() {
                return Some(SchemaError::new(
                    format!("{ref_path}{}", violation.instance_location()),
                    format!(
                        "Invalid {tag} definition: {}",
                        violation.error_description()
                    ),
                ));
            }
        }
    }

    // Reject keys that neither the property definition nor the type admits
    let mut expected_keys: HashSet<&str> = ["type", "description"].into();
    if depth == 0 {
        expected_keys.extend(PROPERTY_KEYS);
    }
    if let Some(schema) = schemas::TYPE_TO_SCHEMA.get(tag) {
        if let Some(schema_properties) =
            schema.get("properties").and_then(Value::as_object)
        {
            expected_keys.extend(schema_properties.keys().map(String::as_str));
        }
    }

    for key in obj.keys() {
        if !expected_keys.contains(key.as_str()) {
            return Some(SchemaError::new(
                ref_path,
                format!(
                    "Additional properties are not allowed ({key:?} was unexpected)"
                ),
            ));
        }
    }

    match tag {
        "boolean" | "duration" | "time_zone" => None,
        "integer" | "float" => validate_bounds(obj, ref_path),
        "string" | "path" => validate_pattern(obj, ref_path),
        "date" => validate_format(obj, ref_path, Subset::Date),
        "time" => validate_format(obj, ref_path, Subset::Time),
        "datetime" => validate_format(obj, ref_path, Subset::Any),
        "array" => {
            let minimum_size = obj.get("minimum_size").and_then(Value::as_u64);
            let maximum_size = obj.get("maximum_size").and_then(Value::as_u64);
            if let (Some(minimum), Some(maximum)) = (minimum_size, maximum_size) {
                if minimum > maximum {
                    return Some(SchemaError::new(
                        format!("{ref_path}/minimum_size"),
                        format!(
                            "Minimum size is larger than the maximum size: \
                             {minimum} > {maximum}"
                        ),
                    ));
                }
            }

            validate_type_recursively(
                &obj["values"],
                &format!("{ref_path}/values"),
                types,
                depth + 1,
            )
        }
        "map" => validate_type_recursively(
            &obj["values"],
            &format!("{ref_path}/values"),
            types,
            depth + 1,
        ),
        // A composite reference; nothing further to check here
        _ => None,
    }
}

/// Check the ordering and exclusiveness of numeric bounds.
fn validate_bounds(obj: &Map<String, Value>, ref_path: &str) -> Option<SchemaError> {
    let minimum = obj.get("minimum").and_then(Value::as_f64)?;
    let maximum = obj.get("maximum").and_then(Value::as_f64)?;

    if minimum > maximum {
        return Some(SchemaError::new(
            ref_path,
            format!("minimum (== {minimum}) > maximum (== {maximum})"),
        ));
    }

    let exclusive_minimum = obj
        .get("exclusive_minimum")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let exclusive_maximum = obj
        .get("exclusive_maximum")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if minimum == maximum {
        if exclusive_minimum && exclusive_maximum {
            return Some(SchemaError::new(
                ref_path,
                format!(
                    "minimum (== {minimum}) == maximum and both are set to exclusive"
                ),
            ));
        } else if exclusive_maximum {
            return Some(SchemaError::new(
                ref_path,
                format!(
                    "minimum (== {minimum}) == maximum and \
                     maximum is set to exclusive"
                ),
            ));
        } else if exclusive_minimum {
            return Some(SchemaError::new(
                ref_path,
                format!(
                    "minimum (== {minimum}) == maximum and \
                     minimum is set to exclusive"
                ),
            ));
        }
    }

    None
}

/// Check that the pattern constraint, if any, compiles.
fn validate_pattern(obj: &Map<String, Value>, ref_path: &str) -> Option<SchemaError> {
    let pattern = obj.get("pattern").and_then(Value::as_str)?;

    match Regex::new(pattern) {
        Ok(_) => None,
        Err(err) => Some(SchemaError::new(
            format!("{ref_path}/pattern"),
            err.to_string(),
        )),
    }
}

enum Subset {
    Date,
    Time,
    Any,
}

/// Check that the format constraint, if any, tokenizes and respects the
/// date-only or time-only directive subset.
fn validate_format(
    obj: &Map<String, Value>,
    ref_path: &str,
    subset: Subset,
) -> Option<SchemaError> {
    let format = obj.get("format").and_then(Value::as_str)?;

    let token_lines = match strftime::tokenize(format) {
        Ok(token_lines) => token_lines,
        Err(err) => {
            return Some(SchemaError::new(
                format!("{ref_path}/format"),
                err.to_string(),
            ));
        }
    };

    let message = match subset {
        Subset::Date => strftime::validate_date_tokens(&token_lines),
        Subset::Time => strftime::validate_time_tokens(&token_lines),
        Subset::Any => None,
    };

    message.map(|message| SchemaError::new(format!("{ref_path}/format"), message))
}

/// Check that no graph property conflicts with an instance registry.
///
/// The instance registry of a class appears in the serialized graph under
/// the JSON form of the class's plural.
fn validate_plurals(obj: &Map<String, Value>, ref_path: &str) -> Vec<SchemaError> {
    let Some(classes) = obj.get("classes").and_then(Value::as_array) else {
        return Vec::new();
    };
    let Some(properties) = obj.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut registry_property_to_class: IndexMap<String, &str> = IndexMap::new();

    for cls in classes {
        let Some(name) = cls.get("name").and_then(Value::as_str) else {
            continue;
        };

        let plural = match cls.get("plural").and_then(Value::as_str) {
            Some(plural) => plural.to_string(),
            None => naming::plural(name),
        };

        registry_property_to_class.insert(naming::json_plural(&plural), name);
    }

    let mut errors = Vec::new();

    for property_name in properties.keys() {
        if let Some(class_name) = registry_property_to_class.get(property_name) {
            errors.push(SchemaError::new(
                format!("{ref_path}/{property_name}"),
                format!(
                    "Graph property {property_name:?} conflicts with the plural \
                     necessary for the registry of class {class_name:?}"
                ),
            ));
        }
    }

    errors
}
