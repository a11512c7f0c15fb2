//! The schema model of an object graph.
//!
//! The model is constructed by the loader ([`load`]), frozen once
//! validation ([`validate`]) succeeds and consumed read-only by the
//! generators. Composites reference each other by name rather than by
//! pointer, so the model is free of circular ownership.

pub mod load;
pub mod schemas;
pub mod validate;

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

/// Default format of [`ValueType::Date`].
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default format of [`ValueType::Time`].
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Default format of [`ValueType::Datetime`].
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The type of a value in the object graph.
#[derive(Debug, Clone)]
pub enum ValueType {
    Boolean,
    Integer {
        minimum: Option<i64>,
        exclusive_minimum: bool,
        maximum: Option<i64>,
        exclusive_maximum: bool,
    },
    Float {
        minimum: Option<f64>,
        exclusive_minimum: bool,
        maximum: Option<f64>,
        exclusive_maximum: bool,
    },
    String {
        pattern: Option<Regex>,
    },
    /// A path in the file system; the concrete type is a target setting.
    Path {
        pattern: Option<Regex>,
    },
    Date {
        format: String,
    },
    Time {
        format: String,
    },
    Datetime {
        format: String,
    },
    /// A time zone given as an IANA identifier at runtime
    TimeZone,
    /// A duration encoded as ISO 8601 at runtime
    Duration,
    Array {
        values: Box<ValueType>,
        minimum_size: Option<usize>,
        maximum_size: Option<usize>,
    },
    /// A mapping string -> value
    Map {
        values: Box<ValueType>,
    },
    /// A reference to an instance of the class with the given name
    ClassRef {
        name: String,
    },
    /// An inlined instance of the embeddable structure with the given name
    EmbedRef {
        name: String,
    },
}

/// A property of a composite.
#[derive(Debug, Clone)]
pub struct Property {
    /// Reference path to the property in the schema document
    pub ref_path: String,

    pub name: String,
    pub description: String,

    /// Identifier of the property in the JSONable structure
    pub json: String,

    pub value_type: ValueType,

    /// If true, the absence of the property is not an error
    pub optional: bool,

    /// Name of the composite owning the property (non-owning back-reference)
    pub owner: String,
}

/// A referenceable record whose instances live in a registry keyed by id.
#[derive(Debug, Clone)]
pub struct Class {
    /// Reference path to the class in the schema document
    pub ref_path: String,

    pub name: String,

    /// Plural form under which the instance registry appears in the
    /// serialized graph
    pub plural: String,

    pub description: String,

    pub properties: IndexMap<String, Property>,

    /// Pattern enforced on the instance identifiers, if any
    pub id_pattern: Option<Regex>,
}

/// A value record inlined wherever it is used; has no identity.
#[derive(Debug, Clone)]
pub struct Embed {
    /// Reference path to the embed in the schema document
    pub ref_path: String,

    pub name: String,
    pub description: String,

    pub properties: IndexMap<String, Property>,
}

/// The root composite of the schema.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Reference path to the schema document itself (*e.g.*, `#`)
    pub ref_path: String,

    pub name: String,
    pub description: String,

    pub classes: IndexMap<String, Class>,
    pub embeds: IndexMap<String, Embed>,
    pub properties: IndexMap<String, Property>,
}

/// Settings for the generation of the C++ code.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Cpp {
    /// Namespace of the generated code (`::`-separated)
    pub namespace: String,

    pub path_as: CppPathAs,
    pub optional_as: CppOptionalAs,
    pub datetime_library: CppDatetimeLibrary,

    #[serde(default = "default_cpp_indention")]
    pub indention: String,
}

fn default_cpp_indention() -> String {
    "  ".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CppPathAs {
    #[serde(rename = "std::filesystem::path")]
    StdFilesystemPath,
    #[serde(rename = "boost::filesystem::path")]
    BoostFilesystemPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CppOptionalAs {
    #[serde(rename = "boost::optional")]
    BoostOptional,
    #[serde(rename = "std::optional")]
    StdOptional,
    #[serde(rename = "std::experimental::optional")]
    ExperimentalOptional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum CppDatetimeLibrary {
    #[serde(rename = "ctime")]
    Ctime,
    #[serde(rename = "date.h")]
    DateH,
}

/// Settings for the generation of the Go code.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Go {
    /// Package of the generated code
    pub package: String,
}

/// Settings for the generation of the Python code.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Py {
    /// Fully qualified base module name of the generated code
    pub module_name: String,

    pub path_as: PyPathAs,
    pub timezone_as: PyTimezoneAs,

    #[serde(default = "default_py_indention")]
    pub indention: String,
}

fn default_py_indention() -> String {
    "    ".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PyPathAs {
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "pathlib.Path")]
    PathlibPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PyTimezoneAs {
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "pytz.timezone")]
    PytzTimezone,
}

/// A validated schema of an object graph together with target settings.
#[derive(Debug, Clone)]
pub struct Schema {
    pub graph: Graph,
    pub cpp: Option<Cpp>,
    pub go: Option<Go>,
    pub py: Option<Py>,
}

impl Graph {
    /// Check recursively whether any value type in the graph satisfies
    /// the predicate.
    ///
    /// The search covers the property types of the graph, its classes and
    /// its embeds, including the element types of arrays and maps.
    pub fn has_type(&self, predicate: impl Fn(&ValueType) -> bool) -> bool {
        self.all_properties()
            .any(|prop| type_matches(&prop.value_type, &predicate))
    }

    /// Iterate over the properties of the graph and all its composites.
    pub fn all_properties(&self) -> impl Iterator<Item = &Property> {
        self.classes
            .values()
            .flat_map(|cls| cls.properties.values())
            .chain(self.embeds.values().flat_map(|embed| embed.properties.values()))
            .chain(self.properties.values())
    }
}

fn type_matches(value_type: &ValueType, predicate: &impl Fn(&ValueType) -> bool) -> bool {
    if predicate(value_type) {
        return true;
    }

    match value_type {
        ValueType::Array { values, .. } | ValueType::Map { values } => {
            type_matches(values, predicate)
        }
        _ => false,
    }
}

/// Iterate over every value type defined in the graph together with its
/// reference path.
///
/// This includes the element types of arrays and maps (suffixed with
/// `/values`) as well as the property types of classes, embeds and the
/// graph itself.
pub fn iter_types(graph: &Graph) -> Vec<(&ValueType, String)> {
    let mut result = Vec::new();

    for prop in graph.all_properties() {
        push_types_recursively(&prop.value_type, prop.ref_path.clone(), &mut result);
    }

    result
}

fn push_types_recursively<'a>(
    value_type: &'a ValueType,
    ref_path: String,
    result: &mut Vec<(&'a ValueType, String)>,
) {
    match value_type {
        ValueType::Array { values, .. } | ValueType::Map { values } => {
            let nested_ref = format!("{ref_path}/values");
            result.push((value_type, ref_path));
            push_types_recursively(values, nested_ref, result);
        }
        _ => result.push((value_type, ref_path)),
    }
}

/// Collect the classes transitively referenced by the given properties,
/// sorted by class name for deterministic emission.
pub fn referenced_classes<'a>(
    graph: &'a Graph,
    properties: &'a IndexMap<String, Property>,
) -> Vec<&'a Class> {
    let mut found: BTreeSet<&'a str> = BTreeSet::new();
    let mut visited: HashSet<&'a str> = HashSet::new();

    for prop in properties.values() {
        collect_references(graph, &prop.value_type, &mut visited, &mut found);
    }

    found.iter().map(|name| &graph.classes[*name]).collect()
}

fn collect_references<'a>(
    graph: &'a Graph,
    value_type: &'a ValueType,
    visited: &mut HashSet<&'a str>,
    found: &mut BTreeSet<&'a str>,
) {
    match value_type {
        ValueType::Array { values, .. } | ValueType::Map { values } => {
            collect_references(graph, values, visited, found);
        }
        ValueType::ClassRef { name } => {
            found.insert(name.as_str());
            if visited.insert(name.as_str()) {
                for prop in graph.classes[name].properties.values() {
                    collect_references(graph, &prop.value_type, visited, found);
                }
            }
        }
        ValueType::EmbedRef { name } => {
            if visited.insert(name.as_str()) {
                for prop in graph.embeds[name].properties.values() {
                    collect_references(graph, &prop.value_type, visited, found);
                }
            }
        }
        _ => {}
    }
}
