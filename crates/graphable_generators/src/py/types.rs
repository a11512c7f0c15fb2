//! Emission of `__init__.py` defining the types of the object graph.

use graphable_core::{Class, Embed, Graph, Property, Py, PyPathAs, PyTimezoneAs, ValueType};
use graphable_core::indention::reindent;

use super::common::{self, WARNING, docstring, order_by_optional, string_literal};
use super::naming;
use crate::common::indent;

/// Generate the import statements.
fn imports(graph: &Graph, py: &Py) -> String {
    let mut stdlib_block = vec!["import typing"];

    if graph.has_type(|t| matches!(t, ValueType::Path { .. }))
        && py.path_as == PyPathAs::PathlibPath
    {
        stdlib_block.push("import pathlib");
    }

    if graph.has_type(|t| matches!(t, ValueType::TimeZone))
        && py.timezone_as == PyTimezoneAs::PytzTimezone
    {
        stdlib_block.push("import datetime");
    }

    if graph.has_type(|t| {
        matches!(
            t,
            ValueType::Date { .. }
                | ValueType::Time { .. }
                | ValueType::Datetime { .. }
                | ValueType::Duration
        )
    }) {
        stdlib_block.push("import datetime");
    }

    if !graph.classes.is_empty() {
        // Needed for the initialization of class registries
        stdlib_block.push("import collections");
    }

    stdlib_block.sort_unstable();
    stdlib_block.dedup();

    stdlib_block.join("\n")
}

/// Generate the type annotation, quoting composites not yet defined.
///
/// Python annotations do not support forward declarations, so a composite
/// that is defined later in the module is referenced as a string literal.
fn type_repr(value_type: &ValueType, py: &Py, defined: &[&str]) -> String {
    match value_type {
        ValueType::Array { values, .. } => {
            format!("typing.List[{}]", type_repr(values, py, defined))
        }
        ValueType::Map { values } => {
            format!(
                "typing.MutableMapping[str, {}]",
                type_repr(values, py, defined)
            )
        }
        ValueType::ClassRef { name } | ValueType::EmbedRef { name } => {
            let composite = naming::as_composite(name);
            if defined.contains(&name.as_str()) {
                composite
            } else {
                string_literal(&composite)
            }
        }
        _ => common::type_repr(value_type, py),
    }
}

/// Render the `__init__` arguments of the given properties.
fn init_arguments(
    properties: &[&Property],
    py: &Py,
    defined: &[&str],
) -> Vec<String> {
    properties
        .iter()
        .map(|prop| {
            let attribute = naming::as_attribute(&prop.name);
            let annotation = type_repr(&prop.value_type, py, defined);

            if prop.optional {
                format!("{attribute}: typing.Optional[{annotation}] = None")
            } else {
                format!("{attribute}: {annotation}")
            }
        })
        .collect()
}

/// Render an `__init__` from pre-computed argument and docstring lines.
fn render_init(arguments: &[String], doctext: &str, body: &str) -> String {
    let mut code = String::new();

    code.push_str("def __init__(\n        self");
    for argument in arguments {
        code.push_str(",\n        ");
        code.push_str(argument);
    }
    code.push_str(") -> None:\n");

    code.push_str(&indent(&docstring(doctext), 1));
    code.push('\n');
    code.push_str(&indent(body, 1));

    code
}

/// Generate the definition of the given class.
fn define_class(cls: &Class, py: &Py, defined: &[&str]) -> String {
    let properties = order_by_optional(&cls.properties);

    let mut doctext = format!(
        "initializes an instance of {} with the given values.\n\n\
         :param id: identifier of the instance",
        naming::as_composite(&cls.name)
    );
    for prop in &properties {
        doctext.push_str(&format!(
            "\n:param {}: {}",
            naming::as_attribute(&prop.name),
            prop.description
        ));
    }

    let mut arguments = vec!["id: str".to_string()];
    arguments.extend(init_arguments(&properties, py, defined));

    let mut body = "self.id = id\n".to_string();
    for prop in &properties {
        let attribute = naming::as_attribute(&prop.name);
        body.push_str(&format!("self.{attribute} = {attribute}\n"));
    }

    let mut code = format!("class {}:\n", naming::as_composite(&cls.name));
    if !cls.description.is_empty() {
        code.push_str(&indent(&docstring(&cls.description), 1));
        code.push_str("\n\n");
    }
    code.push_str(&indent(&render_init(&arguments, &doctext, &body), 1));

    code.trim_end().to_string()
}

/// Generate the definition of the given embeddable structure.
fn define_embed(embed: &Embed, py: &Py, defined: &[&str]) -> String {
    let composite = naming::as_composite(&embed.name);

    if embed.properties.is_empty() {
        let mut code = format!("class {composite}:\n");
        if embed.description.is_empty() {
            code.push_str("    pass");
        } else {
            code.push_str(&indent(&docstring(&embed.description), 1));
        }
        return code.trim_end().to_string();
    }

    let properties = order_by_optional(&embed.properties);

    let mut doctext = format!(
        "initializes an instance of {composite} with the given values.\n"
    );
    for prop in &properties {
        doctext.push_str(&format!(
            "\n:param {}: {}",
            naming::as_attribute(&prop.name),
            prop.description
        ));
    }

    let arguments = init_arguments(&properties, py, defined);

    let mut body = String::new();
    for prop in &properties {
        let attribute = naming::as_attribute(&prop.name);
        body.push_str(&format!("self.{attribute} = {attribute}\n"));
    }

    let mut code = format!("class {composite}:\n");
    if !embed.description.is_empty() {
        code.push_str(&indent(&docstring(&embed.description), 1));
        code.push_str("\n\n");
    }
    code.push_str(&indent(&render_init(&arguments, &doctext, &body), 1));

    code.trim_end().to_string()
}

/// Generate the definition of the object graph.
fn define_graph(graph: &Graph, py: &Py, defined: &[&str]) -> String {
    let composite = naming::as_composite(&graph.name);

    if graph.properties.is_empty() && graph.classes.is_empty() {
        let mut code = format!("class {composite}:\n");
        if graph.description.is_empty() {
            code.push_str("    pass");
        } else {
            code.push_str(&indent(&docstring(&graph.description), 1));
        }
        return code.trim_end().to_string();
    }

    let properties = order_by_optional(&graph.properties);

    let mut doctext = format!(
        "initializes an instance of {composite} with the given values.\n"
    );
    if !graph.classes.is_empty() {
        doctext.push_str(
            "\nThe class registries are initialized with \
             empty ordered dictionaries.\n",
        );
    }
    for prop in &properties {
        doctext.push_str(&format!(
            "\n:param {}: {}",
            naming::as_attribute(&prop.name),
            prop.description
        ));
    }
    for cls in graph.classes.values() {
        doctext.push_str(&format!(
            "\n:param {}:\n    registry of instances of {};\n    \
             if not specified, it is initialized as a ``collections.OrderedDict``.",
            naming::as_attribute(&cls.plural),
            naming::as_composite(&cls.name)
        ));
    }

    let mut arguments = init_arguments(&properties, py, defined);
    for cls in graph.classes.values() {
        arguments.push(format!(
            "{}: typing.Optional[typing.MutableMapping[str, {}]] = None",
            naming::as_attribute(&cls.plural),
            type_repr(
                &ValueType::ClassRef {
                    name: cls.name.clone()
                },
                py,
                defined
            )
        ));
    }

    let mut body = String::new();
    for prop in &properties {
        let attribute = naming::as_attribute(&prop.name);
        body.push_str(&format!("self.{attribute} = {attribute}\n"));
    }
    for cls in graph.classes.values() {
        let attribute = naming::as_attribute(&cls.plural);
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&format!(
            "if {attribute} is not None:\n    \
             self.{attribute} = {attribute}\nelse:\n    \
             self.{attribute} = collections.OrderedDict()\n"
        ));
    }

    let mut code = format!("class {composite}:\n");
    if !graph.description.is_empty() {
        code.push_str(&indent(&docstring(&graph.description), 1));
        code.push_str("\n\n");
    }
    code.push_str(&indent(&render_init(&arguments, &doctext, &body), 1));

    code.trim_end().to_string()
}

/// Generate the source file that defines the types of the object graph.
pub(crate) fn generate(graph: &Graph, py: &Py) -> String {
    let mut blocks = vec![WARNING.to_string()];

    if !graph.description.is_empty() {
        blocks.push(docstring(&graph.description));
    }

    blocks.push(imports(graph, py));

    // Classes first, then embeds, then the graph; annotations referring to
    // a composite defined later are quoted.
    let mut defined: Vec<&str> = Vec::new();

    for cls in graph.classes.values() {
        blocks.push(define_class(cls, py, &defined));
        defined.push(&cls.name);
    }

    for embed in graph.embeds.values() {
        blocks.push(define_embed(embed, py, &defined));
        defined.push(&embed.name);
    }

    blocks.push(define_graph(graph, py, &defined));

    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n\n") + "\n"), 0, &py.indention)
}
