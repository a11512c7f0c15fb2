//! Emission of `types.go` defining the types of the object graph.

use graphable_core::indention::reindent;
use graphable_core::{Go, Graph, Property, ValueType, naming};
use indexmap::IndexMap;

use super::common::{self, WARNING, comment};

fn imports(graph: &Graph) -> String {
    let mut import_set = std::collections::BTreeSet::new();

    if graph.has_type(|t| {
        matches!(
            t,
            ValueType::Date { .. }
                | ValueType::Time { .. }
                | ValueType::Datetime { .. }
                | ValueType::Duration
                | ValueType::TimeZone
        )
    }) {
        import_set.insert("time");
    }

    common::import_declarations(&import_set)
}

/// Generate the Go type of a property, wrapping optional non-pointer
/// types in a pointer.
fn property_type_repr(property: &Property) -> String {
    let type_repr = common::type_repr(&property.value_type);

    if property.optional && !common::is_pointer_type(&property.value_type) {
        format!("*{type_repr}")
    } else {
        type_repr
    }
}

/// Render the fields of the given properties, blank-line separated.
fn render_fields(properties: &IndexMap<String, Property>, out: &mut String, first: bool) {
    let mut separate = !first;

    for prop in properties.values() {
        if separate {
            out.push('\n');
        }
        separate = true;

        if !prop.description.is_empty() {
            out.push_str(&crate::common::indent(&comment(&prop.description), 1));
            out.push('\n');
        }
        out.push_str(&format!(
            "    {} {}\n",
            naming::upper_camel(&prop.name),
            property_type_repr(prop)
        ));
    }
}

/// Generate the struct definition of a class.
fn define_class(name: &str, description: &str, properties: &IndexMap<String, Property>) -> String {
    let composite = naming::upper_camel(name);

    let mut code = String::new();
    if !description.is_empty() {
        code.push_str(&comment(&format!("{composite} {description}")));
        code.push('\n');
    }
    code.push_str(&format!("type {composite} struct {{\n"));
    code.push_str("    // identifies the instance.\n    ID string\n");
    render_fields(properties, &mut code, false);
    code.push('}');

    code
}

/// Generate the struct definition of an embeddable structure.
fn define_embed(name: &str, description: &str, properties: &IndexMap<String, Property>) -> String {
    let composite = naming::upper_camel(name);

    let mut code = String::new();
    if !description.is_empty() {
        code.push_str(&comment(&format!("{composite} {description}")));
        code.push('\n');
    }
    code.push_str(&format!("type {composite} struct {{\n"));
    render_fields(properties, &mut code, true);
    code.push('}');

    code
}

/// Generate the struct definition of the object graph.
fn define_graph(graph: &Graph) -> String {
    let composite = naming::upper_camel(&graph.name);

    let mut code = String::new();
    if !graph.description.is_empty() {
        code.push_str(&comment(&format!("{composite} {}", graph.description)));
        code.push('\n');
    }
    code.push_str(&format!("type {composite} struct {{\n"));

    let mut separate = false;
    for cls in graph.classes.values() {
        if separate {
            code.push('\n');
        }
        separate = true;

        code.push_str(&format!(
            "    // registers instances of {}.\n    {} map[string]*{}\n",
            naming::upper_camel(&cls.name),
            naming::upper_camel(&cls.plural),
            naming::upper_camel(&cls.name)
        ));
    }

    render_fields(&graph.properties, &mut code, !separate);
    code.push('}');

    code
}

/// Generate the source file that defines the types of the object graph.
pub(crate) fn generate(graph: &Graph, go: &Go) -> String {
    let mut blocks = vec![format!("package {}", go.package), WARNING.to_string()];

    let import_block = imports(graph);
    if !import_block.is_empty() {
        blocks.push(import_block);
    }

    for embed in graph.embeds.values() {
        blocks.push(define_embed(&embed.name, &embed.description, &embed.properties));
    }

    for cls in graph.classes.values() {
        blocks.push(define_class(&cls.name, &cls.description, &cls.properties));
    }

    blocks.push(define_graph(graph));

    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, "\t")
}
