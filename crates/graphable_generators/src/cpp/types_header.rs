//! Emission of `types.h` defining the types of the object graph.

use std::collections::BTreeSet;

use graphable_core::indention::reindent;
use graphable_core::{Cpp, CppDatetimeLibrary, CppOptionalAs, CppPathAs, Graph, Property, ValueType};
use indexmap::IndexMap;

use super::common::{self, WARNING, comment};
use super::naming;
use crate::common::indent;

/// Generate the include directives.
fn includes(graph: &Graph, cpp: &Cpp) -> String {
    let mut stl_block: BTreeSet<&str> = BTreeSet::new();
    let mut third_party_block: BTreeSet<&str> = BTreeSet::new();

    if graph.has_type(|t| matches!(t, ValueType::Integer { .. })) {
        stl_block.insert("#include <cstdint>");
    }

    if graph.has_type(|t| matches!(t, ValueType::String { .. })) {
        stl_block.insert("#include <string>");
    }

    if graph.has_type(|t| matches!(t, ValueType::Path { .. })) {
        match cpp.path_as {
            CppPathAs::StdFilesystemPath => {
                stl_block.insert("#include <filesystem>");
            }
            CppPathAs::BoostFilesystemPath => {
                third_party_block.insert("#include <boost/filesystem/path.hpp>");
            }
        }
    }

    let has_date_time = graph.has_type(|t| {
        matches!(
            t,
            ValueType::Date { .. } | ValueType::Time { .. } | ValueType::Datetime { .. }
        )
    });

    match cpp.datetime_library {
        CppDatetimeLibrary::Ctime => {
            if has_date_time {
                stl_block.insert("#include <ctime>");
            }
            if graph.has_type(|t| matches!(t, ValueType::TimeZone)) {
                stl_block.insert("#include <string>");
            }
        }
        CppDatetimeLibrary::DateH => {
            if has_date_time {
                third_party_block.insert("#include <date/date.h>");
            }
            if graph.has_type(|t| matches!(t, ValueType::Time { .. })) {
                stl_block.insert("#include <chrono>");
            }
            if graph.has_type(|t| matches!(t, ValueType::TimeZone)) {
                third_party_block.insert("#include <date/tz.h>");
            }
        }
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        stl_block.insert("#include <chrono>");
    }

    if graph.has_type(|t| matches!(t, ValueType::Array { .. })) {
        stl_block.insert("#include <vector>");
    }

    if graph.has_type(|t| matches!(t, ValueType::Map { .. })) {
        stl_block.insert("#include <map>");
    }

    if !graph.classes.is_empty() {
        stl_block.insert("#include <map>");
        stl_block.insert("#include <string>");
        stl_block.insert("#include <memory>");
    }

    if common::has_optional(graph) {
        match cpp.optional_as {
            CppOptionalAs::BoostOptional => {
                third_party_block.insert("#include <boost/optional.hpp>");
            }
            CppOptionalAs::StdOptional => {
                stl_block.insert("#include <optional>");
            }
            CppOptionalAs::ExperimentalOptional => {
                third_party_block.insert("#include <optional.hpp>");
            }
        }
    }

    let mut block_strs = Vec::new();
    if !third_party_block.is_empty() {
        block_strs.push(
            third_party_block
                .iter()
                .copied()
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
    if !stl_block.is_empty() {
        block_strs.push(stl_block.iter().copied().collect::<Vec<_>>().join("\n"));
    }

    block_strs.join("\n\n")
}

/// Generate the forward declarations of all the graph-specific types.
fn forward_declarations(graph: &Graph) -> String {
    let mut blocks = vec![format!("struct {};", naming::as_composite(&graph.name))];

    if !graph.classes.is_empty() {
        let classes = graph
            .classes
            .values()
            .map(|cls| format!("class {};", naming::as_composite(&cls.name)))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(classes);
    }

    if !graph.embeds.is_empty() {
        let embeds = graph
            .embeds
            .values()
            .map(|embed| format!("struct {};", naming::as_composite(&embed.name)))
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(embeds);
    }

    blocks.join("\n\n")
}

/// Generate the default member initializer, if the type has one.
fn default_value(value_type: &ValueType, cpp: &Cpp) -> Option<&'static str> {
    match value_type {
        ValueType::Boolean => Some("false"),
        ValueType::Integer { .. } => Some("0"),
        ValueType::Float { .. } => Some("0.0"),
        ValueType::Date { .. } | ValueType::Time { .. } | ValueType::Datetime { .. } => {
            match cpp.datetime_library {
                CppDatetimeLibrary::Ctime => Some("tm{0}"),
                CppDatetimeLibrary::DateH => None,
            }
        }
        ValueType::TimeZone => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => None,
            CppDatetimeLibrary::DateH => Some("nullptr"),
        },
        ValueType::ClassRef { .. } => Some("nullptr"),
        _ => None,
    }
}

/// Generate the property fields of a composite.
fn property_fields(properties: &IndexMap<String, Property>, cpp: &Cpp) -> String {
    let mut blocks = Vec::new();

    for prop in properties.values() {
        let mut block = Vec::new();
        if !prop.description.is_empty() {
            block.push(comment(&prop.description));
        }

        let field = naming::as_field(&prop.name);

        if prop.optional {
            let non_optional = common::type_repr(&prop.value_type, cpp);
            block.push(format!(
                "{}<{non_optional}> {field};",
                common::optional_type(cpp)
            ));
        } else {
            let prop_type = common::type_repr(&prop.value_type, cpp);
            match default_value(&prop.value_type, cpp) {
                Some(default) => block.push(format!("{prop_type} {field} = {default};")),
                None => block.push(format!("{prop_type} {field};")),
            }
        }

        blocks.push(block.join("\n"));
    }

    blocks.join("\n\n")
}

fn embed_definition(
    name: &str,
    description: &str,
    properties: &IndexMap<String, Property>,
    cpp: &Cpp,
) -> String {
    let mut code = String::new();
    if !description.is_empty() {
        code.push_str(&comment(description));
        code.push('\n');
    }
    code.push_str(&format!("struct {} {{\n", naming::as_composite(name)));

    let fields = property_fields(properties, cpp);
    if !fields.is_empty() {
        code.push_str(&indent(&fields, 1));
        code.push('\n');
    }
    code.push_str("};");

    code
}

fn class_definition(
    name: &str,
    description: &str,
    properties: &IndexMap<String, Property>,
    cpp: &Cpp,
) -> String {
    let mut code = String::new();
    if !description.is_empty() {
        code.push_str(&comment(description));
        code.push('\n');
    }
    code.push_str(&format!("class {} {{\n", naming::as_composite(name)));
    code.push_str("public:\n    // identifies the instance.\n    std::string id;\n");

    let fields = property_fields(properties, cpp);
    if !fields.is_empty() {
        code.push('\n');
        code.push_str(&indent(&fields, 1));
        code.push('\n');
    }
    code.push_str("};");

    code
}

fn graph_definition(graph: &Graph, cpp: &Cpp) -> String {
    let mut code = String::new();
    if !graph.description.is_empty() {
        code.push_str(&comment(&graph.description));
        code.push('\n');
    }
    code.push_str(&format!(
        "struct {} {{\n",
        naming::as_composite(&graph.name)
    ));

    let fields = property_fields(&graph.properties, cpp);
    if !fields.is_empty() {
        code.push_str(&indent(&fields, 1));
        code.push('\n');
    }

    for (i, cls) in graph.classes.values().enumerate() {
        if i > 0 || !fields.is_empty() {
            code.push('\n');
        }
        code.push_str(&format!(
            "    // registers {} instances.\n    std::map<std::string, std::unique_ptr<{}>> {};\n",
            naming::as_composite(&cls.name),
            naming::as_composite(&cls.name),
            naming::as_field(&cls.plural)
        ));
    }

    code.push_str("};");

    code
}

/// Generate the header file that defines the types of the object graph.
pub(crate) fn generate(graph: &Graph, cpp: &Cpp) -> String {
    let mut blocks = vec![
        "#pragma once".to_string(),
        WARNING.to_string(),
        includes(graph, cpp),
        common::namespace_opening(cpp),
        forward_declarations(graph),
    ];

    for embed in graph.embeds.values() {
        blocks.push(embed_definition(
            &embed.name,
            &embed.description,
            &embed.properties,
            cpp,
        ));
    }

    for cls in graph.classes.values() {
        blocks.push(class_definition(
            &cls.name,
            &cls.description,
            &cls.properties,
            cpp,
        ));
    }

    blocks.push(graph_definition(graph, cpp));

    blocks.push(common::namespace_closing(cpp));
    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, &cpp.indention)
}
