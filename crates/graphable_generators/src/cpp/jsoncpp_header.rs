//! Emission of `jsoncpp.h` declaring the de/serialization from/to
//! Jsoncpp values.

use std::collections::BTreeSet;

use graphable_core::indention::reindent;
use graphable_core::schema::referenced_classes;
use graphable_core::{Cpp, CppOptionalAs, CppPathAs, Graph, ValueType};

use super::common::{self, WARNING};
use super::naming;

/// Generate the include directives of the header file.
fn includes(
    graph: &Graph,
    cpp: &Cpp,
    types_header_path: &str,
    parse_header_path: &str,
) -> String {
    let mut stl_block: BTreeSet<&str> = BTreeSet::new();
    let mut third_party_block: BTreeSet<String> =
        BTreeSet::from(["#include <json/json.h>  // jsoncpp".to_string()]);

    let first_party_block: BTreeSet<String> = BTreeSet::from([
        format!("#include \"{types_header_path}\""),
        format!("#include \"{parse_header_path}\""),
    ]);

    if graph.has_type(|t| matches!(t, ValueType::String { .. })) {
        stl_block.insert("#include <string>");
    }

    if graph.has_type(|t| matches!(t, ValueType::Path { .. })) {
        match cpp.path_as {
            CppPathAs::StdFilesystemPath => {
                stl_block.insert("#include <filesystem>");
            }
            CppPathAs::BoostFilesystemPath => {
                third_party_block
                    .insert("#include <boost/filesystem/path.hpp>".to_string());
            }
        }
    }

    if !graph.classes.is_empty() {
        stl_block.insert("#include <map>");
        stl_block.insert("#include <memory>");
        stl_block.insert("#include <string>");
    }

    if common::has_optional(graph) {
        match cpp.optional_as {
            CppOptionalAs::BoostOptional => {
                third_party_block.insert("#include <boost/optional.hpp>".to_string());
            }
            CppOptionalAs::StdOptional => {
                stl_block.insert("#include <optional>");
            }
            CppOptionalAs::ExperimentalOptional => {
                third_party_block.insert("#include <optional.hpp>".to_string());
            }
        }
    }

    let mut block_strs = vec![
        third_party_block.iter().cloned().collect::<Vec<_>>().join("\n"),
    ];
    if !stl_block.is_empty() {
        block_strs.push(stl_block.iter().copied().collect::<Vec<_>>().join("\n"));
    }
    block_strs.push(first_party_block.iter().cloned().collect::<Vec<_>>().join("\n"));

    block_strs.join("\n\n")
}

/// Generate the declarations of the parsing functions.
fn parse_definitions(graph: &Graph) -> String {
    let graph_composite = naming::as_composite(&graph.name);
    let graph_variable = naming::as_variable(&graph.name);

    let mut blocks = vec![format!(
        r#"/**
 * parses {graph_composite} from a JSON value.
 *
 * @param [in] value to be parsed
 * @param [in] ref reference to the value (e.g., a reference path)
 * @param [out] target parsed {graph_composite}
 * @param [out] errors encountered during parsing
 */
void {graph_variable}_from(
    const Json::Value& value,
    std::string ref,
    {graph_composite}* target,
    parse::Errors* errors);"#
    )];

    let nongraph: Vec<(&str, &indexmap::IndexMap<String, graphable_core::Property>)> =
        graph
            .embeds
            .values()
            .map(|embed| (embed.name.as_str(), &embed.properties))
            .chain(
                graph
                    .classes
                    .values()
                    .map(|cls| (cls.name.as_str(), &cls.properties)),
            )
            .collect();

    for (name, properties) in nongraph {
        let composite = naming::as_composite(name);
        let variable = naming::as_variable(name);

        let mut registry_docs = String::new();
        let mut registry_parameters = String::new();
        for reference in referenced_classes(graph, properties) {
            registry_docs.push_str(&format!(
                " * @param {}_registry registry of the {} instances\n",
                naming::as_variable(&reference.plural),
                naming::as_composite(&reference.name)
            ));
            registry_parameters.push_str(&format!(
                "    const std::map<std::string, std::unique_ptr<{}>>& {}_registry,\n",
                naming::as_composite(&reference.name),
                naming::as_variable(&reference.plural)
            ));
        }

        blocks.push(format!(
            r#"/**
 * parses {composite} from a JSON value.
 *
 * @param [in] value to be parsed
{registry_docs} * @param ref reference to the value (e.g., a reference path)
 * @param [out] target parsed data
 * @param [out] errors encountered during parsing
 */
void {variable}_from(
    const Json::Value& value,
{registry_parameters}    std::string ref,
    {composite}* target,
    parse::Errors* errors);"#
        ));
    }

    blocks.join("\n\n")
}

/// Generate the declarations of the serialization functions.
fn serialize_definitions(graph: &Graph) -> String {
    let mut composite_names = vec![graph.name.as_str()];
    composite_names.extend(graph.classes.values().map(|cls| cls.name.as_str()));
    composite_names.extend(graph.embeds.values().map(|embed| embed.name.as_str()));

    let mut blocks = Vec::new();
    for name in composite_names {
        let composite = naming::as_composite(name);
        let variable = naming::as_variable(name);

        blocks.push(format!(
            r#"/**
 * serializes {composite} to a JSON value.
 *
 * @param {variable} to be serialized
 * @return JSON value
 */
Json::Value serialize_{variable}(
    const {composite}& {variable});"#
        ));
    }

    blocks.join("\n\n")
}

/// Generate the header file for de/serialization from/to Jsoncpp.
pub(crate) fn generate(
    graph: &Graph,
    cpp: &Cpp,
    types_header_path: &str,
    parse_header_path: &str,
) -> String {
    let blocks = [
        "#pragma once".to_string(),
        WARNING.to_string(),
        includes(graph, cpp, types_header_path, parse_header_path),
        common::namespace_opening(cpp),
        "namespace jsoncpp {".to_string(),
        parse_definitions(graph),
        serialize_definitions(graph),
        "}  // namespace jsoncpp".to_string(),
        common::namespace_closing(cpp),
        WARNING.to_string(),
    ];

    reindent(&(blocks.join("\n\n") + "\n"), 0, &cpp.indention)
}
