//! Emission of `parse.py` with the error container and the placeholders.

use graphable_core::indention::reindent;
use graphable_core::{Graph, Property, Py};
use indexmap::IndexMap;

use super::common::{WARNING, docstring};
use super::naming;
use crate::common::indent;

/// The `Error` and `Errors` containers of the generated parsing code.
const DEFINE_ERROR_AND_ERRORS: &str = r#"class Error:
    """represents an error occurred while parsing."""

    def __init__(self, ref: str, message: str) -> None:
        """
        initializes the error with the given values.

        :param ref: references the cause (e.g., a reference path)
        :param message: describes the error
        """
        self.ref = ref
        self.message = message


class Errors:
    """
    collects errors capped at a certain quantity.

    If the capacity is full, the subsequent surplus errors are ignored.
    """

    def __init__(self, cap: int) -> None:
        """
        initializes the error container with the given cap.

        :param cap: maximum number of contained errors
        """
        self.cap = cap
        self._values = []  # type: typing.List[Error]

    def add(self, ref: str, message: str) -> None:
        """
        adds an error to the container.

        :param ref: references the cause (e.g., a reference path)
        :param message: describes the error
        """
        if len(self._values) < self.cap:
            self._values.append(Error(ref=ref, message=message))

    def full(self) -> bool:
        """gives True when there are exactly ``cap`` errors contained."""
        return len(self._values) == self.cap

    def empty(self) -> bool:
        """gives True when there are no errors contained."""
        return len(self._values) == 0

    def count(self) -> int:
        """returns the number of errors."""
        return len(self._values)

    def values(self) -> typing.Iterable[Error]:
        """gives an iterator over the errors."""
        return iter(self._values)"#;

/// Generate a placeholder factory for a composite.
///
/// Placeholders are empty shells filled out during parsing; they make the
/// pre-allocation of class registries possible.
fn placeholder_function(
    variable: &str,
    composite: &str,
    takes_id: bool,
    properties: &IndexMap<String, Property>,
    py: &Py,
) -> String {
    let module = &py.module_name;
    let required: Vec<&Property> =
        properties.values().filter(|prop| !prop.optional).collect();

    let mut code = if takes_id {
        format!(
            "def placeholder_{variable}(\n        id: str) -> {module}.{composite}:\n"
        )
    } else {
        format!("def placeholder_{variable}() -> {module}.{composite}:\n")
    };

    let mut doctext = format!(
        "creates a placeholder instance of {composite}.\n\n\
         Placeholders are necessary so that we can pre-allocate class registries\n\
         during parsing. All the attributes of the placeholder are set to None.\n\
         Consider a placeholder an empty shell to be filled out during parsing.\n"
    );
    if takes_id {
        doctext.push_str("\n:param id: identifier of the instance");
    }
    doctext.push_str("\n:return: empty shell");

    code.push_str(&indent(&docstring(&doctext), 1));
    code.push('\n');

    let mut arguments: Vec<String> = Vec::new();
    if takes_id {
        arguments.push("id=id".to_string());
    }
    for prop in &required {
        arguments.push(format!("{}=None", naming::as_attribute(&prop.name)));
    }

    if arguments.is_empty() {
        code.push_str(&format!("    return {module}.{composite}()"));
    } else {
        let type_ignore = if required.is_empty() {
            ""
        } else {
            "  # type: ignore"
        };
        code.push_str(&format!("    return {module}.{composite}({type_ignore}\n"));
        for (i, argument) in arguments.iter().enumerate() {
            let separator = if i + 1 == arguments.len() { ")" } else { "," };
            code.push_str(&format!("        {argument}{separator}\n"));
        }
    }

    code.trim_end().to_string()
}

/// Generate the source file with the general parsing structures.
pub(crate) fn generate(graph: &Graph, py: &Py) -> String {
    let mut blocks = vec![
        WARNING.to_string(),
        docstring("provides general structures and functions for parsing."),
        format!("import typing\n\nimport {}", py.module_name),
        DEFINE_ERROR_AND_ERRORS.to_string(),
    ];

    for embed in graph.embeds.values() {
        blocks.push(placeholder_function(
            &naming::as_variable(&embed.name),
            &naming::as_composite(&embed.name),
            false,
            &embed.properties,
            py,
        ));
    }

    for cls in graph.classes.values() {
        blocks.push(placeholder_function(
            &naming::as_variable(&cls.name),
            &naming::as_composite(&cls.name),
            true,
            &cls.properties,
            py,
        ));
    }

    blocks.push(placeholder_function(
        &naming::as_variable(&graph.name),
        &naming::as_composite(&graph.name),
        false,
        &graph.properties,
        py,
    ));

    reindent(&(blocks.join("\n\n\n") + "\n"), 0, &py.indention)
}
