//! Generation of the Python code de/serializing an object graph.
//!
//! The emitted module set mirrors the structure of the generated package:
//! `__init__.py` (types), `parse.py` (error container and placeholders),
//! `fromjsonable.py` (parsing) and `tojsonable.py` (serialization).

pub mod naming;
pub mod validation;

pub(crate) mod common;
pub(crate) mod expr;

mod fromjsonable;
mod parse;
mod tojsonable;
mod types;

use graphable_core::Schema;

use crate::{GenerateError, GeneratedFile};

/// Generate the full set of Python source files for the schema.
///
/// The file names are relative to the package directory of the generated
/// module; writing them out is the caller's concern.
pub fn generate(schema: &Schema) -> Result<Vec<GeneratedFile>, GenerateError> {
    let errors = validation::validate_schema(schema);
    if !errors.is_empty() {
        return Err(GenerateError::TargetValidation(errors));
    }

    let py = schema
        .py
        .as_ref()
        .ok_or(GenerateError::MissingSettings("py"))?;
    let graph = &schema.graph;

    Ok(vec![
        GeneratedFile {
            name: "__init__.py".to_string(),
            content: types::generate(graph, py),
        },
        GeneratedFile {
            name: "parse.py".to_string(),
            content: parse::generate(graph, py),
        },
        GeneratedFile {
            name: "fromjsonable.py".to_string(),
            content: fromjsonable::generate(graph, py),
        },
        GeneratedFile {
            name: "tojsonable.py".to_string(),
            content: tojsonable::generate(graph, py),
        },
    ])
}
