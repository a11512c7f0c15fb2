//! Generation of the Go code de/serializing an object graph.
//!
//! The emitted file set: `types.go`, `parse.go`, `from_jsonable.go`,
//! `to_jsonable.go` and the accompanying Example tests for the duration
//! round-tripping.

pub mod validation;

pub(crate) mod common;
pub(crate) mod expr;
pub(crate) mod timeformat;

mod fromjsonable;
mod fromjsonable_test;
mod parse;
mod tojsonable;
mod tojsonable_test;
mod types;

use graphable_core::Schema;

use crate::{GenerateError, GeneratedFile};

/// Generate the full set of Go source files for the schema.
pub fn generate(schema: &Schema) -> Result<Vec<GeneratedFile>, GenerateError> {
    let errors = validation::validate_schema(schema);
    if !errors.is_empty() {
        return Err(GenerateError::TargetValidation(errors));
    }

    let go = schema
        .go
        .as_ref()
        .ok_or(GenerateError::MissingSettings("go"))?;
    let graph = &schema.graph;

    Ok(vec![
        GeneratedFile {
            name: "types.go".to_string(),
            content: types::generate(graph, go),
        },
        GeneratedFile {
            name: "parse.go".to_string(),
            content: parse::generate(go),
        },
        GeneratedFile {
            name: "from_jsonable.go".to_string(),
            content: fromjsonable::generate(graph, go),
        },
        GeneratedFile {
            name: "from_jsonable_test.go".to_string(),
            content: fromjsonable_test::generate(graph, go),
        },
        GeneratedFile {
            name: "to_jsonable.go".to_string(),
            content: tojsonable::generate(graph, go),
        },
        GeneratedFile {
            name: "to_jsonable_test.go".to_string(),
            content: tojsonable_test::generate(graph, go),
        },
    ])
}
