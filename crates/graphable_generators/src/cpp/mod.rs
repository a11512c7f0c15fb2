//! Generation of the C++ code de/serializing an object graph.
//!
//! The emitted file set: `types.h` (type definitions), `parse.h` /
//! `parse.cpp` (the error container) and `jsoncpp.h` / `jsoncpp.cpp`
//! (parsing and serialization against Jsoncpp values).

pub mod validation;

pub(crate) mod common;
pub(crate) mod expr;
pub(crate) mod naming;

mod jsoncpp_header;
mod jsoncpp_impl;
mod parse_header;
mod parse_impl;
mod types_header;

use graphable_core::Schema;

use crate::{GenerateError, GeneratedFile};

/// Generate the full set of C++ source files for the schema.
///
/// The include directives of the generated files refer to each other by
/// the emitted file names; a caller placing the files in separate
/// directories has to fix up the includes.
pub fn generate(schema: &Schema) -> Result<Vec<GeneratedFile>, GenerateError> {
    let errors = validation::validate_schema(schema);
    if !errors.is_empty() {
        return Err(GenerateError::TargetValidation(errors));
    }

    let cpp = schema
        .cpp
        .as_ref()
        .ok_or(GenerateError::MissingSettings("cpp"))?;
    let graph = &schema.graph;

    Ok(vec![
        GeneratedFile {
            name: "types.h".to_string(),
            content: types_header::generate(graph, cpp),
        },
        GeneratedFile {
            name: "parse.h".to_string(),
            content: parse_header::generate(cpp),
        },
        GeneratedFile {
            name: "parse.cpp".to_string(),
            content: parse_impl::generate(cpp, "parse.h"),
        },
        GeneratedFile {
            name: "jsoncpp.h".to_string(),
            content: jsoncpp_header::generate(graph, cpp, "types.h", "parse.h"),
        },
        GeneratedFile {
            name: "jsoncpp.cpp".to_string(),
            content: jsoncpp_impl::generate(graph, cpp, "types.h", "parse.h", "jsoncpp.h"),
        },
    ])
}
