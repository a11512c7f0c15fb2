//! # graphable_generators
//!
//! Code generators for the graphable schema: each target module (C++, Go,
//! Python) validates the schema against the constraints of its language
//! and emits the full set of source files needed to represent, parse and
//! serialize instances of the object graph.
//!
//! The emitters are strictly type-directed: every dispatch point matches
//! exhaustively over [`graphable_core::ValueType`], so an unhandled tag is
//! a compile error here rather than a runtime surprise in generated code.
//!
//! Generation is deterministic: wherever a set is iterated (include sets,
//! transitive reference sets, registries), it is sorted by a canonical key
//! first. Two runs over the same schema produce byte-identical files.

pub mod cpp;
pub mod go;
pub mod py;

pub(crate) mod common;

use graphable_core::SchemaError;
use graphable_core::error::join_errors;

/// A single generated source file.
///
/// The caller decides where (and whether) to write it; the core never
/// touches the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory (*e.g.*, `types.go`)
    pub name: String,

    /// Full content of the file
    pub content: String,
}

/// The failure modes of generating code for a target.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The schema violates target-specific constraints (reserved keywords,
    /// identifier collisions under target casing). All violations are
    /// reported.
    #[error("the schema failed to validate for the target:\n{}", join_errors(.0))]
    TargetValidation(Vec<SchemaError>),

    /// The schema lacks the settings section for the requested target
    #[error("expected the {0:?} settings to be set in the schema, but found none")]
    MissingSettings(&'static str),
}
