//! Error types for schema loading and validation.

use std::fmt;

/// An error in a schema document, anchored at a reference path.
///
/// Violations are collected, not raised one-by-one, so that a user sees the
/// full set of problems in a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// References the cause (*e.g.*, `#/classes/0/properties/foo/pattern`)
    pub ref_path: String,

    /// Describes the error
    pub message: String,
}

impl SchemaError {
    pub fn new(ref_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ref_path: ref_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ref_path, self.message)
    }
}

/// Render a list of schema errors one per line.
pub fn join_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The failure modes of loading a schema document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document was not syntactically valid JSON. This is the only
    /// error that is not expressed as a collection of [`SchemaError`]s.
    #[error("failed to json-decode the schema at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    /// The document parsed, but violated the schema-of-schemas or one of
    /// the semantic invariants. All violations are reported.
    #[error("the schema failed to validate:\n{}", join_errors(.0))]
    Invalid(Vec<SchemaError>),
}
