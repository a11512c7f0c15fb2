//! # graphable_core
//!
//! Core of the graphable code generator: the schema model of an object
//! graph, the loader and validators that construct it from a JSON
//! document, and the helpers shared by every target emitter (identifier
//! naming, strftime tokenization, re-indentation).
//!
//! ## Architecture
//!
//! ```text
//! schema JSON
//!     ↓
//! load::schema_from_str / schema_from_value
//!     ↓  (Stage A structural + Stage B semantic validation)
//! Schema { graph, cpp, go, py }
//!     ↓
//! graphable_generators::{cpp, go, py}::generate(schema)
//! ```
//!
//! The core performs no I/O; reading and writing files is the concern of
//! the command-line interface.

pub mod error;
pub mod indention;
pub mod naming;
pub mod schema;
pub mod strftime;

pub use error::{LoadError, SchemaError};
pub use schema::load::{schema_from_str, schema_from_value};
pub use schema::{
    Class, Cpp, CppDatetimeLibrary, CppOptionalAs, CppPathAs, Embed, Go, Graph,
    Property, Py, PyPathAs, PyTimezoneAs, Schema, ValueType,
};
