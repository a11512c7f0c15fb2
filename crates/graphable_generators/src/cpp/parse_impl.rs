//! Emission of `parse.cpp` implementing the general parsing structures.

use graphable_core::Cpp;
use graphable_core::indention::reindent;

use super::common::{self, WARNING};

const PARSE_ERRORS: &str = r#"Errors::Errors(size_t cap) : cap_(cap) {}

void Errors::reserve(size_t expected_errors) {
    errors_.reserve(expected_errors);
}

void Errors::add(const std::string& ref, const std::string& message) {
    if (errors_.size() < cap_) {
        errors_.emplace_back(Error{ref, message});
    }
}

bool Errors::full() const {
    return errors_.size() == cap_;
}

bool Errors::empty() const {
    return errors_.empty();
}

const std::vector<Error>& Errors::get() const {
    return errors_;
}"#;

/// Generate the implementation file of the parsing structures.
pub(crate) fn generate(cpp: &Cpp, parse_header_path: &str) -> String {
    let blocks = [
        WARNING.to_string(),
        format!("#include \"{parse_header_path}\""),
        "#include <string>\n#include <vector>".to_string(),
        common::namespace_opening(cpp),
        "namespace parse {".to_string(),
        PARSE_ERRORS.to_string(),
        "}  // namespace parse".to_string(),
        common::namespace_closing(cpp),
        WARNING.to_string(),
    ];

    reindent(&(blocks.join("\n\n") + "\n"), 0, &cpp.indention)
}
