//! Translation of schema identifiers to Python identifiers.

use graphable_core::naming;

/// Translate the name of a property to the name of a Python attribute
/// (`some_URL_property` becomes `some_url_property`).
pub fn as_attribute(identifier: &str) -> String {
    naming::lowercase_join(identifier)
}

/// Translate the identifier of a composite to a Python variable name
/// (`Some_URL_class` becomes `some_url_class`).
pub fn as_variable(identifier: &str) -> String {
    assert_composite_identifier(identifier);
    identifier.to_lowercase()
}

/// Translate the identifier of a composite to a Python class name
/// (`Some_URL_class` becomes `SomeURLClass`).
pub fn as_composite(identifier: &str) -> String {
    assert_composite_identifier(identifier);
    naming::upper_camel(identifier)
}

fn assert_composite_identifier(identifier: &str) {
    assert!(
        identifier.starts_with(|c: char| c.is_ascii_uppercase()),
        "Expected an identifier of a composite to be in capital, but got: {identifier:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_attribute() {
        assert_eq!(as_attribute("some_URL_property"), "some_url_property");
        assert_eq!(as_attribute("URL_property"), "url_property");
    }

    #[test]
    fn test_as_variable() {
        assert_eq!(as_variable("Some_URL_class"), "some_url_class");
    }

    #[test]
    fn test_as_composite() {
        assert_eq!(as_composite("Some_URL_class"), "SomeURLClass");
    }
}
