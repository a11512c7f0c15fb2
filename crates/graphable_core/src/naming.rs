//! Identifier transformations (splitting, plural, camel casing).
//!
//! Identifiers are written in `Snake_case` or `snake_case`; the functions
//! here derive the forms needed by the schema and the generators. Camel
//! conversions preserve inner capitalization, so `Some_URL_class` becomes
//! `SomeURLClass` rather than `SomeUrlClass`.

/// Irregular plural forms. Capitalized heads are handled by [`plural`].
const PLURAL_TABLE: &[(&str, &str)] = &[
    ("criterion", "criteria"),
    ("minimum", "minima"),
    ("maximum", "maxima"),
    ("matrix", "matrices"),
    ("life", "lives"),
    ("focus", "foci"),
];

/// Split the identifier into its underscore-separated parts.
pub fn split(identifier: &str) -> Vec<&str> {
    identifier.split('_').collect()
}

fn irregular_plural(last_part: &str) -> Option<String> {
    for (singular, plural) in PLURAL_TABLE {
        if last_part == *singular {
            return Some((*plural).to_string());
        }

        // Capitalized singulars pluralize to capitalized plurals.
        let mut capitalized = singular.to_string();
        capitalized[..1].make_ascii_uppercase();
        if last_part == capitalized {
            let mut result = (*plural).to_string();
            result[..1].make_ascii_uppercase();
            return Some(result);
        }
    }

    None
}

/// Generate the plural of the identifier.
///
/// Only the final underscore-part is pluralized; the preceding parts are
/// preserved (`Bounding_box` becomes `Bounding_boxes`).
pub fn plural(identifier: &str) -> String {
    assert!(!identifier.is_empty(), "Expected a non-empty identifier");

    let parts = split(identifier);
    let last_part = parts[parts.len() - 1];

    if let Some(irregular) = irregular_plural(last_part) {
        let mut result = parts[..parts.len() - 1].join("_");
        if !result.is_empty() {
            result.push('_');
        }
        result.push_str(&irregular);
        return result;
    }

    let vowel_y = ["ay", "ey", "iy", "oy", "uy"]
        .iter()
        .any(|suffix| last_part.ends_with(suffix));

    if vowel_y {
        format!("{identifier}s")
    } else if last_part.ends_with('y') {
        format!("{}ies", &identifier[..identifier.len() - 1])
    } else if last_part.ends_with('x') || last_part.ends_with('s') {
        format!("{identifier}es")
    } else {
        format!("{identifier}s")
    }
}

/// Translate the plural designation of a class to a JSON field name.
///
/// The plural must be capitalized; the JSON field is its lowercase form
/// (`Some_URL_instances` becomes `some_url_instances`).
pub fn json_plural(a_plural: &str) -> String {
    assert!(
        a_plural.starts_with(|c: char| c.is_ascii_uppercase()),
        "Expected a capital plural of a composite, but got: {a_plural:?}"
    );

    a_plural.to_lowercase()
}

/// Join the identifier parts in lowercase (`Some_URL` becomes `some_url`).
pub fn lowercase_join(identifier: &str) -> String {
    assert!(!identifier.is_empty(), "Expected a non-empty identifier");

    identifier.to_lowercase()
}

/// Convert the identifier to lowerCamelCase.
///
/// The first part is lowercased entirely; the remaining parts keep their
/// inner capitalization (`IDs_of_URLs` becomes `idsOfURLs`).
pub fn lower_camel(identifier: &str) -> String {
    assert!(!identifier.is_empty(), "Expected a non-empty identifier");

    let parts = split(identifier);
    let mut result = parts[0].to_lowercase();

    for part in &parts[1..] {
        push_capitalized(part, &mut result);
    }

    result
}

/// Convert the identifier to UpperCamelCase.
///
/// Each part is capitalized, preserving inner capitalization
/// (`Some_ID_URLs` becomes `SomeIDURLs`).
pub fn upper_camel(identifier: &str) -> String {
    assert!(!identifier.is_empty(), "Expected a non-empty identifier");

    let parts = split(identifier);
    let mut result = String::with_capacity(identifier.len());

    for part in parts {
        push_capitalized(part, &mut result);
    }

    result
}

/// Capitalize the first char and push the part, keeping the rest intact.
fn push_capitalized(part: &str, result: &mut String) {
    let mut chars = part.chars();
    if let Some(first) = chars.next() {
        result.extend(first.to_uppercase());
        result.push_str(chars.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        assert_eq!(split("some"), vec!["some"]);
        assert_eq!(split("some_split"), vec!["some", "split"]);
        assert_eq!(split("Some_Split"), vec!["Some", "Split"]);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("Hello"), "Hellos");
        assert_eq!(plural("GoodDay"), "GoodDays");
        assert_eq!(plural("Daisy"), "Daisies");
        assert_eq!(plural("Bounding_box"), "Bounding_boxes");
        assert_eq!(plural("Some_URL"), "Some_URLs");
        assert_eq!(plural("Day"), "Days");
        assert_eq!(plural("Address"), "Addresses");
    }

    #[test]
    fn test_plural_irregular() {
        assert_eq!(plural("Focus"), "Foci");
        assert_eq!(plural("criterion"), "criteria");
        assert_eq!(plural("Matrix"), "Matrices");
        assert_eq!(plural("Some_maximum"), "Some_maxima");
        assert_eq!(plural("Life"), "Lives");
    }

    #[test]
    fn test_json_plural() {
        assert_eq!(json_plural("Some_URL_instances"), "some_url_instances");
        assert_eq!(json_plural("Things"), "things");
    }

    #[test]
    fn test_lower_camel() {
        assert_eq!(lower_camel("some_block"), "someBlock");
        assert_eq!(lower_camel("Some_block"), "someBlock");
        assert_eq!(lower_camel("Some_ID_URLs"), "someIDURLs");
        assert_eq!(lower_camel("IDs_of_URLs"), "idsOfURLs");
    }

    #[test]
    fn test_upper_camel() {
        assert_eq!(upper_camel("some_block"), "SomeBlock");
        assert_eq!(upper_camel("Some_Block"), "SomeBlock");
        assert_eq!(upper_camel("Some_ID_URLs"), "SomeIDURLs");
        assert_eq!(upper_camel("IDs_of_URLs"), "IDsOfURLs");
    }

    #[test]
    fn test_lowercase_join() {
        assert_eq!(lowercase_join("Some_URL_class"), "some_url_class");
        assert_eq!(lowercase_join("URL_property"), "url_property");
    }
}
