//! Conversion of strftime directives to Go time layouts.

use graphable_core::strftime::{self, Token};

/// Translation of the supported strftime directives to the Go reference
/// time (`Mon Jan 2 15:04:05 MST 2006`).
const STRFTIME_TO_GO: &[(&str, &str)] = &[
    ("%a", "Sun"),
    ("%A", "Sunday"),
    ("%b", "Jan"),
    ("%B", "January"),
    ("%d", "02"),
    ("%e", "_2"),
    ("%m", "01"),
    ("%y", "06"),
    ("%Y", "2006"),
    ("%H", "15"),
    ("%I", "03"),
    ("%l", "3"),
    ("%M", "04"),
    ("%P", "pm"),
    ("%p", "PM"),
    ("%S", "05"),
    ("%z", "-0700"),
    ("%Z", "MST"),
    ("%%", "%"),
];

/// Convert the strftime directives of a validated format to a Go layout.
pub(crate) fn convert(format: &str) -> String {
    let token_lines = strftime::tokenize(format)
        .expect("the format was tokenized during schema validation");

    let mut parts = Vec::new();

    for (i, token_line) in token_lines.iter().enumerate() {
        if i > 0 {
            parts.push("\n".to_string());
        }

        for token in token_line {
            match token {
                Token::Directive(content) => {
                    let converted = STRFTIME_TO_GO
                        .iter()
                        .find(|(directive, _)| directive == content)
                        .map(|(_, go)| *go)
                        .unwrap_or_else(|| {
                            unreachable!(
                                "Unhandled strftime->go mapping for: {content}"
                            )
                        });
                    parts.push(converted.to_string());
                }
                Token::Text(content) => parts.push(content.clone()),
            }
        }
    }

    parts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert() {
        assert_eq!(convert("%Y-%m-%d %H:%M:%SZ"), "2006-01-02 15:04:05Z");
        assert_eq!(convert("%Y-%m-%dT%H:%M:%SZ"), "2006-01-02T15:04:05Z");
        assert_eq!(convert("%d %b %y"), "02 Jan 06");
    }

    #[test]
    fn test_convert_multiline() {
        assert_eq!(convert("%Y-%m-%d\n%H:%M:%SZ"), "2006-01-02\n15:04:05Z");
    }
}
