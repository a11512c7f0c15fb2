//! Re-indentation of emitted code.
//!
//! Emitters produce text with a canonical 4-space indention; the target
//! settings decide the final indention string (*e.g.*, a tab for Go or two
//! spaces for C++).

/// Re-indent `text` to the given `level` with the `indention` string.
///
/// Each run of N×4 leading spaces becomes `level + N` copies of
/// `indention`. Lines without content are kept empty so that no trailing
/// whitespace is introduced.
pub fn reindent(text: &str, level: usize, indention: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);

        if content.trim().is_empty() {
            // Blank line; re-indenting would add trailing whitespace.
            result.push_str(content.trim_start_matches(' '));
            if line.ends_with('\n') {
                result.push('\n');
            }
            continue;
        }

        let leading = content.len() - content.trim_start_matches(' ').len();
        let quads = leading / 4;

        for _ in 0..level + quads {
            result.push_str(indention);
        }
        result.push_str(&content[quads * 4..]);

        if line.ends_with('\n') {
            result.push('\n');
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindent() {
        let text = "test me:\n    again\n        and again\n";
        assert_eq!(
            reindent(text, 0, "|"),
            "test me:\n|again\n||and again\n"
        );
    }

    #[test]
    fn test_reindent_with_level() {
        let text = "test me:\n    again\n        and again\n";
        assert_eq!(
            reindent(text, 1, "|"),
            "|test me:\n||again\n|||and again\n"
        );
    }

    #[test]
    fn test_reindent_keeps_blank_lines_clean() {
        let text = "first\n\nsecond\n";
        assert_eq!(reindent(text, 1, "  "), "  first\n\n  second\n");
    }

    #[test]
    fn test_reindent_tabs() {
        let text = "func f() {\n    return\n}\n";
        assert_eq!(reindent(text, 0, "\t"), "func f() {\n\treturn\n}\n");
    }
}
