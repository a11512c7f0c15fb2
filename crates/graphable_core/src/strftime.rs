//! Tokenization of strftime-style date/time formats.
//!
//! Only a closed subset of the strftime directives is supported, since the
//! same format has to be interpreted by the date/time libraries of every
//! target language.

/// A lexed fragment of a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A `%`-directive such as `%Y` (the content includes the percent)
    Directive(String),

    /// A run of literal text between directives
    Text(String),
}

impl Token {
    /// The raw content of the token.
    pub fn content(&self) -> &str {
        match self {
            Token::Directive(content) | Token::Text(content) => content,
        }
    }
}

/// The failure modes of tokenizing a format string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrftimeError {
    /// A bare `%` not followed by a directive character
    #[error("failed to lex the format at character {0}")]
    Lex(usize),

    /// Directives outside of the supported set, joined by `, `
    #[error("unsupported directive(s): {0}")]
    UnsupportedDirective(String),
}

/// Supported strftime directives.
///
/// The set is closed: every directive has to be translatable to the
/// format vocabulary of all the target date/time libraries.
pub const SUPPORTED_DIRECTIVES: &[&str] = &[
    "%a", // The abbreviated weekday name ("Sun")
    "%A", // The full weekday name ("Sunday")
    "%b", // The abbreviated month name ("Jan")
    "%B", // The full month name ("January")
    "%d", // Day of the month (01..31)
    "%e", // Day of the month with a leading blank instead of zero ( 1..31)
    "%m", // Month of the year (01..12)
    "%y", // Year without a century (00..99)
    "%Y", // Year with century
    "%H", // Hour of the day, 24-hour clock (00..23)
    "%I", // Hour of the day, 12-hour clock (01..12)
    "%l", // Hour of the day, 12-hour clock without a leading zero (1..12)
    "%M", // Minute of the hour (00..59)
    "%P", // Meridian indicator ("am" or "pm")
    "%p", // Meridian indicator ("AM" or "PM")
    "%S", // Second of the minute (00..60)
    "%z", // Time zone hour and minute offset from UTC
    "%Z", // Time zone name
    "%%", // Literal "%" character
];

/// Directives admitted in a date format.
pub const DATE_DIRECTIVES: &[&str] = &[
    "%a", "%A", "%b", "%B", "%d", "%e", "%m", "%y", "%Y", "%z", "%Z", "%%",
];

/// Directives admitted in a time format.
pub const TIME_DIRECTIVES: &[&str] = &[
    "%H", "%I", "%l", "%M", "%P", "%p", "%S", "%z", "%Z", "%%",
];

/// Tokenize the date/time format into per-line token sequences.
///
/// Also validates that the format contains only the supported subset of
/// strftime directives.
pub fn tokenize(format: &str) -> Result<Vec<Vec<Token>>, StrftimeError> {
    let mut token_lines = Vec::new();
    let mut position = 0usize;

    for line in format.split('\n') {
        token_lines.push(lex_line(line, position)?);
        position += line.len() + 1;
    }

    let mut unsupported: Vec<String> = Vec::new();
    for token_line in &token_lines {
        for token in token_line {
            if let Token::Directive(content) = token {
                if !SUPPORTED_DIRECTIVES.contains(&content.as_str())
                    && !unsupported.iter().any(|seen| seen == content)
                {
                    unsupported.push(content.clone());
                }
            }
        }
    }

    if !unsupported.is_empty() {
        return Err(StrftimeError::UnsupportedDirective(unsupported.join(", ")));
    }

    Ok(token_lines)
}

/// Lex a single line into directive and text tokens.
///
/// `offset` is the position of the line start within the whole format,
/// used to report lex errors.
fn lex_line(line: &str, offset: usize) -> Result<Vec<Token>, StrftimeError> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '%' {
            text.push(c);
            continue;
        }

        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }

        match chars.next() {
            Some((_, suffix)) if suffix.is_ascii_alphabetic() || suffix == '%' => {
                tokens.push(Token::Directive(format!("%{suffix}")));
            }
            _ => return Err(StrftimeError::Lex(offset + i)),
        }
    }

    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }

    Ok(tokens)
}

/// Check that the tokens represent a valid sequence of date directives.
///
/// Returns the error message, if any.
pub fn validate_date_tokens(token_lines: &[Vec<Token>]) -> Option<String> {
    validate_against_subset(token_lines, DATE_DIRECTIVES, "date")
}

/// Check that the tokens represent a valid sequence of time directives.
///
/// Returns the error message, if any.
pub fn validate_time_tokens(token_lines: &[Vec<Token>]) -> Option<String> {
    validate_against_subset(token_lines, TIME_DIRECTIVES, "time")
}

fn validate_against_subset(
    token_lines: &[Vec<Token>],
    subset: &[&str],
    kind: &str,
) -> Option<String> {
    if token_lines.iter().map(Vec::len).sum::<usize>() == 0 {
        return Some("Unexpected empty format".to_string());
    }

    for token_line in token_lines {
        for token in token_line {
            if let Token::Directive(content) = token {
                if !subset.contains(&content.as_str()) {
                    return Some(format!(
                        "Unexpected directive {content:?} in a {kind} format"
                    ));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_date() {
        let token_lines = tokenize("%Y-%m-%d").unwrap();
        assert_eq!(
            token_lines,
            vec![vec![
                Token::Directive("%Y".to_string()),
                Token::Text("-".to_string()),
                Token::Directive("%m".to_string()),
                Token::Text("-".to_string()),
                Token::Directive("%d".to_string()),
            ]]
        );
    }

    #[test]
    fn test_tokenize_multiline() {
        let token_lines = tokenize("%Y\n%H:%M").unwrap();
        assert_eq!(token_lines.len(), 2);
        assert_eq!(token_lines[0], vec![Token::Directive("%Y".to_string())]);
        assert_eq!(
            token_lines[1],
            vec![
                Token::Directive("%H".to_string()),
                Token::Text(":".to_string()),
                Token::Directive("%M".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_literal_percent() {
        let token_lines = tokenize("100%%").unwrap();
        assert_eq!(
            token_lines,
            vec![vec![
                Token::Text("100".to_string()),
                Token::Directive("%%".to_string()),
            ]]
        );
    }

    #[test]
    fn test_unsupported_directive() {
        assert_eq!(
            tokenize("%Y-%m-%j"),
            Err(StrftimeError::UnsupportedDirective("%j".to_string()))
        );

        assert_eq!(
            tokenize("%j %q"),
            Err(StrftimeError::UnsupportedDirective("%j, %q".to_string()))
        );
    }

    #[test]
    fn test_lex_error() {
        assert_eq!(tokenize("%Y-%"), Err(StrftimeError::Lex(3)));
        assert_eq!(tokenize("% 1"), Err(StrftimeError::Lex(0)));
    }

    #[test]
    fn test_validate_date_tokens() {
        let token_lines = tokenize("%Y-%m-%d").unwrap();
        assert_eq!(validate_date_tokens(&token_lines), None);

        let token_lines = tokenize("%Y-%m-%d %H").unwrap();
        assert_eq!(
            validate_date_tokens(&token_lines),
            Some("Unexpected directive \"%H\" in a date format".to_string())
        );

        assert_eq!(
            validate_date_tokens(&[]),
            Some("Unexpected empty format".to_string())
        );
    }

    #[test]
    fn test_validate_time_tokens() {
        let token_lines = tokenize("%H:%M:%S").unwrap();
        assert_eq!(validate_time_tokens(&token_lines), None);

        let token_lines = tokenize("%Y %H:%M").unwrap();
        assert_eq!(
            validate_time_tokens(&token_lines),
            Some("Unexpected directive \"%Y\" in a time format".to_string())
        );
    }
}
