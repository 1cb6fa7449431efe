//! Error types for query lexing and parsing.

use std::{error, fmt};

use thiserror::Error;

/// Lexer error with position information.
///
/// Displays the message with the input and a caret under the offending position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query syntax error: {message}\n  {input}\n  {}^", caret_padding(.position))]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }

    /// Formats the error with a caret under the offending position.
    pub fn format_with_context(&self) -> String {
        self.to_string()
    }
}

/// Spaces that put a caret under byte `position`.
fn caret_padding(position: &usize) -> String {
    " ".repeat(*position)
}

/// Parse error with the index of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Token index where error occurred (if applicable).
    pub token_index: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, token_index: Option<usize>) -> Self {
        Self {
            message: message.into(),
            token_index,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            token_index: None,
        }
    }
}

/// A unified error type for query parsing.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone)]
pub enum QueryErrorKind {
    /// Lexer error (tokenization failed).
    Lex {
        /// Error message.
        message: String,
        /// Byte position in input.
        position: usize,
    },
    /// Parser error (invalid structure).
    Parse {
        /// Error message.
        message: String,
        /// Token index (if available).
        token_index: Option<usize>,
    },
}

impl QueryError {
    /// Creates a lex error.
    pub fn lex(message: impl Into<String>, position: usize, query: impl Into<String>) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: message.into(),
                position,
            },
            query: Some(query.into()),
        }
    }

    /// Creates a parse error.
    pub fn parse(
        message: impl Into<String>,
        token_index: Option<usize>,
        query: Option<String>,
    ) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: message.into(),
                token_index,
            },
            query,
        }
    }

    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } | QueryErrorKind::Parse { message, .. } => {
                message
            }
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } if message.contains("unclosed quote") => {
                Some("Add a closing quote (\") to complete the phrase")
            }
            QueryErrorKind::Lex { message, .. } if message.contains("reserved character") => {
                Some("Quote the value or escape the character with a backslash")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("closing parenthesis") => {
                Some("Add a closing parenthesis ) to match the opening one")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("OR") => {
                Some("OR requires expressions on both sides, e.g. 'reader OR writer'")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("after '") => {
                Some("Valid fields are: contents, file, name, ext, proj, ws, jar, dir, modified")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.message())?;

        if let Some(query) = &self.query {
            writeln!(f, "  {query}")?;
            if let QueryErrorKind::Lex { position, .. } = &self.kind {
                let clamped = (*position).min(query.len());
                writeln!(f, "  {}^", " ".repeat(clamped))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {suggestion}")?;
        }

        Ok(())
    }
}

impl error::Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
            },
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: err.message,
                token_index: err.token_index,
            },
            query: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_display() {
        let err = QueryError::lex("unclosed quote", 0, "\"hello world");
        let display = err.to_string();
        assert!(display.contains("unclosed quote"));
        assert!(display.contains("\"hello world"));
        assert!(display.contains('^'));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn parse_error_display() {
        let err = QueryError::parse(
            "expected closing parenthesis",
            Some(2),
            Some("(reader".to_string()),
        );
        let display = err.to_string();
        assert!(display.contains("expected closing parenthesis"));
        assert!(display.contains("(reader"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn error_with_query() {
        let err = QueryError::parse("test error", None, None).with_query("ext:");
        assert_eq!(err.query.as_deref(), Some("ext:"));
    }

    #[test]
    fn reserved_character_suggestion() {
        let err = QueryError::lex("reserved character '['", 3, "foo[0]");
        assert!(err.suggestion().unwrap().contains("backslash"));
    }

    #[test]
    fn missing_field_value_lists_fields() {
        let err = QueryError::parse("expected term, phrase, or group after 'ext:'", None, None);
        assert!(err.suggestion().unwrap().contains("Valid fields are"));
    }

    #[test]
    fn lex_error_caret_lines_up() {
        let err = LexError::new("reserved character '{'", 4, "Map{}");
        let rendered = err.format_with_context();
        assert!(rendered.ends_with("      ^"));
    }

    #[test]
    fn lex_error_is_a_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(LexError::new("unclosed quote", 2, "a \"b"));
        assert_eq!(
            err.to_string(),
            "query syntax error: unclosed quote\n  a \"b\n    ^"
        );
    }
}
