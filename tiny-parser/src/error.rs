//! Errors raised while lexing and parsing.

use std::fmt;
use tiny_source::Position;

/// Any error produced by [`crate::parser::Parser`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// The input at `position` does not form a token.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("[{position}] {kind}")]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub position: Position,
}

impl LexicalError {
    pub fn new(kind: LexicalErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexicalErrorKind {
    InvalidCharacter(char),
    UnterminatedString,
    /// A `\r` or `\n` that is not part of a `\r\n` pair.
    MalformedLineBreak,
    /// A character that only forms a token when followed by `expected`.
    Expected { expected: char, after: char },
}

impl fmt::Display for LexicalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexicalErrorKind::InvalidCharacter(c) => write!(f, "Invalid character found: ({})", c),
            LexicalErrorKind::UnterminatedString => write!(f, "Unterminated string literal"),
            LexicalErrorKind::MalformedLineBreak => {
                write!(f, "Malformed line break, expected \\r\\n")
            }
            LexicalErrorKind::Expected { expected, after } => {
                write!(f, "Expected: ({}) after ({})", expected, after)
            }
        }
    }
}

/// The token at `position` is not allowed by the grammar.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("[{position}] Expected: {expected} found: {found}")]
    Unexpected {
        expected: String,
        found: String,
        position: Position,
    },
    #[error("[{position}] Invalid number format: {text}")]
    NumberOutOfRange { text: String, position: Position },
}
