//! Error types for encoding and decoding.
//!
//! Decoding is fail-fast: the first problem aborts the whole call and no partial
//! document is returned. Every syntax error carries the 1-based line and column of
//! the offending character in the original input text.
//!
//! ## Error Categories
//!
//! - **Syntax errors**: [`Error::UnexpectedChar`], [`Error::UnexpectedEof`],
//!   [`Error::DanglingToken`]
//! - **Literal errors**: [`Error::UnterminatedString`], [`Error::InvalidEscapeSequence`],
//!   [`Error::InvalidNumber`]
//! - **Reference errors**: [`Error::UnknownReference`]
//! - **Resource limits**: [`Error::DepthLimitExceeded`]
//! - **I/O errors**: [`Error::Io`]
//! - **Serde bridge**: [`Error::UnsupportedType`], [`Error::Cyclic`], [`Error::Custom`]
//!
//! ## Examples
//!
//! ```rust
//! use serde_refjson::{decode, Error};
//!
//! let err = decode(r#"{"a":$5}"#).unwrap_err();
//! assert!(matches!(err, Error::UnknownReference { id: 5, .. }));
//! assert!(err.to_string().contains("$5"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while encoding or decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error at the read/write boundary
    #[error("IO error: {0}")]
    Io(String),

    /// A character that is not valid at this position
    #[error("Unexpected character {found:?} at line {line}, column {col}: expected {expected}")]
    UnexpectedChar {
        line: usize,
        col: usize,
        found: char,
        expected: String,
    },

    /// Input ended while a value, container or key/value pair was still open
    #[error("Unexpected end of input at line {line}, column {col}: expected {expected}")]
    UnexpectedEof {
        line: usize,
        col: usize,
        expected: String,
    },

    /// A string literal whose closing quote was never found
    #[error("Unterminated string starting at line {line}, column {col}")]
    UnterminatedString { line: usize, col: usize },

    /// A backslash followed by a character outside the escape table
    #[error("Invalid escape sequence {sequence:?} at line {line}, column {col}")]
    InvalidEscapeSequence {
        line: usize,
        col: usize,
        sequence: String,
    },

    /// A numeric literal that does not match `-? digit+ ('.' digit+)?`
    #[error("Invalid number {literal:?} at line {line}, column {col}")]
    InvalidNumber {
        line: usize,
        col: usize,
        literal: String,
    },

    /// A `$n` token naming a container that has not been opened yet
    #[error("Unknown reference ${id} at line {line}, column {col}")]
    UnknownReference { line: usize, col: usize, id: u64 },

    /// A `,` or `:` outside of any container
    #[error("Dangling {token:?} at line {line}, column {col}: no enclosing container")]
    DanglingToken { line: usize, col: usize, token: char },

    /// Container nesting deeper than [`Options::max_depth`](crate::Options::max_depth)
    #[error("Nesting depth limit of {limit} exceeded at line {line}, column {col}")]
    DepthLimitExceeded { line: usize, col: usize, limit: usize },

    /// A Rust type that has no representation in the format
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A cyclic document cannot be deserialized into a tree-shaped Rust type
    #[error("Cannot deserialize a cyclic value into a tree-shaped type")]
    Cyclic,

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

/// A 1-based line and column inside some source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// Computes the position of the byte `offset` inside `source`.
    ///
    /// Columns count characters, not bytes. Offsets past the end of `source`
    /// resolve to the position just after the last character.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut col = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        Position { line, col }
    }
}

impl Error {
    pub(crate) fn unexpected_char(pos: Position, found: char, expected: impl fmt::Display) -> Self {
        Error::UnexpectedChar {
            line: pos.line,
            col: pos.col,
            found,
            expected: expected.to_string(),
        }
    }

    pub(crate) fn unexpected_eof(pos: Position, expected: impl fmt::Display) -> Self {
        Error::UnexpectedEof {
            line: pos.line,
            col: pos.col,
            expected: expected.to_string(),
        }
    }

    pub(crate) fn unterminated_string(pos: Position) -> Self {
        Error::UnterminatedString {
            line: pos.line,
            col: pos.col,
        }
    }

    pub(crate) fn invalid_escape(pos: Position, sequence: &str) -> Self {
        Error::InvalidEscapeSequence {
            line: pos.line,
            col: pos.col,
            sequence: sequence.to_string(),
        }
    }

    pub(crate) fn invalid_number(pos: Position, literal: &str) -> Self {
        Error::InvalidNumber {
            line: pos.line,
            col: pos.col,
            literal: literal.to_string(),
        }
    }

    pub(crate) fn unknown_reference(pos: Position, id: u64) -> Self {
        Error::UnknownReference {
            line: pos.line,
            col: pos.col,
            id,
        }
    }

    pub(crate) fn dangling_token(pos: Position, token: char) -> Self {
        Error::DanglingToken {
            line: pos.line,
            col: pos.col,
            token,
        }
    }

    pub(crate) fn depth_limit(pos: Position, limit: usize) -> Self {
        Error::DepthLimitExceeded {
            line: pos.line,
            col: pos.col,
            limit,
        }
    }

    /// Creates an unsupported type error for Rust types with no representation in the format.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_refjson::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for errors raised while reading the text syntax.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedChar { .. }
                | Error::UnexpectedEof { .. }
                | Error::UnterminatedString { .. }
                | Error::InvalidEscapeSequence { .. }
                | Error::InvalidNumber { .. }
                | Error::UnknownReference { .. }
                | Error::DanglingToken { .. }
        )
    }

    /// Returns the 1-based `(line, column)` of a decode error, if it has one.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::UnexpectedChar { line, col, .. }
            | Error::UnexpectedEof { line, col, .. }
            | Error::UnterminatedString { line, col }
            | Error::InvalidEscapeSequence { line, col, .. }
            | Error::InvalidNumber { line, col, .. }
            | Error::UnknownReference { line, col, .. }
            | Error::DanglingToken { line, col, .. }
            | Error::DepthLimitExceeded { line, col, .. } => Some((*line, *col)),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
