//! String literal extraction.
//!
//! Before any structural parsing happens, every quoted string literal is pulled out
//! of the input: its body is unescaped and queued, and in the working text only the
//! opening quote is left behind as a placeholder. Literal bodies can contain any of
//! `{ } [ ] : , $`, and after this pass none of them can be mistaken for structure.
//!
//! ```rust
//! use serde_refjson::tokenizer::strip_literals;
//!
//! let mut stripped = strip_literals(r#"{"a:b":["}"]}"#).unwrap();
//! assert_eq!(stripped.text(), r#"{":["]}"#);
//! assert_eq!(stripped.next_literal().as_deref(), Some("a:b"));
//! assert_eq!(stripped.next_literal().as_deref(), Some("}"));
//! ```

use std::collections::VecDeque;

use tracing::trace;

use crate::error::Position;
use crate::escape::{unescape_body, ESCAPE_CHAR};
use crate::{Error, Result};

/// The placeholder left in the working text for each extracted literal.
pub const PLACEHOLDER: char = '"';

/// Input text with its string literals extracted.
#[derive(Debug)]
pub struct Stripped<'a> {
    source: &'a str,
    text: String,
    literals: VecDeque<String>,
    // (offset in `text` just past a placeholder, bytes removed from `source` so far)
    shifts: Vec<(usize, usize)>,
}

impl<'a> Stripped<'a> {
    /// The structural text, with one placeholder per literal.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text that was stripped.
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Pops the next queued literal, in source order.
    pub fn next_literal(&mut self) -> Option<String> {
        self.literals.pop_front()
    }

    /// Number of literals not consumed yet.
    #[must_use]
    pub fn remaining_literals(&self) -> usize {
        self.literals.len()
    }

    /// Maps a byte offset in [`Stripped::text`] back to the byte offset in the source.
    #[must_use]
    pub fn source_offset(&self, offset: usize) -> usize {
        let idx = self.shifts.partition_point(|(at, _)| *at <= offset);
        match idx {
            0 => offset,
            _ => offset + self.shifts[idx - 1].1,
        }
    }

    /// Line and column in the source of a byte offset in [`Stripped::text`].
    pub(crate) fn position(&self, offset: usize) -> Position {
        Position::locate(self.source, self.source_offset(offset))
    }
}

/// Finds the first double quote at or after `from` that is not escaped.
///
/// A quote is escaped when an odd run of escape characters sits right before it.
fn find_unescaped_quote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx < bytes.len() {
        if bytes[idx] == PLACEHOLDER as u8 {
            let mut run = 0;
            while idx - run > from && bytes[idx - run - 1] == ESCAPE_CHAR as u8 {
                run += 1;
            }
            if run % 2 == 0 {
                return Some(idx);
            }
        }
        idx += 1;
    }
    None
}

/// Extracts and unescapes every string literal in `source`.
///
/// # Errors
///
/// - [`Error::UnterminatedString`] if a literal has no closing quote
/// - [`Error::InvalidEscapeSequence`] if a literal body holds an unknown escape
pub fn strip_literals(source: &str) -> Result<Stripped<'_>> {
    let bytes = source.as_bytes();
    let mut text = String::with_capacity(source.len());
    let mut literals = VecDeque::new();
    let mut shifts = Vec::new();
    let mut removed = 0;
    let mut cursor = 0;

    while let Some(open) = find_unescaped_quote(bytes, cursor) {
        let close = find_unescaped_quote(bytes, open + 1)
            .ok_or_else(|| Error::unterminated_string(Position::locate(source, open)))?;

        let body = &source[open + 1..close];
        let value = unescape_body(body).map_err(|bad| {
            Error::invalid_escape(
                Position::locate(source, open + 1 + bad.offset),
                &bad.sequence,
            )
        })?;
        literals.push_back(value);

        // Keep the opening quote, drop the body and the closing quote
        text.push_str(&source[cursor..=open]);
        removed += close - open;
        shifts.push((text.len(), removed));
        cursor = close + 1;
    }
    text.push_str(&source[cursor..]);

    trace!(literals = literals.len(), stripped_len = text.len(), "extracted string literals");

    Ok(Stripped {
        source,
        text,
        literals,
        shifts,
    })
}
