//! String escaping.
//!
//! A fixed table maps a backslash followed by one marker character to the raw
//! character it stands for. [`escape`] and [`unescape`] are exact inverses:
//!
//! ```rust
//! use serde_refjson::escape::{escape, unescape};
//!
//! let raw = "tab\there \"quoted\" back\\slash\u{7}";
//! let quoted = escape(raw);
//! assert_eq!(quoted, r#""tab\there \"quoted\" back\\slash\a""#);
//! assert_eq!(unescape(&quoted[1..quoted.len() - 1]).unwrap(), raw);
//! ```

use crate::error::Position;
use crate::{Error, Result};

/// The escape character.
pub const ESCAPE_CHAR: char = '\\';

/// `(marker, raw)` pairs: `\marker` in text decodes to `raw`.
pub const ESCAPE_TABLE: [(char, char); 9] = [
    ('\\', '\\'),
    ('"', '"'),
    ('n', '\n'),
    ('r', '\r'),
    ('b', '\u{0008}'),
    ('t', '\t'),
    ('v', '\u{000B}'),
    ('a', '\u{0007}'),
    ('f', '\u{000C}'),
];

#[inline]
fn marker_for(raw: char) -> Option<char> {
    ESCAPE_TABLE
        .iter()
        .find(|(_, r)| *r == raw)
        .map(|(marker, _)| *marker)
}

#[inline]
fn raw_for(marker: char) -> Option<char> {
    ESCAPE_TABLE
        .iter()
        .find(|(m, _)| *m == marker)
        .map(|(_, raw)| *raw)
}

/// Escapes `s` and wraps the result in double quotes.
///
/// The escape character itself is doubled before anything else is substituted,
/// so no escape produced here is ever re-read as a different one.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_escaped(&mut out, s);
    out
}

/// Appends the quoted, escaped form of `s` to `out`.
pub(crate) fn write_escaped(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match marker_for(ch) {
            Some(marker) => {
                out.push(ESCAPE_CHAR);
                out.push(marker);
            }
            None => out.push(ch),
        }
    }
    out.push('"');
}

/// Reverses [`escape`] on the body of a string literal (without its quotes).
///
/// # Errors
///
/// Returns [`Error::InvalidEscapeSequence`] when a backslash is followed by a
/// character that is not in [`ESCAPE_TABLE`], or ends the input. The reported
/// position is relative to `s`.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::escape::unescape;
/// use serde_refjson::Error;
///
/// assert_eq!(unescape(r"a\nb").unwrap(), "a\nb");
/// assert!(matches!(unescape(r"\q"), Err(Error::InvalidEscapeSequence { .. })));
/// ```
pub fn unescape(s: &str) -> Result<String> {
    unescape_body(s).map_err(|bad| Error::invalid_escape(Position::locate(s, bad.offset), &bad.sequence))
}

/// An escape sequence outside the table, found at byte `offset` of the body.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct BadEscape {
    pub offset: usize,
    pub sequence: String,
}

pub(crate) fn unescape_body(s: &str) -> std::result::Result<String, BadEscape> {
    // Fast path: most literals carry no escapes at all
    if !s.contains(ESCAPE_CHAR) {
        return Ok(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices();
    while let Some((idx, ch)) = chars.next() {
        if ch != ESCAPE_CHAR {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some((_, marker)) => match raw_for(marker) {
                Some(raw) => out.push(raw),
                None => {
                    return Err(BadEscape {
                        offset: idx,
                        sequence: format!("{ESCAPE_CHAR}{marker}"),
                    })
                }
            },
            None => {
                return Err(BadEscape {
                    offset: idx,
                    sequence: ESCAPE_CHAR.to_string(),
                })
            }
        }
    }
    Ok(out)
}
