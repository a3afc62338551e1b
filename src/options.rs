//! Configuration options for encoding and decoding.
//!
//! ## Examples
//!
//! ```rust
//! use serde_refjson::{decode, encode_with_options, Options};
//!
//! let doc = decode(r#"{"a":[1,2]}"#).unwrap();
//!
//! let text = encode_with_options(&doc, &Options::pretty());
//! assert_eq!(text, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
//! ```

/// Nesting depth accepted by the decoder unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Configuration options for encoding and decoding.
///
/// Controls output layout for the encoder and resource limits for the decoder.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::Options;
///
/// // Default compact options
/// let options = Options::new();
///
/// // Pretty-printed with 2-space indentation
/// let options = Options::pretty();
///
/// // Custom configuration
/// let options = Options::pretty().with_indent(4).with_max_depth(32);
/// assert_eq!(options.indent, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub indent: usize,
    pub pretty: bool,
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            indent: 2,
            pretty: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Creates default options (compact output, 2-space indent, depth limit of 256).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_refjson::Options;
    ///
    /// let options = Options::new();
    /// assert_eq!(options.indent, 2);
    /// assert!(!options.pretty);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for pretty-printed output with newlines and indentation.
    #[must_use]
    pub fn pretty() -> Self {
        Options {
            pretty: true,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    ///
    /// Only affects pretty-printed output.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the maximum container nesting depth accepted when decoding.
    ///
    /// Deeper input is rejected with [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_refjson::{decode_with_options, Error, Options};
    ///
    /// let options = Options::new().with_max_depth(2);
    /// assert!(decode_with_options("[[1]]", &options).is_ok());
    /// assert!(matches!(
    ///     decode_with_options("[[[1]]]", &options),
    ///     Err(Error::DepthLimitExceeded { limit: 2, .. })
    /// ));
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
