//! # serde_refjson
//!
//! A codec for a JSON-like text format that can express arbitrary object graphs.
//!
//! ## What does the format add to JSON?
//!
//! - **Any value as a map key**: keys may be numbers, arrays or maps, not only strings
//! - **Shared structure**: a container that appears more than once is written in full
//!   the first time and as a `$id` back-reference afterwards
//! - **Cycles**: a container may contain itself, directly or indirectly
//!
//! Reference ids are 1-based and handed out in the order a depth-first,
//! left-to-right walk first reaches each container. Map keys are walked before their
//! values and count towards the numbering.
//!
//! ```text
//! {"a":["string"],"b":$2}      "a" and "b" hold the very same array
//! {"self":$1}                  a map that contains itself
//! {[1,2]:"pair",{}:"empty"}    array and map keys
//! ```
//!
//! Scalars are strings and numbers. There are no booleans and no null.
//!
//! ## Quick Start
//!
//! ### Documents
//!
//! A [`Document`] is an arena of containers ([`Graph`]) plus a root [`Value`]. Values
//! refer to containers by [`ContainerId`] handle, so sharing is just copying a handle.
//!
//! ```rust
//! use serde_refjson::{decode, encode, Container, Value};
//!
//! let doc = decode(r#"{"a":["string"], "b":$2}"#).unwrap();
//!
//! let Some(Container::Map(map)) = doc.container(doc.root()) else { panic!() };
//! assert!(map.get_str("a").unwrap().same_identity(map.get_str("b").unwrap()));
//!
//! assert_eq!(encode(&doc), r#"{"a":["string"],"b":$2}"#);
//! ```
//!
//! ### Serde
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_refjson::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! let user = User {
//!     id: 123,
//!     name: "Alice".to_string(),
//!     tags: vec!["admin".to_string()],
//! };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, r#"{"id":123,"name":"Alice","tags":["admin"]}"#);
//!
//! let user_back: User = from_str(&text).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Encoding uses an explicit work stack and never recurses per nesting level
//! - Decoding rejects nesting beyond [`Options::max_depth`] instead of exhausting memory
//!   or the call stack
//!
//! ## Logging
//!
//! The crate emits `tracing` events (`debug` at encode/decode boundaries, `trace`
//! inside the tokenizer). Install any subscriber to see them.

pub mod de;
pub mod error;
pub mod escape;
pub mod io;
pub mod map;
pub mod options;
pub mod refs;
pub mod ser;
pub mod tokenizer;
pub mod value;

pub use de::{decode, decode_with_options, from_document, from_document_with_options};
pub use error::{Error, Result};
pub use map::Map;
pub use options::Options;
pub use ser::{encode, encode_with_options, to_document};
pub use value::{Container, ContainerId, Document, Graph, Number, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serialize any `T: Serialize` to compact text.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::to_string;
/// use std::collections::BTreeMap;
///
/// let mut scores = BTreeMap::new();
/// scores.insert(1, "one");
/// scores.insert(2, "two");
/// assert_eq!(to_string(&scores).unwrap(), r#"{1:"one",2:"two"}"#);
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for values the format cannot express, such as
/// `bool` or `None`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &Options::default())
}

/// Serialize any `T: Serialize` to indented text.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &Options::pretty())
}

/// Serialize any `T: Serialize` with custom layout options.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::{to_string_with_options, Options};
///
/// let text = to_string_with_options(&vec![1, 2], &Options::pretty().with_indent(4)).unwrap();
/// assert_eq!(text, "[\n    1,\n    2\n]");
/// ```
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: &Options) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let doc = to_document(value)?;
    Ok(encode_with_options(&doc, options))
}

/// Deserialize an instance of type `T` from text.
///
/// Shared containers in the text are copied into every place that references
/// them.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::from_str;
///
/// let pairs: Vec<Vec<String>> = from_str(r#"[["x","y"],$2]"#).unwrap();
/// assert_eq!(pairs[0], pairs[1]);
/// ```
///
/// # Errors
///
/// Returns a syntax error if the text is malformed, [`Error::Cyclic`] if it
/// describes a cycle, or a custom error if its shape does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let doc = decode(s)?;
    from_document(&doc)
}
