//! Deserialization: text to documents, and documents to Rust values.
//!
//! ## Overview
//!
//! Decoding runs in two passes:
//!
//! 1. [`strip_literals`] pulls every string literal out of the text, leaving a
//!    single `"` placeholder for each.
//! 2. [`Parser`] walks the remaining structural text with an explicit stack of
//!    open containers and a small state machine ([`State`]) that knows whether
//!    the next token is a map key, a map value or an array element.
//!
//! A container is registered for `$id` references the moment its opening marker
//! is read, so it can be referenced from inside itself:
//!
//! ```rust
//! use serde_refjson::decode;
//!
//! let doc = decode(r#"{"self":$1}"#).unwrap();
//! let map = doc.container(doc.root()).unwrap();
//! # let serde_refjson::Container::Map(map) = map else { panic!() };
//! assert!(map.get_str("self").unwrap().same_identity(doc.root()));
//! ```
//!
//! [`from_document`] then maps an acyclic document onto any `T: Deserialize`.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use serde::{forward_to_deserialize_any, Deserialize};
use tracing::debug;

use crate::refs::{RefId, ReferenceTable};
use crate::tokenizer::{strip_literals, Stripped, PLACEHOLDER};
use crate::{Container, ContainerId, Document, Error, Graph, Map, Number, Options, Result, Value};

/// Parses `text` into a [`Document`].
///
/// Container nesting is limited to
/// [`DEFAULT_MAX_DEPTH`](crate::options::DEFAULT_MAX_DEPTH) levels.
/// [`encode`](crate::encode) has no such limit, so text it wrote for a deeper
/// document must be read back with [`decode_with_options`] and a larger
/// [`Options::max_depth`].
///
/// # Errors
///
/// Fails with the first syntax error found; see [`Error`]. No partial document
/// is ever returned.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::decode;
///
/// let doc = decode(r#"{"a":["string"], "b":$2}"#).unwrap();
/// # let serde_refjson::Container::Map(map) = doc.container(doc.root()).unwrap() else { panic!() };
/// let a = map.get_str("a").unwrap();
/// let b = map.get_str("b").unwrap();
/// assert!(a.same_identity(b));
/// ```
pub fn decode(text: &str) -> Result<Document> {
    decode_with_options(text, &Options::default())
}

/// Parses `text` into a [`Document`] with custom limits.
///
/// # Errors
///
/// As [`decode`], plus [`Error::DepthLimitExceeded`] when containers nest deeper
/// than `options.max_depth`.
pub fn decode_with_options(text: &str, options: &Options) -> Result<Document> {
    let stripped = strip_literals(text)?;
    let doc = Parser::new(stripped, options).parse()?;
    debug!(
        containers = doc.graph().len(),
        bytes = text.len(),
        "decoded document"
    );
    Ok(doc)
}

/// Where the parser is in the grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// Nothing read yet; one top-level value expected.
    Root,
    /// Just after `[`: first element or `]`.
    ArrayStart,
    /// After `,` in an array: next element.
    Element,
    /// Just after `{`: first key or `}`.
    MapStart,
    /// After `,` in a map: next key.
    Key,
    /// A key is complete; `:` expected.
    Colon,
    /// After `:`: the value of the pending key.
    EntryValue,
    /// An element or entry is complete; `,` or the closing marker expected.
    Separator,
    /// The top-level value is complete; only whitespace may follow.
    End,
}

impl State {
    /// `true` while the next value read becomes a map key.
    #[must_use]
    pub const fn expecting_key(self) -> bool {
        matches!(self, State::MapStart | State::Key)
    }
}

/// A set of token classes, used to validate the next character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expected(u8);

impl Expected {
    pub const NOTHING: Expected = Expected(0);
    /// Start of a string, number, reference, array or map.
    pub const VALUE: Expected = Expected(1);
    pub const CLOSE_ARRAY: Expected = Expected(1 << 1);
    pub const CLOSE_MAP: Expected = Expected(1 << 2);
    pub const COMMA: Expected = Expected(1 << 3);
    pub const COLON: Expected = Expected(1 << 4);

    #[must_use]
    pub const fn union(self, other: Expected) -> Expected {
        Expected(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, other: Expected) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// The class a character belongs to, if it can start a token at all.
    #[must_use]
    pub fn of(ch: char) -> Expected {
        match ch {
            '{' | '[' | PLACEHOLDER | '$' | '-' | '0'..='9' => Expected::VALUE,
            ']' => Expected::CLOSE_ARRAY,
            '}' => Expected::CLOSE_MAP,
            ',' => Expected::COMMA,
            ':' => Expected::COLON,
            _ => Expected::NOTHING,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Expected, &str); 5] = [
            (Expected::VALUE, "a value"),
            (Expected::CLOSE_ARRAY, "']'"),
            (Expected::CLOSE_MAP, "'}'"),
            (Expected::COMMA, "','"),
            (Expected::COLON, "':'"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(class, _)| self.contains(*class))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("end of input")
        } else {
            f.write_str(&names.join(" or "))
        }
    }
}

/// How a container is used by the container around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Key,
    Value,
}

/// An opened container that has not been closed yet.
#[derive(Debug)]
struct Open {
    id: ContainerId,
    role: Role,
    is_map: bool,
    // For maps: the key whose value has not been read yet
    key: Option<Value>,
}

/// The structural parser.
///
/// Consumes the output of [`strip_literals`]. An empty container stack stands
/// for the synthetic root that holds the single top-level value.
pub struct Parser<'a> {
    stripped: Stripped<'a>,
    pos: usize,
    graph: Graph,
    refs: ReferenceTable,
    stack: Vec<Open>,
    root: Option<Value>,
    state: State,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(stripped: Stripped<'a>, options: &Options) -> Self {
        Parser {
            stripped,
            pos: 0,
            graph: Graph::new(),
            refs: ReferenceTable::new(),
            stack: Vec::new(),
            root: None,
            state: State::Root,
            max_depth: options.max_depth,
        }
    }

    /// Current state of the machine.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Runs the machine to the end of input.
    ///
    /// # Errors
    ///
    /// Any syntax error, unknown reference or depth violation.
    pub fn parse(mut self) -> Result<Document> {
        while let Some(ch) = self.peek_char() {
            self.step(ch)?;
        }

        match (self.state, self.root.take()) {
            (State::End, Some(root)) => Ok(Document::new(self.graph, root)),
            _ => Err(Error::unexpected_eof(
                self.stripped.position(self.pos),
                self.expected(),
            )),
        }
    }

    /// Consumes one token (or one whitespace character) starting with `ch`.
    fn step(&mut self, ch: char) -> Result<()> {
        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            self.next_char();
            return Ok(());
        }

        let at = self.pos;
        if matches!(ch, ',' | ':') && self.stack.is_empty() {
            return Err(Error::dangling_token(self.stripped.position(at), ch));
        }
        let expected = self.expected();
        if !expected.contains(Expected::of(ch)) {
            return Err(Error::unexpected_char(
                self.stripped.position(at),
                ch,
                expected,
            ));
        }

        match ch {
            '[' | '{' => {
                self.next_char();
                self.open(ch == '{', at)
            }
            ']' | '}' => {
                self.next_char();
                self.close()
            }
            ',' => {
                self.next_char();
                self.state = if self.top_is_map() {
                    State::Key
                } else {
                    State::Element
                };
                Ok(())
            }
            ':' => {
                self.next_char();
                self.state = State::EntryValue;
                Ok(())
            }
            PLACEHOLDER => {
                self.next_char();
                let literal = self.stripped.next_literal().ok_or_else(|| {
                    Error::unexpected_char(self.stripped.position(at), ch, "a string literal")
                })?;
                self.complete(Value::String(literal));
                Ok(())
            }
            '$' => {
                self.next_char();
                let id = self.reference(at)?;
                self.complete(Value::Container(id));
                Ok(())
            }
            _ => {
                let number = self.number(at)?;
                self.complete(Value::Number(number));
                Ok(())
            }
        }
    }

    /// The token classes valid in the current state.
    fn expected(&self) -> Expected {
        match self.state {
            State::Root | State::Element | State::Key | State::EntryValue => Expected::VALUE,
            State::ArrayStart => Expected::VALUE.union(Expected::CLOSE_ARRAY),
            State::MapStart => Expected::VALUE.union(Expected::CLOSE_MAP),
            State::Colon => Expected::COLON,
            State::Separator => Expected::COMMA.union(if self.top_is_map() {
                Expected::CLOSE_MAP
            } else {
                Expected::CLOSE_ARRAY
            }),
            State::End => Expected::NOTHING,
        }
    }

    fn top_is_map(&self) -> bool {
        self.stack.last().map_or(false, |open| open.is_map)
    }

    /// State after a value has been stored in the innermost container (or the root).
    fn after_value(&self) -> State {
        if self.stack.is_empty() {
            State::End
        } else {
            State::Separator
        }
    }

    /// A string, number or reference has been read.
    fn complete(&mut self, value: Value) {
        if self.state.expecting_key() {
            self.set_pending_key(value);
            self.state = State::Colon;
        } else {
            self.commit(value);
            self.state = self.after_value();
        }
    }

    fn set_pending_key(&mut self, key: Value) {
        if let Some(open) = self.stack.last_mut() {
            open.key = Some(key);
        }
    }

    /// Stores `value` as the next element, the pending key's value, or the root.
    fn commit(&mut self, value: Value) {
        let Some(open) = self.stack.last_mut() else {
            self.root = Some(value);
            return;
        };
        match &mut self.graph[open.id] {
            Container::Array(items) => items.push(value),
            Container::Map(map) => {
                if let Some(key) = open.key.take() {
                    // A repeated key keeps its first position and takes the last value
                    map.insert(key, value);
                }
            }
        }
    }

    fn open(&mut self, is_map: bool, at: usize) -> Result<()> {
        if self.stack.len() >= self.max_depth {
            return Err(Error::depth_limit(
                self.stripped.position(at),
                self.max_depth,
            ));
        }

        let id = if is_map {
            self.graph.insert_map(Map::new())
        } else {
            self.graph.insert_array(Vec::new())
        };
        self.refs.register(id);

        let role = if self.state.expecting_key() {
            // Inserted into the parent only once its value has been read
            self.set_pending_key(Value::Container(id));
            Role::Key
        } else {
            self.commit(Value::Container(id));
            Role::Value
        };

        self.stack.push(Open {
            id,
            role,
            is_map,
            key: None,
        });
        self.state = if is_map {
            State::MapStart
        } else {
            State::ArrayStart
        };
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(open) = self.stack.pop() {
            self.state = match open.role {
                Role::Key => State::Colon,
                Role::Value => self.after_value(),
            };
        }
        Ok(())
    }

    /// Reads the digits of a `$id` token (the `$` is already consumed).
    fn reference(&mut self, at: usize) -> Result<ContainerId> {
        let start = self.pos;
        while matches!(self.peek_char(), Some('0'..='9')) {
            self.next_char();
        }
        let digits = &self.stripped.text()[start..self.pos];
        if digits.is_empty() {
            let pos = self.stripped.position(self.pos);
            return Err(match self.peek_char() {
                Some(found) => Error::unexpected_char(pos, found, "reference digits"),
                None => Error::unexpected_eof(pos, "reference digits"),
            });
        }

        // Ids too large for u64 can never have been registered
        let id = digits.parse::<u64>().unwrap_or(u64::MAX);
        self.refs
            .resolve(RefId::from(id))
            .ok_or_else(|| Error::unknown_reference(self.stripped.position(at), id))
    }

    /// Reads a numeric literal up to the next delimiter.
    fn number(&mut self, at: usize) -> Result<Number> {
        while let Some(ch) = self.peek_char() {
            if matches!(ch, ']' | '}' | ':' | ',' | ' ' | '\t' | '\n' | '\r') {
                break;
            }
            self.next_char();
        }
        let literal = &self.stripped.text()[at..self.pos];
        Number::parse(literal)
            .ok_or_else(|| Error::invalid_number(self.stripped.position(at), literal))
    }

    fn peek_char(&self) -> Option<char> {
        self.stripped.text()[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }
}

/// Deserializes an instance of `T` from a document.
///
/// Containers shared within the document are copied into each place they
/// occur. Strings can be borrowed from the document.
///
/// # Errors
///
/// - [`Error::Cyclic`] if a container is reached again from inside itself
/// - a custom error if the document's shape does not fit `T`, or nesting goes
///   deeper than the default depth limit
///
/// # Examples
///
/// ```rust
/// use serde_refjson::{decode, from_document};
/// use std::collections::BTreeMap;
///
/// let doc = decode(r#"{[1,2]:"pair",[3]:"single"}"#).unwrap();
/// let map: BTreeMap<Vec<u8>, String> = from_document(&doc).unwrap();
/// assert_eq!(map[&vec![1, 2]], "pair");
/// ```
pub fn from_document<'a, T>(doc: &'a Document) -> Result<T>
where
    T: Deserialize<'a>,
{
    from_document_with_options(doc, &Options::default())
}

/// Deserializes an instance of `T` from a document with a custom depth limit.
///
/// # Errors
///
/// See [`from_document`].
pub fn from_document_with_options<'a, T>(doc: &'a Document, options: &Options) -> Result<T>
where
    T: Deserialize<'a>,
{
    let active = RefCell::new(HashSet::new());
    let deserializer = ValueDeserializer {
        graph: doc.graph(),
        value: doc.root(),
        active: &active,
        max_depth: options.max_depth,
    };
    T::deserialize(deserializer)
}

/// A `serde::Deserializer` over one value of a document.
pub struct ValueDeserializer<'de, 's> {
    graph: &'de Graph,
    value: &'de Value,
    // Containers currently being deserialized, from the root down
    active: &'s RefCell<HashSet<ContainerId>>,
    max_depth: usize,
}

impl<'de, 's> ValueDeserializer<'de, 's> {
    fn child(&self, value: &'de Value) -> Self {
        ValueDeserializer {
            graph: self.graph,
            value,
            active: self.active,
            max_depth: self.max_depth,
        }
    }

    fn enter(&self, id: ContainerId) -> Result<&'de Container> {
        let container = self
            .graph
            .get(id)
            .ok_or_else(|| Error::custom(format!("container {id} is not part of the document")))?;
        let mut active = self.active.borrow_mut();
        if active.len() >= self.max_depth {
            return Err(Error::custom(format!(
                "nesting depth limit of {} exceeded",
                self.max_depth
            )));
        }
        if !active.insert(id) {
            return Err(Error::Cyclic);
        }
        Ok(container)
    }

    fn leave(&self, id: ContainerId) {
        self.active.borrow_mut().remove(&id);
    }
}

impl<'de, 's> de::Deserializer<'de> for ValueDeserializer<'de, 's> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Number(n) => match (n.is_integer(), n.as_i64()) {
                (true, Some(i)) => visitor.visit_i64(i),
                _ => visitor.visit_f64(n.as_f64()),
            },
            Value::Container(id) => {
                let container = self.enter(*id)?;
                let result = match container {
                    Container::Array(items) => visitor.visit_seq(SeqAccess {
                        de: self.child(self.value),
                        items: items.iter(),
                    }),
                    Container::Map(map) => visitor.visit_map(MapAccess {
                        de: self.child(self.value),
                        entries: map.iter(),
                        pending: None,
                    }),
                };
                self.leave(*id);
                result
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // There is no null, so anything present is `Some`
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(variant.as_str().into_deserializer()),
            Value::Container(id) => match self.graph.map(*id) {
                Some(map) if map.len() == 1 => match map.get_index(0) {
                    Some((variant, value)) => visitor.visit_enum(EnumAccess {
                        variant: self.child(variant),
                        value: self.child(value),
                    }),
                    None => Err(Error::custom("expected a single-entry map for an enum")),
                },
                _ => Err(Error::custom("expected a string or a single-entry map for an enum")),
            },
            Value::Number(_) => Err(Error::custom("expected a string or a single-entry map for an enum")),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct SeqAccess<'de, 's> {
    de: ValueDeserializer<'de, 's>,
    items: std::slice::Iter<'de, Value>,
}

impl<'de, 's> de::SeqAccess<'de> for SeqAccess<'de, 's> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some(value) => seed.deserialize(self.de.child(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct MapAccess<'de, 's> {
    de: ValueDeserializer<'de, 's>,
    entries: indexmap::map::Iter<'de, Value, Value>,
    pending: Option<&'de Value>,
}

impl<'de, 's> de::MapAccess<'de> for MapAccess<'de, 's> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(self.de.child(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| Error::custom("next_value_seed called before next_key_seed"))?;
        seed.deserialize(self.de.child(value))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct EnumAccess<'de, 's> {
    variant: ValueDeserializer<'de, 's>,
    value: ValueDeserializer<'de, 's>,
}

impl<'de, 's> de::EnumAccess<'de> for EnumAccess<'de, 's> {
    type Error = Error;
    type Variant = ValueDeserializer<'de, 's>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant)?;
        Ok((variant, self.value))
    }
}

impl<'de, 's> de::VariantAccess<'de> for ValueDeserializer<'de, 's> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Err(Error::custom("expected a unit variant to be a plain string"))
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Document> {
        decode(text)
    }

    fn root_map(doc: &Document) -> &Map {
        match doc.container(doc.root()) {
            Some(Container::Map(map)) => map,
            other => panic!("expected map root, got {other:?}"),
        }
    }

    #[test]
    fn test_states_after_each_token() {
        let options = Options::default();
        let mut parser = Parser::new(strip_literals(r#"{"k":[1,2]}"#).unwrap(), &options);
        let mut seen = Vec::new();
        while let Some(ch) = parser.peek_char() {
            parser.step(ch).unwrap();
            seen.push(parser.state());
        }
        assert_eq!(
            seen,
            vec![
                State::MapStart,
                State::Colon,
                State::EntryValue,
                State::ArrayStart,
                State::Separator,
                State::Element,
                State::Separator,
                State::Separator,
                State::End,
            ]
        );
    }

    #[test]
    fn test_expected_display() {
        assert_eq!(Expected::VALUE.union(Expected::CLOSE_MAP).to_string(), "a value or '}'");
        assert_eq!(Expected::NOTHING.to_string(), "end of input");
    }

    #[test]
    fn test_scalar_roots() {
        assert_eq!(parse(r#""hi""#).unwrap().root(), &Value::from("hi"));
        assert_eq!(parse("  -12 ").unwrap().root(), &Value::from(-12));
        assert_eq!(
            parse("0.5").unwrap().root(),
            &Value::Number(Number::from_f64(0.5).unwrap())
        );
    }

    #[test]
    fn test_container_key_is_inserted_with_its_value() {
        let doc = parse(r#"{[1,2,3]:"v", {"x":1}:2}"#).unwrap();
        let map = root_map(&doc);
        assert_eq!(map.len(), 2);

        let (key, value) = map.get_index(0).unwrap();
        let key_items = doc.graph().array(key.as_container().unwrap()).unwrap();
        assert_eq!(key_items, &vec![Value::from(1), Value::from(2), Value::from(3)]);
        assert_eq!(value, &Value::from("v"));

        let (key, value) = map.get_index(1).unwrap();
        assert!(doc.graph().map(key.as_container().unwrap()).is_some());
        assert_eq!(value, &Value::from(2));
    }

    #[test]
    fn test_reference_as_key() {
        let doc = parse(r#"{"a":["k"],$2:"v"}"#).unwrap();
        let map = root_map(&doc);
        let (key, value) = map.get_index(1).unwrap();
        assert!(key.same_identity(map.get_str("a").unwrap()));
        assert_eq!(value, &Value::from("v"));
    }

    #[test]
    fn test_reference_ids_count_key_containers() {
        // outer map is $1, the key array $2, the value array $3
        let doc = parse(r#"{[0]:[1], "k":$3}"#).unwrap();
        let map = root_map(&doc);
        let (_, first_value) = map.get_index(0).unwrap();
        assert!(map.get_str("k").unwrap().same_identity(first_value));
    }

    #[test]
    fn test_self_reference_inside_array() {
        let doc = parse("[1,$1]").unwrap();
        let items = doc.graph().array(doc.root().as_container().unwrap()).unwrap();
        assert!(items[1].same_identity(doc.root()));
    }

    #[test]
    fn test_missing_value_is_unexpected_char() {
        let err = parse(r#"{"a":}"#).unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedChar {
                line: 1,
                col: 6,
                found: '}',
                expected: "a value".to_string()
            }
        );
    }

    #[test]
    fn test_mismatched_close() {
        assert!(matches!(parse("[1}"), Err(Error::UnexpectedChar { found: '}', .. })));
        assert!(matches!(parse(r#"{"a":1]"#), Err(Error::UnexpectedChar { found: ']', .. })));
    }

    #[test]
    fn test_unknown_reference() {
        assert!(matches!(
            parse(r#"{"a":$5}"#),
            Err(Error::UnknownReference { id: 5, .. })
        ));
        assert!(matches!(parse("[$0]"), Err(Error::UnknownReference { id: 0, .. })));
    }

    #[test]
    fn test_reference_without_digits() {
        assert!(matches!(
            parse("[$]"),
            Err(Error::UnexpectedChar { found: ']', .. })
        ));
        assert!(matches!(parse("[$"), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(parse("-"), Err(Error::InvalidNumber { .. })));
        assert!(matches!(parse("[1.]"), Err(Error::InvalidNumber { .. })));
        assert!(matches!(parse("[1x]"), Err(Error::InvalidNumber { .. })));
        assert!(matches!(parse("1e5"), Err(Error::InvalidNumber { .. })));
    }

    #[test]
    fn test_dangling_tokens() {
        assert!(matches!(parse(","), Err(Error::DanglingToken { token: ',', .. })));
        assert!(matches!(parse(":1"), Err(Error::DanglingToken { token: ':', .. })));
        assert!(matches!(parse("[1],"), Err(Error::DanglingToken { token: ',', .. })));
    }

    #[test]
    fn test_bad_end_of_input() {
        for text in ["", "   ", "[1,2", r#"{"a""#, r#"{"a":"#, "[[]"] {
            assert!(
                matches!(parse(text), Err(Error::UnexpectedEof { .. })),
                "{text:?} should fail at end of input"
            );
        }
    }

    #[test]
    fn test_trailing_value() {
        assert!(matches!(
            parse("1 2"),
            Err(Error::UnexpectedChar { found: '2', .. })
        ));
    }

    #[test]
    fn test_error_positions_skip_literals() {
        let err = parse("{\"long key\": 1,\n \"x\" 2}").unwrap_err();
        assert_eq!(err.position(), Some((2, 6)));
    }

    #[test]
    fn test_depth_limit() {
        let options = Options::new().with_max_depth(3);
        assert!(decode_with_options("[[[1]]]", &options).is_ok());
        assert!(matches!(
            decode_with_options("[[[[1]]]]", &options),
            Err(Error::DepthLimitExceeded { limit: 3, col: 4, .. })
        ));
    }

    #[test]
    fn test_encoded_deep_document_needs_raised_limit() {
        let mut graph = Graph::new();
        let mut inner = graph.new_array();
        for _ in 1..300 {
            inner = graph.insert_array(vec![Value::Container(inner)]);
        }
        let doc = Document::new(graph, Value::Container(inner));
        let text = crate::encode(&doc);

        assert!(matches!(
            decode(&text),
            Err(Error::DepthLimitExceeded { limit: 256, col: 257, .. })
        ));
        let options = Options::new().with_max_depth(300);
        assert_eq!(decode_with_options(&text, &options).unwrap(), doc);
    }

    #[test]
    fn test_from_document_rejects_cycles() {
        let doc = parse(r#"{"self":$1}"#).unwrap();
        let result: Result<std::collections::HashMap<String, serde::de::IgnoredAny>> =
            from_document(&doc);
        // Ignoring the value still walks into it
        assert!(matches!(result, Err(Error::Cyclic)));
    }

    #[test]
    fn test_from_document_copies_shared() {
        let doc = parse(r#"[[1,2],$2]"#).unwrap();
        let value: Vec<Vec<i32>> = from_document(&doc).unwrap();
        assert_eq!(value, vec![vec![1, 2], vec![1, 2]]);
    }
}
