//! Serialization: documents to text, and Rust values to documents.
//!
//! ## Overview
//!
//! [`Serializer`] walks a [`Document`] depth-first, left to right. The first time
//! it reaches a container it hands the container the next reference id and
//! expands it; every later occurrence is written as `$id` and not entered again.
//! That is what makes cyclic documents finite on the page.
//!
//! The walk keeps its own stack of open containers instead of recursing, so
//! arbitrarily deep documents cannot exhaust the call stack and encoding never fails.
//!
//! ```rust
//! use serde_refjson::{encode, Document, Graph, Value};
//!
//! let mut graph = Graph::new();
//! let shared = graph.insert_array(vec![Value::from("string")]);
//! let root = graph.new_map();
//! let map = graph.map_mut(root).unwrap();
//! map.insert(Value::from("a"), Value::Container(shared));
//! map.insert(Value::from("b"), Value::Container(shared));
//!
//! let doc = Document::new(graph, Value::Container(root));
//! assert_eq!(encode(&doc), r#"{"a":["string"],"b":$2}"#);
//! ```
//!
//! [`ValueSerializer`] is a `serde::Serializer` that builds a [`Document`] from
//! any `T: Serialize`; see [`to_document`].

use serde::{ser, Serialize};
use tracing::debug;

use crate::escape::write_escaped;
use crate::refs::{ReferenceTracker, Visit};
use crate::{Container, Document, Error, Graph, Map, Number, Options, Result, Value};

/// Serializes `doc` to compact text.
///
/// # Panics
///
/// Panics if a handle reachable from the root does not belong to the document's graph.
#[must_use]
pub fn encode(doc: &Document) -> String {
    encode_with_options(doc, &Options::default())
}

/// Serializes `doc` to text with custom layout options.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::{decode, encode_with_options, Options};
///
/// let doc = decode(r#"{[1]:"v"}"#).unwrap();
/// let text = encode_with_options(&doc, &Options::pretty().with_indent(1));
/// assert_eq!(text, "{\n [\n  1\n ]: \"v\"\n}");
/// ```
#[must_use]
pub fn encode_with_options(doc: &Document, options: &Options) -> String {
    let serializer = Serializer::new(doc.graph(), options);
    let (output, containers) = serializer.serialize(doc.root());
    debug!(containers, bytes = output.len(), "encoded document");
    output
}

/// The text serializer.
///
/// Holds the reference tracker and work stack for a single encode call.
pub struct Serializer<'g> {
    graph: &'g Graph,
    options: &'g Options,
    output: String,
    tracker: ReferenceTracker,
    stack: Vec<Frame<'g>>,
}

/// A container whose opening marker has been written but not its closing one.
enum Frame<'g> {
    Array {
        items: std::slice::Iter<'g, Value>,
        empty: bool,
    },
    Map {
        entries: indexmap::map::Iter<'g, Value, Value>,
        // Value of the entry whose key was just written
        pending: Option<&'g Value>,
        empty: bool,
    },
}

enum Step<'g> {
    /// An array element or a map key.
    Item { value: &'g Value, first: bool },
    /// The value following a map key.
    EntryValue(&'g Value),
    Close { marker: char, empty: bool },
}

impl<'g> Serializer<'g> {
    pub fn new(graph: &'g Graph, options: &'g Options) -> Self {
        Serializer {
            graph,
            options,
            output: String::with_capacity(256),
            tracker: ReferenceTracker::new(),
            stack: Vec::new(),
        }
    }

    /// Writes `root` and everything reachable from it.
    ///
    /// Returns the text and the number of distinct containers written.
    pub fn serialize(mut self, root: &'g Value) -> (String, usize) {
        self.write_value(root);
        while let Some(step) = self.next_step() {
            match step {
                Step::Item { value, first } => {
                    if !first {
                        self.output.push(',');
                    }
                    self.write_newline(self.stack.len());
                    self.write_value(value);
                }
                Step::EntryValue(value) => {
                    self.output.push(':');
                    if self.options.pretty {
                        self.output.push(' ');
                    }
                    self.write_value(value);
                }
                Step::Close { marker, empty } => {
                    if !empty {
                        self.write_newline(self.stack.len());
                    }
                    self.output.push(marker);
                }
            }
        }
        (self.output, self.tracker.len())
    }

    fn next_step(&mut self) -> Option<Step<'g>> {
        let step = match self.stack.last_mut()? {
            Frame::Array { items, empty } => match items.next() {
                Some(value) => {
                    let first = std::mem::replace(empty, false);
                    Step::Item { value, first }
                }
                None => Step::Close {
                    marker: ']',
                    empty: *empty,
                },
            },
            Frame::Map {
                entries,
                pending,
                empty,
            } => {
                if let Some(value) = pending.take() {
                    Step::EntryValue(value)
                } else {
                    match entries.next() {
                        Some((key, value)) => {
                            *pending = Some(value);
                            let first = std::mem::replace(empty, false);
                            Step::Item { value: key, first }
                        }
                        None => Step::Close {
                            marker: '}',
                            empty: *empty,
                        },
                    }
                }
            }
        };
        if matches!(step, Step::Close { .. }) {
            self.stack.pop();
        }
        Some(step)
    }

    fn write_value(&mut self, value: &'g Value) {
        match value {
            Value::String(s) => write_escaped(&mut self.output, s),
            Value::Number(n) => self.output.push_str(&n.to_string()),
            Value::Container(id) => match self.tracker.visit(*id) {
                Visit::Seen(ref_id) => self.output.push_str(&ref_id.to_string()),
                Visit::First(_) => {
                    let graph = self.graph;
                    match &graph[*id] {
                        Container::Array(items) => {
                            self.output.push('[');
                            self.stack.push(Frame::Array {
                                items: items.iter(),
                                empty: true,
                            });
                        }
                        Container::Map(map) => {
                            self.output.push('{');
                            self.stack.push(Frame::Map {
                                entries: map.iter(),
                                pending: None,
                                empty: true,
                            });
                        }
                    }
                }
            },
        }
    }

    fn write_newline(&mut self, depth: usize) {
        if self.options.pretty {
            self.output.push('\n');
            self.output
                .push_str(&" ".repeat(depth * self.options.indent));
        }
    }
}

/// Builds a [`Document`] from any `T: Serialize`.
///
/// The result is always acyclic: every Rust value becomes its own container.
/// Map keys keep their shape, so a `BTreeMap<Vec<u8>, String>` gets array keys.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for `bool`, `()`, `None`, unit structs and
/// non-finite floats, none of which the format can express.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::{encode, to_document};
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert(vec![1, 2, 3], "v");
///
/// let doc = to_document(&map).unwrap();
/// assert_eq!(encode(&doc), r#"{[1,2,3]:"v"}"#);
/// ```
pub fn to_document<T>(value: &T) -> Result<Document>
where
    T: ?Sized + Serialize,
{
    let mut graph = Graph::new();
    let root = value.serialize(ValueSerializer::new(&mut graph))?;
    Ok(Document::new(graph, root))
}

/// A `serde::Serializer` producing [`Value`]s inside a [`Graph`].
pub struct ValueSerializer<'g> {
    graph: &'g mut Graph,
}

impl<'g> ValueSerializer<'g> {
    pub fn new(graph: &'g mut Graph) -> Self {
        ValueSerializer { graph }
    }
}

pub struct SerializeVec<'g> {
    graph: &'g mut Graph,
    items: Vec<Value>,
}

pub struct SerializeTupleVariant<'g> {
    graph: &'g mut Graph,
    variant: &'static str,
    items: Vec<Value>,
}

pub struct SerializeMap<'g> {
    graph: &'g mut Graph,
    map: Map,
    next_key: Option<Value>,
}

pub struct SerializeStructVariant<'g> {
    graph: &'g mut Graph,
    variant: &'static str,
    map: Map,
}

/// Wraps `inner` as `{variant: inner}`, the externally tagged enum layout.
fn tagged(graph: &mut Graph, variant: &'static str, inner: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(Value::from(variant), inner);
    Value::Container(graph.insert_map(map))
}

impl<'g> ser::Serializer for ValueSerializer<'g> {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec<'g>;
    type SerializeTuple = SerializeVec<'g>;
    type SerializeTupleStruct = SerializeVec<'g>;
    type SerializeTupleVariant = SerializeTupleVariant<'g>;
    type SerializeMap = SerializeMap<'g>;
    type SerializeStruct = SerializeMap<'g>;
    type SerializeStructVariant = SerializeStructVariant<'g>;

    fn serialize_bool(self, _v: bool) -> Result<Value> {
        Err(Error::unsupported_type("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::from_u64(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        ser::Serializer::serialize_f64(self, f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| Error::unsupported_type("non-finite float"))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        let items = v.iter().map(|b| Value::from(*b)).collect();
        Ok(Value::Container(self.graph.insert_array(items)))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(Error::unsupported_type("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(Error::unsupported_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(Error::unsupported_type(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let graph = self.graph;
        let inner = value.serialize(ValueSerializer::new(&mut *graph))?;
        Ok(tagged(graph, variant, inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec<'g>> {
        Ok(SerializeVec {
            graph: self.graph,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec<'g>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec<'g>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant<'g>> {
        Ok(SerializeTupleVariant {
            graph: self.graph,
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap<'g>> {
        Ok(SerializeMap {
            graph: self.graph,
            map: Map::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap<'g>> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant<'g>> {
        Ok(SerializeStructVariant {
            graph: self.graph,
            variant,
            map: Map::with_capacity(len),
        })
    }
}

impl<'g> ser::SerializeSeq for SerializeVec<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(ValueSerializer::new(&mut *self.graph))?;
        self.items.push(value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Container(self.graph.insert_array(self.items)))
    }
}

impl<'g> ser::SerializeTuple for SerializeVec<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl<'g> ser::SerializeTupleStruct for SerializeVec<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl<'g> ser::SerializeTupleVariant for SerializeTupleVariant<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(ValueSerializer::new(&mut *self.graph))?;
        self.items.push(value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let inner = Value::Container(self.graph.insert_array(self.items));
        Ok(tagged(self.graph, self.variant, inner))
    }
}

impl<'g> ser::SerializeMap for SerializeMap<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(key.serialize(ValueSerializer::new(&mut *self.graph))?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called before serialize_key"))?;
        let value = value.serialize(ValueSerializer::new(&mut *self.graph))?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Container(self.graph.insert_map(self.map)))
    }
}

impl<'g> ser::SerializeStruct for SerializeMap<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(ValueSerializer::new(&mut *self.graph))?;
        self.map.insert(Value::from(key), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        ser::SerializeMap::end(self)
    }
}

impl<'g> ser::SerializeStructVariant for SerializeStructVariant<'g> {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(ValueSerializer::new(&mut *self.graph))?;
        self.map.insert(Value::from(key), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let inner = Value::Container(self.graph.insert_map(self.map));
        Ok(tagged(self.graph, self.variant, inner))
    }
}
