//! Value model: scalars, arena-owned containers, and documents.
//!
//! Containers (arrays and maps) live in a [`Graph`], an owning arena, and values
//! point at them through copyable [`ContainerId`] handles. Two values denote the
//! *same* container exactly when their handles are equal, which is how shared and
//! cyclic structure is represented without reference counting.
//!
//! ## Core Types
//!
//! - [`Value`]: a string, a number, or a handle to a container
//! - [`Number`]: a signed integer or a finite float
//! - [`Container`]: an array or a [`Map`]
//! - [`Graph`]: the arena that owns every container
//! - [`Document`]: a graph together with its top-level value
//!
//! ## Building a cyclic value
//!
//! ```rust
//! use serde_refjson::{encode, Document, Graph, Value};
//!
//! let mut graph = Graph::new();
//! let x = graph.new_map();
//! graph
//!     .map_mut(x)
//!     .unwrap()
//!     .insert(Value::from("self"), Value::Container(x));
//!
//! let doc = Document::new(graph, Value::Container(x));
//! assert_eq!(encode(&doc), r#"{"self":$1}"#);
//! ```
//!
//! ## Two kinds of equality
//!
//! `PartialEq` on [`Value`] compares scalars by content and containers by
//! identity. `PartialEq` on [`Document`] is structural: it compares shape and
//! contents and ignores which containers happen to be shared.
//!
//! ```rust
//! use serde_refjson::{Document, Graph, Value};
//!
//! let mut graph = Graph::new();
//! let a = graph.insert_array(vec![Value::from(1)]);
//! let b = graph.insert_array(vec![Value::from(1)]);
//!
//! assert!(!Value::Container(a).same_identity(&Value::Container(b)));
//! assert!(graph.structural_eq(&Value::Container(a), &graph, &Value::Container(b)));
//! ```

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use crate::Map;

/// A stable handle to a container inside a [`Graph`].
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(usize);

impl ContainerId {
    /// Position of the container in its graph's arena.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single node of a document.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::Value;
///
/// let text = Value::from("hello");
/// let num = Value::from(42);
///
/// assert!(text.is_string());
/// assert_eq!(num.as_i64(), Some(42));
/// assert!(!num.is_container());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    Container(ContainerId),
}

/// A numeric scalar: a signed 64-bit integer or a finite float.
///
/// Non-finite floats have no textual form, so they cannot be stored here.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::Number;
///
/// let integer = Number::from(42);
/// let float = Number::from_f64(3.5).unwrap();
///
/// assert!(integer.is_integer());
/// assert_eq!(float.as_f64(), 3.5);
/// assert!(Number::from_f64(f64::NAN).is_none());
/// assert_eq!(Number::from_f64(2.0).unwrap().to_string(), "2.0");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Number {
    n: N,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum N {
    Integer(i64),
    // Always finite
    Float(f64),
}

impl Number {
    /// Creates an integer number.
    #[inline]
    #[must_use]
    pub const fn from_i64(value: i64) -> Self {
        Number {
            n: N::Integer(value),
        }
    }

    /// Creates a float number, or `None` if `value` is infinite or NaN.
    #[inline]
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        value.is_finite().then_some(Number {
            n: N::Float(value),
        })
    }

    /// Creates a number from a `u64`, falling back to a float above `i64::MAX`.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::from_i64(i),
            Err(_) => Number {
                n: N::Float(value as f64),
            },
        }
    }

    /// Returns `true` if this is an integer value.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self.n, N::Integer(_))
    }

    /// Returns `true` if this is a floating-point value.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self.n, N::Float(_))
    }

    /// Converts this number to an `i64` if possible.
    ///
    /// Floats convert only when they have no fractional part and fit in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.n {
            N::Integer(i) => Some(i),
            N::Float(f) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    /// Converts this number to an `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self.n {
            N::Integer(i) => i as f64,
            N::Float(f) => f,
        }
    }

    /// Parses a numeric literal of the form `-? digit+ ('.' digit+)?`.
    ///
    /// Literals without a fraction become integers, unless they overflow `i64`,
    /// in which case they are read as floats.
    pub(crate) fn parse(literal: &str) -> Option<Number> {
        let unsigned = literal.strip_prefix('-').unwrap_or(literal);
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (unsigned, None),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
            return None;
        }

        if frac_part.is_none() {
            if let Ok(i) = literal.parse::<i64>() {
                return Some(Number::from_i64(i));
            }
        }
        literal.parse::<f64>().ok().and_then(Number::from_f64)
    }
}

// Floats are always finite, so equality is reflexive.
impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.n {
            N::Integer(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            N::Float(f) => {
                1u8.hash(state);
                // -0.0 == 0.0, so both must hash alike
                let f = if f == 0.0 { 0.0 } else { f };
                f.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.n {
            N::Integer(i) => write!(f, "{}", i),
            N::Float(fl) => {
                write!(f, "{}", fl)?;
                // Keep integral floats distinguishable from integers
                if fl.fract() == 0.0 {
                    f.write_str(".0")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::from_i64(i64::from(value))
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl Value {
    /// Returns `true` if the value is a string.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if the value is a number.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if the value is a handle to an array or a map.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Value::Container(_))
    }

    /// If the value is a string, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is a number, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a number convertible to `i64`, returns it.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(|n| n.as_i64())
    }

    /// If the value is a number, returns it as an `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(|n| n.as_f64())
    }

    /// If the value is a container handle, returns it.
    #[inline]
    #[must_use]
    pub fn as_container(&self) -> Option<ContainerId> {
        match self {
            Value::Container(id) => Some(*id),
            _ => None,
        }
    }

    /// Identity equality: `true` only if both values are handles to the very
    /// same container. Scalars have no identity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_refjson::{Graph, Value};
    ///
    /// let mut graph = Graph::new();
    /// let id = graph.new_array();
    ///
    /// assert!(Value::Container(id).same_identity(&Value::Container(id)));
    /// assert!(!Value::from("a").same_identity(&Value::from("a")));
    /// ```
    #[must_use]
    pub fn same_identity(&self, other: &Value) -> bool {
        matches!((self, other), (Value::Container(a), Value::Container(b)) if a == b)
    }
}

impl Eq for Value {}

/// Strings hash by content, numbers by kind and value, containers by handle.
///
/// Must stay in step with the string-key lookup in [`Map::get_str`].
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::String(s) => {
                VALUE_STRING_TAG.hash(state);
                s.as_str().hash(state);
            }
            Value::Number(n) => {
                1u8.hash(state);
                n.hash(state);
            }
            Value::Container(id) => {
                2u8.hash(state);
                id.hash(state);
            }
        }
    }
}

pub(crate) const VALUE_STRING_TAG: u8 = 0;

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<ContainerId> for Value {
    fn from(value: ContainerId) -> Self {
        Value::Container(value)
    }
}

/// The two container kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum Container {
    Array(Vec<Value>),
    Map(Map),
}

impl Container {
    /// Returns `true` for arrays.
    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Container::Array(_))
    }

    /// Returns `true` for maps.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Container::Map(_))
    }

    /// Number of elements (arrays) or entries (maps).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Container::Array(items) => items.len(),
            Container::Map(map) => map.len(),
        }
    }

    /// Returns `true` if the container holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The arena that owns every container of a document.
///
/// # Examples
///
/// ```rust
/// use serde_refjson::{Graph, Value};
///
/// let mut graph = Graph::new();
/// let inner = graph.insert_array(vec![Value::from(1), Value::from(2)]);
/// let outer = graph.insert_array(vec![Value::Container(inner), Value::Container(inner)]);
///
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.array(outer).map(|items| items.len()), Some(2));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    containers: Vec<Container>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Graph {
            containers: Vec::new(),
        }
    }

    /// Creates an empty graph with room for `capacity` containers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Graph {
            containers: Vec::with_capacity(capacity),
        }
    }

    /// Number of containers in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Returns `true` if the arena holds no containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Moves a container into the arena and returns its handle.
    pub fn insert(&mut self, container: Container) -> ContainerId {
        self.containers.push(container);
        ContainerId(self.containers.len() - 1)
    }

    /// Adds an array holding `items`.
    pub fn insert_array(&mut self, items: Vec<Value>) -> ContainerId {
        self.insert(Container::Array(items))
    }

    /// Adds a map holding `map`.
    pub fn insert_map(&mut self, map: Map) -> ContainerId {
        self.insert(Container::Map(map))
    }

    /// Adds an empty array.
    pub fn new_array(&mut self) -> ContainerId {
        self.insert_array(Vec::new())
    }

    /// Adds an empty map.
    pub fn new_map(&mut self) -> ContainerId {
        self.insert_map(Map::new())
    }

    /// Returns the container behind `id`.
    #[must_use]
    pub fn get(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.0)
    }

    /// Returns the container behind `id` mutably.
    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> {
        self.containers.get_mut(id.0)
    }

    /// Returns the elements of the array behind `id`, or `None` for maps.
    #[must_use]
    pub fn array(&self, id: ContainerId) -> Option<&Vec<Value>> {
        match self.get(id)? {
            Container::Array(items) => Some(items),
            Container::Map(_) => None,
        }
    }

    /// Mutable access to the array behind `id`.
    pub fn array_mut(&mut self, id: ContainerId) -> Option<&mut Vec<Value>> {
        match self.get_mut(id)? {
            Container::Array(items) => Some(items),
            Container::Map(_) => None,
        }
    }

    /// Returns the map behind `id`, or `None` for arrays.
    #[must_use]
    pub fn map(&self, id: ContainerId) -> Option<&Map> {
        match self.get(id)? {
            Container::Map(map) => Some(map),
            Container::Array(_) => None,
        }
    }

    /// Mutable access to the map behind `id`.
    pub fn map_mut(&mut self, id: ContainerId) -> Option<&mut Map> {
        match self.get_mut(id)? {
            Container::Map(map) => Some(map),
            Container::Array(_) => None,
        }
    }

    /// Iterates over every container with its handle, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (ContainerId, &Container)> {
        self.containers
            .iter()
            .enumerate()
            .map(|(idx, c)| (ContainerId(idx), c))
    }

    /// Structural equality of `a` (in `self`) and `b` (in `other`).
    ///
    /// Shapes and scalar contents must match; which containers are shared is
    /// ignored. Cycles are handled by assuming a pair of containers equal while
    /// it is being compared, so two self-referencing maps with the same entries
    /// are equal.
    #[must_use]
    pub fn structural_eq(&self, a: &Value, other: &Graph, b: &Value) -> bool {
        let mut assumed: HashSet<(ContainerId, ContainerId)> = HashSet::new();
        let mut pending: Vec<(&Value, &Value)> = vec![(a, b)];

        while let Some((x, y)) = pending.pop() {
            match (x, y) {
                (Value::String(s), Value::String(t)) if s == t => {}
                (Value::Number(m), Value::Number(n)) if m == n => {}
                (Value::Container(i), Value::Container(j)) => {
                    if !assumed.insert((*i, *j)) {
                        continue;
                    }
                    match (self.get(*i), other.get(*j)) {
                        (Some(Container::Array(xs)), Some(Container::Array(ys)))
                            if xs.len() == ys.len() =>
                        {
                            pending.extend(xs.iter().zip(ys));
                        }
                        (Some(Container::Map(xm)), Some(Container::Map(ym)))
                            if xm.len() == ym.len() =>
                        {
                            for ((k1, v1), (k2, v2)) in xm.iter().zip(ym.iter()) {
                                pending.push((k1, k2));
                                pending.push((v1, v2));
                            }
                        }
                        _ => return false,
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

impl Index<ContainerId> for Graph {
    type Output = Container;

    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    fn index(&self, id: ContainerId) -> &Container {
        &self.containers[id.0]
    }
}

impl IndexMut<ContainerId> for Graph {
    fn index_mut(&mut self, id: ContainerId) -> &mut Container {
        &mut self.containers[id.0]
    }
}

/// A graph together with its single top-level value.
///
/// This is what [`encode`](crate::encode) consumes and [`decode`](crate::decode)
/// produces. Equality is structural.
#[derive(Clone, Debug)]
pub struct Document {
    graph: Graph,
    root: Value,
}

impl Document {
    /// Creates a document.
    ///
    /// Nothing is checked here. Every handle reachable from `root` must have been
    /// issued by `graph`; [`encode`](crate::encode) panics on a handle that was not.
    #[must_use]
    pub fn new(graph: Graph, root: Value) -> Self {
        Document { graph, root }
    }

    /// The top-level value.
    #[must_use]
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The arena holding the document's containers.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the arena.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Replaces the top-level value.
    pub fn set_root(&mut self, root: Value) {
        self.root = root;
    }

    /// Splits the document into its graph and root.
    #[must_use]
    pub fn into_parts(self) -> (Graph, Value) {
        (self.graph, self.root)
    }

    /// Looks up the container behind a value, if it is a container handle.
    #[must_use]
    pub fn container(&self, value: &Value) -> Option<&Container> {
        value.as_container().and_then(|id| self.graph.get(id))
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.graph.structural_eq(&self.root, &other.graph, &other.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_parse_accepts_grammar() {
        assert_eq!(Number::parse("0"), Some(Number::from(0)));
        assert_eq!(Number::parse("-17"), Some(Number::from(-17)));
        assert_eq!(Number::parse("3.25"), Number::from_f64(3.25));
        assert_eq!(Number::parse("-0.5"), Number::from_f64(-0.5));
    }

    #[test]
    fn test_number_parse_rejects_malformed() {
        for bad in ["", "-", "1.", ".5", "1e5", "--1", "1.2.3", "+1", "0x10", "1-"] {
            assert_eq!(Number::parse(bad), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_number_parse_overflow_falls_back_to_float() {
        let n = Number::parse("99999999999999999999").unwrap();
        assert!(n.is_float());
        assert_eq!(n.as_f64(), 1e20);
    }

    #[test]
    fn test_float_display_keeps_kind() {
        assert_eq!(Number::from_f64(1.0).unwrap().to_string(), "1.0");
        assert_eq!(Number::from_f64(-0.25).unwrap().to_string(), "-0.25");
        assert_eq!(Number::from(12).to_string(), "12");
        let shown = Number::from_f64(1e21).unwrap().to_string();
        assert_eq!(Number::parse(&shown), Number::from_f64(1e21));
    }

    #[test]
    fn test_structural_eq_ignores_sharing() {
        let mut shared = Graph::new();
        let leaf = shared.insert_array(vec![Value::from("x")]);
        let root_a = shared.insert_array(vec![Value::Container(leaf), Value::Container(leaf)]);

        let mut copied = Graph::new();
        let l1 = copied.insert_array(vec![Value::from("x")]);
        let l2 = copied.insert_array(vec![Value::from("x")]);
        let root_b = copied.insert_array(vec![Value::Container(l1), Value::Container(l2)]);

        assert!(shared.structural_eq(
            &Value::Container(root_a),
            &copied,
            &Value::Container(root_b)
        ));
    }

    #[test]
    fn test_structural_eq_handles_cycles() {
        let build = |extra: &str| {
            let mut graph = Graph::new();
            let m = graph.new_map();
            let map = graph.map_mut(m).unwrap();
            map.insert(Value::from("self"), Value::Container(m));
            map.insert(Value::from("tag"), Value::from(extra));
            Document::new(graph, Value::Container(m))
        };

        assert_eq!(build("a"), build("a"));
        assert_ne!(build("a"), build("b"));
    }

    #[test]
    fn test_structural_eq_distinguishes_kinds() {
        let mut graph = Graph::new();
        let arr = graph.new_array();
        let map = graph.new_map();
        assert!(!graph.structural_eq(&Value::Container(arr), &graph, &Value::Container(map)));
        assert!(!graph.structural_eq(&Value::from(1), &graph, &Value::from("1")));
    }

    #[test]
    #[should_panic]
    fn test_encode_panics_on_foreign_handle() {
        let mut other = Graph::new();
        other.new_array();
        let foreign = other.new_array();

        let doc = Document::new(Graph::new(), Value::Container(foreign));
        let _ = crate::encode(&doc);
    }

    #[test]
    fn test_typed_accessors() {
        let mut graph = Graph::new();
        let arr = graph.new_array();
        assert!(graph.array(arr).is_some());
        assert!(graph.map(arr).is_none());
        graph.array_mut(arr).unwrap().push(Value::from(5));
        assert_eq!(graph[arr].len(), 1);
    }
}
