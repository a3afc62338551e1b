//! Ordered map type for map containers.
//!
//! This module provides [`Map`], a wrapper around [`IndexMap`] keyed by full
//! [`Value`]s: a key can be a string, a number, or a handle to another container.
//! Insertion order is preserved and matters, since it decides the order in which
//! reference ids are handed out during encoding.
//!
//! A map never holds two equal keys, so every map encodes to text that decodes
//! back to the same entries.
//!
//! ## Examples
//!
//! ```rust
//! use serde_refjson::{Map, Value};
//!
//! let mut map = Map::new();
//! map.insert(Value::from("name"), Value::from("Alice"));
//! map.insert(Value::from(7), Value::from("seven"));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get_str("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(map.get(&Value::from(7)).and_then(|v| v.as_str()), Some("seven"));
//! ```

use std::hash::{Hash, Hasher};

use indexmap::{Equivalent, IndexMap};

use crate::value::VALUE_STRING_TAG;
use crate::Value;

/// An ordered map from [`Value`] keys to [`Value`]s.
///
/// Key comparison uses [`Value`]'s `PartialEq`: scalars compare by content and
/// container keys compare by identity.
#[derive(Debug, Clone, Default)]
pub struct Map(IndexMap<Value, Value>);

/// Borrowed string key, hashed exactly like [`Value::String`].
struct StrKey<'a>(&'a str);

impl Hash for StrKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        VALUE_STRING_TAG.hash(state);
        self.0.hash(state);
    }
}

impl Equivalent<Value> for StrKey<'_> {
    fn equivalent(&self, key: &Value) -> bool {
        key.as_str() == Some(self.0)
    }
}

impl Map {
    /// Creates an empty `Map`.
    #[must_use]
    pub fn new() -> Self {
        Map(IndexMap::new())
    }

    /// Creates an empty `Map` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the entry keeps its position, its
    /// value is replaced, and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_refjson::{Map, Value};
    ///
    /// let mut map = Map::new();
    /// assert!(map.insert(Value::from("key"), Value::from(42)).is_none());
    /// assert!(map.insert(Value::from("key"), Value::from(43)).is_some());
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value stored under a string key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.0.get(&StrKey(key))
    }

    /// Returns the entry at `index` in insertion order.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&Value, &Value)> {
        self.0.get_index(index)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Value, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Value, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Value, Value> {
        self.0.iter()
    }
}

// Entry order is part of a map's meaning here: it fixes the reference numbering.
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = indexmap::map::IntoIter<Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a Value, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Value, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (Value, Value)>>(iter: T) -> Self {
        Map(IndexMap::from_iter(iter))
    }
}
