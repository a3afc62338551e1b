//! Reference ids for shared and cyclic containers.
//!
//! Every distinct container gets a 1-based [`RefId`] the first time a pre-order,
//! left-to-right walk reaches it. Later occurrences of the same container are
//! written as `$id` instead of being expanded again.
//!
//! Both directions keep their ids in an [`IndexSet`] of container handles, so
//! the id of a container is simply its insertion index plus one. A tracker lives
//! for exactly one encode or decode call.

use std::fmt;

use indexmap::IndexSet;
use tracing::trace;

use crate::ContainerId;

/// A 1-based reference id, as written after `$` in the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(u64);

impl RefId {
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    fn from_index(index: usize) -> Self {
        RefId(index as u64 + 1)
    }

    #[inline]
    fn to_index(self) -> Option<usize> {
        usize::try_from(self.0).ok()?.checked_sub(1)
    }
}

impl From<u64> for RefId {
    fn from(id: u64) -> Self {
        RefId(id)
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}

/// Outcome of [`ReferenceTracker::visit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// First time this container is reached; it was just given this id.
    First(RefId),
    /// The container was reached before under this id.
    Seen(RefId),
}

/// Encode side: container identity to reference id.
#[derive(Debug, Default)]
pub struct ReferenceTracker {
    ids: IndexSet<ContainerId>,
}

impl ReferenceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a visit to `container`, assigning the next id on first sight.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_refjson::refs::{ReferenceTracker, Visit};
    /// use serde_refjson::Graph;
    ///
    /// let mut graph = Graph::new();
    /// let a = graph.new_array();
    /// let b = graph.new_map();
    ///
    /// let mut tracker = ReferenceTracker::new();
    /// assert!(matches!(tracker.visit(b), Visit::First(id) if id.get() == 1));
    /// assert!(matches!(tracker.visit(a), Visit::First(id) if id.get() == 2));
    /// assert!(matches!(tracker.visit(b), Visit::Seen(id) if id.get() == 1));
    /// ```
    pub fn visit(&mut self, container: ContainerId) -> Visit {
        let (index, inserted) = self.ids.insert_full(container);
        let id = RefId::from_index(index);
        if inserted {
            Visit::First(id)
        } else {
            Visit::Seen(id)
        }
    }

    /// Number of distinct containers visited so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Decode side: reference id to container.
///
/// Containers are registered the moment their opening marker is read, before
/// any of their contents, which is what lets a container refer to itself.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    containers: IndexSet<ContainerId>,
}

impl ReferenceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly opened container under the next sequential id.
    pub fn register(&mut self, container: ContainerId) -> RefId {
        let (index, _) = self.containers.insert_full(container);
        RefId::from_index(index)
    }

    /// Looks up the container registered under `id`.
    #[must_use]
    pub fn resolve(&self, id: RefId) -> Option<ContainerId> {
        let resolved = id.to_index().and_then(|idx| self.containers.get_index(idx).copied());
        trace!(%id, found = resolved.is_some(), "resolving reference");
        resolved
    }

    /// Number of registered containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Graph;

    #[test]
    fn test_ids_are_contiguous_from_one() {
        let mut graph = Graph::new();
        let handles: Vec<_> = (0..4).map(|_| graph.new_array()).collect();

        let mut tracker = ReferenceTracker::new();
        for (n, handle) in handles.iter().rev().enumerate() {
            assert_eq!(tracker.visit(*handle), Visit::First(RefId(n as u64 + 1)));
        }
        assert_eq!(tracker.len(), 4);
        assert_eq!(tracker.visit(handles[3]), Visit::Seen(RefId(1)));
    }

    #[test]
    fn test_table_resolves_registered() {
        let mut graph = Graph::new();
        let a = graph.new_map();
        let b = graph.new_array();

        let mut table = ReferenceTable::new();
        assert_eq!(table.register(a), RefId(1));
        assert_eq!(table.register(b), RefId(2));

        assert_eq!(table.resolve(RefId(1)), Some(a));
        assert_eq!(table.resolve(RefId(2)), Some(b));
        assert_eq!(table.resolve(RefId(3)), None);
        assert_eq!(table.resolve(RefId(0)), None);
    }

    #[test]
    fn test_display_matches_token() {
        assert_eq!(RefId(12).to_string(), "$12");
    }
}
