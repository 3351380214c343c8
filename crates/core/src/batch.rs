//! Raw mutation batches.
//!
//! A `MutationBatch` is what a host collection delivers after a mutation:
//! the contents of the collection after the batch, plus the ordered list of
//! sub-changes that led there. Batches are self-contained; classification
//! never needs to look at the live collection.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::ops::Range;

/// One unit of mutation inside a batch.
///
/// A sub-change may report insertions, removals and an in-place update range
/// at the same time. A replacement, for instance, reports both the removed
/// and the inserted elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubChange<T> {
    added: Vec<T>,
    removed: Vec<T>,
    updated: Option<Range<usize>>,
}

impl<T> SubChange<T> {
    /// Creates a sub-change reporting inserted elements, in insertion order.
    pub fn insertion(added: Vec<T>) -> Self {
        Self {
            added,
            removed: Vec::new(),
            updated: None,
        }
    }

    /// Creates a sub-change reporting removed elements.
    pub fn removal(removed: Vec<T>) -> Self {
        Self {
            added: Vec::new(),
            removed,
            updated: None,
        }
    }

    /// Creates a sub-change reporting an in-place update of `[from, to)`.
    pub fn update(range: Range<usize>) -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            updated: Some(range),
        }
    }

    /// Creates a sub-change where `removed` was replaced by `added`.
    pub fn replacement(removed: Vec<T>, added: Vec<T>) -> Self {
        Self {
            added,
            removed,
            updated: None,
        }
    }

    /// Inserted elements.
    #[inline]
    pub fn added(&self) -> &[T] {
        &self.added
    }

    /// Removed elements.
    #[inline]
    pub fn removed(&self) -> &[T] {
        &self.removed
    }

    /// The updated index range, if any.
    #[inline]
    pub fn updated_range(&self) -> Option<Range<usize>> {
        self.updated.clone()
    }

    #[inline]
    pub fn was_added(&self) -> bool {
        !self.added.is_empty()
    }

    #[inline]
    pub fn was_removed(&self) -> bool {
        !self.removed.is_empty()
    }

    #[inline]
    pub fn was_updated(&self) -> bool {
        self.updated.as_ref().map_or(false, |r| !r.is_empty())
    }

    /// Returns true if this sub-change reports nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.was_added() && !self.was_removed() && !self.was_updated()
    }
}

/// An ordered batch of sub-changes over a snapshot.
///
/// `snapshot` holds the collection contents after every sub-change of the
/// batch has been applied. Update ranges index into it.
#[derive(Clone, Debug)]
pub struct MutationBatch<T> {
    snapshot: Rc<[T]>,
    changes: Vec<SubChange<T>>,
}

impl<T> MutationBatch<T> {
    /// Creates a batch from a snapshot and its sub-changes.
    pub fn new(snapshot: impl Into<Rc<[T]>>, changes: Vec<SubChange<T>>) -> Self {
        Self {
            snapshot: snapshot.into(),
            changes,
        }
    }

    /// Creates a batch holding a single sub-change.
    pub fn single(snapshot: impl Into<Rc<[T]>>, change: SubChange<T>) -> Self {
        let mut changes = Vec::with_capacity(1);
        changes.push(change);
        Self::new(snapshot, changes)
    }

    /// Returns the collection contents after the batch.
    #[inline]
    pub fn snapshot(&self) -> &[T] {
        &self.snapshot
    }

    /// Returns a shared handle to the snapshot.
    #[inline]
    pub fn snapshot_rc(&self) -> Rc<[T]> {
        Rc::clone(&self.snapshot)
    }

    /// Returns the sub-changes in source order.
    #[inline]
    pub fn changes(&self) -> &[SubChange<T>] {
        &self.changes
    }

    /// Iterates over the sub-changes in source order.
    pub fn iter(&self) -> core::slice::Iter<'_, SubChange<T>> {
        self.changes.iter()
    }

    /// Returns the number of sub-changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns true if the batch carries no sub-change.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a MutationBatch<T> {
    type Item = &'a SubChange<T>;
    type IntoIter = core::slice::Iter<'a, SubChange<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
