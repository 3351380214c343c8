//! Change classifiers.
//!
//! A classifier turns one raw `MutationBatch` into zero or more logical
//! events. All classifiers walk the batch the same way: sub-changes in source
//! order, and within a sub-change insertions first, then removals, then the
//! updated range. They differ in what they emit:
//!
//! - `SnapshotClassifier`: the whole collection, once per batch
//! - `FlagClassifier`: raw elements of a single kind (adds, removals, updates)
//! - `ChangeClassifier`: every element tagged with its `ChangeFlag`
//! - `DistinctClassifier`: Added/Removed transitions gated by an occurrence ledger

mod change;
mod distinct;
mod flag;
mod snapshot;

pub use change::ChangeClassifier;
pub use distinct::DistinctClassifier;
pub use flag::FlagClassifier;
pub use snapshot::SnapshotClassifier;

use alloc::vec::Vec;
use core::fmt;
use obslist_core::{Error, MutationBatch, Result, SubChange};

/// The emission mode of a classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Emit the whole collection once per batch.
    Snapshot,
    /// Emit inserted elements.
    Adds,
    /// Emit removed elements.
    Removals,
    /// Emit elements of updated ranges.
    Updates,
    /// Emit every element tagged Added, Removed or Updated.
    Changes,
    /// Emit Added/Removed transitions, payload is the element.
    DistinctChanges,
    /// Emit Added/Removed transitions, payload is the projected key.
    DistinctMappings,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Snapshot => "snapshot",
            Mode::Adds => "adds",
            Mode::Removals => "removals",
            Mode::Updates => "updates",
            Mode::Changes => "changes",
            Mode::DistinctChanges => "distinct-changes",
            Mode::DistinctMappings => "distinct-mappings",
        };
        f.write_str(name)
    }
}

/// Classifies raw mutation batches into logical events.
///
/// One classifier instance belongs to exactly one subscription. Stateful
/// classifiers must be seeded from the source's contents before the first
/// batch arrives.
pub trait Classifier<T> {
    /// The payload type of emitted events.
    type Output;

    /// Returns the emission mode.
    fn mode(&self) -> Mode;

    /// Returns true if `seed` must be called before the first batch.
    fn requires_seed(&self) -> bool {
        false
    }

    /// Records the collection's contents before any mutation.
    fn seed(&mut self, _snapshot: &[T]) {}

    /// Classifies one batch, calling `emit` once per event in order.
    ///
    /// On error, events already passed to `emit` stay emitted and the rest of
    /// the batch is skipped.
    fn classify<E>(&mut self, batch: &MutationBatch<T>, emit: E) -> Result<()>
    where
        E: FnMut(Self::Output);

    /// Classifies one batch and collects its events.
    fn classify_to_vec(&mut self, batch: &MutationBatch<T>) -> Result<Vec<Self::Output>> {
        let mut events = Vec::new();
        self.classify(batch, |event| events.push(event))?;
        Ok(events)
    }
}

/// Returns the snapshot elements covered by a sub-change's update range.
pub(crate) fn updated_elements<'a, T>(
    batch: &'a MutationBatch<T>,
    change: &SubChange<T>,
) -> Result<&'a [T]> {
    match change.updated_range() {
        None => Ok(&[]),
        Some(range) if range.is_empty() => Ok(&[]),
        Some(range) => {
            let len = batch.snapshot().len();
            batch
                .snapshot()
                .get(range.clone())
                .ok_or(Error::range_out_of_bounds(range.start, range.end, len))
        }
    }
}
