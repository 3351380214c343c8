//! obslist Incremental - Change classification for observable lists.
//!
//! This crate turns raw mutation batches reported by an ordered collection
//! into ordered logical change events, optionally suppressing duplicate-driven
//! noise by counting occurrences per key.
//!
//! # Core Concepts
//!
//! - `OccurrenceLedger<K>`: A multiset counting live occurrences per key
//! - `Projection<F>`: Maps an element to the key used for distinctness
//! - `Classifier<T>`: Turns one `MutationBatch<T>` into events, in order
//! - `Mode`: The emission mode of a classifier
//!
//! # Classifiers
//!
//! - `SnapshotClassifier`: the whole collection once per batch
//! - `FlagClassifier`: adds, removals or updates as raw elements
//! - `ChangeClassifier`: every element tagged Added/Removed/Updated
//! - `DistinctClassifier`: Added/Removed transitions gated by the ledger
//!
//! # Example
//!
//! ```
//! use obslist_core::{ListChange, MutationBatch, SubChange};
//! use obslist_incremental::{Classifier, DistinctClassifier};
//!
//! // The collection already holds [1, 2, 2, 3]
//! let mut classifier = DistinctClassifier::identity().seeded(&[1, 2, 2, 3]);
//!
//! // Removing one of the two 2s is not a transition
//! let batch = MutationBatch::single(vec![1, 2, 3], SubChange::removal(vec![2]));
//! assert!(classifier.classify_to_vec(&batch).unwrap().is_empty());
//!
//! // Removing the only 3 is
//! let batch = MutationBatch::single(vec![1, 2], SubChange::removal(vec![3]));
//! assert_eq!(
//!     classifier.classify_to_vec(&batch).unwrap(),
//!     vec![ListChange::removed(3)]
//! );
//! ```

#![no_std]

extern crate alloc;

pub mod classify;
pub mod ledger;
pub mod projection;

pub use classify::{
    ChangeClassifier, Classifier, DistinctClassifier, FlagClassifier, Mode, SnapshotClassifier,
};
pub use ledger::OccurrenceLedger;
pub use projection::{Original, PayloadSelector, Projected, Projection};

// Re-export commonly used types from dependencies
pub use obslist_core::{ChangeFlag, Error, ListChange, MutationBatch, Result, SubChange};
