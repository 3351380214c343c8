//! obslist Core - Core types for observable list change streams.
//!
//! This crate provides the foundational types shared by the classifier and
//! the reactive layer:
//!
//! - `ChangeFlag`: The kind of transition (Added, Removed, Updated)
//! - `ListChange`: A classified change, payload plus flag
//! - `SubChange`: One unit of mutation inside a raw batch
//! - `MutationBatch`: An ordered batch of sub-changes over a snapshot
//! - `Error`: Error types for classification and delivery
//!
//! # Example
//!
//! ```rust
//! use obslist_core::{MutationBatch, SubChange};
//!
//! let batch = MutationBatch::new(
//!     vec![1, 2, 3],
//!     vec![SubChange::insertion(vec![3]), SubChange::update(0..1)],
//! );
//!
//! assert_eq!(batch.len(), 2);
//! assert!(batch.changes()[0].was_added());
//! ```

#![no_std]

extern crate alloc;

mod batch;
mod change;
mod error;

pub use batch::{MutationBatch, SubChange};
pub use change::{ChangeFlag, ListChange};
pub use error::{Error, Result};
