//! obslist Reactive - Change streams over observable lists.
//!
//! This crate attaches classifiers to a mutable ordered collection and turns
//! its mutation batches into subscriber-facing event streams.
//!
//! # Core Concepts
//!
//! - `ListSource`: The host seam; reports contents and delivers batches
//! - `ObservableList`: An in-memory `ListSource`; `WeakObservableList` does
//!   not keep it alive
//! - `ListStream`: A lazily attached stream built from a classifier factory
//! - `ListSubscription`: Detaches from the host when dropped or unsubscribed
//! - `SubscriptionManager`: Tracks the listeners attached to one host
//!
//! # Factories
//!
//! - `from_list()`: the whole collection once per batch
//! - `from_list_adds()`, `from_list_removals()`, `from_list_updates()`
//! - `from_list_changes()`: every element tagged Added/Removed/Updated
//! - `from_list_distinct_changes()`, `from_list_distinct_changes_by()`,
//!   `from_list_distinct_mappings()`: duplicate-suppressed transitions
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use obslist_core::ListChange;
//! use obslist_reactive::{from_list_distinct_changes, Event, ObservableList};
//!
//! let list = ObservableList::from_vec(vec![1, 2, 2, 3]);
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let seen_clone = seen.clone();
//! let _sub = from_list_distinct_changes(list.clone()).subscribe(move |event| {
//!     if let Event::Next(change) = event {
//!         seen_clone.borrow_mut().push(change);
//!     }
//! });
//!
//! list.push(4);
//! list.remove_item(&2);
//! list.remove_item(&2);
//!
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![ListChange::added(4), ListChange::removed(2)]
//! );
//! ```

#![no_std]

extern crate alloc;

pub mod observable_list;
pub mod source;
pub mod sources;
pub mod stream;
pub mod subscription;

pub use observable_list::{ObservableList, WeakObservableList};
pub use source::{DetachHandle, ListSource};
pub use sources::{
    from_list, from_list_adds, from_list_changes, from_list_distinct_changes,
    from_list_distinct_changes_by, from_list_distinct_mappings, from_list_removals,
    from_list_updates, IdentityDistinct,
};
pub use stream::{Event, ListStream, ListSubscription};
pub use subscription::{
    BatchCallback, Notification, SharedCallback, SubscriptionId, SubscriptionManager,
};

// Re-export commonly used types from dependencies
pub use obslist_core::{ChangeFlag, Error, ListChange, MutationBatch, Result, SubChange};
pub use obslist_incremental::{Classifier, Mode};
