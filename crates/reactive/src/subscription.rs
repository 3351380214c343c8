//! Listener management for observable lists.
//!
//! This module provides listener IDs, the notification type delivered to
//! listeners, and a manager tracking the listeners attached to one host.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;
use obslist_core::{Error, MutationBatch};

/// Unique identifier for an attached listener.
pub type SubscriptionId = u64;

/// What a host delivers to its listeners.
#[derive(Debug)]
pub enum Notification<'a, T> {
    /// A mutation batch, in arrival order.
    Batch(&'a MutationBatch<T>),
    /// The host failed while delivering.
    Failed(&'a Error),
}

impl<'a, T> Clone for Notification<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Notification<'a, T> {}

/// Callback type for batch notifications.
pub type BatchCallback<T> = Box<dyn Fn(Notification<'_, T>)>;

/// A listener handle that can be invoked after its manager is released.
pub type SharedCallback<T> = Rc<dyn Fn(Notification<'_, T>)>;

/// Manages the listeners attached to one host collection.
pub struct SubscriptionManager<T> {
    /// Attached listeners
    listeners: HashMap<SubscriptionId, SharedCallback<T>>,
    /// Attach order, so listeners are notified in registration order
    order: Vec<SubscriptionId>,
    /// Next listener ID to assign
    next_id: SubscriptionId,
}

impl<T> Default for SubscriptionManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SubscriptionManager<T> {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Attaches a listener.
    ///
    /// Returns the ID that can be used to detach it.
    pub fn subscribe(&mut self, callback: BatchCallback<T>) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;

        self.listeners.insert(id, Rc::from(callback));
        self.order.push(id);

        id
    }

    /// Detaches by ID.
    ///
    /// Returns true if the listener was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.detach(id).is_some()
    }

    /// Detaches by ID and hands the listener back.
    ///
    /// Lets the caller release its borrow of the manager before the listener
    /// (and whatever it owns) is dropped.
    pub fn detach(&mut self, id: SubscriptionId) -> Option<SharedCallback<T>> {
        let removed = self.listeners.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(removed)
    }

    /// Returns true if the listener is still attached.
    #[inline]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Returns the attached listeners in registration order.
    ///
    /// The returned handles stay valid when listeners detach, so callers can
    /// release their borrow of the manager before invoking them.
    pub fn callbacks(&self) -> Vec<(SubscriptionId, SharedCallback<T>)> {
        self.order
            .iter()
            .filter_map(|id| self.listeners.get(id).map(|cb| (*id, Rc::clone(cb))))
            .collect()
    }

    /// Returns the number of attached listeners.
    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listener is attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Detaches every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.order.clear();
    }
}
