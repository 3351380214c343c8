//! In-memory observable list.
//!
//! `ObservableList` is a shared, single-threaded `Vec` that reports every
//! mutation to its listeners as a `MutationBatch`. It is the host the stream
//! factories attach to when no UI toolkit provides one.
//!
//! # Delivery
//!
//! - Each mutation outside `batch()` is delivered as its own batch.
//! - Mutations inside `batch()` are delivered together when the outermost
//!   `batch()` returns, one sub-change per mutation, in order.
//! - Listeners are notified in attach order.
//! - A mutation made from inside a listener is queued and delivered after the
//!   current notification has reached every listener.

use crate::source::{DetachHandle, ListSource};
use crate::subscription::{BatchCallback, Notification, SubscriptionManager};
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::ops::Range;
use obslist_core::{Error, MutationBatch, Result, SubChange};

enum Delivery<T> {
    Batch(MutationBatch<T>),
    Failed(Error),
}

struct ListInner<T> {
    items: RefCell<Vec<T>>,
    listeners: RefCell<SubscriptionManager<T>>,
    /// Sub-changes recorded by an open `batch()` call
    open_batch: RefCell<Option<Vec<SubChange<T>>>>,
    /// Notifications waiting for delivery
    queue: RefCell<VecDeque<Delivery<T>>>,
    dispatching: Cell<bool>,
}

/// How an insertion or removal moved the elements behind it.
enum Shift<'a> {
    Inserted { at: usize, count: usize },
    Removed(Range<usize>),
    /// Ascending positions of removed elements
    RemovedAt(&'a [usize]),
}

impl Shift<'_> {
    /// Maps a position before the change to the position after it, or
    /// `None` if the element there was removed.
    fn remap(&self, index: usize) -> Option<usize> {
        match self {
            Shift::Inserted { at, count } if index >= *at => Some(index + count),
            Shift::Inserted { .. } => Some(index),
            Shift::Removed(range) if range.contains(&index) => None,
            Shift::Removed(range) if index >= range.end => Some(index - range.len()),
            Shift::Removed(_) => Some(index),
            Shift::RemovedAt(positions) => match positions.binary_search(&index) {
                Ok(_) => None,
                Err(before) => Some(index - before),
            },
        }
    }
}

/// Rewrites the update ranges in `changes` through `remap`, splitting a range
/// whose elements are no longer contiguous and dropping one with no elements
/// left.
fn remap_updates<T, M>(changes: &mut Vec<SubChange<T>>, remap: M)
where
    M: Fn(usize) -> Option<usize>,
{
    let mut remapped = Vec::with_capacity(changes.len());
    for change in changes.drain(..) {
        let Some(range) = change.updated_range() else {
            remapped.push(change);
            continue;
        };
        let mut run: Option<Range<usize>> = None;
        for index in range.filter_map(&remap) {
            if let Some(current) = run.as_mut().filter(|r| r.end == index) {
                current.end += 1;
                continue;
            }
            if let Some(done) = run.replace(index..index + 1) {
                remapped.push(SubChange::update(done));
            }
        }
        if let Some(done) = run {
            remapped.push(SubChange::update(done));
        }
    }
    *changes = remapped;
}

/// Resets the dispatching flag even if a listener panics.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A shared list that notifies listeners of its mutations.
///
/// Cloning the list clones the handle, not the contents.
pub struct ObservableList<T> {
    inner: Rc<ListInner<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ObservableList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a list holding `items`. No notification is sent.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(ListInner {
                items: RefCell::new(items),
                listeners: RefCell::new(SubscriptionManager::new()),
                open_batch: RefCell::new(None),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Returns a copy of the element at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Returns a copy of the contents.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }

    /// Returns the number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Returns a handle that does not keep the list alive.
    pub fn downgrade(&self) -> WeakObservableList<T> {
        WeakObservableList {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Appends an element.
    pub fn push(&self, value: T) {
        self.inner.items.borrow_mut().push(value.clone());
        self.record(SubChange::insertion(vec![value]));
    }

    /// Inserts an element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, value: T) {
        self.inner.items.borrow_mut().insert(index, value.clone());
        self.record_moved(
            SubChange::insertion(vec![value]),
            Shift::Inserted { at: index, count: 1 },
        );
    }

    /// Appends every element, reported as one insertion.
    pub fn extend<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        if values.is_empty() {
            return;
        }
        self.inner.items.borrow_mut().extend(values.iter().cloned());
        self.record(SubChange::insertion(values));
    }

    /// Inserts every element at `index`, reported as one insertion.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert_all(&self, index: usize, values: Vec<T>) {
        if values.is_empty() {
            return;
        }
        self.inner
            .items
            .borrow_mut()
            .splice(index..index, values.iter().cloned());
        let shift = Shift::Inserted {
            at: index,
            count: values.len(),
        };
        self.record_moved(SubChange::insertion(values), shift);
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.record_moved(
            SubChange::removal(vec![removed.clone()]),
            Shift::Removed(index..index + 1),
        );
        Some(removed)
    }

    /// Removes the first element equal to `value`.
    ///
    /// Returns true if an element was removed.
    pub fn remove_item(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let position = self.inner.items.borrow().iter().position(|v| v == value);
        match position {
            Some(index) => self.remove(index).is_some(),
            None => false,
        }
    }

    /// Removes the elements in `range`, reported as one removal.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn remove_range(&self, range: Range<usize>) -> Vec<T> {
        let removed: Vec<T> = self.inner.items.borrow_mut().drain(range.clone()).collect();
        if !removed.is_empty() {
            self.record_moved(SubChange::removal(removed.clone()), Shift::Removed(range));
        }
        removed
    }

    /// Replaces the element at `index` and returns the previous one.
    ///
    /// Reported as a replacement: the old element removed, the new one added.
    pub fn set(&self, index: usize, value: T) -> Option<T> {
        let old = {
            let mut items = self.inner.items.borrow_mut();
            let slot = items.get_mut(index)?;
            core::mem::replace(slot, value.clone())
        };
        self.record(SubChange::replacement(vec![old.clone()], vec![value]));
        Some(old)
    }

    /// Mutates the element at `index` in place, reported as an update.
    ///
    /// `f` must not access the list. Returns false if `index` is out of
    /// bounds.
    pub fn update<F>(&self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        {
            let mut items = self.inner.items.borrow_mut();
            match items.get_mut(index) {
                Some(slot) => f(slot),
                None => return false,
            }
        }
        self.record(SubChange::update(index..index + 1));
        true
    }

    /// Keeps the elements matching `keep`; the rest are reported as one
    /// removal, in list order. `keep` must not access the list.
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let (removed, positions) = {
            let mut items = self.inner.items.borrow_mut();
            let mut kept = Vec::with_capacity(items.len());
            let mut removed = Vec::new();
            let mut positions = Vec::new();
            for (index, value) in items.drain(..).enumerate() {
                if keep(&value) {
                    kept.push(value);
                } else {
                    removed.push(value);
                    positions.push(index);
                }
            }
            *items = kept;
            (removed, positions)
        };
        if !removed.is_empty() {
            self.record_moved(SubChange::removal(removed), Shift::RemovedAt(&positions));
        }
    }

    /// Removes every element, reported as one removal.
    pub fn clear(&self) {
        let removed = core::mem::take(&mut *self.inner.items.borrow_mut());
        if !removed.is_empty() {
            let shift = Shift::Removed(0..removed.len());
            self.record_moved(SubChange::removal(removed), shift);
        }
    }

    /// Runs `f` and delivers every mutation it makes as a single batch.
    ///
    /// Nested calls join the outermost batch. An update followed by an
    /// insertion or removal in the same batch is reported at the updated
    /// element's final position, or dropped if that element was removed.
    pub fn batch<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        let outermost = {
            let mut open = self.inner.open_batch.borrow_mut();
            if open.is_some() {
                false
            } else {
                *open = Some(Vec::new());
                true
            }
        };

        let result = f(self);

        if outermost {
            let changes = self.inner.open_batch.borrow_mut().take().unwrap_or_default();
            if !changes.is_empty() {
                self.publish(changes);
            }
        }
        result
    }

    /// Delivers an upstream error to every listener.
    pub fn fail(&self, error: Error) {
        self.inner.queue.borrow_mut().push_back(Delivery::Failed(error));
        self.dispatch();
    }

    fn record(&self, change: SubChange<T>) {
        if let Some(changes) = self.inner.open_batch.borrow_mut().as_mut() {
            changes.push(change);
            return;
        }
        self.publish(vec![change]);
    }

    /// Records a change that moved elements, first moving the update ranges
    /// already recorded in an open batch along with their elements.
    fn record_moved(&self, change: SubChange<T>, shift: Shift<'_>) {
        if let Some(changes) = self.inner.open_batch.borrow_mut().as_mut() {
            remap_updates(changes, |index| shift.remap(index));
            changes.push(change);
            return;
        }
        self.publish(vec![change]);
    }

    fn publish(&self, changes: Vec<SubChange<T>>) {
        let snapshot: Rc<[T]> = Rc::from(self.inner.items.borrow().as_slice());
        self.inner
            .queue
            .borrow_mut()
            .push_back(Delivery::Batch(MutationBatch::new(snapshot, changes)));
        self.dispatch();
    }

    fn dispatch(&self) {
        // A listener mutating the list lands here; the outer loop delivers it
        if self.inner.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(&self.inner.dispatching);

        loop {
            let next = self.inner.queue.borrow_mut().pop_front();
            let Some(delivery) = next else { break };

            let callbacks = self.inner.listeners.borrow().callbacks();
            tracing::trace!(listeners = callbacks.len(), "delivering list notification");

            for (id, callback) in callbacks {
                // Skip listeners detached by an earlier callback
                if !self.inner.listeners.borrow().contains(id) {
                    continue;
                }
                match &delivery {
                    Delivery::Batch(batch) => callback(Notification::Batch(batch)),
                    Delivery::Failed(error) => callback(Notification::Failed(error)),
                }
            }
        }
    }
}

impl<T: Clone + 'static> ListSource<T> for ObservableList<T> {
    fn snapshot(&self) -> Result<Vec<T>> {
        Ok(self.to_vec())
    }

    fn attach(&self, listener: BatchCallback<T>) -> DetachHandle {
        attach_to(&self.inner, listener)
    }
}

fn attach_to<T: 'static>(inner: &Rc<ListInner<T>>, listener: BatchCallback<T>) -> DetachHandle {
    let id = inner.listeners.borrow_mut().subscribe(listener);
    tracing::debug!(id, "listener attached");

    let weak = Rc::downgrade(inner);
    DetachHandle::new(move || {
        if let Some(inner) = weak.upgrade() {
            let listener = inner.listeners.borrow_mut().detach(id);
            if listener.is_some() {
                tracing::debug!(id, "listener detached");
            }
        }
    })
}

/// A non-owning handle to an `ObservableList`.
///
/// Streams built on it do not keep the list alive. Once the list is dropped,
/// `snapshot()` fails with `Error::Detached` and `attach()` attaches nothing.
pub struct WeakObservableList<T> {
    inner: Weak<ListInner<T>>,
}

impl<T> Clone for WeakObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakObservableList<T> {
    /// Returns the list if it is still alive.
    pub fn upgrade(&self) -> Option<ObservableList<T>> {
        self.inner.upgrade().map(|inner| ObservableList { inner })
    }
}

impl<T: Clone + 'static> ListSource<T> for WeakObservableList<T> {
    fn snapshot(&self) -> Result<Vec<T>> {
        let inner = self.inner.upgrade().ok_or(Error::Detached)?;
        let items = inner.items.borrow().clone();
        Ok(items)
    }

    fn attach(&self, listener: BatchCallback<T>) -> DetachHandle {
        match self.inner.upgrade() {
            Some(inner) => attach_to(&inner, listener),
            None => {
                tracing::debug!("attach to a dropped list ignored");
                DetachHandle::noop()
            }
        }
    }
}
