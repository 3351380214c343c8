//! The host-collection seam.
//!
//! A `ListSource` is anything that can report its contents and deliver
//! mutation batches to attached listeners. `ObservableList` is the in-crate
//! implementation; UI toolkits plug in their own.

use crate::subscription::BatchCallback;
use alloc::boxed::Box;
use alloc::vec::Vec;
use obslist_core::Result;

/// A mutable ordered collection that reports its mutations in batches.
///
/// Implementations must deliver batches synchronously and serially: a
/// listener is never invoked while it is already running.
pub trait ListSource<T> {
    /// Returns the current contents, used once to seed stateful classifiers.
    fn snapshot(&self) -> Result<Vec<T>>;

    /// Attaches a listener. Dropping or detaching the returned handle
    /// deregisters it.
    fn attach(&self, listener: BatchCallback<T>) -> DetachHandle;
}

/// Deregisters a listener from its host.
///
/// Detaching happens at most once: on `detach()` or on drop, whichever comes
/// first.
#[must_use = "dropping a DetachHandle detaches the listener"]
pub struct DetachHandle {
    detach: Option<Box<dyn FnOnce()>>,
}

impl DetachHandle {
    /// Creates a handle that runs `detach` when released.
    pub fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Creates a handle with nothing to release.
    pub fn noop() -> Self {
        Self { detach: None }
    }

    /// Returns true if the listener has not been detached yet.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.detach.is_some()
    }

    /// Detaches the listener. Later calls do nothing.
    pub fn detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for DetachHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

impl core::fmt::Debug for DetachHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DetachHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}
