//! Change streams over a list source.
//!
//! A `ListStream` pairs a source with a classifier factory. Every
//! `subscribe()` builds a fresh classifier, seeds it from the source if it
//! keeps state, and attaches a listener that classifies each batch and
//! forwards the events to the subscriber.
//!
//! A stream terminates on the first error, whether reported by the host or
//! raised by the classifier: the subscriber gets one `Event::Error`, the
//! listener is detached, and nothing is delivered afterwards.

use crate::source::{DetachHandle, ListSource};
use crate::subscription::{BatchCallback, Notification};
use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::marker::PhantomData;
use obslist_core::{Error, MutationBatch, Result};
use obslist_incremental::{Classifier, Mode};

/// An event delivered to a stream subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<V> {
    /// A classified change.
    Next(V),
    /// The terminal error. No further events follow.
    Error(Error),
}

impl<V> Event<V> {
    #[inline]
    pub fn is_next(&self) -> bool {
        matches!(self, Event::Next(_))
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }

    /// Returns the value of a `Next` event.
    pub fn into_next(self) -> Option<V> {
        match self {
            Event::Next(value) => Some(value),
            Event::Error(_) => None,
        }
    }

    /// Returns the error of an `Error` event.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Event::Next(_) => None,
            Event::Error(error) => Some(error),
        }
    }
}

/// A lazily attached stream of classified changes.
///
/// Nothing is attached to the source until `subscribe()` is called. Each
/// subscription owns its own classifier, so stateful modes keep one ledger
/// per subscriber.
pub struct ListStream<T, S, C> {
    source: S,
    factory: Rc<dyn Fn() -> C>,
    _element: PhantomData<fn(&T)>,
}

impl<T, S: Clone, C> Clone for ListStream<T, S, C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            factory: Rc::clone(&self.factory),
            _element: PhantomData,
        }
    }
}

impl<T, S, C> ListStream<T, S, C> {
    /// Creates a stream that classifies `source` batches with classifiers
    /// built by `factory`.
    pub fn new<F>(source: S, factory: F) -> Self
    where
        F: Fn() -> C + 'static,
    {
        Self {
            source,
            factory: Rc::new(factory),
            _element: PhantomData,
        }
    }

    /// Returns the source this stream observes.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<T, S, C> ListStream<T, S, C>
where
    T: 'static,
    S: ListSource<T>,
    C: Classifier<T> + 'static,
{
    /// Returns the emission mode of this stream.
    pub fn mode(&self) -> Mode {
        (self.factory)().mode()
    }

    /// Subscribes to the stream.
    ///
    /// Stateful classifiers are seeded from the source's current contents
    /// first; if that fails, `callback` receives the error and the returned
    /// subscription is already closed.
    pub fn subscribe<F>(&self, mut callback: F) -> ListSubscription
    where
        F: FnMut(Event<C::Output>) + 'static,
    {
        let mut classifier = (self.factory)();
        let mode = classifier.mode();

        if classifier.requires_seed() {
            match self.source.snapshot() {
                Ok(snapshot) => classifier.seed(&snapshot),
                Err(error) => {
                    tracing::warn!(%mode, %error, "list stream failed to seed");
                    callback(Event::Error(error));
                    return ListSubscription::closed();
                }
            }
        }

        let state = Rc::new(StreamState {
            mode,
            classifier: RefCell::new(classifier),
            callback: RefCell::new(callback),
            detach: RefCell::new(None),
            closed: Cell::new(false),
        });

        let listener_state = Rc::clone(&state);
        let listener: BatchCallback<T> =
            Box::new(move |notification| listener_state.on_notification(notification));
        let handle = self.source.attach(listener);
        *state.detach.borrow_mut() = Some(handle);

        tracing::debug!(%mode, "list stream subscribed");
        ListSubscription { state: Some(state) }
    }
}

/// Per-subscription state shared by the host listener and the
/// `ListSubscription`.
struct StreamState<C, F> {
    mode: Mode,
    classifier: RefCell<C>,
    callback: RefCell<F>,
    detach: RefCell<Option<DetachHandle>>,
    closed: Cell<bool>,
}

impl<C, F> StreamState<C, F> {
    fn on_notification<T>(&self, notification: Notification<'_, T>)
    where
        C: Classifier<T>,
        F: FnMut(Event<C::Output>),
    {
        if self.closed.get() {
            return;
        }
        let result = match notification {
            Notification::Batch(batch) => self.classify(batch),
            Notification::Failed(error) => Err(error.clone()),
        };
        if let Err(error) = result {
            self.fail::<C::Output>(error);
        }
    }

    fn classify<T>(&self, batch: &MutationBatch<T>) -> Result<()>
    where
        C: Classifier<T>,
        F: FnMut(Event<C::Output>),
    {
        let mut classifier = self.classifier.borrow_mut();
        let mut callback = self.callback.borrow_mut();
        let callback = &mut *callback;
        let closed = &self.closed;
        let mut emitted = 0usize;

        let result = classifier.classify(batch, |value| {
            // The subscriber may unsubscribe mid-batch
            if !closed.get() {
                emitted += 1;
                callback(Event::Next(value));
            }
        });

        tracing::trace!(mode = %self.mode, changes = batch.len(), emitted, "classified batch");
        result
    }

    fn fail<V>(&self, error: Error)
    where
        F: FnMut(Event<V>),
    {
        if self.closed.replace(true) {
            return;
        }
        tracing::warn!(
            mode = %self.mode,
            %error,
            desync = error.is_desync(),
            "list stream terminated"
        );
        {
            let mut callback = self.callback.borrow_mut();
            (&mut *callback)(Event::Error(error));
        }
        let handle = self.detach.borrow_mut().take();
        drop(handle);
    }
}

trait Teardown {
    fn teardown(&self);
    fn is_closed(&self) -> bool;
}

impl<C, F> Teardown for StreamState<C, F> {
    fn teardown(&self) {
        if !self.closed.replace(true) {
            tracing::debug!(mode = %self.mode, "list stream unsubscribed");
        }
        let handle = self.detach.borrow_mut().take();
        drop(handle);
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

/// A live stream subscription.
///
/// Dropping it, or calling `unsubscribe()`, detaches from the source.
#[must_use = "dropping a ListSubscription unsubscribes it"]
pub struct ListSubscription {
    state: Option<Rc<dyn Teardown>>,
}

impl ListSubscription {
    fn closed() -> Self {
        Self { state: None }
    }

    /// Detaches from the source. No event is delivered afterwards.
    pub fn unsubscribe(&mut self) {
        if let Some(state) = self.state.take() {
            state.teardown();
        }
    }

    /// Returns true once the subscription has been unsubscribed or the stream
    /// has terminated with an error.
    pub fn is_closed(&self) -> bool {
        self.state.as_ref().map_or(true, |state| state.is_closed())
    }
}

impl Drop for ListSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl core::fmt::Debug for ListSubscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListSubscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::SubscriptionManager;
    use crate::ObservableList;
    use alloc::vec;
    use alloc::vec::Vec;
    use obslist_core::{ListChange, SubChange};
    use obslist_incremental::{ChangeClassifier, DistinctClassifier, FlagClassifier};

    /// A source that delivers whatever batches the test hands it.
    #[derive(Clone)]
    struct ManualSource {
        contents: Rc<RefCell<Result<Vec<i32>>>>,
        listeners: Rc<RefCell<SubscriptionManager<i32>>>,
    }

    impl ManualSource {
        fn new(contents: Vec<i32>) -> Self {
            Self {
                contents: Rc::new(RefCell::new(Ok(contents))),
                listeners: Rc::new(RefCell::new(SubscriptionManager::new())),
            }
        }

        fn failing(error: Error) -> Self {
            let source = Self::new(Vec::new());
            *source.contents.borrow_mut() = Err(error);
            source
        }

        fn deliver(&self, batch: MutationBatch<i32>) {
            let callbacks = self.listeners.borrow().callbacks();
            for (_, cb) in callbacks {
                cb(Notification::Batch(&batch));
            }
        }

        fn deliver_error(&self, error: Error) {
            let callbacks = self.listeners.borrow().callbacks();
            for (_, cb) in callbacks {
                cb(Notification::Failed(&error));
            }
        }

        fn listener_count(&self) -> usize {
            self.listeners.borrow().len()
        }
    }

    impl ListSource<i32> for ManualSource {
        fn snapshot(&self) -> Result<Vec<i32>> {
            self.contents.borrow().clone()
        }

        fn attach(&self, listener: BatchCallback<i32>) -> DetachHandle {
            let id = self.listeners.borrow_mut().subscribe(listener);
            let listeners = Rc::clone(&self.listeners);
            DetachHandle::new(move || {
                let listener = listeners.borrow_mut().detach(id);
                drop(listener);
            })
        }
    }

    fn collect<V: 'static>() -> (Rc<RefCell<Vec<Event<V>>>>, impl FnMut(Event<V>) + 'static) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = events.clone();
        (events, move |event: Event<V>| events_clone.borrow_mut().push(event))
    }

    #[test]
    fn test_subscribe_is_lazy() {
        let source = ManualSource::new(vec![]);
        let stream = ListStream::new(source.clone(), FlagClassifier::adds);
        assert_eq!(source.listener_count(), 0);

        let (_events, callback) = collect::<i32>();
        let _sub = stream.subscribe(callback);
        assert_eq!(source.listener_count(), 1);
    }

    #[test]
    fn test_events_follow_batch_order() {
        let source = ManualSource::new(vec![]);
        let stream = ListStream::new(source.clone(), ChangeClassifier::new);
        let (events, callback) = collect();
        let _sub = stream.subscribe(callback);

        source.deliver(MutationBatch::single(vec![1], SubChange::insertion(vec![1])));
        source.deliver(MutationBatch::single(vec![], SubChange::removal(vec![1])));

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Next(ListChange::added(1)),
                Event::Next(ListChange::removed(1)),
            ]
        );
    }

    #[test]
    fn test_unsubscribe_detaches() {
        let source = ManualSource::new(vec![]);
        let stream = ListStream::new(source.clone(), FlagClassifier::adds);
        let (events, callback) = collect();
        let mut sub = stream.subscribe(callback);

        source.deliver(MutationBatch::single(vec![1], SubChange::insertion(vec![1])));
        sub.unsubscribe();
        assert!(sub.is_closed());
        source.deliver(MutationBatch::single(vec![1, 2], SubChange::insertion(vec![2])));

        assert_eq!(*events.borrow(), vec![Event::Next(1)]);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let source = ManualSource::new(vec![]);
        let stream = ListStream::new(source.clone(), FlagClassifier::adds);
        let (_events, callback) = collect::<i32>();
        drop(stream.subscribe(callback));
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_desync_terminates_stream() {
        let source = ManualSource::new(vec![1]);
        let stream = ListStream::new(source.clone(), DistinctClassifier::identity);
        let (events, callback) = collect();
        let sub = stream.subscribe(callback);

        // 5 was never present
        source.deliver(MutationBatch::new(
            vec![1, 2],
            vec![SubChange::insertion(vec![2]), SubChange::removal(vec![5])],
        ));
        source.deliver(MutationBatch::single(vec![1, 2, 3], SubChange::insertion(vec![3])));

        assert_eq!(
            *events.borrow(),
            vec![
                Event::Next(ListChange::added(2)),
                Event::Error(Error::LedgerDesync),
            ]
        );
        assert!(sub.is_closed());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_host_error_terminates_stream() {
        let source = ManualSource::new(vec![]);
        let stream = ListStream::new(source.clone(), FlagClassifier::removals);
        let (events, callback) = collect();
        let sub = stream.subscribe(callback);

        source.deliver_error(Error::upstream("host gone"));
        source.deliver_error(Error::upstream("again"));

        assert_eq!(*events.borrow(), vec![Event::Error(Error::upstream("host gone"))]);
        assert!(sub.is_closed());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_range_error_terminates_updates() {
        let source = ManualSource::new(vec![]);
        let stream = ListStream::new(source.clone(), FlagClassifier::updates);
        let (events, callback) = collect();
        let _sub = stream.subscribe(callback);

        source.deliver(MutationBatch::single(vec![1], SubChange::update(0..2)));

        assert_eq!(
            *events.borrow(),
            vec![Event::Error(Error::range_out_of_bounds(0, 2, 1))]
        );
    }

    #[test]
    fn test_seed_failure_closes_subscription() {
        let source = ManualSource::failing(Error::Detached);
        let stream = ListStream::new(source.clone(), DistinctClassifier::identity);
        let (events, callback) = collect::<ListChange<i32>>();
        let sub = stream.subscribe(callback);

        assert_eq!(*events.borrow(), vec![Event::Error(Error::Detached)]);
        assert!(sub.is_closed());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_dropped_list_reports_detached() {
        let list = ObservableList::from_vec(vec![1, 2]);
        let weak = list.downgrade();
        let stream = ListStream::new(weak, DistinctClassifier::identity);
        drop(list);

        let (events, callback) = collect::<ListChange<i32>>();
        let sub = stream.subscribe(callback);

        assert_eq!(*events.borrow(), vec![Event::Error(Error::Detached)]);
        assert!(sub.is_closed());
    }

    #[test]
    fn test_weak_stream_does_not_keep_list_alive() {
        let list = ObservableList::new();
        let stream = ListStream::new(list.downgrade(), FlagClassifier::adds);
        let (events, callback) = collect();
        let _sub = stream.subscribe(callback);

        list.push(1);
        assert!(stream.source().upgrade().is_some());
        drop(list);

        assert!(stream.source().upgrade().is_none());
        assert_eq!(*events.borrow(), vec![Event::Next(1)]);
    }

    #[test]
    fn test_stateless_modes_skip_snapshot() {
        let source = ManualSource::failing(Error::Detached);
        let stream = ListStream::new(source.clone(), FlagClassifier::adds);
        let (events, callback) = collect::<i32>();
        let sub = stream.subscribe(callback);

        assert!(events.borrow().is_empty());
        assert!(!sub.is_closed());
    }

    #[test]
    fn test_each_subscription_has_own_ledger() {
        let list = ObservableList::from_vec(vec!['a']);
        let stream = ListStream::new(list.clone(), DistinctClassifier::identity);

        let (first, callback) = collect();
        let _first = stream.subscribe(callback);

        list.push('b');

        // Seeded from ['a', 'b'], so 'b' is already present
        let (second, callback) = collect();
        let _second = stream.subscribe(callback);

        list.push('b');
        list.push('c');

        assert_eq!(
            *first.borrow(),
            vec![Event::Next(ListChange::added('b')), Event::Next(ListChange::added('c'))]
        );
        assert_eq!(*second.borrow(), vec![Event::Next(ListChange::added('c'))]);
    }

    #[test]
    fn test_unsubscribe_from_callback() {
        let list = ObservableList::new();
        let stream = ListStream::new(list.clone(), FlagClassifier::adds);

        let slot: Rc<RefCell<Option<ListSubscription>>> = Rc::new(RefCell::new(None));
        let slot_clone = slot.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        let sub = stream.subscribe(move |event| {
            seen_clone.borrow_mut().push(event);
            if let Some(mut sub) = slot_clone.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        *slot.borrow_mut() = Some(sub);

        list.extend(vec![1, 2, 3]);
        list.push(4);

        // Closed after the first element of the batch
        assert_eq!(*seen.borrow(), vec![Event::Next(1)]);
        assert_eq!(list.listener_count(), 0);
    }

    #[test]
    fn test_stream_mode() {
        let list: ObservableList<i32> = ObservableList::new();
        assert_eq!(ListStream::new(list.clone(), FlagClassifier::updates).mode(), Mode::Updates);
        assert_eq!(
            ListStream::new(list, DistinctClassifier::identity).mode(),
            Mode::DistinctChanges
        );
    }
}
