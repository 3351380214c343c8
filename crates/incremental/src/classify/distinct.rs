//! Duplicate-suppressing classification.
//!
//! Every inserted and removed element is projected to a key and counted in an
//! `OccurrenceLedger`. Only transitions are emitted:
//!
//! - `Added` when an insertion brings the key's count from 0 to 1
//! - `Removed` when a removal brings it from 1 to 0
//!
//! In-place updates do not change membership and are not classified here.

use super::{Classifier, Mode};
use crate::ledger::OccurrenceLedger;
use crate::projection::{Original, PayloadSelector, Projected, Projection};
use core::hash::Hash;
use core::marker::PhantomData;
use obslist_core::{ListChange, MutationBatch, Result};

/// Emits Added/Removed transitions of projected keys.
///
/// `P` selects the payload: `Original` emits the element that caused the
/// transition, `Projected` emits the key itself, so that distinct elements
/// sharing a key are reported as one entity.
pub struct DistinctClassifier<K, F, P = Original> {
    ledger: OccurrenceLedger<K>,
    projection: Projection<F>,
    _payload: PhantomData<P>,
}

impl<T: Clone + Eq + Hash> DistinctClassifier<T, fn(&T) -> T, Original> {
    /// Creates a classifier keyed on the elements themselves.
    pub fn identity() -> Self {
        Self::with_projection(Projection::identity())
    }
}

impl<K, F> DistinctClassifier<K, F, Original>
where
    K: Eq + Hash,
{
    /// Creates a classifier keyed on `projection`, emitting original elements.
    pub fn new(projection: F) -> Self {
        Self::with_projection(Projection::new(projection))
    }
}

impl<K, F> DistinctClassifier<K, F, Projected>
where
    K: Eq + Hash,
{
    /// Creates a classifier keyed on `projection`, emitting projected keys.
    pub fn mapping(projection: F) -> Self {
        Self::with_projection(Projection::new(projection))
    }
}

impl<K, F, P> DistinctClassifier<K, F, P>
where
    K: Eq + Hash,
{
    /// Creates a classifier from a projection and a payload selector type.
    pub fn with_projection(projection: Projection<F>) -> Self {
        Self {
            ledger: OccurrenceLedger::new(),
            projection,
            _payload: PhantomData,
        }
    }

    /// Seeds the ledger and returns the classifier.
    pub fn seeded<T>(mut self, snapshot: &[T]) -> Self
    where
        F: Fn(&T) -> K,
    {
        self.seed_ledger(snapshot);
        self
    }

    /// Returns the occurrence ledger.
    #[inline]
    pub fn ledger(&self) -> &OccurrenceLedger<K> {
        &self.ledger
    }

    fn seed_ledger<T>(&mut self, snapshot: &[T])
    where
        F: Fn(&T) -> K,
    {
        let projection = &self.projection;
        self.ledger.seed(snapshot.iter().map(|e| projection.key(e)));
        tracing::debug!(
            elements = snapshot.len(),
            keys = self.ledger.len(),
            "seeded occurrence ledger"
        );
    }
}

impl<T, K, F, P> Classifier<T> for DistinctClassifier<K, F, P>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    P: PayloadSelector<T, K>,
{
    type Output = ListChange<P::Output>;

    fn mode(&self) -> Mode {
        P::MODE
    }

    fn requires_seed(&self) -> bool {
        true
    }

    fn seed(&mut self, snapshot: &[T]) {
        self.seed_ledger(snapshot);
    }

    fn classify<E>(&mut self, batch: &MutationBatch<T>, mut emit: E) -> Result<()>
    where
        E: FnMut(Self::Output),
    {
        for change in batch {
            for element in change.added() {
                let key = self.projection.key(element);
                if self.ledger.add(key.clone()) == 1 {
                    emit(ListChange::added(P::select(element, key)));
                }
            }
            for element in change.removed() {
                let key = self.projection.key(element);
                if self.ledger.remove(&key)? == 0 {
                    emit(ListChange::removed(P::select(element, key)));
                }
            }
            if change.was_updated() {
                tracing::trace!("update range not classified under duplicate suppression");
            }
        }
        Ok(())
    }
}
