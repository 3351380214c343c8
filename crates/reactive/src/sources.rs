//! Stream factories, one per emission mode.
//!
//! Each factory wraps a source in a lazily attached `ListStream`. Stateful
//! modes build a fresh ledger per subscription, seeded from the source's
//! contents at subscribe time.
//!
//! | Factory                           | Emits                                  |
//! |-----------------------------------|----------------------------------------|
//! | `from_list`                       | the whole collection once per batch    |
//! | `from_list_adds`                  | added elements                         |
//! | `from_list_removals`              | removed elements                       |
//! | `from_list_updates`               | elements now in updated ranges         |
//! | `from_list_changes`               | every element tagged with its flag     |
//! | `from_list_distinct_changes`      | 0→1 and 1→0 transitions per element    |
//! | `from_list_distinct_changes_by`   | transitions per key, original payload  |
//! | `from_list_distinct_mappings`     | transitions per key, key payload       |

use crate::source::ListSource;
use crate::stream::ListStream;
use core::hash::Hash;
use obslist_incremental::{
    ChangeClassifier, DistinctClassifier, FlagClassifier, Original, Projected, SnapshotClassifier,
};

/// Distinct classifier keyed by the element itself.
pub type IdentityDistinct<T> = DistinctClassifier<T, fn(&T) -> T, Original>;

/// Emits the whole collection once per mutation batch.
pub fn from_list<T, S>(source: S) -> ListStream<T, S, SnapshotClassifier>
where
    S: ListSource<T>,
{
    ListStream::new(source, SnapshotClassifier::new)
}

/// Emits each added element.
pub fn from_list_adds<T, S>(source: S) -> ListStream<T, S, FlagClassifier>
where
    T: Clone,
    S: ListSource<T>,
{
    ListStream::new(source, FlagClassifier::adds)
}

/// Emits each removed element.
pub fn from_list_removals<T, S>(source: S) -> ListStream<T, S, FlagClassifier>
where
    T: Clone,
    S: ListSource<T>,
{
    ListStream::new(source, FlagClassifier::removals)
}

/// Emits each element in an updated range, ascending.
pub fn from_list_updates<T, S>(source: S) -> ListStream<T, S, FlagClassifier>
where
    T: Clone,
    S: ListSource<T>,
{
    ListStream::new(source, FlagClassifier::updates)
}

/// Emits every added, removed and updated element tagged with its flag.
pub fn from_list_changes<T, S>(source: S) -> ListStream<T, S, ChangeClassifier>
where
    T: Clone,
    S: ListSource<T>,
{
    ListStream::new(source, ChangeClassifier::new)
}

/// Emits `Added` when an element value gains its first occurrence and
/// `Removed` when it loses its last. Updates are not reported.
pub fn from_list_distinct_changes<T, S>(source: S) -> ListStream<T, S, IdentityDistinct<T>>
where
    T: Clone + Eq + Hash + 'static,
    S: ListSource<T>,
{
    ListStream::new(source, IdentityDistinct::<T>::identity)
}

/// Like `from_list_distinct_changes`, but distinctness is decided by the key
/// `projection` maps each element to. Events carry the element that caused
/// the transition.
pub fn from_list_distinct_changes_by<T, K, S, F>(
    source: S,
    projection: F,
) -> ListStream<T, S, DistinctClassifier<K, F, Original>>
where
    T: Clone,
    K: Eq + Hash,
    S: ListSource<T>,
    F: Fn(&T) -> K + Clone + 'static,
{
    ListStream::new(source, move || DistinctClassifier::new(projection.clone()))
}

/// Like `from_list_distinct_changes_by`, but events carry the key instead of
/// the element.
pub fn from_list_distinct_mappings<T, K, S, F>(
    source: S,
    projection: F,
) -> ListStream<T, S, DistinctClassifier<K, F, Projected>>
where
    K: Eq + Hash,
    S: ListSource<T>,
    F: Fn(&T) -> K + Clone + 'static,
{
    ListStream::new(source, move || DistinctClassifier::mapping(projection.clone()))
}
