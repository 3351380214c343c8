//! Occurrence ledger.
//!
//! A multiset keyed by projected value. The ledger only stores keys with a
//! live occurrence: an entry holds a count of at least 1, and the decrement
//! that brings it to 0 deletes the entry.

use core::borrow::Borrow;
use core::hash::Hash;
use hashbrown::HashMap;
use obslist_core::{Error, Result};

/// Tracks how many live occurrences each key has.
///
/// Used by the duplicate-suppressing classifiers to detect the first
/// appearance (`add` returns 1) and the last disappearance (`remove`
/// returns 0) of a key.
#[derive(Clone, Debug)]
pub struct OccurrenceLedger<K> {
    counts: HashMap<K, usize>,
}

impl<K> Default for OccurrenceLedger<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> OccurrenceLedger<K>
where
    K: Eq + Hash,
{
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Creates an empty ledger with room for `capacity` distinct keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: HashMap::with_capacity(capacity),
        }
    }

    /// Creates a ledger holding one occurrence per key yielded.
    pub fn from_keys(keys: impl IntoIterator<Item = K>) -> Self {
        let mut ledger = Self::new();
        ledger.seed(keys);
        ledger
    }

    /// Adds one occurrence per key yielded.
    pub fn seed(&mut self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.add(key);
        }
    }

    /// Adds one occurrence of `key` and returns the count after the increment.
    pub fn add(&mut self, key: K) -> usize {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Removes one occurrence of `key` and returns the count after the
    /// decrement. The entry is deleted when the count reaches 0.
    ///
    /// Returns `Error::LedgerDesync` if `key` has no live occurrence.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let count = self.counts.get_mut(key).ok_or(Error::LedgerDesync)?;
        debug_assert!(*count > 0, "ledger entry with zero count");
        *count -= 1;
        let remaining = *count;
        if remaining == 0 {
            self.counts.remove(key);
        }
        Ok(remaining)
    }

    /// Returns the live occurrence count of `key` (0 if absent).
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Returns true if `key` has at least one live occurrence.
    #[inline]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.contains_key(key)
    }

    /// Returns the number of distinct live keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if no key is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the total number of live occurrences across all keys.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl<K> FromIterator<K> for OccurrenceLedger<K>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::from_keys(iter)
    }
}

impl<K> Extend<K> for OccurrenceLedger<K>
where
    K: Eq + Hash,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.seed(iter);
    }
}
