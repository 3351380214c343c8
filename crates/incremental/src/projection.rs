//! Projection layer.
//!
//! A projection maps an element to the key used for distinctness. The
//! payload selector decides whether emitted events carry the original
//! element or the projected key.

use crate::classify::Mode;
use core::hash::Hash;

/// A key-extraction function applied before the occurrence ledger.
#[derive(Clone, Copy, Debug)]
pub struct Projection<F> {
    f: F,
}

impl<F> Projection<F> {
    /// Wraps a key-extraction function.
    #[inline]
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Applies the projection to one element.
    #[inline]
    pub fn key<T, K>(&self, element: &T) -> K
    where
        F: Fn(&T) -> K,
    {
        (self.f)(element)
    }
}

impl<T: Clone + Eq + Hash> Projection<fn(&T) -> T> {
    /// The identity projection: an element is its own key.
    pub fn identity() -> Self {
        Self::new(T::clone)
    }
}

/// Chooses the payload of an emitted event from the element and its key.
pub trait PayloadSelector<T, K> {
    type Output;

    /// The mode a duplicate-suppressing classifier runs in with this payload.
    const MODE: Mode;

    fn select(element: &T, key: K) -> Self::Output;
}

/// Emit the original element.
#[derive(Clone, Copy, Debug, Default)]
pub struct Original;

/// Emit the projected key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Projected;

impl<T: Clone, K> PayloadSelector<T, K> for Original {
    type Output = T;

    const MODE: Mode = Mode::DistinctChanges;

    #[inline]
    fn select(element: &T, _key: K) -> T {
        element.clone()
    }
}

impl<T, K> PayloadSelector<T, K> for Projected {
    type Output = K;

    const MODE: Mode = Mode::DistinctMappings;

    #[inline]
    fn select(_element: &T, key: K) -> K {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};

    #[test]
    fn test_projection_key() {
        let projection = Projection::new(|s: &String| s.len());
        assert_eq!(projection.key(&"four".to_string()), 4);
    }

    #[test]
    fn test_projection_identity() {
        let projection = Projection::<fn(&i32) -> i32>::identity();
        assert_eq!(projection.key(&5), 5);
    }

    #[test]
    fn test_payload_selectors() {
        let element = "apple".to_string();
        assert_eq!(<Original as PayloadSelector<String, char>>::select(&element, 'a'), "apple");
        assert_eq!(<Projected as PayloadSelector<String, char>>::select(&element, 'a'), 'a');
    }
}
