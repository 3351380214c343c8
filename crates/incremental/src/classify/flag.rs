//! Single-kind classifiers: adds only, removals only, updates only.

use super::{updated_elements, Classifier, Mode};
use obslist_core::{ChangeFlag, MutationBatch, Result};

/// Emits the raw elements of one kind of sub-change.
///
/// - `adds()`: inserted elements, in insertion order
/// - `removals()`: removed elements, in the order the host reports them
/// - `updates()`: the element now at each index of the updated range,
///   ascending
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlagClassifier {
    flag: ChangeFlag,
}

impl FlagClassifier {
    /// Creates a classifier for the given kind of change.
    pub fn new(flag: ChangeFlag) -> Self {
        Self { flag }
    }

    pub fn adds() -> Self {
        Self::new(ChangeFlag::Added)
    }

    pub fn removals() -> Self {
        Self::new(ChangeFlag::Removed)
    }

    pub fn updates() -> Self {
        Self::new(ChangeFlag::Updated)
    }

    /// Returns the kind of change this classifier passes through.
    #[inline]
    pub fn flag(&self) -> ChangeFlag {
        self.flag
    }
}

impl<T: Clone> Classifier<T> for FlagClassifier {
    type Output = T;

    fn mode(&self) -> Mode {
        match self.flag {
            ChangeFlag::Added => Mode::Adds,
            ChangeFlag::Removed => Mode::Removals,
            ChangeFlag::Updated => Mode::Updates,
        }
    }

    fn classify<E>(&mut self, batch: &MutationBatch<T>, mut emit: E) -> Result<()>
    where
        E: FnMut(Self::Output),
    {
        for change in batch {
            let elements = match self.flag {
                ChangeFlag::Added => change.added(),
                ChangeFlag::Removed => change.removed(),
                ChangeFlag::Updated => updated_elements(batch, change)?,
            };
            elements.iter().cloned().for_each(&mut emit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use obslist_core::{Error, SubChange};

    fn mixed_batch() -> MutationBatch<char> {
        MutationBatch::new(
            vec!['a', 'b', 'c', 'd'],
            vec![
                SubChange::insertion(vec!['c', 'd']),
                SubChange::removal(vec!['z', 'y']),
                SubChange::update(0..2),
                SubChange::replacement(vec!['q'], vec!['a']),
            ],
        )
    }

    #[test]
    fn test_adds_only() {
        let events = FlagClassifier::adds().classify_to_vec(&mixed_batch()).unwrap();
        assert_eq!(events, vec!['c', 'd', 'a']);
    }

    #[test]
    fn test_removals_only_keep_reported_order() {
        let events = FlagClassifier::removals().classify_to_vec(&mixed_batch()).unwrap();
        assert_eq!(events, vec!['z', 'y', 'q']);
    }

    #[test]
    fn test_updates_read_snapshot_ascending() {
        let events = FlagClassifier::updates().classify_to_vec(&mixed_batch()).unwrap();
        assert_eq!(events, vec!['a', 'b']);
    }

    #[test]
    fn test_updates_out_of_bounds() {
        let batch = MutationBatch::single(vec![1], SubChange::update(0..3));
        let result: Result<Vec<i32>> = FlagClassifier::updates().classify_to_vec(&batch);
        assert_eq!(result, Err(Error::range_out_of_bounds(0, 3, 1)));
    }

    #[test]
    fn test_adds_ignore_out_of_bounds_update() {
        // Only the update classifier reads the range
        let batch = MutationBatch::new(
            vec![1],
            vec![SubChange::update(0..3), SubChange::insertion(vec![1])],
        );
        let events = FlagClassifier::adds().classify_to_vec(&batch).unwrap();
        assert_eq!(events, vec![1]);
    }

    #[test]
    fn test_flag_modes() {
        assert_eq!(Classifier::<i32>::mode(&FlagClassifier::adds()), Mode::Adds);
        assert_eq!(Classifier::<i32>::mode(&FlagClassifier::removals()), Mode::Removals);
        assert_eq!(Classifier::<i32>::mode(&FlagClassifier::updates()), Mode::Updates);
    }
}
