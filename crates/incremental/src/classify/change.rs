//! Full classification: every element tagged with its flag.

use super::{updated_elements, Classifier, Mode};
use obslist_core::{ListChange, MutationBatch, Result};

/// Emits `Added`, `Removed` and `Updated` events for every element a batch
/// reports.
///
/// Within a sub-change, insertions come first, then removals, then the
/// updated range.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChangeClassifier;

impl ChangeClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Clone> Classifier<T> for ChangeClassifier {
    type Output = ListChange<T>;

    fn mode(&self) -> Mode {
        Mode::Changes
    }

    fn classify<E>(&mut self, batch: &MutationBatch<T>, mut emit: E) -> Result<()>
    where
        E: FnMut(Self::Output),
    {
        for change in batch {
            for element in change.added() {
                emit(ListChange::added(element.clone()));
            }
            for element in change.removed() {
                emit(ListChange::removed(element.clone()));
            }
            for element in updated_elements(batch, change)? {
                emit(ListChange::updated(element.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use obslist_core::{ChangeFlag, Error, SubChange};

    #[test]
    fn test_insertions_before_removals() {
        let batch = MutationBatch::new(
            vec!['x', 'y'],
            vec![
                SubChange::insertion(vec!['x', 'y']),
                SubChange::removal(vec!['z']),
            ],
        );

        let events = ChangeClassifier::new().classify_to_vec(&batch).unwrap();
        assert_eq!(
            events,
            vec![
                ListChange::added('x'),
                ListChange::added('y'),
                ListChange::removed('z'),
            ]
        );
    }

    #[test]
    fn test_replacement_reports_added_then_removed() {
        let batch = MutationBatch::single(vec![9], SubChange::replacement(vec![1], vec![9]));
        let events = ChangeClassifier::new().classify_to_vec(&batch).unwrap();
        assert_eq!(events, vec![ListChange::added(9), ListChange::removed(1)]);
    }

    #[test]
    fn test_sub_changes_in_source_order() {
        // A removal reported before an insertion stays first
        let batch = MutationBatch::new(
            vec![2, 3],
            vec![
                SubChange::removal(vec![1]),
                SubChange::insertion(vec![3]),
                SubChange::update(0..1),
            ],
        );

        let flags: alloc::vec::Vec<ChangeFlag> = ChangeClassifier::new()
            .classify_to_vec(&batch)
            .unwrap()
            .iter()
            .map(|c| c.flag())
            .collect();
        assert_eq!(
            flags,
            vec![ChangeFlag::Removed, ChangeFlag::Added, ChangeFlag::Updated]
        );
    }

    #[test]
    fn test_updates_tagged() {
        let batch = MutationBatch::single(vec![5, 6, 7], SubChange::update(1..3));
        let events = ChangeClassifier::new().classify_to_vec(&batch).unwrap();
        assert_eq!(events, vec![ListChange::updated(6), ListChange::updated(7)]);
    }

    #[test]
    fn test_error_keeps_earlier_events() {
        let batch = MutationBatch::new(
            vec![1],
            vec![SubChange::insertion(vec![1]), SubChange::update(4..5)],
        );

        let mut seen = alloc::vec::Vec::new();
        let result = ChangeClassifier::new().classify(&batch, |c| seen.push(c));

        assert_eq!(result, Err(Error::range_out_of_bounds(4, 5, 1)));
        assert_eq!(seen, vec![ListChange::added(1)]);
    }
}
