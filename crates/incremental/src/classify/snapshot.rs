//! Passthrough classifier: the whole collection once per batch.

use super::{Classifier, Mode};
use alloc::rc::Rc;
use obslist_core::{MutationBatch, Result};

/// Emits the batch snapshot once per batch, ignoring the sub-changes.
///
/// For consumers that only need to know that something changed and re-read
/// the collection.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotClassifier;

impl SnapshotClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl<T> Classifier<T> for SnapshotClassifier {
    type Output = Rc<[T]>;

    fn mode(&self) -> Mode {
        Mode::Snapshot
    }

    fn classify<E>(&mut self, batch: &MutationBatch<T>, mut emit: E) -> Result<()>
    where
        E: FnMut(Self::Output),
    {
        emit(batch.snapshot_rc());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use obslist_core::SubChange;

    #[test]
    fn test_snapshot_once_per_batch() {
        let batch = MutationBatch::new(
            vec![1, 2, 3],
            vec![
                SubChange::insertion(vec![2]),
                SubChange::insertion(vec![3]),
                SubChange::removal(vec![4]),
            ],
        );

        let events = SnapshotClassifier::new().classify_to_vec(&batch).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(&*events[0], &[1, 2, 3]);
    }

    #[test]
    fn test_snapshot_shares_batch_contents() {
        let batch = MutationBatch::single(vec!['a'], SubChange::insertion(vec!['a']));
        let events = SnapshotClassifier::new().classify_to_vec(&batch).unwrap();
        assert!(Rc::ptr_eq(&events[0], &batch.snapshot_rc()));
    }
}
