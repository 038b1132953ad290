//! Sequence store: the integer array being sorted, plus a version counter.
//!
//! Every mutation goes through this type, so each change can be paired with
//! the step that describes it. Ordering decisions use
//! [`Direction::precedes`], either through [`SequenceStore::compare_at`] or,
//! for values a strategy holds outside the sequence, directly.

use std::sync::Arc;

use sv_common::{Direction, SortError, SortResult};

/// Mutable integer sequence with a version that bumps on every replacement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceStore {
    values: Vec<i32>,
    version: u64,
}

impl SequenceStore {
    /// Create an empty store at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sequence.
    ///
    /// An empty slice is rejected and leaves the current values untouched.
    pub fn set(&mut self, values: &[i32]) -> SortResult<()> {
        if values.is_empty() {
            return Err(SortError::MalformedInput {
                reason: "sequence must contain at least one number".to_string(),
            });
        }
        self.values = values.to_vec();
        self.version += 1;
        Ok(())
    }

    /// Drop all values.
    pub fn clear(&mut self) {
        self.values.clear();
        self.version += 1;
    }

    /// Owned copy of the current values.
    pub fn get(&self) -> Vec<i32> {
        self.values.clone()
    }

    /// Shared immutable copy of the current values.
    pub fn snapshot(&self) -> Arc<[i32]> {
        Arc::from(self.values.as_slice())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn value_at(&self, i: usize) -> i32 {
        self.values[i]
    }

    /// Whether the element at `i` must come strictly before the element at `j`.
    pub fn compare_at(&self, i: usize, j: usize, direction: Direction) -> bool {
        direction.precedes(self.values[i], self.values[j])
    }

    pub fn swap_at(&mut self, i: usize, j: usize) {
        self.values.swap(i, j);
    }

    pub fn write_at(&mut self, i: usize, value: i32) {
        self.values[i] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = SequenceStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn set_replaces_and_bumps_version() {
        let mut store = SequenceStore::new();
        store.set(&[5, 3, 1]).unwrap();
        assert_eq!(store.get(), vec![5, 3, 1]);
        assert_eq!(store.version(), 1);

        store.set(&[2]).unwrap();
        assert_eq!(store.get(), vec![2]);
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn set_empty_keeps_prior_values() {
        let mut store = SequenceStore::new();
        store.set(&[4, 2]).unwrap();
        let err = store.set(&[]).unwrap_err();
        assert!(matches!(err, SortError::MalformedInput { .. }));
        assert_eq!(store.get(), vec![4, 2]);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn get_is_a_copy() {
        let mut store = SequenceStore::new();
        store.set(&[1, 2, 3]).unwrap();
        let mut copy = store.get();
        copy[0] = 99;
        assert_eq!(store.value_at(0), 1);
    }

    #[test]
    fn compare_at_agrees_with_precedes_on_held_values() {
        let values = [-4, 0, 0, 9];
        let mut store = SequenceStore::new();
        store.set(&values).unwrap();
        for direction in [Direction::Ascending, Direction::Descending] {
            for i in 0..values.len() {
                for j in 0..values.len() {
                    assert_eq!(
                        store.compare_at(i, j, direction),
                        direction.precedes(values[i], values[j]),
                        "{direction} {i} {j}"
                    );
                }
            }
        }
    }

    #[test]
    fn compare_at_follows_direction() {
        let mut store = SequenceStore::new();
        store.set(&[3, 7, 7]).unwrap();
        assert!(store.compare_at(0, 1, Direction::Ascending));
        assert!(!store.compare_at(1, 0, Direction::Ascending));
        assert!(store.compare_at(1, 0, Direction::Descending));
        // Ties never order either way.
        assert!(!store.compare_at(1, 2, Direction::Ascending));
        assert!(!store.compare_at(2, 1, Direction::Descending));
    }

    #[test]
    fn swap_and_write() {
        let mut store = SequenceStore::new();
        store.set(&[1, 2, 3]).unwrap();
        store.swap_at(0, 2);
        assert_eq!(store.get(), vec![3, 2, 1]);
        store.swap_at(1, 1);
        assert_eq!(store.get(), vec![3, 2, 1]);
        store.write_at(1, 42);
        assert_eq!(store.get(), vec![3, 42, 1]);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn clear_empties() {
        let mut store = SequenceStore::new();
        store.set(&[1]).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.version(), 2);
        assert_eq!(&*store.snapshot(), &[] as &[i32]);
    }
}
