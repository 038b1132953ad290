//! Insertion sort with element shifting.
//!
//! The held key is no longer in the sequence, so it is ordered with
//! [`Direction::precedes`](sv_common::Direction::precedes), the predicate
//! `SequenceStore::compare_at` wraps.

use sv_common::Algorithm;

use super::{SortContext, SortStrategy, StepResult};

/// Insertion sort. Elements are shifted right with overwrites rather than
/// swapped, and the held key is written back at the end of each pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct InsertionSort;

impl SortStrategy for InsertionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Insertion
    }

    fn run(&self, ctx: &mut SortContext<'_>) -> StepResult {
        let direction = ctx.direction();
        let n = ctx.len();
        for i in 1..n {
            let key = ctx.value(i);
            // `hole` is the slot the key would land in; it walks left while
            // the key must come before its left neighbour.
            let mut hole = i;
            while hole > 0 && direction.precedes(key, ctx.value(hole - 1)) {
                ctx.compare(hole - 1, hole)?;
                let shifted = ctx.value(hole - 1);
                ctx.write(hole, shifted)?;
                hole -= 1;
            }
            ctx.write(hole, key)?;
        }
        Ok(())
    }
}
