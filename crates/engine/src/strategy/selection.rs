//! Selection sort: pick the extreme of the unsorted tail, swap it into place.

use sv_common::Algorithm;

use super::{SortContext, SortStrategy, StepResult};

/// Selection sort that always swaps at the end of a pass, even when the
/// selected index is the pass index itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectionSort;

impl SortStrategy for SelectionSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Selection
    }

    fn run(&self, ctx: &mut SortContext<'_>) -> StepResult {
        let n = ctx.len();
        for i in 0..n {
            let mut selected = i;
            for j in i + 1..n {
                ctx.compare(selected, j)?;
                if ctx.precedes(j, selected) {
                    selected = j;
                }
            }
            ctx.swap(i, selected)?;
        }
        Ok(())
    }
}
