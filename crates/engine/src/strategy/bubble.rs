//! Bubble sort: adjacent compare-and-swap passes.

use sv_common::Algorithm;

use super::{SortContext, SortStrategy, StepResult};

/// Classic bubble sort without early exit.
///
/// Pass `i` compares pairs `(j, j + 1)` for `j` in `0..n - i - 1` and swaps
/// whenever the right element must come first.
#[derive(Clone, Copy, Debug, Default)]
pub struct BubbleSort;

impl SortStrategy for BubbleSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bubble
    }

    fn run(&self, ctx: &mut SortContext<'_>) -> StepResult {
        let n = ctx.len();
        for i in 0..n {
            for j in 0..n - i - 1 {
                ctx.compare(j, j + 1)?;
                if ctx.precedes(j + 1, j) {
                    ctx.swap(j, j + 1)?;
                }
            }
        }
        Ok(())
    }
}
