//! Quick sort with Lomuto partitioning on the last element.
//!
//! Not stable. Quadratic on input already ordered in the target direction,
//! where every partition is maximally unbalanced.

use sv_common::Algorithm;

use super::{SortContext, SortStrategy, StepResult};

#[derive(Clone, Copy, Debug, Default)]
pub struct QuickSort;

impl SortStrategy for QuickSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Quick
    }

    fn run(&self, ctx: &mut SortContext<'_>) -> StepResult {
        let n = ctx.len();
        if n > 1 {
            sort_range(ctx, 0, n - 1)?;
        }
        Ok(())
    }
}

/// Sort the inclusive range `low..=high`.
fn sort_range(ctx: &mut SortContext<'_>, low: usize, high: usize) -> StepResult {
    if low >= high {
        return Ok(());
    }
    let pivot = partition(ctx, low, high)?;
    if pivot > low {
        sort_range(ctx, low, pivot - 1)?;
    }
    sort_range(ctx, pivot + 1, high)
}

/// Partition `low..=high` around the value at `high`, returning its final index.
fn partition(ctx: &mut SortContext<'_>, low: usize, high: usize) -> StepResult<usize> {
    // Everything left of `boundary` must come before the pivot. The pivot
    // stays at `high` during the scan since `boundary <= j < high`.
    let mut boundary = low;
    for j in low..high {
        ctx.compare(boundary, j)?;
        if ctx.precedes(j, high) {
            ctx.swap(boundary, j)?;
            boundary += 1;
        }
    }
    ctx.swap(boundary, high)?;
    Ok(boundary)
}
