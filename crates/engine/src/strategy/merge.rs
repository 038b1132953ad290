//! Top-down merge sort.
//!
//! Merging writes each placed element back with an overwrite. No compare
//! step is emitted during merging; only placements are observable.
//!
//! Both halves are copied out before merging, so buffered values are ordered
//! with [`Direction::precedes`](sv_common::Direction::precedes), the predicate
//! `SequenceStore::compare_at` wraps.

use sv_common::Algorithm;

use super::{SortContext, SortStrategy, StepResult};

/// Stable merge sort: on ties the element from the left half is placed first.
#[derive(Clone, Copy, Debug, Default)]
pub struct MergeSort;

impl SortStrategy for MergeSort {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Merge
    }

    fn run(&self, ctx: &mut SortContext<'_>) -> StepResult {
        let n = ctx.len();
        if n > 1 {
            sort_range(ctx, 0, n - 1)?;
        }
        Ok(())
    }
}

fn sort_range(ctx: &mut SortContext<'_>, left: usize, right: usize) -> StepResult {
    if left >= right {
        return Ok(());
    }
    let mid = left + (right - left) / 2;
    sort_range(ctx, left, mid)?;
    sort_range(ctx, mid + 1, right)?;
    merge(ctx, left, mid, right)
}

fn merge(ctx: &mut SortContext<'_>, left: usize, mid: usize, right: usize) -> StepResult {
    let direction = ctx.direction();
    let lower = ctx.copy_range(left, mid);
    let upper = ctx.copy_range(mid + 1, right);

    let (mut a, mut b) = (0, 0);
    let mut out = left;
    while a < lower.len() && b < upper.len() {
        let value = if direction.precedes(upper[b], lower[a]) {
            b += 1;
            upper[b - 1]
        } else {
            a += 1;
            lower[a - 1]
        };
        ctx.write(out, value)?;
        out += 1;
    }
    for &value in lower[a..].iter().chain(&upper[b..]) {
        ctx.write(out, value)?;
        out += 1;
    }
    Ok(())
}
