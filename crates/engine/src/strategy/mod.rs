//! Sorting strategies and the context they run in.
//!
//! A strategy never touches the sequence or the emitter directly. It reads
//! through [`SortContext::value`]/[`SortContext::precedes`] and changes
//! things through [`SortContext::compare`], [`SortContext::swap`] and
//! [`SortContext::write`], each of which checks for cancellation, applies the
//! change, and emits the matching step. A change that has been applied is
//! always delivered, so the store never runs ahead of what subscribers saw.

mod bubble;
mod insertion;
mod merge;
mod quick;
mod selection;

use std::sync::Arc;

use parking_lot::Mutex;
use sv_common::{Algorithm, Direction, RunId, Step, StepEvent};

use crate::cancel::{CancelToken, Interrupted};
use crate::emitter::StepEmitter;
use crate::store::SequenceStore;

pub use bubble::BubbleSort;
pub use insertion::InsertionSort;
pub use merge::MergeSort;
pub use quick::QuickSort;
pub use selection::SelectionSort;

/// Result of every step operation: `Err` once the run has been cancelled.
pub type StepResult<T = ()> = Result<T, Interrupted>;

/// Trait for all instrumented sorting algorithms.
pub trait SortStrategy: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Sort the context's sequence in its direction, emitting a step for
    /// every comparison and mutation. Returns early on cancellation.
    fn run(&self, ctx: &mut SortContext<'_>) -> StepResult;
}

/// The built-in strategy for `algorithm`.
pub fn strategy_for(algorithm: Algorithm) -> &'static dyn SortStrategy {
    match algorithm {
        Algorithm::Bubble => &BubbleSort,
        Algorithm::Selection => &SelectionSort,
        Algorithm::Insertion => &InsertionSort,
        Algorithm::Quick => &QuickSort,
        Algorithm::Merge => &MergeSort,
    }
}

/// Number of steps delivered so far, by kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StepCounts {
    pub steps: u64,
    pub compares: u64,
    pub swaps: u64,
    pub overwrites: u64,
}

/// Everything one run needs: the store, direction, emitter, and token.
pub struct SortContext<'a> {
    store: &'a Mutex<SequenceStore>,
    direction: Direction,
    emitter: &'a StepEmitter,
    cancel: &'a CancelToken,
    run: RunId,
    counts: StepCounts,
}

impl<'a> SortContext<'a> {
    pub fn new(
        store: &'a Mutex<SequenceStore>,
        direction: Direction,
        emitter: &'a StepEmitter,
        cancel: &'a CancelToken,
        run: RunId,
    ) -> Self {
        Self {
            store,
            direction,
            emitter,
            cancel,
            run,
            counts: StepCounts::default(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> StepCounts {
        self.counts
    }

    pub fn value(&self, i: usize) -> i32 {
        self.store.lock().value_at(i)
    }

    /// Copy of the inclusive range `start..=end`.
    pub fn copy_range(&self, start: usize, end: usize) -> Vec<i32> {
        let store = self.store.lock();
        (start..=end).map(|i| store.value_at(i)).collect()
    }

    /// Whether element `i` must come strictly before element `j`.
    pub fn precedes(&self, i: usize, j: usize) -> bool {
        self.store.lock().compare_at(i, j, self.direction)
    }

    /// Announce that `i` and `j` are being compared.
    pub fn compare(&mut self, i: usize, j: usize) -> StepResult {
        self.check()?;
        let values = self.store.lock().snapshot();
        self.publish(Step::Compare(i, j), values);
        // A handler or the pacing window may have cancelled the run.
        self.check()
    }

    /// Exchange the values at `i` and `j` and emit the swap.
    pub fn swap(&mut self, i: usize, j: usize) -> StepResult {
        let values = {
            let mut store = self.store.lock();
            self.check()?;
            store.swap_at(i, j);
            store.snapshot()
        };
        self.publish(Step::Swap(i, j), values);
        self.check()
    }

    /// Write `value` at `i` and emit the overwrite.
    pub fn write(&mut self, i: usize, value: i32) -> StepResult {
        let values = {
            let mut store = self.store.lock();
            self.check()?;
            store.write_at(i, value);
            store.snapshot()
        };
        self.publish(Step::Overwrite(i, value), values);
        self.check()
    }

    /// Emit the closing step covering the whole sequence.
    pub(crate) fn settle(&mut self) -> StepResult {
        self.check()?;
        let values = self.store.lock().snapshot();
        let indices = (0..values.len()).collect();
        self.publish(Step::RangeSettled(indices), values);
        Ok(())
    }

    fn check(&self) -> StepResult {
        if self.cancel.is_cancelled() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Deliver a step that has already passed its cancellation check.
    ///
    /// Mutations are checked under the store lock, so a cancel that lands
    /// after the change is applied still sees its step delivered.
    fn publish(&mut self, step: Step, values: Arc<[i32]>) {
        match step {
            Step::Compare(..) => self.counts.compares += 1,
            Step::Swap(..) => self.counts.swaps += 1,
            Step::Overwrite(..) => self.counts.overwrites += 1,
            Step::RangeSettled(..) => {}
        }
        let event = StepEvent {
            run: self.run,
            seq: self.counts.steps,
            step,
            values,
        };
        self.counts.steps += 1;
        self.emitter.publish(event, self.cancel);
    }
}

/// Harness shared by the per-strategy unit tests.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use sv_common::{Direction, RunId, Step};

    use super::{SortContext, SortStrategy};
    use crate::cancel::CancelToken;
    use crate::emitter::StepEmitter;
    use crate::pacing::NoopPacer;
    use crate::store::SequenceStore;

    /// Run `strategy` over `input`, returning the final values and every step.
    pub fn run_collect(
        strategy: &dyn SortStrategy,
        input: &[i32],
        direction: Direction,
    ) -> (Vec<i32>, Vec<Step>) {
        let mut store = SequenceStore::new();
        store.set(input).unwrap();
        let store = Mutex::new(store);
        let emitter = StepEmitter::with_pacer(Arc::new(NoopPacer));
        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        emitter.subscribe(move |e| sink.lock().push(e.step.clone()));

        let cancel = CancelToken::new();
        let mut ctx = SortContext::new(&store, direction, &emitter, &cancel, RunId(1));
        strategy.run(&mut ctx).unwrap();

        let values = store.lock().get();
        let steps = steps.lock().clone();
        (values, steps)
    }

    /// Count mutation steps that actually changed a value, replaying from `input`.
    pub fn value_changing_mutations(input: &[i32], steps: &[Step]) -> usize {
        let mut values = input.to_vec();
        let mut changed = 0;
        for step in steps {
            match *step {
                Step::Swap(i, j) => {
                    if values[i] != values[j] {
                        changed += 1;
                    }
                    values.swap(i, j);
                }
                Step::Overwrite(i, v) => {
                    if values[i] != v {
                        changed += 1;
                    }
                    values[i] = v;
                }
                _ => {}
            }
        }
        changed
    }
}
