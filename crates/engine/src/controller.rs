//! Sort controller -- owns the sequence and drives one sort run at a time.
//!
//! ```text
//! SortController (cloneable handle)
//! +-- SequenceStore (values + version)
//! +-- StepEmitter (subscribers, speed, pacer)
//! +-- Status
//!     +-- state: Idle | Running | Completed | Cancelled | Failed
//!     +-- active run: id, cancel token, run thread
//! ```
//!
//! # Lifecycle
//!
//! 1. Load values with [`set_sequence`](SortController::set_sequence).
//! 2. Call [`start`](SortController::start) to sort on the calling thread, or
//!    [`spawn`](SortController::spawn) to sort on a background thread.
//! 3. Observe progress through subscribers on the emitter.
//! 4. Optionally call [`cancel`](SortController::cancel) from a subscriber or
//!    another thread. The run stops at its next step boundary.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam::channel::Receiver;
use parking_lot::{Condvar, Mutex, MutexGuard};
use sv_common::{
    Algorithm, Direction, RunId, SortError, SortResult, SpeedSetting, StepEvent,
};
use tracing::{debug, info, warn};

use crate::cancel::{CancelToken, Interrupted};
use crate::emitter::{StepEmitter, SubscriptionId};
use crate::pacing::{Pacer, SleepPacer};
use crate::store::SequenceStore;
use crate::strategy::{strategy_for, SortContext, StepCounts};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// High-level state of the controller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SortState {
    /// No run yet, or the sequence was replaced since the last run.
    #[default]
    Idle,
    /// A strategy is executing.
    Running,
    /// The last run sorted the whole sequence.
    Completed,
    /// The last run stopped early on request.
    Cancelled,
    /// The last run panicked; carries the panic message.
    Failed(String),
}

impl SortState {
    /// Whether this state ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SortState::Completed | SortState::Cancelled | SortState::Failed(_)
        )
    }

    pub fn label(&self) -> &str {
        match self {
            SortState::Idle => "Idle",
            SortState::Running => "Running",
            SortState::Completed => "Completed",
            SortState::Cancelled => "Cancelled",
            SortState::Failed(_) => "Failed",
        }
    }
}

/// Summary of one finished run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub run: RunId,
    pub algorithm: Algorithm,
    pub direction: Direction,
    /// `Completed` or `Cancelled`. Failed runs are returned as errors.
    pub outcome: SortState,
    pub counts: StepCounts,
    pub elapsed: Duration,
}

struct ActiveRun {
    id: RunId,
    cancel: CancelToken,
    /// Set once the run starts executing; `None` between `spawn` and the
    /// background thread picking it up.
    thread: Option<ThreadId>,
}

#[derive(Default)]
struct Status {
    state: SortState,
    active: Option<ActiveRun>,
}

struct Shared {
    store: Mutex<SequenceStore>,
    emitter: StepEmitter,
    status: Mutex<Status>,
    finished: Condvar,
    next_run: AtomicU64,
}

/// A run that passed validation and holds the `Running` state.
struct PreparedRun {
    id: RunId,
    algorithm: Algorithm,
    direction: Direction,
    cancel: CancelToken,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives sort runs over a single sequence.
///
/// Clones share the same sequence, emitter and state, so a step handler can
/// hold a clone to cancel the run or change its speed.
#[derive(Clone)]
pub struct SortController {
    shared: Arc<Shared>,
}

impl SortController {
    /// Controller that sleeps between steps.
    pub fn new() -> Self {
        Self::with_pacer(Arc::new(SleepPacer))
    }

    pub fn with_pacer(pacer: Arc<dyn Pacer>) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: Mutex::new(SequenceStore::new()),
                emitter: StepEmitter::with_pacer(pacer),
                status: Mutex::new(Status::default()),
                finished: Condvar::new(),
                next_run: AtomicU64::new(1),
            }),
        }
    }

    /// Replace the sequence.
    ///
    /// Empty input is rejected before anything else happens. An active run is
    /// cancelled first; from any thread but the run's own, this waits for the
    /// run to finish before the values are replaced.
    pub fn set_sequence(&self, values: &[i32]) -> SortResult<()> {
        if values.is_empty() {
            return Err(SortError::MalformedInput {
                reason: "sequence must contain at least one number".to_string(),
            });
        }
        let mut status = self.quiesce();
        self.shared.store.lock().set(values)?;
        if status.active.is_none() {
            status.state = SortState::Idle;
        }
        debug!(len = values.len(), version = self.version(), "Sequence replaced");
        Ok(())
    }

    /// Clear the sequence, cancelling any active run as `set_sequence` does.
    pub fn reset(&self) {
        let mut status = self.quiesce();
        self.shared.store.lock().clear();
        if status.active.is_none() {
            status.state = SortState::Idle;
        }
        debug!("Sequence cleared");
    }

    /// Run `algorithm` to completion on the calling thread.
    ///
    /// Returns the report for completed and cancelled runs. Fails with
    /// [`SortError::InvalidState`] if a run is active and with
    /// [`SortError::EmptySequence`] if there is nothing to sort; in both cases
    /// the state is left unchanged.
    pub fn start(&self, algorithm: Algorithm, direction: Direction) -> SortResult<RunReport> {
        let prepared = {
            let mut status = self.shared.status.lock();
            self.prepare(&mut status, algorithm, direction)?
        };
        self.execute(prepared)
    }

    /// Like [`start`](Self::start), but the run executes on a background thread.
    ///
    /// Validation happens before this returns, so on `Ok` the controller is
    /// already `Running`.
    pub fn spawn(&self, algorithm: Algorithm, direction: Direction) -> SortResult<RunHandle> {
        let prepared = {
            let mut status = self.shared.status.lock();
            self.prepare(&mut status, algorithm, direction)?
        };
        let run = prepared.id;
        let controller = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("sort-{algorithm}"))
            .spawn(move || controller.execute(prepared));

        match spawned {
            Ok(handle) => Ok(RunHandle { run, handle }),
            Err(e) => {
                let reason = format!("failed to spawn run thread: {e}");
                self.finish(run, SortState::Failed(reason.clone()));
                Err(SortError::RunFailed { reason })
            }
        }
    }

    /// Cancel any active run, wait for it to stop, then start a new one.
    pub fn restart(&self, algorithm: Algorithm, direction: Direction) -> SortResult<RunReport> {
        let prepared = {
            let status = self.shared.status.lock();
            if let Some(active) = &status.active {
                if active.thread == Some(thread::current().id()) {
                    return Err(SortError::InvalidState {
                        action: "restart from inside its own run",
                        state: status.state.label().to_string(),
                    });
                }
            }
            drop(status);
            let mut status = self.quiesce();
            self.prepare(&mut status, algorithm, direction)?
        };
        self.execute(prepared)
    }

    /// Request cancellation of the active run.
    ///
    /// The run stops at its next step boundary; no step is delivered after
    /// that. Fails with [`SortError::InvalidState`] unless a run is active.
    pub fn cancel(&self) -> SortResult<()> {
        let status = self.shared.status.lock();
        match &status.active {
            Some(active) => {
                active.cancel.cancel();
                debug!(run = %active.id, "Cancellation requested");
                Ok(())
            }
            None => Err(SortError::InvalidState {
                action: "cancel",
                state: status.state.label().to_string(),
            }),
        }
    }

    /// Change the pacing; valid in any state.
    pub fn set_speed(&self, speed: SpeedSetting) {
        self.shared.emitter.set_speed(speed);
    }

    pub fn speed(&self) -> SpeedSetting {
        self.shared.emitter.speed()
    }

    pub fn state(&self) -> SortState {
        self.shared.status.lock().state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared.status.lock().active.is_some()
    }

    /// Copy of the current values.
    pub fn values(&self) -> Vec<i32> {
        self.shared.store.lock().get()
    }

    pub fn version(&self) -> u64 {
        self.shared.store.lock().version()
    }

    pub fn len(&self) -> usize {
        self.shared.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emitter(&self) -> &StepEmitter {
        &self.shared.emitter
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&StepEvent) + Send + Sync + 'static,
    {
        self.shared.emitter.subscribe(handler)
    }

    pub fn subscribe_channel(&self) -> (SubscriptionId, Receiver<StepEvent>) {
        self.shared.emitter.subscribe_channel()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.emitter.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Run plumbing
    // -----------------------------------------------------------------------

    /// Validate and move to `Running`. The caller holds the status lock.
    fn prepare(
        &self,
        status: &mut Status,
        algorithm: Algorithm,
        direction: Direction,
    ) -> SortResult<PreparedRun> {
        if status.active.is_some() {
            return Err(SortError::InvalidState {
                action: "start a sort",
                state: status.state.label().to_string(),
            });
        }
        if self.shared.store.lock().is_empty() {
            return Err(SortError::EmptySequence);
        }

        let id = RunId(self.shared.next_run.fetch_add(1, Ordering::Relaxed));
        let cancel = CancelToken::new();
        status.state = SortState::Running;
        status.active = Some(ActiveRun {
            id,
            cancel: cancel.clone(),
            thread: None,
        });
        Ok(PreparedRun {
            id,
            algorithm,
            direction,
            cancel,
        })
    }

    fn execute(&self, run: PreparedRun) -> SortResult<RunReport> {
        if let Some(active) = self.shared.status.lock().active.as_mut() {
            active.thread = Some(thread::current().id());
        }

        let len = self.len();
        info!(
            run = %run.id,
            algorithm = %run.algorithm,
            direction = %run.direction,
            len,
            "Sort run started"
        );

        let started = Instant::now();
        let strategy = strategy_for(run.algorithm);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut ctx = SortContext::new(
                &self.shared.store,
                run.direction,
                &self.shared.emitter,
                &run.cancel,
                run.id,
            );
            let flow = strategy.run(&mut ctx).and_then(|()| ctx.settle());
            (flow, ctx.counts())
        }));
        let elapsed = started.elapsed();

        let (outcome, counts) = match result {
            Ok((Ok(()), counts)) => (SortState::Completed, counts),
            Ok((Err(Interrupted), counts)) => (SortState::Cancelled, counts),
            Err(payload) => (SortState::Failed(panic_message(payload)), StepCounts::default()),
        };
        self.finish(run.id, outcome.clone());

        match outcome {
            SortState::Failed(reason) => {
                warn!(run = %run.id, %reason, "Sort run failed");
                Err(SortError::RunFailed { reason })
            }
            outcome => {
                info!(
                    run = %run.id,
                    outcome = outcome.label(),
                    steps = counts.steps,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Sort run finished"
                );
                Ok(RunReport {
                    run: run.id,
                    algorithm: run.algorithm,
                    direction: run.direction,
                    outcome,
                    counts,
                    elapsed,
                })
            }
        }
    }

    /// Record the terminal state and wake anyone waiting in `quiesce`.
    fn finish(&self, run: RunId, outcome: SortState) {
        let mut status = self.shared.status.lock();
        if status.active.as_ref().map(|a| a.id) == Some(run) {
            status.active = None;
            status.state = outcome;
        }
        self.shared.finished.notify_all();
    }

    /// Cancel the active run (if any) and return the status lock once it is
    /// safe to touch the sequence.
    ///
    /// Off the run thread this waits for the run to finish. On the run thread
    /// (inside a step handler) it returns right away: the run is parked in
    /// the handler and stops at its next step boundary.
    fn quiesce(&self) -> MutexGuard<'_, Status> {
        let mut status = self.shared.status.lock();
        loop {
            if status.active.is_none() {
                return status;
            }
            let on_run_thread = match &status.active {
                Some(active) => {
                    active.cancel.cancel();
                    debug!(run = %active.id, "Stopping active run");
                    active.thread == Some(thread::current().id())
                }
                None => false,
            };
            if on_run_thread {
                return status;
            }
            self.shared.finished.wait(&mut status);
        }
    }
}

impl Default for SortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a run started with [`SortController::spawn`].
pub struct RunHandle {
    run: RunId,
    handle: thread::JoinHandle<SortResult<RunReport>>,
}

impl RunHandle {
    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run thread and return its result.
    pub fn wait(self) -> SortResult<RunReport> {
        self.handle.join().unwrap_or_else(|payload| {
            Err(SortError::RunFailed {
                reason: panic_message(payload),
            })
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
