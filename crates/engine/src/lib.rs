//! `sv-engine` -- Sorting instrumentation engine for the sortviz visualizer.
//!
//! This crate provides:
//!
//! - **`SequenceStore`**: the integer sequence being sorted, with a version counter.
//! - **`StepEmitter`**: ordered, paced fan-out of step events to subscribers.
//! - **`SortStrategy`**: bubble, selection, insertion, quick, and merge sort,
//!   each emitting a step for every comparison and mutation.
//! - **`SortController`**: one-run-at-a-time lifecycle with cancellation.
//!
//! # Architecture
//!
//! ```text
//! caller --start(algorithm, direction)--> SortController
//!                                          |
//!                                          +-- SortStrategy::run(SortContext)
//!                                          |     +-- SequenceStore (compare/swap/write)
//!                                          |     +-- StepEmitter::emit --> subscribers
//!                                          |
//!                                          +-- RangeSettled(0..n) on completion
//! ```
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sv_common::{Algorithm, Direction};
//! use sv_engine::{NoopPacer, SortController};
//!
//! let controller = SortController::with_pacer(Arc::new(NoopPacer));
//! controller.set_sequence(&[5, 3, 1]).unwrap();
//! controller.subscribe(|event| println!("{}", event.step));
//! controller.start(Algorithm::Bubble, Direction::Ascending).unwrap();
//! assert_eq!(controller.values(), vec![1, 3, 5]);
//! ```

pub mod cancel;
pub mod controller;
pub mod emitter;
pub mod pacing;
pub mod store;
pub mod strategy;

// Re-export primary types at crate root for convenience.
pub use cancel::{CancelToken, Interrupted};
pub use controller::{RunHandle, RunReport, SortController, SortState};
pub use emitter::{StepEmitter, SubscriptionId};
pub use pacing::{NoopPacer, Pacer, SleepPacer};
pub use store::SequenceStore;
pub use strategy::{strategy_for, SortContext, SortStrategy, StepCounts, StepResult};
