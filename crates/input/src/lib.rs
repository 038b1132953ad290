//! `sv-input` -- Sequence entry for the sortviz engine.
//!
//! Two ways to produce a sequence for `SortController::set_sequence`:
//!
//! - [`generate`] / [`generate_random`]: uniform random integers in an
//!   inclusive range.
//! - [`parse_numbers`]: a comma-separated list typed by the user.

pub mod error;
pub mod parse;
pub mod random;

pub use error::InputError;
pub use parse::parse_numbers;
pub use random::{generate, generate_random, RandomSpec};
