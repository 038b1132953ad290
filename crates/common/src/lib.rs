//! `sv-common` -- Shared types, errors, and configuration for the sortviz engine.
//!
//! This crate is the foundation that the engine, input, and CLI crates depend on:
//!
//! - **Types**: `Direction`, `Algorithm`, `Step`, `StepEvent`, `RunId`, `SpeedSetting`
//! - **Errors**: `SortError`, `ConfigError` (thiserror-based)
//! - **Config**: `VisualizerConfig`, `RandomSettings`

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{RandomSettings, VisualizerConfig};
pub use error::{ConfigError, SortError, SortResult};
pub use types::{Algorithm, Direction, RunId, SpeedSetting, Step, StepEvent};
