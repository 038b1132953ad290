//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SortError;

/// Target ordering for a sort run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// Whether `a` must be placed strictly before `b` under this direction.
    ///
    /// Equal values never precede each other, so no strategy swaps ties.
    pub fn precedes(self, a: i32, b: i32) -> bool {
        match self {
            Direction::Ascending => a < b,
            Direction::Descending => a > b,
        }
    }

    /// Whether `values` is already ordered (non-strictly) in this direction.
    pub fn is_ordered(self, values: &[i32]) -> bool {
        values.windows(2).all(|w| !self.precedes(w[1], w[0]))
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Ascending => "ascending",
            Direction::Descending => "descending",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(SortError::UnknownDirection {
                name: other.to_string(),
            }),
        }
    }
}

/// The comparison sorts the engine knows how to instrument.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    Bubble,
    Selection,
    Insertion,
    Quick,
    Merge,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bubble,
        Algorithm::Selection,
        Algorithm::Insertion,
        Algorithm::Quick,
        Algorithm::Merge,
    ];

    /// Short lowercase name, used for lookup and CLI flags.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Selection => "selection",
            Algorithm::Insertion => "insertion",
            Algorithm::Quick => "quick",
            Algorithm::Merge => "merge",
        }
    }

    /// Whether equal elements keep their relative order.
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            Algorithm::Bubble | Algorithm::Insertion | Algorithm::Merge
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = wanted.strip_suffix("sort").unwrap_or(&wanted).trim();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| SortError::UnknownAlgorithm {
                name: s.to_string(),
            })
    }
}

/// One observable unit of sorting progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Two indices are being compared.
    Compare(usize, usize),
    /// The values at two indices were exchanged (possibly `i == j`).
    Swap(usize, usize),
    /// An index was written with a value (insertion shifting, merge placement).
    Overwrite(usize, i32),
    /// These indices are in their final position. Emitted once per completed run.
    RangeSettled(Vec<usize>),
}

impl Step {
    /// Indices a renderer should highlight for this step.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Step::Compare(i, j) | Step::Swap(i, j) => vec![*i, *j],
            Step::Overwrite(i, _) => vec![*i],
            Step::RangeSettled(indices) => indices.clone(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Compare(i, j) => write!(f, "Compare({i}, {j})"),
            Step::Swap(i, j) => write!(f, "Swap({i}, {j})"),
            Step::Overwrite(i, v) => write!(f, "Overwrite({i}, {v})"),
            Step::RangeSettled(indices) => write!(f, "RangeSettled({} indices)", indices.len()),
        }
    }
}

/// Identifier of one sort run, unique per controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// A step as delivered to subscribers, with the sequence as it stood
/// right after the step was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    pub run: RunId,
    /// Position of this step within its run, starting at 0.
    pub seq: u64,
    pub step: Step,
    pub values: Arc<[i32]>,
}

/// Minimum delay between two delivered steps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeedSetting(Duration);

impl SpeedSetting {
    pub const SLOW: Self = Self(Duration::from_millis(200));
    pub const NORMAL: Self = Self(Duration::from_millis(100));
    pub const FAST: Self = Self(Duration::from_millis(50));

    /// Create a speed setting. The delay must be non-zero.
    pub fn new(delay: Duration) -> Result<Self, SortError> {
        if delay.is_zero() {
            return Err(SortError::InvalidSpeed {
                reason: "delay must be positive".to_string(),
            });
        }
        Ok(Self(delay))
    }

    pub fn from_millis(ms: u64) -> Result<Self, SortError> {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(self) -> Duration {
        self.0
    }

    pub fn as_millis(self) -> u128 {
        self.0.as_millis()
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for SpeedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

impl FromStr for SpeedSetting {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::SLOW),
            "normal" => Ok(Self::NORMAL),
            "fast" => Ok(Self::FAST),
            other => {
                let ms = other
                    .strip_suffix("ms")
                    .unwrap_or(other)
                    .parse::<u64>()
                    .map_err(|_| SortError::InvalidSpeed {
                        reason: format!("expected slow, normal, fast or milliseconds, got {s:?}"),
                    })?;
                Self::from_millis(ms)
            }
        }
    }
}
