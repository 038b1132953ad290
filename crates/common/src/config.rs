//! Configuration for the visualizer: pacing, random generation, defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{Algorithm, Direction, SpeedSetting};

/// Parameters for generating a random sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomSettings {
    /// Number of elements to generate.
    pub count: usize,
    /// Inclusive lower bound.
    pub min: i32,
    /// Inclusive upper bound.
    pub max: i32,
}

impl Default for RandomSettings {
    fn default() -> Self {
        Self {
            count: 30,
            min: 10,
            max: 100,
        }
    }
}

/// Top-level visualizer configuration, usually read from a JSON file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Delay between delivered steps, in milliseconds.
    pub speed_ms: u64,
    pub random: RandomSettings,
    pub algorithm: Algorithm,
    pub direction: Direction,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            speed_ms: SpeedSetting::NORMAL.as_millis() as u64,
            random: RandomSettings::default(),
            algorithm: Algorithm::Bubble,
            direction: Direction::Ascending,
        }
    }
}

impl VisualizerConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "speed_ms must be > 0".to_string(),
            });
        }
        if self.random.count == 0 {
            return Err(ConfigError::Invalid {
                reason: "random.count must be > 0".to_string(),
            });
        }
        if self.random.min > self.random.max {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "random.min ({}) is greater than random.max ({})",
                    self.random.min, self.random.max
                ),
            });
        }
        Ok(())
    }

    /// The configured pacing as a [`SpeedSetting`].
    pub fn speed(&self) -> Result<SpeedSetting, ConfigError> {
        SpeedSetting::from_millis(self.speed_ms).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tool() {
        let config = VisualizerConfig::default();
        assert_eq!(config.speed_ms, 100);
        assert_eq!(config.random.count, 30);
        assert_eq!(config.random.min, 10);
        assert_eq!(config.random.max, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config = VisualizerConfig::from_json(r#"{ "speed_ms": 50 }"#).unwrap();
        assert_eq!(config.speed_ms, 50);
        assert_eq!(config.random, RandomSettings::default());
        assert_eq!(config.direction, Direction::Ascending);
    }

    #[test]
    fn partial_random_section() {
        let config =
            VisualizerConfig::from_json(r#"{ "random": { "count": 8 }, "algorithm": "Merge" }"#)
                .unwrap();
        assert_eq!(config.random.count, 8);
        assert_eq!(config.random.max, 100);
        assert_eq!(config.algorithm, Algorithm::Merge);
    }

    #[test]
    fn zero_speed_rejected() {
        let err = VisualizerConfig::from_json(r#"{ "speed_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = VisualizerConfig::from_json(r#"{ "random": { "min": 50, "max": 5 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("random.min"));
    }

    #[test]
    fn speed_conversion() {
        let config = VisualizerConfig {
            speed_ms: 200,
            ..Default::default()
        };
        assert_eq!(config.speed().unwrap(), SpeedSetting::SLOW);
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join("sv_config_load_test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("sortviz.json");
        std::fs::write(&path, r#"{ "direction": "Descending" }"#).expect("write");

        let config = VisualizerConfig::load(&path).expect("load");
        assert_eq!(config.direction, Direction::Descending);

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_dir(&dir);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = VisualizerConfig::load(Path::new("/nonexistent/sortviz.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
