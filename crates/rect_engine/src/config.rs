//! Configuration system
//!
//! Tuning knobs for [`Space`](crate::physics::space::Space) construction,
//! loadable from TOML. Defaults match the engine's built-in values, so
//! most callers never need a config file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deepest partition supported by the search tree arena.
pub const MAX_TREE_DEPTH: usize = 32;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Tree depth outside the supported range
    #[error("tree depth {0} is out of range (1..={MAX_TREE_DEPTH})")]
    TreeDepthOutOfRange(usize),

    /// Time axis span must be positive
    #[error("time axis span must be positive, got {0} us")]
    NonPositiveTimeSpan(i64),
}

/// Tuning parameters for a [`Space`](crate::physics::space::Space).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Number of levels in the spacetime search tree. A depth of 1 is a
    /// single undivided node.
    pub tree_depth: usize,

    /// Extent of the tree's time axis in microseconds. Trajectory bounds
    /// beyond this span fall back to the root node; queries stay correct
    /// but lose broad-phase precision.
    pub time_axis_span_us: i64,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            // Two levels per spatial axis.
            tree_depth: 4,
            // 1000 seconds; generous for per-tick intervals.
            time_axis_span_us: 1_000_000_000,
        }
    }
}

impl SpaceConfig {
    /// Check that the parameters can actually build a tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tree_depth == 0 || self.tree_depth > MAX_TREE_DEPTH {
            return Err(ConfigError::TreeDepthOutOfRange(self.tree_depth));
        }
        if self.time_axis_span_us <= 0 {
            return Err(ConfigError::NonPositiveTimeSpan(self.time_axis_span_us));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpaceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_depth_rejected() {
        let config = SpaceConfig {
            tree_depth: 0,
            ..SpaceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TreeDepthOutOfRange(0))
        ));
    }

    #[test]
    fn test_nonpositive_span_rejected() {
        let config = SpaceConfig {
            time_axis_span_us: 0,
            ..SpaceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveTimeSpan(0))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SpaceConfig {
            tree_depth: 6,
            time_axis_span_us: 2_000_000,
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SpaceConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: SpaceConfig = toml::from_str("tree_depth = 8").unwrap();
        assert_eq!(parsed.tree_depth, 8);
        assert_eq!(
            parsed.time_axis_span_us,
            SpaceConfig::default().time_axis_span_us
        );
    }
}
