//! Crossing engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! crossing-radius-m = 15.0
//! live-delta-tolerance-m = 30.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Distance in metres within which a checkpoint counts as reached.
pub const CROSSING_RADIUS_METERS: f64 = 15.0;

/// Search radius in metres used when matching the current position against
/// the best attempt's recorded locations.
pub const LIVE_DELTA_TOLERANCE_METERS: f64 = 30.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be a finite, non-negative number of metres (got {value})")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Tunables for [`CrossingEngine`](crate::crossing::CrossingEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrossingConfig {
    pub crossing_radius_m: f64,
    pub live_delta_tolerance_m: f64,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self {
            crossing_radius_m: CROSSING_RADIUS_METERS,
            live_delta_tolerance_m: LIVE_DELTA_TOLERANCE_METERS,
        }
    }
}

impl CrossingConfig {
    /// Default configuration with a different crossing radius.
    pub fn with_crossing_radius(radius_m: f64) -> Self {
        Self {
            crossing_radius_m: radius_m,
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_distance("crossing-radius-m", self.crossing_radius_m)?;
        check_distance("live-delta-tolerance-m", self.live_delta_tolerance_m)
    }
}

fn check_distance(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
