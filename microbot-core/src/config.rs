//! Engine configuration: feature windows plus policy thresholds, loadable from TOML.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```toml
//! [features]
//! depth = 5
//!
//! [policy]
//! base_target = 0.6
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::PolicyConfig;
use crate::features::FeatureConfig;

/// Errors from loading or validating an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub features: FeatureConfig,
    pub policy: PolicyConfig,
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject windows of zero length and thresholds that are negative or non-finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.features;
        for (field, value) in [
            ("features.depth", f.depth),
            ("features.momentum_lookback", f.momentum_lookback),
            ("features.volatility_lookback", f.volatility_lookback),
            ("features.trend_lookback", f.trend_lookback),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be at least 1".into(),
                });
            }
        }

        let p = &self.policy;
        for (field, value) in [
            ("policy.base_target", p.base_target),
            ("policy.trail_activate", p.trail_activate),
            ("policy.entry_imbalance", p.entry_imbalance),
            ("policy.wick_imbalance", p.wick_imbalance),
            ("policy.target_vol_scale", p.target_vol_scale),
            ("policy.soft_stop_floor", p.soft_stop_floor),
            ("policy.soft_stop_vol_scale", p.soft_stop_vol_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }

        if p.entry_imbalance >= 1.0 {
            return Err(ConfigError::Invalid {
                field: "policy.entry_imbalance",
                reason: "imbalance lies in [-1, 1]; a threshold of 1 or more never triggers".into(),
            });
        }

        Ok(())
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
