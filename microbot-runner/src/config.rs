//! Bot configuration: engine settings plus the paper session's execution settings.
//!
//! ```toml
//! [engine.policy]
//! base_target = 0.6
//!
//! [session]
//! trail_distance = 0.2
//! cooldown_cycles = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use microbot_core::{ConfigError, DecisionEngine, EngineConfig};

/// Execution-side settings for the paper session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Units per trade; scales currency pnl on trade records.
    pub quantity: f64,
    /// Gap between peak pnl and the trailing stop once trailing is armed.
    pub trail_distance: f64,
    /// Cycles of forced `hold` after every exit.
    pub cooldown_cycles: u32,
    /// Tag trades as live rather than simulated.
    pub live: bool,
    /// Confidence recorded on each trade.
    pub confidence: f64,
    /// Prices kept in the rolling window (never less than the longest feature lookback).
    pub max_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quantity: 1.0,
            trail_distance: 0.15,
            cooldown_cycles: 5,
            live: false,
            confidence: 100.0,
            max_window: 500,
        }
    }
}

/// Full configuration of one bot instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub engine: EngineConfig,
    pub session: SessionConfig,
}

impl BotConfig {
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

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        let s = &self.session;
        if !s.quantity.is_finite() || s.quantity <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "session.quantity",
                reason: format!("must be a positive number, got {}", s.quantity),
            });
        }
        if !s.trail_distance.is_finite() || s.trail_distance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "session.trail_distance",
                reason: format!("must be a finite non-negative number, got {}", s.trail_distance),
            });
        }
        if !s.confidence.is_finite() {
            return Err(ConfigError::Invalid {
                field: "session.confidence",
                reason: "must be finite".into(),
            });
        }
        Ok(())
    }

    pub fn engine(&self) -> DecisionEngine {
        DecisionEngine::new(self.engine.clone())
    }

    /// Deterministic hash of the full configuration.
    ///
    /// Two replays with identical configs share a fingerprint, so results can
    /// be grouped by the policy that produced them.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_file() {
        let cfg = BotConfig::from_toml("").unwrap();
        assert_eq!(cfg, BotConfig::default());
        assert_eq!(cfg.session.trail_distance, 0.15);
        assert_eq!(cfg.session.cooldown_cycles, 5);
        assert!(!cfg.session.live);
    }

    #[test]
    fn nested_engine_overrides() {
        let cfg = BotConfig::from_toml(
            r#"
            [engine.features]
            depth = 3

            [engine.policy]
            base_target = 0.8

            [session]
            quantity = 0.01
            live = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.engine.features.depth, 3);
        assert_eq!(cfg.engine.policy.base_target, 0.8);
        assert_eq!(cfg.session.quantity, 0.01);
        assert!(cfg.session.live);
        assert_eq!(cfg.engine().feature_config().depth, 3);
    }

    #[test]
    fn engine_validation_applies() {
        assert!(BotConfig::from_toml("[engine.features]\ndepth = 0").is_err());
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = BotConfig::from_toml("[session]\nquantity = 0.0").unwrap_err();
        assert!(err.to_string().contains("session.quantity"));
    }

    #[test]
    fn fingerprint_deterministic() {
        let cfg = BotConfig::default();
        assert_eq!(cfg.fingerprint().unwrap(), cfg.fingerprint().unwrap());
        assert!(!cfg.fingerprint().unwrap().is_empty());
    }

    #[test]
    fn fingerprint_changes_with_params() {
        let a = BotConfig::default();
        let mut b = a.clone();
        b.engine.policy.trail_activate = 0.4;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = BotConfig::default();
        let text = cfg.to_toml().unwrap();
        assert_eq!(BotConfig::from_toml(&text).unwrap(), cfg);
    }
}
