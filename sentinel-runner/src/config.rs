//! `sentinel.toml` configuration.
//!
//! Every section and key is optional. A missing file is the all-defaults
//! config; a file that exists but does not parse or validate is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use sentinel_core::{
    BreakoutRetestConfig, PairFilterConfig, PullbackConfig, RegimeConfig, RiskConfig,
};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sentinel.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// `[quality]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitySection {
    pub min_quote_volume_usdt: f64,
}

impl Default for QualitySection {
    fn default() -> Self {
        Self {
            min_quote_volume_usdt: PairFilterConfig::default().min_quote_volume_usdt,
        }
    }
}

/// `[setups]` section, shared by both detectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupsSection {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub pullback_lookback: usize,
    pub pullback_tolerance_pct: f64,
    pub swing_lookback: usize,
    pub breakout_lookback: usize,
    pub retest_lookback: usize,
    pub retest_tolerance_pct: f64,
}

impl Default for SetupsSection {
    fn default() -> Self {
        let pb = PullbackConfig::default();
        let br = BreakoutRetestConfig::default();
        Self {
            ema_fast: pb.ema_fast,
            ema_slow: pb.ema_slow,
            pullback_lookback: pb.pullback_lookback,
            pullback_tolerance_pct: pb.pullback_tolerance_pct,
            swing_lookback: pb.swing_lookback,
            breakout_lookback: br.breakout_lookback,
            retest_lookback: br.retest_lookback,
            retest_tolerance_pct: br.retest_tolerance_pct,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub risk: RiskConfig,
    pub quality: QualitySection,
    pub regime: RegimeConfig,
    pub setups: SetupsSection,
}

impl SentinelConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("risk.risk_usdt", self.risk.risk_usdt),
            ("risk.fee_buffer_pct", self.risk.fee_buffer_pct),
            ("quality.min_quote_volume_usdt", self.quality.min_quote_volume_usdt),
            ("regime.min_atr_pct", self.regime.min_atr_pct),
            ("regime.max_atr_pct", self.regime.max_atr_pct),
            ("regime.min_trend_strength", self.regime.min_trend_strength),
            ("setups.pullback_tolerance_pct", self.setups.pullback_tolerance_pct),
            ("setups.retest_tolerance_pct", self.setups.retest_tolerance_pct),
        ];
        for (key, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.regime.min_atr_pct > self.regime.max_atr_pct {
            return Err(ConfigError::Invalid(format!(
                "regime.min_atr_pct ({}) exceeds regime.max_atr_pct ({})",
                self.regime.min_atr_pct, self.regime.max_atr_pct
            )));
        }

        let s = &self.setups;
        if s.ema_fast == 0 {
            return Err(ConfigError::Invalid("setups.ema_fast must be >= 1".into()));
        }
        if s.ema_fast >= s.ema_slow {
            return Err(ConfigError::Invalid(format!(
                "setups.ema_fast ({}) must be below setups.ema_slow ({})",
                s.ema_fast, s.ema_slow
            )));
        }
        let lookbacks = [
            ("setups.pullback_lookback", s.pullback_lookback),
            ("setups.swing_lookback", s.swing_lookback),
            ("setups.breakout_lookback", s.breakout_lookback),
            ("setups.retest_lookback", s.retest_lookback),
        ];
        for (key, value) in lookbacks {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{key} must be positive")));
            }
        }

        Ok(())
    }

    // ── Core config accessors ──

    pub fn risk_config(&self) -> RiskConfig {
        self.risk
    }

    pub fn regime_config(&self) -> RegimeConfig {
        self.regime
    }

    pub fn pullback_config(&self) -> PullbackConfig {
        PullbackConfig {
            ema_fast: self.setups.ema_fast,
            ema_slow: self.setups.ema_slow,
            pullback_lookback: self.setups.pullback_lookback,
            pullback_tolerance_pct: self.setups.pullback_tolerance_pct,
            swing_lookback: self.setups.swing_lookback,
        }
    }

    pub fn breakout_config(&self) -> BreakoutRetestConfig {
        BreakoutRetestConfig {
            breakout_lookback: self.setups.breakout_lookback,
            retest_lookback: self.setups.retest_lookback,
            retest_tolerance_pct: self.setups.retest_tolerance_pct,
            swing_lookback: self.setups.swing_lookback,
        }
    }

    /// Pair filters with the configured liquidity floor, optionally overridden.
    pub fn pair_filter_config(&self, min_qv_override: Option<f64>) -> PairFilterConfig {
        PairFilterConfig {
            min_quote_volume_usdt: min_qv_override.unwrap_or(self.quality.min_quote_volume_usdt),
            ..PairFilterConfig::default()
        }
    }
}
