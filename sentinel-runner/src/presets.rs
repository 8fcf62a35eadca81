//! Trading-style presets: timeframe, history depth and scan breadth.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingPreset {
    Scalping,
    Intraday,
    Swing,
    Position,
}

impl TradingPreset {
    pub const ALL: [TradingPreset; 4] = [
        TradingPreset::Scalping,
        TradingPreset::Intraday,
        TradingPreset::Swing,
        TradingPreset::Position,
    ];

    /// Look up a preset by key, defaulting to swing for anything unknown.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "scalping" => TradingPreset::Scalping,
            "intraday" => TradingPreset::Intraday,
            "position" => TradingPreset::Position,
            _ => TradingPreset::Swing,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            TradingPreset::Scalping => "scalping",
            TradingPreset::Intraday => "intraday",
            TradingPreset::Swing => "swing",
            TradingPreset::Position => "position",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradingPreset::Scalping => "Scalping (fast)",
            TradingPreset::Intraday => "Intraday (day trading)",
            TradingPreset::Swing => "Swing (4h)",
            TradingPreset::Position => "Position (1d)",
        }
    }

    pub fn timeframe(&self) -> &'static str {
        match self {
            TradingPreset::Scalping => "5m",
            TradingPreset::Intraday => "15m",
            TradingPreset::Swing => "4h",
            TradingPreset::Position => "1d",
        }
    }

    pub fn bars(&self) -> usize {
        match self {
            TradingPreset::Position => 365,
            _ => 240,
        }
    }

    /// Suggested interval between scans.
    pub fn refresh_seconds(&self) -> u64 {
        match self {
            TradingPreset::Scalping => 300,
            TradingPreset::Intraday => 600,
            TradingPreset::Swing => 1800,
            TradingPreset::Position => 3600,
        }
    }

    pub fn max_pairs(&self) -> usize {
        match self {
            TradingPreset::Scalping | TradingPreset::Intraday => 60,
            TradingPreset::Swing => 50,
            TradingPreset::Position => 30,
        }
    }

    pub fn summary(&self) -> PresetSummary {
        PresetSummary {
            key: self.key(),
            label: self.label(),
            timeframe: self.timeframe(),
            bars: self.bars(),
            refresh_seconds: self.refresh_seconds(),
            max_pairs: self.max_pairs(),
        }
    }
}

impl fmt::Display for TradingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flattened preset for JSON listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetSummary {
    pub key: &'static str,
    pub label: &'static str,
    pub timeframe: &'static str,
    pub bars: usize,
    pub refresh_seconds: u64,
    pub max_pairs: usize,
}
