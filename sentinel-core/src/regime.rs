//! Market regime classification from volatility and trend strength.
//!
//! The volatility band is checked before trend strength: a market outside
//! `[min_atr_pct, max_atr_pct]` is never classified TREND.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::CandleWindow;
use crate::indicators::{atr_pct, ema, trend_strength};

/// EMA periods used for the regime's trend-strength reading.
pub const REGIME_EMA_FAST: usize = 20;
pub const REGIME_EMA_SLOW: usize = 50;

/// Trend strength below this is treated as no separation at all.
pub const TREND_STRENGTH_FLOOR: f64 = 0.0005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    Trend,
    Range,
    Chaos,
}

impl MarketRegime {
    /// Lower-case label used in text tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::Trend => "trend",
            MarketRegime::Range => "range",
            MarketRegime::Chaos => "chaos",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier thresholds. All values are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// ATR% below this is a dead market.
    pub min_atr_pct: f64,
    /// ATR% above this is chaos.
    pub max_atr_pct: f64,
    /// Minimum normalized EMA separation for a trend.
    pub min_trend_strength: f64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            min_atr_pct: 0.2,
            max_atr_pct: 6.0,
            min_trend_strength: 0.004,
        }
    }
}

/// Map (ATR%, trend strength) to a regime.
pub fn classify_regime(atr_pct: f64, trend_strength: f64, cfg: &RegimeConfig) -> MarketRegime {
    if atr_pct < cfg.min_atr_pct {
        return MarketRegime::Range;
    }
    if atr_pct > cfg.max_atr_pct {
        return MarketRegime::Chaos;
    }
    if trend_strength >= cfg.min_trend_strength {
        return MarketRegime::Trend;
    }
    MarketRegime::Range
}

/// A regime together with the readings it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeReading {
    pub regime: MarketRegime,
    pub atr_pct: f64,
    pub trend_strength: f64,
}

/// Compute ATR%, EMA20/EMA50 trend strength and the regime for a window.
///
/// An empty window reads as RANGE with zero volatility and trend.
pub fn assess_regime(window: &CandleWindow, cfg: &RegimeConfig) -> RegimeReading {
    let Some(price) = window.last_close() else {
        return RegimeReading {
            regime: MarketRegime::Range,
            atr_pct: 0.0,
            trend_strength: 0.0,
        };
    };

    let closes = window.closes();
    let atr = atr_pct(window.highs(), window.lows(), closes);
    // Both periods are non-zero constants.
    let fast = ema(closes, REGIME_EMA_FAST).unwrap_or(price);
    let slow = ema(closes, REGIME_EMA_SLOW).unwrap_or(price);

    let mut ts = trend_strength(fast, slow, price);
    if ts < TREND_STRENGTH_FLOOR {
        ts = 0.0;
    }

    RegimeReading {
        regime: classify_regime(atr, ts, cfg),
        atr_pct: atr,
        trend_strength: ts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> RegimeConfig {
        RegimeConfig::default()
    }

    #[test]
    fn trend_inside_band() {
        assert_eq!(classify_regime(1.2, 0.3, &cfg()), MarketRegime::Trend);
    }

    #[test]
    fn dead_market_is_range_regardless_of_trend() {
        assert_eq!(classify_regime(0.1, 0.05, &cfg()), MarketRegime::Range);
        assert_eq!(classify_regime(0.1, 0.99, &cfg()), MarketRegime::Range);
    }

    #[test]
    fn excess_volatility_is_chaos_even_when_trending() {
        assert_eq!(classify_regime(12.0, 0.4, &cfg()), MarketRegime::Chaos);
    }

    #[test]
    fn weak_trend_inside_band_is_range() {
        assert_eq!(classify_regime(1.0, 0.001, &cfg()), MarketRegime::Range);
    }

    #[test]
    fn band_edges_are_inclusive() {
        assert_eq!(classify_regime(0.2, 0.004, &cfg()), MarketRegime::Trend);
        assert_eq!(classify_regime(6.0, 0.004, &cfg()), MarketRegime::Trend);
    }

    #[test]
    fn assess_empty_window_is_range() {
        let r = assess_regime(&CandleWindow::default(), &cfg());
        assert_eq!(r.regime, MarketRegime::Range);
        assert_eq!(r.atr_pct, 0.0);
        assert_eq!(r.trend_strength, 0.0);
    }

    #[test]
    fn assess_flat_window_snaps_trend_to_zero() {
        let n = 80;
        let closes = vec![100.0; n];
        let highs = vec![101.0; n];
        let lows = vec![99.0; n];
        let w = CandleWindow::new(highs, lows, closes).unwrap();
        let r = assess_regime(&w, &cfg());
        assert_eq!(r.trend_strength, 0.0);
        assert!((r.atr_pct - 2.0).abs() < 1e-9);
        assert_eq!(r.regime, MarketRegime::Range);
    }

    #[test]
    fn assess_steady_uptrend_is_trend() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let w = CandleWindow::new(highs, lows, closes).unwrap();
        let r = assess_regime(&w, &cfg());
        // EMA20 lags by 9.5, EMA50 by 24.5: separation 15 on a price of 219.
        assert!((r.trend_strength - 15.0 / 219.0).abs() < 1e-9);
        assert_eq!(r.regime, MarketRegime::Trend);
    }

    #[test]
    fn display_is_lower_case() {
        assert_eq!(MarketRegime::Chaos.to_string(), "chaos");
        assert_eq!(
            serde_json::to_string(&MarketRegime::Trend).unwrap(),
            "\"TREND\""
        );
    }
}
