//! Long setup detectors.
//!
//! Each detector inspects a chronological candle window and returns an
//! optional [`TradePlan`]. Absence of a plan is the common, expected outcome
//! (insufficient history, no trend, no touch, no valid stop) and is not an error.
//!
//! # Ordering
//! Callers evaluate the pullback detector first and fall back to
//! breakout-retest only when it yields nothing, so a window produces at most
//! one plan. [`detect_setup`] encodes that policy.

pub mod breakout_retest;
pub mod pullback;

pub use breakout_retest::{detect_breakout_retest_long, BreakoutRetestConfig};
pub use pullback::{detect_pullback_long, PullbackConfig};

use crate::domain::TradePlan;

/// Pullback first, then breakout-retest.
pub fn detect_setup(
    closes: &[f64],
    lows: &[f64],
    symbol: &str,
    pullback: &PullbackConfig,
    breakout: &BreakoutRetestConfig,
) -> Option<TradePlan> {
    if closes.is_empty() {
        return None;
    }
    detect_pullback_long(closes, lows, symbol, pullback)
        .or_else(|| detect_breakout_retest_long(closes, lows, symbol, breakout))
}

/// Shared synthetic series for detector tests.
#[cfg(test)]
pub(crate) mod fixtures {
    /// Steady uptrend, +0.5 per bar from 100, with one dip into the EMA zone
    /// five bars before the end. Lows sit 1.0 under each close.
    pub fn uptrend_with_dip(n: usize) -> (Vec<f64>, Vec<f64>) {
        let mut closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
        let mut lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        let dip = n - 6;
        closes[dip] = 144.0;
        lows[dip] = 143.5;
        (closes, lows)
    }

    /// Flat base at 100, a prior high of 110, a shelf at 109 with one low
    /// retesting 110, and a final breakout close at 112.
    pub fn breakout_then_retest() -> (Vec<f64>, Vec<f64>) {
        let mut closes = vec![100.0; 60];
        closes[40] = 110.0;
        for c in closes.iter_mut().take(59).skip(41) {
            *c = 109.0;
        }
        closes[59] = 112.0;
        let mut lows: Vec<f64> = closes.iter().map(|c| c - 1.0).collect();
        lows[55] = 109.2;
        (closes, lows)
    }
}
