//! Breakout-retest-long detector: a break above recent resistance that comes
//! back to test it as support.
//!
//! The level is the highest close of the `breakout_lookback` candles before
//! the current one. A breakout is any close above it among the last
//! `retest_lookback + 5` candles; a retest is any low within
//! `retest_tolerance_pct` of it among the `retest_lookback` candles before
//! the current one.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{PlanStatus, SetupKind, TradePlan};
use crate::structure::{near_level, recent_swing_low};

/// History required beyond `breakout_lookback`.
pub const BREAKOUT_EXTRA_BARS: usize = 10;

/// Extra candles, beyond the retest window, searched for the breakout close.
pub const BREAKOUT_SEARCH_PAD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakoutRetestConfig {
    pub breakout_lookback: usize,
    pub retest_lookback: usize,
    /// Proximity of a retest low to the level, in percent.
    pub retest_tolerance_pct: f64,
    pub swing_lookback: usize,
}

impl Default for BreakoutRetestConfig {
    fn default() -> Self {
        Self {
            breakout_lookback: 40,
            retest_lookback: 10,
            retest_tolerance_pct: 1.0,
            swing_lookback: 30,
        }
    }
}

/// Highest close among the `lookback` candles preceding the last one.
fn resistance_level(closes: &[f64], lookback: usize) -> Option<f64> {
    let prior = &closes[..closes.len().checked_sub(1)?];
    let start = prior.len().saturating_sub(lookback);
    prior[start..].iter().copied().reduce(f64::max)
}

/// Detect a breakout-retest-long setup on the latest bar.
///
/// Status is READY while the close holds above the level, WATCH otherwise.
pub fn detect_breakout_retest_long(
    closes: &[f64],
    lows: &[f64],
    symbol: &str,
    cfg: &BreakoutRetestConfig,
) -> Option<TradePlan> {
    let n = closes.len();
    if lows.len() != n || n < cfg.breakout_lookback + BREAKOUT_EXTRA_BARS {
        trace!(symbol, bars = n, "breakout-retest: insufficient history");
        return None;
    }

    let price = closes[n - 1];
    let level = resistance_level(closes, cfg.breakout_lookback)?;
    if level <= 0.0 {
        return None;
    }

    let search_from = n.saturating_sub(cfg.retest_lookback + BREAKOUT_SEARCH_PAD);
    if !closes[search_from..].iter().any(|&c| c > level) {
        trace!(symbol, level, "breakout-retest: no close above level");
        return None;
    }

    let retest_from = n.saturating_sub(cfg.retest_lookback + 1);
    let retested = lows[retest_from..n - 1]
        .iter()
        .any(|&low| near_level(low, level, cfg.retest_tolerance_pct));
    if !retested {
        trace!(symbol, level, "breakout-retest: level not retested");
        return None;
    }

    let status = if price > level {
        PlanStatus::Ready
    } else {
        PlanStatus::Watch
    };

    let stop = recent_swing_low(lows, cfg.swing_lookback);
    let trigger = match status {
        PlanStatus::Watch => format!("Enter on reclaim: close back above {level:.6}."),
        PlanStatus::Ready => format!(
            "Level {level:.6} held as support. Enter only if the next candle closes above it."
        ),
    };
    let notes = format!(
        "Breakout above {}-candle high {level:.6}, retested within last {} candles. \
         Manage at +1R / +2R; trail after +1R.",
        cfg.breakout_lookback, cfg.retest_lookback
    );

    let plan = TradePlan::long_from_stop(
        symbol,
        SetupKind::BreakoutRetest,
        status,
        price,
        stop,
        trigger,
        notes,
    );
    if plan.is_none() {
        trace!(symbol, price, stop, "breakout-retest: swing low is not a valid stop");
    }
    plan
}
