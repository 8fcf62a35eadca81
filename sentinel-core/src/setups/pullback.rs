//! Pullback-long detector: trend continuation after a dip into the EMA zone.
//!
//! Conditions, evaluated on the latest bar:
//! 1. Enough history for both EMAs plus [`PULLBACK_EXTRA_BARS`].
//! 2. Trend bias: close > slow EMA and fast EMA > slow EMA.
//! 3. At least one of the previous `pullback_lookback` candles (current one
//!    excluded) touched the EMA zone with its close or low.
//! 4. A recent swing low exists strictly below the current close.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{PlanStatus, SetupKind, TradePlan};
use crate::indicators::ema;
use crate::structure::{near_level, recent_swing_low};

/// History required beyond the slow EMA period.
pub const PULLBACK_EXTRA_BARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PullbackConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// How many candles before the current one may count as the touch.
    pub pullback_lookback: usize,
    /// Proximity to the EMA zone, in percent.
    pub pullback_tolerance_pct: f64,
    /// Window for the structural stop.
    pub swing_lookback: usize,
}

impl Default for PullbackConfig {
    fn default() -> Self {
        Self {
            ema_fast: 20,
            ema_slow: 50,
            pullback_lookback: 14,
            pullback_tolerance_pct: 2.2,
            swing_lookback: 30,
        }
    }
}

/// True if `value` is near either EMA or inside the EMA band widened by
/// `tolerance_pct` of the band's upper bound.
fn touches_zone(value: f64, e_fast: f64, e_slow: f64, tolerance_pct: f64) -> bool {
    if near_level(value, e_fast, tolerance_pct) || near_level(value, e_slow, tolerance_pct) {
        return true;
    }
    let upper = e_fast.max(e_slow);
    let lower = e_fast.min(e_slow);
    let pad = upper * tolerance_pct / 100.0;
    value >= lower - pad && value <= upper + pad
}

fn had_pullback_touch(
    closes: &[f64],
    lows: &[f64],
    e_fast: f64,
    e_slow: f64,
    tolerance_pct: f64,
    lookback: usize,
) -> bool {
    let n = closes.len();
    if n < 3 {
        return false;
    }
    let lb = lookback.min(n - 1);
    (2..lb + 2).any(|back| {
        let i = n - back;
        touches_zone(closes[i], e_fast, e_slow, tolerance_pct)
            || touches_zone(lows[i], e_fast, e_slow, tolerance_pct)
    })
}

/// Detect a pullback-long setup on the latest bar of `closes` / `lows`.
///
/// Status is READY when the close is back above the fast EMA, WATCH otherwise.
/// An EMA period of zero yields no plan.
pub fn detect_pullback_long(
    closes: &[f64],
    lows: &[f64],
    symbol: &str,
    cfg: &PullbackConfig,
) -> Option<TradePlan> {
    let n = closes.len();
    if lows.len() != n || n < cfg.ema_fast.max(cfg.ema_slow) + PULLBACK_EXTRA_BARS {
        trace!(symbol, bars = n, "pullback: insufficient history");
        return None;
    }

    let price = closes[n - 1];
    let e_fast = ema(closes, cfg.ema_fast).ok()?;
    let e_slow = ema(closes, cfg.ema_slow).ok()?;

    if !(price > e_slow && e_fast > e_slow) {
        trace!(symbol, price, e_fast, e_slow, "pullback: no long trend bias");
        return None;
    }

    if !had_pullback_touch(
        closes,
        lows,
        e_fast,
        e_slow,
        cfg.pullback_tolerance_pct,
        cfg.pullback_lookback,
    ) {
        trace!(symbol, "pullback: EMA zone not touched");
        return None;
    }

    let status = if price > e_fast {
        PlanStatus::Ready
    } else {
        PlanStatus::Watch
    };

    let stop = recent_swing_low(lows, cfg.swing_lookback);
    let trigger = match status {
        PlanStatus::Watch => format!("Enter on confirmation: close above EMA{}.", cfg.ema_fast),
        PlanStatus::Ready => format!(
            "Confirmation met (close > EMA{0}). Enter only if the next candle holds above EMA{0}.",
            cfg.ema_fast
        ),
    };
    let notes = format!(
        "Trend continuation: EMA{} > EMA{}. Pullback touched EMA zone within last {} candles. \
         Manage at +1R / +2R; trail after +1R.",
        cfg.ema_fast, cfg.ema_slow, cfg.pullback_lookback
    );

    let plan = TradePlan::long_from_stop(
        symbol,
        SetupKind::Pullback,
        status,
        price,
        stop,
        trigger,
        notes,
    );
    if plan.is_none() {
        trace!(symbol, price, stop, "pullback: swing low is not a valid stop");
    }
    plan
}
