//! Fixed-risk position sizing.
//!
//! # Formula
//! ```text
//! stop_distance = entry - stop
//! adjusted      = stop_distance * (1 + fee_buffer_pct / 100)
//! size_units    = risk_usdt / adjusted
//! notional_usdt = size_units * entry
//! ```
//!
//! # Example
//! - Entry 100, stop 99, risk 1 USDT, no fee buffer
//! - Size: 1 / 1 = 1 unit, notional 100 USDT

use serde::{Deserialize, Serialize};

use crate::domain::TradePlan;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Quote currency lost if the stop is hit.
    pub risk_usdt: f64,
    /// Widens the stop distance to cover fees and slippage, in percent.
    pub fee_buffer_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_usdt: 1.0,
            fee_buffer_pct: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSizing {
    pub entry: f64,
    pub stop: f64,
    pub risk_usdt: f64,
    pub stop_distance: f64,
    pub stop_distance_pct: f64,
    pub size_units: f64,
    pub notional_usdt: f64,
}

/// Size a long position so that hitting `stop` loses `cfg.risk_usdt`.
///
/// Returns `None` unless both prices are finite, `0 < stop < entry`, and the
/// resulting size is positive and finite.
pub fn compute_position_sizing(entry: f64, stop: f64, cfg: &RiskConfig) -> Option<PositionSizing> {
    if !entry.is_finite() || !stop.is_finite() {
        return None;
    }
    if entry <= 0.0 || stop <= 0.0 || stop >= entry {
        return None;
    }

    let stop_distance = entry - stop;
    let adjusted = stop_distance * (1.0 + cfg.fee_buffer_pct / 100.0);
    if adjusted <= 0.0 {
        return None;
    }

    let size_units = cfg.risk_usdt / adjusted;
    if !size_units.is_finite() || size_units <= 0.0 {
        return None;
    }

    Some(PositionSizing {
        entry,
        stop,
        risk_usdt: cfg.risk_usdt,
        stop_distance,
        stop_distance_pct: stop_distance / entry * 100.0,
        size_units,
        notional_usdt: size_units * entry,
    })
}

/// Convenience wrapper sizing a plan at its reference entry.
pub fn size_plan(plan: &TradePlan, cfg: &RiskConfig) -> Option<PositionSizing> {
    compute_position_sizing(plan.entry_ref(), plan.stop(), cfg)
}
