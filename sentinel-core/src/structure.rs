//! Price-structure helpers used by the setup detectors.

/// Lowest low among the last `lookback` lows (all lows if fewer exist).
///
/// Returns 0.0 for an empty slice or a zero lookback; detectors treat that as
/// "no valid stop".
pub fn recent_swing_low(lows: &[f64], lookback: usize) -> f64 {
    if lows.is_empty() || lookback == 0 {
        return 0.0;
    }
    let start = lows.len().saturating_sub(lookback);
    lows[start..].iter().copied().fold(f64::INFINITY, f64::min)
}

/// True when `price` lies within `tolerance_pct` percent of `level`.
///
/// A zero level never matches.
pub fn near_level(price: f64, level: f64, tolerance_pct: f64) -> bool {
    if level == 0.0 {
        return false;
    }
    (price - level).abs() / level * 100.0 <= tolerance_pct
}
