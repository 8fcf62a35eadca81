//! Average True Range as a percentage of the last close.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! Averaged with a plain mean over every bar that has a previous close.

/// True range of bar `i` (requires `i >= 1`).
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64], i: usize) -> f64 {
    let (h, l, pc) = (highs[i], lows[i], closes[i - 1]);
    (h - l).max((h - pc).abs()).max((l - pc).abs())
}

/// Mean true range over bars `1..n`, as a percentage of the final close.
///
/// Returns 0.0 with fewer than two closes or a zero final close. The columns
/// must be the same length; a [`crate::CandleWindow`] guarantees this.
pub fn atr_pct(highs: &[f64], lows: &[f64], closes: &[f64]) -> f64 {
    let n = closes.len().min(highs.len()).min(lows.len());
    if n < 2 {
        return 0.0;
    }
    let price = closes[n - 1];
    if price == 0.0 {
        return 0.0;
    }

    let sum: f64 = (1..n).map(|i| true_range(highs, lows, closes, i)).sum();
    let atr = sum / (n - 1) as f64;
    atr / price * 100.0
}
