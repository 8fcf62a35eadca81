//! Normalized EMA separation as a trend proxy.

/// `|ema_fast - ema_slow| / price`, or 0.0 when price is zero.
pub fn trend_strength(ema_fast: f64, ema_slow: f64, price: f64) -> f64 {
    if price == 0.0 {
        return 0.0;
    }
    (ema_fast - ema_slow).abs() / price
}
