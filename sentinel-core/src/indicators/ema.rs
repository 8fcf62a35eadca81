//! Exponential Moving Average (EMA), last value only.
//!
//! Seed: SMA of the first `period` values.
//! Recursive: EMA[t] = k * value[t] + (1 - k) * EMA[t-1], k = 2 / (period + 1).
//! Short input (fewer than `period` values) degrades to the plain mean.

use crate::error::CoreError;

/// EMA of `values` evaluated at the last element.
///
/// Returns the arithmetic mean of everything available when
/// `values.len() < period`, and 0.0 for an empty slice.
pub fn ema(values: &[f64], period: usize) -> Result<f64, CoreError> {
    if period == 0 {
        return Err(CoreError::InvalidArgument(
            "EMA period must be > 0".to_string(),
        ));
    }
    if values.is_empty() {
        return Ok(0.0);
    }
    if values.len() < period {
        return Ok(values.iter().sum::<f64>() / values.len() as f64);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    Ok(values[period..]
        .iter()
        .fold(seed, |prev, &v| v * k + prev * (1.0 - k)))
}
