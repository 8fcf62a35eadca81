//! Scalar trend and volatility indicators.
//!
//! Unlike a full indicator library these return a single value for the most
//! recent bar of a window, which is all the regime classifier and detectors need.

pub mod atr;
pub mod ema;
pub mod trend;

pub use atr::{atr_pct, true_range};
pub use ema::ema;
pub use trend::trend_strength;

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
