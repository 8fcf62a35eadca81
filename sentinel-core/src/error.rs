//! Error types for the signal pipeline.
//!
//! Most "failures" in this crate are expected absences (no setup, no sizing)
//! and are modelled as `Option`. Only malformed input to a primitive is an error.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("candle window arrays differ in length (highs={highs}, lows={lows}, closes={closes})")]
    LengthMismatch {
        highs: usize,
        lows: usize,
        closes: usize,
    },
}
