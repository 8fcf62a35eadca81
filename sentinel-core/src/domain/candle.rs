//! Candles and the column-oriented window the detectors consume.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One OHLCV row as delivered by an exchange (timestamp in epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronological (high, low, close) columns, index 0 = oldest.
///
/// The three columns always have the same length, so the type is only
/// built through [`CandleWindow::new`] or [`CandleWindow::from_candles`] and
/// never deserialized. Detectors evaluating bar `i` must only see a window
/// truncated at `i`; see [`CandleWindow::truncated`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleWindow {
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
}

impl CandleWindow {
    pub fn new(highs: Vec<f64>, lows: Vec<f64>, closes: Vec<f64>) -> Result<Self, CoreError> {
        if highs.len() != lows.len() || lows.len() != closes.len() {
            return Err(CoreError::LengthMismatch {
                highs: highs.len(),
                lows: lows.len(),
                closes: closes.len(),
            });
        }
        Ok(Self {
            highs,
            lows,
            closes,
        })
    }

    /// Split OHLCV rows into columns. Open and volume are not used by the core.
    pub fn from_candles(candles: &[Candle]) -> Self {
        Self {
            highs: candles.iter().map(|c| c.high).collect(),
            lows: candles.iter().map(|c| c.low).collect(),
            closes: candles.iter().map(|c| c.close).collect(),
        }
    }

    pub fn highs(&self) -> &[f64] {
        &self.highs
    }

    pub fn lows(&self) -> &[f64] {
        &self.lows
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// Prefix of the window ending at `end` (inclusive).
    ///
    /// Indices past the end are clamped, so `truncated(len - 1)` is a copy.
    pub fn truncated(&self, end: usize) -> Self {
        let n = (end + 1).min(self.len());
        Self {
            highs: self.highs[..n].to_vec(),
            lows: self.lows[..n].to_vec(),
            closes: self.closes[..n].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: i64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp_ms: ts,
            open: close,
            high,
            low,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let err = CandleWindow::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            CoreError::LengthMismatch {
                highs: 2,
                lows: 1,
                closes: 2
            }
        );
    }

    #[test]
    fn from_candles_splits_columns() {
        let w = CandleWindow::from_candles(&[
            candle(0, 11.0, 9.0, 10.0),
            candle(1, 12.0, 10.0, 11.0),
        ]);
        assert_eq!(w.highs(), &[11.0, 12.0]);
        assert_eq!(w.lows(), &[9.0, 10.0]);
        assert_eq!(w.closes(), &[10.0, 11.0]);
        assert_eq!(w.last_close(), Some(11.0));
    }

    #[test]
    fn truncated_is_inclusive_and_clamped() {
        let w = CandleWindow::new(vec![3.0; 5], vec![1.0; 5], vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap();
        assert_eq!(w.truncated(2).closes(), &[1.0, 2.0, 3.0]);
        assert_eq!(w.truncated(99).len(), 5);
    }

    #[test]
    fn window_serializes_as_columns() {
        let w = CandleWindow::new(vec![2.0], vec![1.0], vec![1.5]).unwrap();
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["highs"][0], 2.0);
        assert_eq!(json["closes"][0], 1.5);
    }

    #[test]
    fn empty_window() {
        let w = CandleWindow::default();
        assert!(w.is_empty());
        assert_eq!(w.last_close(), None);
    }
}
