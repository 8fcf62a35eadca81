//! R-multiple backtest of the long setups.
//!
//! Each index `i` with a valid (stop, tp1) pair is a hypothetical entry at
//! `closes[i]`. The trade walks forward over closes for at most
//! [`HORIZON_BARS`] - 1 bars: the first close at or below the stop scores -1R,
//! the first close at or above tp1 scores +1R.
//!
//! Trades that touch neither level within the horizon are dropped rather than
//! scored. This biases `win_rate` and `profit_factor` upward in quiet markets
//! and is kept deliberately so results stay comparable with earlier runs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::CandleWindow;
use crate::setups::{detect_setup, BreakoutRetestConfig, PullbackConfig};

/// Forward-walk cap: bars `i+1 .. i+HORIZON_BARS` (exclusive) are inspected.
pub const HORIZON_BARS: usize = 80;

/// Bars skipped at the start of a series before setups are evaluated.
pub const DEFAULT_BACKTEST_WARMUP: usize = 100;

/// Aggregate statistics for one (symbol, timeframe) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub timeframe: String,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_r: f64,
    pub expectancy: f64,
    /// `f64::INFINITY` when there are wins and no losses.
    pub profit_factor: f64,
    pub max_drawdown_r: f64,
}

impl BacktestResult {
    /// The all-zero result reported when no trade resolved.
    pub fn empty(symbol: &str, timeframe: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            trades: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            avg_r: 0.0,
            expectancy: 0.0,
            profit_factor: 0.0,
            max_drawdown_r: 0.0,
        }
    }
}

/// Replay entries against `closes` and return the resolved R outcomes in order.
///
/// Indices beyond the shortest of the three series are ignored.
pub fn simulate_r_series(closes: &[f64], stops: &[f64], tp1s: &[f64]) -> Vec<f64> {
    let n = closes.len();
    let entries = n.min(stops.len()).min(tp1s.len());
    let mut out = Vec::new();

    for i in 0..entries {
        let entry = closes[i];
        let stop = stops[i];
        let tp1 = tp1s[i];
        if entry <= 0.0 || stop <= 0.0 || stop >= entry {
            continue;
        }

        let horizon_end = (i + HORIZON_BARS).min(n);
        let outcome = closes[(i + 1).min(horizon_end)..horizon_end]
            .iter()
            .find_map(|&c| {
                if c <= stop {
                    Some(-1.0)
                } else if c >= tp1 {
                    Some(1.0)
                } else {
                    None
                }
            });

        if let Some(r) = outcome {
            out.push(r);
        }
    }

    out
}

/// Aggregate R outcomes (in time order) into a [`BacktestResult`].
pub fn summarize(symbol: &str, timeframe: &str, outcomes: &[f64]) -> BacktestResult {
    let trades = outcomes.len();
    if trades == 0 {
        return BacktestResult::empty(symbol, timeframe);
    }

    let wins = outcomes.iter().filter(|&&r| r > 0.0).count();
    let losses = outcomes.iter().filter(|&&r| r < 0.0).count();
    let avg_r = outcomes.iter().sum::<f64>() / trades as f64;

    let gross_win: f64 = outcomes.iter().filter(|&&r| r > 0.0).sum();
    let gross_loss: f64 = -outcomes.iter().filter(|&&r| r < 0.0).sum::<f64>();
    let profit_factor = if gross_loss > 0.0 {
        gross_win / gross_loss
    } else {
        f64::INFINITY
    };

    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    for &r in outcomes {
        equity += r;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }

    BacktestResult {
        symbol: symbol.to_string(),
        timeframe: timeframe.to_string(),
        trades,
        wins,
        losses,
        win_rate: wins as f64 / trades as f64,
        avg_r,
        expectancy: avg_r,
        profit_factor,
        max_drawdown_r: max_dd,
    }
}

/// Simulate and summarize in one step.
pub fn run_backtest(
    symbol: &str,
    timeframe: &str,
    closes: &[f64],
    stops: &[f64],
    tp1s: &[f64],
) -> BacktestResult {
    let outcomes = simulate_r_series(closes, stops, tp1s);
    summarize(symbol, timeframe, &outcomes)
}

/// Per-index stops and first targets, parallel to the window's closes.
///
/// Indices without a plan hold 0.0, which the simulator skips.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanSeries {
    pub stops: Vec<f64>,
    pub tp1s: Vec<f64>,
}

impl PlanSeries {
    pub fn signal_count(&self) -> usize {
        self.stops.iter().filter(|&&s| s > 0.0).count()
    }
}

/// Run the setup detectors at every bar from `warmup` to the second-to-last,
/// each time on the prefix ending at that bar.
pub fn build_plan_series(
    window: &CandleWindow,
    symbol: &str,
    pullback: &PullbackConfig,
    breakout: &BreakoutRetestConfig,
    warmup: usize,
) -> PlanSeries {
    let n = window.len();
    let mut series = PlanSeries {
        stops: vec![0.0; n],
        tp1s: vec![0.0; n],
    };

    let closes = window.closes();
    let lows = window.lows();
    for i in warmup..n.saturating_sub(1) {
        if let Some(plan) = detect_setup(&closes[..=i], &lows[..=i], symbol, pullback, breakout) {
            series.stops[i] = plan.stop();
            series.tp1s[i] = plan.tp1();
        }
    }

    series
}

/// Detect setups bar by bar over `window`, then score them against its closes.
pub fn backtest_window(
    symbol: &str,
    timeframe: &str,
    window: &CandleWindow,
    pullback: &PullbackConfig,
    breakout: &BreakoutRetestConfig,
    warmup: usize,
) -> BacktestResult {
    let series = build_plan_series(window, symbol, pullback, breakout, warmup);
    let result = run_backtest(
        symbol,
        timeframe,
        window.closes(),
        &series.stops,
        &series.tp1s,
    );
    debug!(
        symbol,
        timeframe,
        signals = series.signal_count(),
        trades = result.trades,
        "backtest complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use crate::setups::fixtures::uptrend_with_dip;

    #[test]
    fn win_win_loss_statistics() {
        let r = summarize("BTC/USDT", "4h", &[1.0, 1.0, -1.0]);
        assert_eq!(r.trades, 3);
        assert_eq!(r.wins, 2);
        assert_eq!(r.losses, 1);
        assert_approx(r.win_rate, 2.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(r.avg_r, 1.0 / 3.0, DEFAULT_EPSILON);
        assert_eq!(r.expectancy, r.avg_r);
        assert_approx(r.profit_factor, 2.0, DEFAULT_EPSILON);
        assert_approx(r.max_drawdown_r, 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn no_losses_is_infinite_profit_factor() {
        let r = summarize("X", "1h", &[1.0, 1.0]);
        assert!(r.profit_factor.is_infinite());
        assert_eq!(r.max_drawdown_r, 0.0);
    }

    #[test]
    fn drawdown_from_initial_losses() {
        let r = summarize("X", "1h", &[-1.0, -1.0, 1.0]);
        assert_approx(r.max_drawdown_r, 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_trades_is_all_zero() {
        let r = summarize("X", "1h", &[]);
        assert_eq!(r, BacktestResult::empty("X", "1h"));
    }

    #[test]
    fn target_hit_scores_plus_one() {
        let closes = [100.0, 100.5, 102.0, 98.0];
        let stops = [99.0, 0.0, 0.0, 0.0];
        let tp1s = [101.0, 0.0, 0.0, 0.0];
        assert_eq!(simulate_r_series(&closes, &stops, &tp1s), vec![1.0]);
    }

    #[test]
    fn stop_hit_scores_minus_one() {
        let closes = [100.0, 99.5, 99.0, 105.0];
        let stops = [99.0, 0.0, 0.0, 0.0];
        let tp1s = [101.0, 0.0, 0.0, 0.0];
        assert_eq!(simulate_r_series(&closes, &stops, &tp1s), vec![-1.0]);
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let closes = [100.0, 100.0, 0.0, 200.0];
        // stop above entry, zero stop, zero entry
        let stops = [101.0, 0.0, 1.0, 0.0];
        let tp1s = [102.0, 102.0, 2.0, 0.0];
        assert!(simulate_r_series(&closes, &stops, &tp1s).is_empty());
    }

    #[test]
    fn unresolved_trade_is_dropped() {
        let closes = [100.0, 100.2, 100.4, 100.1];
        let stops = [99.0, 0.0, 0.0, 0.0];
        let tp1s = [101.0, 0.0, 0.0, 0.0];
        let r = run_backtest("X", "1h", &closes, &stops, &tp1s);
        assert_eq!(r.trades, 0);
    }

    #[test]
    fn horizon_is_capped() {
        // Target is only reached on bar 80, one past the horizon.
        let mut closes = vec![100.0; 100];
        closes[80] = 110.0;
        let mut stops = vec![0.0; 100];
        let mut tp1s = vec![0.0; 100];
        stops[0] = 90.0;
        tp1s[0] = 105.0;
        assert!(simulate_r_series(&closes, &stops, &tp1s).is_empty());

        closes[79] = 110.0;
        assert_eq!(simulate_r_series(&closes, &stops, &tp1s), vec![1.0]);
    }

    #[test]
    fn short_stop_series_limits_entries() {
        let closes = [100.0, 101.0, 102.0, 99.0, 103.0, 104.0, 98.0, 105.0];
        let r = run_backtest("X/USDT", "1h", &closes, &[99.0, 99.0, 99.0], &[101.0; 3]);
        assert_eq!(r.symbol, "X/USDT");
        // Entries 0 and 1 hit 101+ on the next bars; entry 2 hits the stop.
        assert_eq!(r.trades, 3);
        assert_eq!(r.wins, 2);
    }

    #[test]
    fn backtest_is_deterministic() {
        let closes = [100.0, 102.0, 98.0, 101.0, 97.0, 104.0];
        let stops = [98.5, 99.0, 96.0, 0.0, 95.0, 0.0];
        let tp1s = [101.5, 104.0, 100.0, 0.0, 99.0, 0.0];
        let a = run_backtest("X", "1h", &closes, &stops, &tp1s);
        let b = run_backtest("X", "1h", &closes, &stops, &tp1s);
        assert_eq!(a, b);
        assert_eq!(a.max_drawdown_r.to_bits(), b.max_drawdown_r.to_bits());
    }

    #[test]
    fn plan_series_has_no_signal_before_warmup_or_on_last_bar() {
        let (closes, lows) = uptrend_with_dip(120);
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let w = CandleWindow::new(highs, lows, closes).unwrap();
        let series = build_plan_series(
            &w,
            "X",
            &PullbackConfig::default(),
            &BreakoutRetestConfig::default(),
            100,
        );
        assert_eq!(series.stops.len(), 120);
        assert!(series.stops[..100].iter().all(|&s| s == 0.0));
        assert_eq!(series.stops[119], 0.0);
        assert!(series.signal_count() > 0);
        for i in 0..120 {
            if series.stops[i] > 0.0 {
                assert!(series.stops[i] < w.closes()[i]);
                assert!(series.tp1s[i] > w.closes()[i]);
            }
        }
    }

    #[test]
    fn plan_series_does_not_look_ahead() {
        let (closes, lows) = uptrend_with_dip(120);
        let highs: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
        let full = CandleWindow::new(highs, lows, closes).unwrap();
        let pb = PullbackConfig::default();
        let br = BreakoutRetestConfig::default();

        let series_full = build_plan_series(&full, "X", &pb, &br, 90);
        let prefix = full.truncated(105);
        let series_prefix = build_plan_series(&prefix, "X", &pb, &br, 90);

        // Bars strictly before the prefix's last bar must agree.
        assert_eq!(&series_prefix.stops[..105], &series_full.stops[..105]);
        assert_eq!(&series_prefix.tp1s[..105], &series_full.tp1s[..105]);
    }
}
