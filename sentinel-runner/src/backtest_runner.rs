//! Backtests over a (symbol × timeframe) grid.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use sentinel_core::{backtest_window, BacktestResult, CandleWindow, DEFAULT_BACKTEST_WARMUP};

use crate::config::SentinelConfig;
use crate::data_loader::{dataset_hash, CandleSource};

/// Windows shorter than this are not backtested.
pub const MIN_BACKTEST_BARS: usize = 200;

/// Default history requested per (symbol, timeframe).
pub const DEFAULT_BACKTEST_BARS: usize = 800;

/// A grid cell that produced no result, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRun {
    pub symbol: String,
    pub timeframe: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    pub pairs: Vec<String>,
    pub timeframes: Vec<String>,
    pub bars: usize,
    /// BLAKE3 over every window that was backtested.
    pub dataset_hash: String,
    pub synthetic: bool,
    pub results: Vec<BacktestResult>,
    pub skipped: Vec<SkippedRun>,
}

enum Cell {
    Done(BacktestResult, CandleWindow),
    Skipped(SkippedRun),
}

fn run_cell(
    source: &dyn CandleSource,
    symbol: &str,
    timeframe: &str,
    bars: usize,
    cfg: &SentinelConfig,
) -> Cell {
    let skip = |reason: String| {
        warn!(symbol, timeframe, %reason, "skipping backtest");
        Cell::Skipped(SkippedRun {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            reason,
        })
    };

    let window = match source.window(symbol, timeframe, bars) {
        Ok(w) => w,
        Err(e) => return skip(e.to_string()),
    };
    if window.len() < MIN_BACKTEST_BARS {
        return skip(format!(
            "only {} bars, need at least {MIN_BACKTEST_BARS}",
            window.len()
        ));
    }

    let result = backtest_window(
        symbol,
        timeframe,
        &window,
        &cfg.pullback_config(),
        &cfg.breakout_config(),
        DEFAULT_BACKTEST_WARMUP,
    );
    Cell::Done(result, window)
}

/// Backtest every (symbol, timeframe) pair. Results keep grid order,
/// symbols outermost.
pub fn run_backtests(
    source: &dyn CandleSource,
    symbols: &[String],
    timeframes: &[String],
    bars: usize,
    cfg: &SentinelConfig,
) -> BacktestReport {
    let grid: Vec<(&String, &String)> = symbols
        .iter()
        .flat_map(|s| timeframes.iter().map(move |tf| (s, tf)))
        .collect();

    let cells: Vec<Cell> = grid
        .par_iter()
        .map(|(symbol, timeframe)| run_cell(source, symbol, timeframe, bars, cfg))
        .collect();

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    let mut windows = Vec::new();
    for cell in cells {
        match cell {
            Cell::Done(result, window) => {
                windows.push((format!("{}@{}", result.symbol, result.timeframe), window));
                results.push(result);
            }
            Cell::Skipped(s) => skipped.push(s),
        }
    }

    let synthetic = symbols.iter().any(|s| source.is_synthetic(s));
    let report = BacktestReport {
        pairs: symbols.to_vec(),
        timeframes: timeframes.to_vec(),
        bars,
        dataset_hash: dataset_hash(&windows),
        synthetic,
        results,
        skipped,
    };
    info!(
        runs = report.results.len(),
        skipped = report.skipped.len(),
        trades = report.results.iter().map(|r| r.trades).sum::<usize>(),
        "backtests complete"
    );
    report
}

/// Fixed-width result table.
pub fn format_backtest_table(results: &[BacktestResult]) -> String {
    let rule = "-".repeat(90);
    let mut lines = vec![
        "SENTINEL backtest-lite (TP1=+1R, SL=-1R using candle closes)".to_string(),
        rule.clone(),
        format!(
            "{:<12}{:<6}{:>8}{:>8}{:>10}{:>10}{:>10}",
            "SYMBOL", "TF", "TRADES", "WIN%", "AVG_R", "PF", "MDD_R"
        ),
        rule,
    ];
    for r in results {
        lines.push(format!(
            "{:<12}{:<6}{:>8}{:>8.1}{:>10.3}{:>10.2}{:>10.2}",
            r.symbol,
            r.timeframe,
            r.trades,
            r.win_rate * 100.0,
            r.avg_r,
            r.profit_factor,
            r.max_drawdown_r
        ));
    }
    lines.join("\n") + "\n"
}

/// Table plus provenance and skip notes.
pub fn format_backtest_text(report: &BacktestReport) -> String {
    let mut text = format_backtest_table(&report.results);
    for s in &report.skipped {
        text.push_str(&format!(
            "skipped {} {}: {}\n",
            s.symbol, s.timeframe, s.reason
        ));
    }
    text.push_str(&format!("dataset {}", report.dataset_hash));
    if report.synthetic {
        text.push_str(" (includes synthetic data)");
    }
    text.push('\n');
    text
}
