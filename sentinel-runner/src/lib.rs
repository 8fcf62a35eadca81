//! Sentinel Runner: scan and backtest orchestration.
//!
//! This crate builds on `sentinel-core` to provide:
//! - `sentinel.toml` configuration with validation
//! - Trading-style presets
//! - Candle loading from CSV directories with a synthetic fallback
//! - Parallel regime/setup scans and the trader briefing
//! - Backtests over a symbol × timeframe grid
//! - Text and JSON export

pub mod backtest_runner;
pub mod briefing;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod presets;
pub mod scan;

pub use backtest_runner::{
    format_backtest_table, format_backtest_text, run_backtests, BacktestReport, SkippedRun,
    DEFAULT_BACKTEST_BARS, MIN_BACKTEST_BARS,
};
pub use briefing::{build_briefing, BriefingRow};
pub use config::{ConfigError, SentinelConfig, DEFAULT_CONFIG_FILE};
pub use data_loader::{
    dataset_hash, discover_symbols, load_candles, load_tickers, load_window, synthetic_candles,
    CandleSource, CandleStore, LoadError,
};
pub use export::{to_json_string, write_json, write_text, ExportError};
pub use presets::{PresetSummary, TradingPreset};
pub use scan::{
    format_pair_list, format_scan_text, list_pairs, run_scan, PairList, ScanOptions, ScanReport,
    ScanRow,
};
