//! Sentinel Core: the read-only signal pipeline.
//!
//! This crate turns a window of candles into trade ideas a human can act on:
//! - Trend and volatility indicators (EMA, ATR%, trend strength)
//! - Market regime classification (TREND / RANGE / CHAOS)
//! - Structure helpers (swing lows, level proximity)
//! - Long setup detectors (pullback, breakout-retest)
//! - Fixed-risk position sizing
//! - An R-multiple backtest simulator for the setups
//!
//! Everything here is synchronous and side-effect free. Data acquisition,
//! configuration files and presentation live in `sentinel-runner`.

pub mod backtest;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod regime;
pub mod setups;
pub mod sizing;
pub mod structure;
pub mod universe;

pub use backtest::{
    backtest_window, build_plan_series, run_backtest, simulate_r_series, summarize,
    BacktestResult, PlanSeries, DEFAULT_BACKTEST_WARMUP, HORIZON_BARS,
};
pub use domain::{Candle, CandleWindow, Direction, PlanStatus, SetupKind, TradePlan};
pub use error::CoreError;
pub use regime::{assess_regime, classify_regime, MarketRegime, RegimeConfig, RegimeReading};
pub use setups::{
    detect_breakout_retest_long, detect_pullback_long, detect_setup, BreakoutRetestConfig,
    PullbackConfig,
};
pub use sizing::{compute_position_sizing, size_plan, PositionSizing, RiskConfig};
pub use universe::{MarketInfo, PairFilterConfig};
