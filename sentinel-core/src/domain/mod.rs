//! Domain types shared across the pipeline.

pub mod candle;
pub mod plan;

pub use candle::{Candle, CandleWindow};
pub use plan::{Direction, PlanStatus, SetupKind, TradePlan};
