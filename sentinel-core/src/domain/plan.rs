//! Trade plans emitted by the setup detectors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Only long setups are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetupKind {
    Pullback,
    BreakoutRetest,
}

impl SetupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupKind::Pullback => "PULLBACK",
            SetupKind::BreakoutRetest => "BREAKOUT_RETEST",
        }
    }
}

impl fmt::Display for SetupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WATCH awaits confirmation; READY means the confirmation condition holds now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Watch,
    Ready,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Watch => "WATCH",
            PlanStatus::Ready => "READY",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A long trade idea with structure-based stop and 1R / 2R targets.
///
/// Built only from finite prices with `entry_ref - stop > 0`, so
/// `stop < entry_ref < tp1 < tp2` always holds. Fields are read-only after
/// construction, and the type is never deserialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradePlan {
    symbol: String,
    direction: Direction,
    setup: SetupKind,
    status: PlanStatus,
    entry_ref: f64,
    stop: f64,
    tp1: f64,
    tp2: f64,
    entry_trigger: String,
    notes: String,
}

impl TradePlan {
    /// Build a plan from an entry and a stop, deriving the 1R and 2R targets.
    ///
    /// Returns `None` when either price is non-finite, the stop is
    /// non-positive or not below the entry, or a target overflows.
    pub fn long_from_stop(
        symbol: &str,
        setup: SetupKind,
        status: PlanStatus,
        entry_ref: f64,
        stop: f64,
        entry_trigger: String,
        notes: String,
    ) -> Option<Self> {
        if !entry_ref.is_finite() || !stop.is_finite() {
            return None;
        }
        if stop <= 0.0 || stop >= entry_ref {
            return None;
        }
        let risk = entry_ref - stop;
        if risk <= 0.0 {
            return None;
        }
        let tp2 = entry_ref + 2.0 * risk;
        if !tp2.is_finite() {
            return None;
        }
        Some(Self {
            symbol: symbol.to_string(),
            direction: Direction::Long,
            setup,
            status,
            entry_ref,
            stop,
            tp1: entry_ref + risk,
            tp2,
            entry_trigger,
            notes,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn setup(&self) -> SetupKind {
        self.setup
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn entry_ref(&self) -> f64 {
        self.entry_ref
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn tp1(&self) -> f64 {
        self.tp1
    }

    pub fn tp2(&self) -> f64 {
        self.tp2
    }

    pub fn entry_trigger(&self) -> &str {
        &self.entry_trigger
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Initial risk per unit (entry minus stop).
    pub fn risk(&self) -> f64 {
        self.entry_ref - self.stop
    }
}
