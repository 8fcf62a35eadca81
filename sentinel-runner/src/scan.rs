//! Regime and setup scan across a universe of pairs.
//!
//! Pair selection is sequential; per-symbol evaluation runs in parallel with
//! rayon and the report keeps selection order. Symbols whose candles fail to
//! load are logged and left out of the report.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sentinel_core::universe::{is_stablecoin_pair, is_usdt_pair, rank_quality_pairs};
use sentinel_core::{
    assess_regime, detect_setup, size_plan, CandleWindow, MarketInfo, MarketRegime,
    PositionSizing, TradePlan,
};

use crate::briefing::{build_briefing, BriefingRow};
use crate::config::SentinelConfig;
use crate::data_loader::{format_timestamp, CandleSource, LoadError};
use crate::presets::TradingPreset;

/// Default number of rows reported.
pub const DEFAULT_SCAN_LIMIT: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOptions {
    pub timeframe: String,
    pub bars: usize,
    /// Maximum rows in the report.
    pub limit: usize,
    /// Maximum pairs evaluated after filtering and ranking.
    pub max_pairs: usize,
    /// Rank by quote volume and apply the liquidity floor.
    pub quality: bool,
    /// Overrides `[quality] min_quote_volume_usdt`.
    pub min_qv: Option<f64>,
    pub exclude_stables: bool,
    /// Run the setup detectors on TREND pairs.
    pub setups: bool,
    /// Attach the trader briefing.
    pub brief: bool,
}

impl ScanOptions {
    pub fn from_preset(preset: TradingPreset) -> Self {
        Self {
            timeframe: preset.timeframe().to_string(),
            bars: preset.bars(),
            limit: DEFAULT_SCAN_LIMIT,
            max_pairs: preset.max_pairs(),
            quality: false,
            min_qv: None,
            exclude_stables: false,
            setups: false,
            brief: false,
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from_preset(TradingPreset::Swing)
    }
}

/// One evaluated pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRow {
    pub symbol: String,
    pub regime: MarketRegime,
    pub atr_pct: f64,
    pub trend_strength: f64,
    pub action: String,
    pub note: String,
    pub plan: Option<TradePlan>,
    pub sizing: Option<PositionSizing>,
    /// Close time of the newest candle, RFC 3339.
    pub last_candle: Option<String>,
}

impl From<&ScanRow> for BriefingRow {
    fn from(row: &ScanRow) -> Self {
        BriefingRow {
            symbol: row.symbol.clone(),
            regime: row.regime,
            action: row.action.clone(),
            note: row.note.clone(),
        }
    }
}

/// Filtered pair list, reported without any regime analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairList {
    /// Pairs left after filtering and ranking.
    pub count: usize,
    /// Alphabetical, at most `limit` entries.
    pub pairs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub timeframe: String,
    pub bars: usize,
    /// Pairs left after filtering and ranking, before the `max_pairs` cap.
    pub pairs_found: usize,
    pub pairs_analyzed: usize,
    pub rows: Vec<ScanRow>,
    pub briefing: Option<String>,
}

// ── Labels ──

/// `A+ <SETUP> <STATUS>` for a plan, otherwise the regime's default action.
pub fn action_label(regime: MarketRegime, plan: Option<&TradePlan>) -> String {
    if let Some(plan) = plan {
        return format!("A+ {} {}", plan.setup(), plan.status());
    }
    match regime {
        MarketRegime::Trend => "trade-allowed",
        MarketRegime::Range => "limited",
        MarketRegime::Chaos => "NO TRADE",
    }
    .to_string()
}

pub fn note_label(
    regime: MarketRegime,
    plan: Option<&TradePlan>,
    sizing: Option<&PositionSizing>,
) -> String {
    match (plan, sizing) {
        (Some(_), Some(s)) => format!(
            "risk {:.2} | notional≈{:.0} | SL {:.2}%",
            s.risk_usdt, s.notional_usdt, s.stop_distance_pct
        ),
        (Some(_), None) => "sizing unavailable".to_string(),
        (None, _) => match regime {
            MarketRegime::Trend => "Trend only → wait A+",
            MarketRegime::Range => "Range → avoid chop",
            MarketRegime::Chaos => "Chaos → protect capital",
        }
        .to_string(),
    }
}

// ── Scan ──

/// Apply the USDT, stablecoin and quality filters, keeping ranking order.
fn filter_pairs(
    universe: &[String],
    markets: Option<&[MarketInfo]>,
    cfg: &SentinelConfig,
    opts: &ScanOptions,
) -> Vec<String> {
    let pairs: Vec<String> = universe
        .iter()
        .filter(|s| is_usdt_pair(s))
        .filter(|s| !(opts.exclude_stables && is_stablecoin_pair(s)))
        .cloned()
        .collect();

    if opts.quality {
        let infos: Vec<MarketInfo> = pairs
            .iter()
            .map(|symbol| {
                markets
                    .and_then(|ms| ms.iter().find(|m| &m.symbol == symbol))
                    .cloned()
                    .unwrap_or_else(|| MarketInfo::new(symbol.as_str()))
            })
            .collect();
        return rank_quality_pairs(&infos, &cfg.pair_filter_config(opts.min_qv));
    }
    pairs
}

/// Apply the pair filters and the `max_pairs` cap.
///
/// Returns the selection and the count before the cap.
pub fn select_pairs(
    universe: &[String],
    markets: Option<&[MarketInfo]>,
    cfg: &SentinelConfig,
    opts: &ScanOptions,
) -> (Vec<String>, usize) {
    let mut pairs = filter_pairs(universe, markets, cfg, opts);
    let found = pairs.len();
    pairs.truncate(opts.max_pairs);
    debug!(found, selected = pairs.len(), "pair selection");
    (pairs, found)
}

/// Evaluate one symbol: regime, optional setup, sizing and labels.
pub fn evaluate_symbol(
    source: &dyn CandleSource,
    symbol: &str,
    cfg: &SentinelConfig,
    opts: &ScanOptions,
) -> Result<ScanRow, LoadError> {
    let candles = source.candles(symbol, &opts.timeframe, opts.bars)?;
    let window = CandleWindow::from_candles(&candles);
    let reading = assess_regime(&window, &cfg.regime_config());

    let plan = if opts.setups && reading.regime == MarketRegime::Trend {
        detect_setup(
            window.closes(),
            window.lows(),
            symbol,
            &cfg.pullback_config(),
            &cfg.breakout_config(),
        )
    } else {
        None
    };
    let sizing = plan.as_ref().and_then(|p| size_plan(p, &cfg.risk_config()));

    debug!(
        symbol,
        regime = %reading.regime,
        atr_pct = reading.atr_pct,
        trend = reading.trend_strength,
        setup = plan.as_ref().map(|p| p.setup().as_str()),
        "evaluated"
    );

    Ok(ScanRow {
        symbol: symbol.to_string(),
        regime: reading.regime,
        atr_pct: reading.atr_pct,
        trend_strength: reading.trend_strength,
        action: action_label(reading.regime, plan.as_ref()),
        note: note_label(reading.regime, plan.as_ref(), sizing.as_ref()),
        plan,
        sizing,
        last_candle: candles.last().and_then(|c| format_timestamp(c.timestamp_ms)),
    })
}

pub fn run_scan(
    source: &dyn CandleSource,
    universe: &[String],
    markets: Option<&[MarketInfo]>,
    cfg: &SentinelConfig,
    opts: &ScanOptions,
) -> ScanReport {
    let (pairs, pairs_found) = select_pairs(universe, markets, cfg, opts);

    let evaluated: Vec<Result<ScanRow, LoadError>> = pairs
        .par_iter()
        .map(|symbol| evaluate_symbol(source, symbol, cfg, opts))
        .collect();

    let mut rows = Vec::with_capacity(evaluated.len());
    for (symbol, result) in pairs.iter().zip(evaluated) {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(symbol = %symbol, error = %e, "skipping symbol"),
        }
    }
    rows.truncate(opts.limit);

    let briefing = opts.brief.then(|| {
        let brief_rows: Vec<BriefingRow> = rows.iter().map(BriefingRow::from).collect();
        build_briefing(&brief_rows)
    });

    info!(
        timeframe = %opts.timeframe,
        analyzed = pairs.len(),
        rows = rows.len(),
        setups = rows.iter().filter(|r| r.plan.is_some()).count(),
        "scan complete"
    );

    ScanReport {
        timeframe: opts.timeframe.clone(),
        bars: opts.bars,
        pairs_found,
        pairs_analyzed: pairs.len(),
        rows,
        briefing,
    }
}

/// The filtered universe, sorted and cut at `opts.limit`. No candles are read.
pub fn list_pairs(
    universe: &[String],
    markets: Option<&[MarketInfo]>,
    cfg: &SentinelConfig,
    opts: &ScanOptions,
) -> PairList {
    let mut pairs = filter_pairs(universe, markets, cfg, opts);
    let count = pairs.len();
    pairs.sort();
    pairs.truncate(opts.limit);
    info!(count, listed = pairs.len(), "pair list");
    PairList { count, pairs }
}

// ── Text output ──

pub fn format_pair_list(list: &PairList) -> String {
    let mut lines = vec![format!("USDT pairs found: {}", list.count), "-".repeat(40)];
    lines.extend(list.pairs.iter().cloned());
    lines.join("\n") + "\n"
}

const TABLE_WIDTH: usize = 70;

/// Fixed-width scan table, followed by the briefing when present.
pub fn format_scan_text(report: &ScanReport) -> String {
    let rule = "-".repeat(TABLE_WIDTH);
    let mut lines = vec![
        format!("USDT pairs found: {}", report.pairs_found),
        format!(
            "Regime analysis on: {} pairs | tf={} bars={}",
            report.pairs_analyzed, report.timeframe, report.bars
        ),
        rule.clone(),
        format!(
            "{:<16} {:<8} {:>7} {:>7}  ACTION",
            "SYMBOL", "REGIME", "ATR%", "TREND"
        ),
        rule,
    ];

    for row in &report.rows {
        lines.push(format!(
            "{:<16} {:<8} {:>7.2} {:>7.3}  {}",
            row.symbol,
            row.regime.as_str(),
            row.atr_pct,
            row.trend_strength,
            row.action
        ));
        if let (Some(plan), Some(s)) = (&row.plan, &row.sizing) {
            lines.push(format!(
                "  ↳ ENTRY≈{:.6} SL={:.6} TP1={:.6} TP2={:.6}",
                plan.entry_ref(),
                plan.stop(),
                plan.tp1(),
                plan.tp2()
            ));
            lines.push(format!(
                "     SIZE≈{:.6} units | NOTIONAL≈{:.2} | STOP={:.2}%",
                s.size_units, s.notional_usdt, s.stop_distance_pct
            ));
            lines.push(format!("     TRIGGER: {}", plan.entry_trigger()));
        }
    }

    let mut text = lines.join("\n");
    match &report.briefing {
        Some(brief) => {
            text.push_str("\n\n");
            text.push_str(brief);
        }
        None => text.push('\n'),
    }
    text
}
