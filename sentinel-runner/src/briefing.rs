//! Plain-text trader briefing built from scan rows.

use sentinel_core::MarketRegime;

const RULE_WIDTH: usize = 78;
const MAX_TREND_ROWS: usize = 20;
const MAX_RANGE_ROWS: usize = 15;
const MAX_CHAOS_ROWS: usize = 15;

/// The slice of a scan row the briefing needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BriefingRow {
    pub symbol: String,
    pub regime: MarketRegime,
    pub action: String,
    pub note: String,
}

impl BriefingRow {
    fn is_setup(&self) -> bool {
        self.action.starts_with("A+")
    }
}

/// Render the briefing. Rows keep their scan order within each section.
pub fn build_briefing(rows: &[BriefingRow]) -> String {
    if rows.is_empty() {
        return "No briefing rows.\n".to_string();
    }

    let setups: Vec<&BriefingRow> = rows.iter().filter(|r| r.is_setup()).collect();
    let trend: Vec<&BriefingRow> = rows
        .iter()
        .filter(|r| r.regime == MarketRegime::Trend && !r.is_setup())
        .collect();
    let ranges: Vec<&BriefingRow> = rows
        .iter()
        .filter(|r| r.regime == MarketRegime::Range)
        .collect();
    let chaos: Vec<&BriefingRow> = rows
        .iter()
        .filter(|r| r.regime == MarketRegime::Chaos)
        .collect();

    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out: Vec<String> = vec![
        heavy.clone(),
        "SENTINEL - TRADER BRIEFING (manual execution only)".to_string(),
        heavy.clone(),
    ];

    let mut section = |title: &str, lines: Vec<String>| {
        if lines.is_empty() {
            return;
        }
        out.push(format!("\n{title}"));
        out.push(light.clone());
        out.extend(lines);
    };

    section(
        "A+ SETUPS (prioritize)",
        setups
            .iter()
            .map(|r| bullet(&format!("{}: {}  {}", r.symbol, r.action, r.note)))
            .collect(),
    );
    section(
        "TREND WATCHLIST (wait for A+ confirmation)",
        trend
            .iter()
            .take(MAX_TREND_ROWS)
            .map(|r| bullet(&format!("{}: {}", r.symbol, r.note)))
            .collect(),
    );
    section(
        "RANGE / LIMITED (avoid forcing)",
        ranges
            .iter()
            .take(MAX_RANGE_ROWS)
            .map(|r| bullet(&format!("{}: {}", r.symbol, r.note)))
            .collect(),
    );
    section(
        "CHAOS (NO TRADE)",
        chaos
            .iter()
            .take(MAX_CHAOS_ROWS)
            .map(|r| bullet(&format!("{}: protect capital", r.symbol)))
            .collect(),
    );

    out.push("\nRISK RULES (v1)".to_string());
    out.push(light);
    out.push("- Risk per trade: keep small (default 1 USDT).".to_string());
    out.push("- Daily rule: stop after -2R.".to_string());
    out.push("- Only trade A+ setups. TREND alone is not an entry.".to_string());
    out.push(heavy);

    out.join("\n") + "\n"
}

fn bullet(body: &str) -> String {
    format!("- {}", body.trim_end())
}
