//! Pair universe filtering: which USDT pairs are worth scanning.
//!
//! Supplies the scanner with a pre-filtered, liquidity-ranked symbol list.
//! Symbols use the exchange-agnostic `BASE/QUOTE` form (e.g. `BTC/USDT`).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Base assets that are themselves stablecoins or fiat.
pub const STABLE_BASES: &[&str] = &[
    "USDT", "USDC", "FDUSD", "TUSD", "USDP", "BUSD", "DAI", "USD1", "USDE", "EUR", "EURC",
];

const LEVERAGED_SUFFIXES: &[&str] = &["UP/USDT", "DOWN/USDT", "BULL/USDT", "BEAR/USDT"];

/// Market metadata relevant to filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub symbol: String,
    /// `None` when the exchange does not report it; treated as active.
    pub active: Option<bool>,
    /// 24h quote volume in USDT, if known.
    pub quote_volume: Option<f64>,
}

impl MarketInfo {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            active: None,
            quote_volume: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairFilterConfig {
    pub exclude_leveraged_tokens: bool,
    /// Liquidity floor for quality ranking.
    pub min_quote_volume_usdt: f64,
    pub require_active: bool,
}

impl Default for PairFilterConfig {
    fn default() -> Self {
        Self {
            exclude_leveraged_tokens: true,
            min_quote_volume_usdt: 5_000_000.0,
            require_active: true,
        }
    }
}

pub fn is_usdt_pair(symbol: &str) -> bool {
    symbol.ends_with("/USDT")
}

pub fn is_stablecoin_pair(symbol: &str) -> bool {
    let base = symbol.split('/').next().unwrap_or("").trim().to_uppercase();
    STABLE_BASES.contains(&base.as_str())
}

pub fn is_leveraged_token(symbol: &str) -> bool {
    let upper = symbol.to_uppercase();
    LEVERAGED_SUFFIXES.iter().any(|suffix| upper.ends_with(suffix))
}

pub fn passes_market_filters(market: &MarketInfo, cfg: &PairFilterConfig) -> bool {
    if cfg.exclude_leveraged_tokens && is_leveraged_token(&market.symbol) {
        return false;
    }
    if cfg.require_active && !market.is_active() {
        return false;
    }
    true
}

/// Rank markets by quote volume, keeping those above the liquidity floor.
///
/// Markets failing [`passes_market_filters`] are dropped first. If no market
/// clears the floor, every survivor is returned in ranked order so a scan
/// never comes back empty on a quiet exchange.
pub fn rank_quality_pairs(markets: &[MarketInfo], cfg: &PairFilterConfig) -> Vec<String> {
    let mut scored: Vec<(&str, f64)> = markets
        .iter()
        .filter(|m| passes_market_filters(m, cfg))
        .map(|m| (m.symbol.as_str(), m.quote_volume.unwrap_or(0.0)))
        .collect();

    // Stable sort keeps input order among equal volumes.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let above: Vec<String> = scored
        .iter()
        .filter(|(_, qv)| *qv >= cfg.min_quote_volume_usdt)
        .map(|(s, _)| s.to_string())
        .collect();

    if above.is_empty() {
        scored.into_iter().map(|(s, _)| s.to_string()).collect()
    } else {
        above
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(symbol: &str, active: Option<bool>, qv: Option<f64>) -> MarketInfo {
        MarketInfo {
            symbol: symbol.into(),
            active,
            quote_volume: qv,
        }
    }

    #[test]
    fn stablecoin_detection_uses_base() {
        assert!(is_stablecoin_pair("USDC/USDT"));
        assert!(is_stablecoin_pair("fdusd/USDT"));
        assert!(!is_stablecoin_pair("BTC/USDT"));
        assert!(!is_stablecoin_pair("USDCX/USDT"));
    }

    #[test]
    fn leveraged_token_detection() {
        assert!(is_leveraged_token("BTCUP/USDT"));
        assert!(is_leveraged_token("ethbear/usdt"));
        assert!(!is_leveraged_token("SUPER/USDT"));
    }

    #[test]
    fn usdt_pair_detection() {
        assert!(is_usdt_pair("BTC/USDT"));
        assert!(!is_usdt_pair("BTC/USDC"));
    }

    #[test]
    fn unknown_active_flag_counts_as_active() {
        let cfg = PairFilterConfig::default();
        assert!(passes_market_filters(&market("BTC/USDT", None, None), &cfg));
        assert!(!passes_market_filters(
            &market("BTC/USDT", Some(false), None),
            &cfg
        ));
        let lenient = PairFilterConfig {
            require_active: false,
            ..cfg
        };
        assert!(passes_market_filters(
            &market("BTC/USDT", Some(false), None),
            &lenient
        ));
    }

    #[test]
    fn ranking_orders_by_volume_and_applies_floor() {
        let markets = vec![
            market("ADA/USDT", None, Some(6e6)),
            market("BTC/USDT", Some(true), Some(9e8)),
            market("XYZ/USDT", None, Some(1e5)),
            market("ETHUP/USDT", None, Some(1e9)),
            market("DEAD/USDT", Some(false), Some(1e9)),
        ];
        let ranked = rank_quality_pairs(&markets, &PairFilterConfig::default());
        assert_eq!(ranked, vec!["BTC/USDT".to_string(), "ADA/USDT".to_string()]);
    }

    #[test]
    fn ranking_falls_back_to_all_survivors() {
        let markets = vec![
            market("AAA/USDT", None, Some(10.0)),
            market("BBB/USDT", None, None),
            market("CCC/USDT", None, Some(20.0)),
        ];
        let ranked = rank_quality_pairs(&markets, &PairFilterConfig::default());
        assert_eq!(ranked, vec!["CCC/USDT", "AAA/USDT", "BBB/USDT"]);
    }
}
