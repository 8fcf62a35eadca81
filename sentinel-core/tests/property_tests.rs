//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Plan ordering: every emitted plan has stop < entry < tp1 < tp2 with 1R / 2R targets
//! 2. Sizing identity: size * buffered stop distance equals the risk budget
//! 3. Backtest bounds: counts add up, rates stay in range, replay is deterministic
//! 4. Regime gating: nothing outside the ATR band is ever TREND
//! 5. EMA bounds: the average stays within the input range

use proptest::prelude::*;
use sentinel_core::{
    classify_regime, compute_position_sizing, detect_setup, indicators::ema, run_backtest,
    BreakoutRetestConfig, CandleWindow, MarketRegime, PullbackConfig, RegimeConfig, RiskConfig,
};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random-walk candle window with bars between `min` and `max`.
fn arb_window(min: usize, max: usize) -> impl Strategy<Value = CandleWindow> {
    prop::collection::vec((-0.03..0.035_f64, 0.0..0.02_f64), min..max).prop_map(|steps| {
        let mut closes = Vec::with_capacity(steps.len());
        let mut highs = Vec::with_capacity(steps.len());
        let mut lows = Vec::with_capacity(steps.len());
        let mut price = 100.0_f64;
        for (ret, wick) in steps {
            price *= 1.0 + ret;
            closes.push(price);
            highs.push(price * (1.0 + wick));
            lows.push(price * (1.0 - wick));
        }
        CandleWindow::new(highs, lows, closes).expect("equal lengths")
    })
}

fn arb_price() -> impl Strategy<Value = f64> {
    (0.01..50_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0 + 0.01)
}

// ── 1. Plan ordering ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn plans_respect_risk_reward_ordering(window in arb_window(60, 220)) {
        if let Some(plan) = detect_setup(
            window.closes(),
            window.lows(),
            "PROP/USDT",
            &PullbackConfig::default(),
            &BreakoutRetestConfig::default(),
        ) {
            let entry = plan.entry_ref();
            prop_assert!(plan.stop() > 0.0);
            prop_assert!(plan.stop() < entry);
            prop_assert!(entry < plan.tp1());
            prop_assert!(plan.tp1() < plan.tp2());
            let risk = entry - plan.stop();
            prop_assert!((plan.tp1() - (entry + risk)).abs() < 1e-9 * entry.max(1.0));
            prop_assert!((plan.tp2() - (entry + 2.0 * risk)).abs() < 1e-9 * entry.max(1.0));
            prop_assert_eq!(entry, window.last_close().unwrap());
        }
    }
}

// ── 2. Sizing identity ───────────────────────────────────────────────

proptest! {
    #[test]
    fn sizing_spends_exactly_the_risk_budget(
        entry in arb_price(),
        stop_frac in 0.01..0.99_f64,
        risk_usdt in 0.1..1_000.0_f64,
        fee_buffer_pct in 0.0..5.0_f64,
    ) {
        let stop = entry * stop_frac;
        let cfg = RiskConfig { risk_usdt, fee_buffer_pct };
        let s = compute_position_sizing(entry, stop, &cfg).expect("valid inputs");
        let adjusted = (entry - stop) * (1.0 + fee_buffer_pct / 100.0);
        prop_assert!((s.size_units * adjusted - risk_usdt).abs() < 1e-6 * risk_usdt);
        prop_assert!((s.notional_usdt - s.size_units * entry).abs() < 1e-9 * s.notional_usdt.max(1.0));
        prop_assert!(s.stop_distance_pct > 0.0 && s.stop_distance_pct < 100.0);
    }

    #[test]
    fn sizing_rejects_stop_at_or_above_entry(entry in arb_price(), above in 0.0..100.0_f64) {
        prop_assert!(compute_position_sizing(entry, entry + above, &RiskConfig::default()).is_none());
    }
}

// ── 3. Backtest bounds ───────────────────────────────────────────────

proptest! {
    #[test]
    fn backtest_counts_and_bounds(
        window in arb_window(10, 300),
        stop_fracs in prop::collection::vec(prop::option::of(0.9..0.999_f64), 10..300),
    ) {
        let closes = window.closes();
        let n = closes.len().min(stop_fracs.len());
        let mut stops = vec![0.0; n];
        let mut tp1s = vec![0.0; n];
        for i in 0..n {
            if let Some(f) = stop_fracs[i] {
                stops[i] = closes[i] * f;
                tp1s[i] = closes[i] + (closes[i] - stops[i]);
            }
        }

        let a = run_backtest("PROP/USDT", "1h", closes, &stops, &tp1s);
        let b = run_backtest("PROP/USDT", "1h", closes, &stops, &tp1s);
        prop_assert_eq!(&a, &b);

        let valid_entries = stops.iter().filter(|&&s| s > 0.0).count();
        prop_assert!(a.trades <= valid_entries);
        prop_assert_eq!(a.wins + a.losses, a.trades);
        prop_assert!((0.0..=1.0).contains(&a.win_rate));
        prop_assert!(a.max_drawdown_r >= 0.0);
        prop_assert!(a.max_drawdown_r <= a.losses as f64);
        prop_assert!(a.avg_r >= -1.0 && a.avg_r <= 1.0);
        prop_assert_eq!(a.expectancy, a.avg_r);
        if a.trades > 0 && a.losses == 0 {
            prop_assert!(a.profit_factor.is_infinite());
        }
    }
}

// ── 4. Regime gating ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn outside_atr_band_is_never_trend(
        atr in 0.0..50.0_f64,
        trend in 0.0..1.0_f64,
    ) {
        let cfg = RegimeConfig::default();
        let regime = classify_regime(atr, trend, &cfg);
        if atr < cfg.min_atr_pct {
            prop_assert_eq!(regime, MarketRegime::Range);
        } else if atr > cfg.max_atr_pct {
            prop_assert_eq!(regime, MarketRegime::Chaos);
        } else if trend >= cfg.min_trend_strength {
            prop_assert_eq!(regime, MarketRegime::Trend);
        }
    }
}

// ── 5. EMA bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ema_stays_within_input_range(
        values in prop::collection::vec(1.0..1_000.0_f64, 1..200),
        period in 1usize..60,
    ) {
        let e = ema(&values, period).unwrap();
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(e >= lo - 1e-9 && e <= hi + 1e-9);
    }
}
