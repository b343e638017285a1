//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Full size: universe instruments with data sit at exactly ±limit
//! 2. Universe filter: instruments outside the universe are always flat
//! 3. Direction: long iff the forecast is strictly above the latest price
//! 4. Determinism: repeated evaluation yields an identical mapping
//! 5. Decision rule: for any forecast and price, including NaN, infinities
//!    and ties, long iff forecast > price, and failures follow the policy

use proptest::prelude::*;
use std::collections::BTreeMap;

use foresight_core::{
    DecisionMapper, DecisionReason, Direction, FailurePolicy, ForecastFailure, ForecastModel,
    PositionLimits, SignalEngine, TrendSmoothing, INSTRUMENT_UNIVERSE,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_limit() -> impl Strategy<Value = f64> {
    (0.0..1000.0_f64).prop_map(|l| l.round())
}

fn arb_prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec((1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0), 1..60)
}

fn arb_universe_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(INSTRUMENT_UNIVERSE.to_vec())
}

fn arb_outsider_name() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_map(|s| format!("outsider {s}"))
}

/// Any price-like value, with the non-finite ones well represented.
fn arb_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -1.0e6..1.0e6_f64,
        1 => Just(f64::NAN),
        1 => prop_oneof![Just(f64::INFINITY), Just(f64::NEG_INFINITY)],
    ]
}

/// `(forecast, current)`, with exact ties generated on purpose.
fn arb_forecast_and_price() -> impl Strategy<Value = (f64, f64)> {
    prop_oneof![
        3 => (arb_value(), arb_value()),
        1 => arb_value().prop_map(|v| (v, v)),
    ]
}

fn arb_failure() -> impl Strategy<Value = ForecastFailure> {
    prop_oneof![
        (0usize..2).prop_map(|len| ForecastFailure::InsufficientData { len, required: 2 }),
        Just(ForecastFailure::NonFinite),
        Just(ForecastFailure::ZeroHorizon),
    ]
}

fn single_limit(name: &str, limit: f64) -> PositionLimits {
    let mut map = BTreeMap::new();
    map.insert(name.to_string(), limit);
    PositionLimits::new(map).unwrap()
}

// ── 1. Full size ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn universe_positions_are_full_size(
        name in arb_universe_name(),
        limit in arb_limit(),
        prices in arb_prices(),
    ) {
        let mut engine = SignalEngine::new(single_limit(name, limit));
        engine.load(name, prices).unwrap();
        let positions = engine.desired_positions().unwrap();
        prop_assert_eq!(positions[name].abs(), limit);
    }
}

// ── 2. Universe filter ───────────────────────────────────────────────

proptest! {
    #[test]
    fn outsiders_are_flat(
        name in arb_outsider_name(),
        limit in arb_limit(),
        prices in arb_prices(),
    ) {
        let mut engine = SignalEngine::new(single_limit(&name, limit));
        engine.load(&name, prices).unwrap();
        let positions = engine.desired_positions().unwrap();
        prop_assert_eq!(positions[&name], 0.0);
    }
}

// ── 3. Direction ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn long_iff_forecast_above_latest(
        name in arb_universe_name(),
        limit in (1.0..1000.0_f64),
        prices in arb_prices(),
    ) {
        let latest = *prices.last().unwrap();
        let forecast = TrendSmoothing::default().forecast(&prices, 1);

        let mut engine = SignalEngine::new(single_limit(name, limit));
        engine.load(name, prices).unwrap();
        let position = engine.desired_positions().unwrap()[name];

        match forecast {
            Ok(f) if f > latest => prop_assert_eq!(position, limit),
            _ => prop_assert_eq!(position, -limit),
        }
    }
}

// ── 4. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn evaluation_is_deterministic(
        limit in arb_limit(),
        a in arb_prices(),
        b in arb_prices(),
    ) {
        let mut map = BTreeMap::new();
        map.insert("Milk".to_string(), limit);
        map.insert("Red Pens".to_string(), limit);
        let mut engine = SignalEngine::new(PositionLimits::new(map).unwrap());
        engine.load("Milk", a).unwrap();
        engine.load("Red Pens", b).unwrap();

        let first = engine.desired_positions().unwrap();
        let second = engine.desired_positions().unwrap();
        prop_assert_eq!(first, second);
    }
}

// ── 5. Decision rule ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn decision_follows_forecast_vs_price(
        (forecast, current) in arb_forecast_and_price(),
        limit in (1.0..1000.0_f64),
    ) {
        let decision = DecisionMapper::default().decide(&Ok(forecast), current, limit);

        if forecast > current {
            prop_assert_eq!(decision.direction, Direction::Long);
            prop_assert_eq!(decision.reason, DecisionReason::ForecastAbove);
            prop_assert_eq!(decision.position, limit);
        } else {
            // Ties and any NaN land here.
            prop_assert_eq!(decision.direction, Direction::Short);
            prop_assert_eq!(decision.reason, DecisionReason::ForecastNotAbove);
            prop_assert_eq!(decision.position, -limit);
        }
    }

    #[test]
    fn failed_forecast_follows_policy(
        failure in arb_failure(),
        current in arb_value(),
        limit in (1.0..1000.0_f64),
    ) {
        let forecast = Err(failure);

        let short = DecisionMapper::new(FailurePolicy::Short).decide(&forecast, current, limit);
        prop_assert_eq!(short.direction, Direction::Short);
        prop_assert_eq!(short.reason, DecisionReason::ForecastFailed);
        prop_assert_eq!(short.position, -limit);

        let flat = DecisionMapper::new(FailurePolicy::Flat).decide(&forecast, current, limit);
        prop_assert_eq!(flat.direction, Direction::Flat);
        prop_assert_eq!(flat.reason, DecisionReason::ForecastFailed);
        prop_assert_eq!(flat.position, 0.0);
    }
}
