use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use combinadas::combinations::{
    AllocatorConfig, Allocation, RiskCategory, SkipReason, allocate, qualifying_pool,
};
use combinadas::fixture::Slate;
use combinadas::model_config::ModelConfig;
use combinadas::report::{Execution, Report, generate_report};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn report() -> Report {
    let slate: Slate =
        serde_json::from_str(&read_fixture("jornada.json")).expect("slate should parse");
    generate_report(&slate, &ModelConfig::default(), Execution::Parallel).expect("report")
}

fn allocation() -> Allocation {
    allocate(&report(), &AllocatorConfig::default()).expect("allocation")
}

#[test]
fn pool_is_filtered_and_sorted() {
    let report = report();
    let pool = qualifying_pool(&report, &AllocatorConfig::default());
    assert_eq!(pool.len(), 30);
    assert!(pool.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    assert!(pool.iter().all(|l| l.confidence >= 70.0 && l.price > 1.0));
    assert_eq!(pool[0].fixture_id, 7);
    assert_eq!(pool[0].confidence, 88.4);
    // Equal confidence keeps report order.
    assert_eq!(pool[1].fixture_id, 12);
}

#[test]
fn strategies_run_in_order_until_the_pool_runs_dry() {
    let a = allocation();
    let legs: Vec<Vec<u32>> = a
        .parlays
        .iter()
        .map(|p| p.legs.iter().map(|l| l.fixture_id).collect())
        .collect();
    assert_eq!(
        legs,
        vec![
            vec![7, 12, 13],
            vec![11, 14, 8, 9],
            vec![11, 8, 12],
            vec![7, 5, 15, 3, 13],
            vec![6, 15, 4, 1],
            vec![5, 14, 16, 2, 10, 1],
            vec![16, 4, 3, 2, 9],
        ]
    );
    let names: Vec<&str> = a.parlays.iter().map(|p| p.strategy.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Value Safe",
            "Medium Value",
            "Quick Win",
            "Power Combo",
            "Smart Pick",
            "High Stakes",
            "Risk-Reward"
        ]
    );
    assert_eq!(a.parlays[5].category, RiskCategory::High);

    assert_eq!(a.skipped.len(), 1);
    assert_eq!(a.skipped[0].strategy, "Monster Combo");
    assert_eq!(
        a.skipped[0].reason,
        SkipReason::NotEnoughPicks {
            available: 0,
            required: 7
        }
    );
}

#[test]
fn no_pick_is_reused_and_no_parlay_repeats_a_fixture() {
    let a = allocation();
    let mut seen = HashSet::new();
    for parlay in &a.parlays {
        let fixtures: HashSet<u32> = parlay.legs.iter().map(|l| l.fixture_id).collect();
        assert_eq!(fixtures.len(), parlay.legs.len(), "{}", parlay.id);
        for id in parlay.pick_ids() {
            assert!(seen.insert(id), "{id:?} used twice");
        }
    }
    // The whole pool is consumed exactly once.
    assert_eq!(seen.len(), a.pool_size);
    assert_eq!(a.stats.total_legs, 30);
}

#[test]
fn first_parlay_numbers() {
    let a = allocation();
    let p = &a.parlays[0];
    assert_eq!(p.id, "comb_001");
    assert!((p.combined_price - 5.355).abs() < 1e-3);
    assert!((p.combined_probability - 0.6861).abs() < 1e-3);
    assert!((p.expected_roi - (p.combined_price - 1.0) * p.combined_probability).abs() < 1e-12);
    assert!(p.kelly_percent >= 0.0 && p.kelly_percent <= 5.0);
    assert_eq!(p.name, format!("Value Safe - price {:.2}", p.combined_price));

    let leg = &p.legs[0];
    assert_eq!(leg.fixture, "RCD Mallorca vs Real Betis");
    assert_eq!(leg.competition, "LaLiga EA Sports");
    assert_eq!(leg.prediction, "Over 2.5");
    assert_eq!(leg.date.to_string(), "2026-02-15");
    assert_eq!(leg.time.format("%H:%M").to_string(), "16:15");
}

#[test]
fn stats_cover_emitted_parlays() {
    let a = allocation();
    assert_eq!(a.stats.total, 7);
    let max = a
        .parlays
        .iter()
        .map(|p| p.combined_price)
        .fold(f64::MIN, f64::max);
    let min = a
        .parlays
        .iter()
        .map(|p| p.combined_price)
        .fold(f64::MAX, f64::min);
    assert_eq!(a.stats.max_price, max);
    assert_eq!(a.stats.min_price, min);
    assert!((min - 4.356).abs() < 1e-3);
    assert!((max - 32.8409).abs() < 1e-3);
}

#[test]
fn raising_the_threshold_shrinks_to_nothing() {
    let cfg = AllocatorConfig {
        min_confidence: 88.0,
        ..AllocatorConfig::default()
    };
    let a = allocate(&report(), &cfg).expect("allocation");
    assert_eq!(a.pool_size, 2);
    assert!(a.parlays.is_empty());
    assert!(
        a.skipped
            .iter()
            .all(|s| matches!(s.reason, SkipReason::PoolTooSmall { .. }))
    );
}

#[test]
fn allocation_json_shape() {
    let a = allocation();
    let value = serde_json::to_value(&a).expect("serialize");
    assert_eq!(value["parlays"][0]["status"], "pending");
    assert_eq!(value["parlays"][0]["category"], "safe");
    assert_eq!(value["parlays"][6]["category"], "medium-high");
    assert_eq!(value["skipped"][0]["reason"], "not_enough_picks");
    assert_eq!(value["skipped"][0]["required"], 7);
}
