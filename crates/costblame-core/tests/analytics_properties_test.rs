//! Behavioural tests for the delta, anomaly and time-window analytics.

use chrono::{TimeZone, Utc};
use costblame_core::analytics::{NEW_SPEND_PERCENT_SENTINEL, select_deltas};
use costblame_core::{CostMap, DetectorConfig, SeriesMap, Severity, TimeWindow, compute_deltas, compute_stats, detect_anomalies};
use std::collections::HashSet;

fn costs(entries: &[(&str, f64)]) -> CostMap {
    entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}

/// Deterministic pseudo-random cost maps over a shared key space.
fn generated_maps(seed: u64) -> (CostMap, CostMap) {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        state >> 33
    };
    let mut current = CostMap::new();
    let mut prior = CostMap::new();
    for i in 0..40 {
        let roll = next() % 4;
        let amount = (next() % 100_000) as f64 / 100.0;
        if roll != 0 {
            current.insert(format!("key-{i}"), amount);
        }
        if roll != 1 {
            prior.insert(format!("key-{i}"), (next() % 100_000) as f64 / 100.0);
        }
    }
    (current, prior)
}

#[test]
fn test_union_completeness() {
    for seed in 1..50 {
        let (current, prior) = generated_maps(seed);
        let union: HashSet<&String> = current.keys().chain(prior.keys()).collect();
        let deltas = compute_deltas(&current, &prior);
        assert_eq!(deltas.len(), union.len());
        let seen: HashSet<&String> = deltas.iter().map(|d| &d.key).collect();
        assert_eq!(seen.len(), deltas.len(), "each key appears once");
        assert_eq!(seen, union);
    }
}

#[test]
fn test_delta_arithmetic_and_order() {
    for seed in 1..50 {
        let (current, prior) = generated_maps(seed);
        let deltas = compute_deltas(&current, &prior);
        for d in &deltas {
            let curr = current.get(&d.key).copied().unwrap_or(0.0);
            let prev = prior.get(&d.key).copied().unwrap_or(0.0);
            assert_eq!(d.current_cost, curr);
            assert_eq!(d.prior_cost, prev);
            assert_eq!(d.absolute_delta, curr - prev);
            assert_eq!(d.is_new_spender, prev < 0.01 && curr >= 0.01);
        }
        assert!(deltas.windows(2).all(|w| w[0].absolute_delta >= w[1].absolute_delta));
    }
}

#[test]
fn test_new_spender_threshold_examples() {
    let deltas = compute_deltas(&costs(&[("a", 0.02), ("b", 0.005)]), &costs(&[("a", 0.005), ("b", 0.003)]));
    let a = deltas.iter().find(|d| d.key == "a").unwrap();
    let b = deltas.iter().find(|d| d.key == "b").unwrap();
    assert!(a.is_new_spender);
    assert!(!b.is_new_spender);
}

#[test]
fn test_percent_change_sentinel() {
    let deltas = compute_deltas(&costs(&[("fresh", 100.0)]), &costs(&[("fresh", 0.0)]));
    assert_eq!(deltas[0].percent_change, 9999.0);
    assert_eq!(deltas[0].percent_change, NEW_SPEND_PERCENT_SENTINEL);
    assert!(deltas[0].is_new_spender);
}

#[test]
fn test_zscore_excludes_current_point() {
    let series: SeriesMap = [("svc".to_string(), vec![10.0, 20.0, 30.0, 40.0, 50.0])].into_iter().collect();
    let config = DetectorConfig { min_data_points: 5, ..DetectorConfig::default() };
    let anomalies = detect_anomalies(&series, &config);
    assert!((anomalies[0].historical_mean - 25.0).abs() < 1e-9);
    assert!((anomalies[0].historical_std_dev - 11.180_339_887).abs() < 1e-6);
    assert!((anomalies[0].z_score - 2.236_067_977).abs() < 1e-6);
}

#[test]
fn test_stats_use_whole_sample() {
    let stats = compute_stats(&[10.0, 20.0, 30.0, 40.0, 50.0]);
    assert!((stats.mean - 30.0).abs() < 1e-9);
    assert!((stats.std_dev - 14.142_135_623).abs() < 1e-6);
}

#[test]
fn test_severity_boundaries() {
    for (z, expected) in [
        (4.5, Severity::Critical),
        (3.5, Severity::High),
        (2.5, Severity::Medium),
        (1.5, Severity::Low),
        (0.0, Severity::Low),
        (2.0, Severity::Medium),
        (1.999_999, Severity::Low),
    ] {
        assert_eq!(Severity::from_z_score(z), expected, "z = {z}");
    }
}

#[test]
fn test_window_adjacency_for_many_inputs() {
    let now = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
    for n in [0, 1, 2, 7, 13, 24, 30, 48, 90, 365] {
        for unit in ["h", "d"] {
            let w = TimeWindow::parse_at(&format!("{n}{unit}"), now).unwrap();
            assert_eq!(w.prior_end, w.current_start);
            assert_eq!(w.current_end - w.current_start, w.prior_end - w.prior_start);
            assert!(w.current_end <= now);
        }
    }
}

#[test]
fn test_window_rejection() {
    for bad in ["7days", "7", "", "7x"] {
        assert!(TimeWindow::parse(bad).is_err(), "{bad:?}");
    }
}

#[test]
fn test_spend_shift_scenario() {
    let current = costs(&[("EC2", 500.0), ("RDS", 200.0), ("S3", 50.0), ("New", 100.0)]);
    let prior = costs(&[("EC2", 400.0), ("RDS", 200.0), ("S3", 100.0)]);

    let deltas = compute_deltas(&current, &prior);
    assert_eq!(deltas.len(), 4);

    // EC2 and New tie at +100; the stable sort keeps current-map insertion order.
    let order: Vec<&str> = deltas.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(order, vec!["EC2", "New", "RDS", "S3"]);

    assert_eq!(deltas[0].absolute_delta, 100.0);
    assert!((deltas[0].percent_change - 25.0).abs() < 1e-9);
    assert!(deltas[1].is_new_spender);
    assert_eq!(deltas[1].percent_change, 9999.0);
    assert_eq!(deltas[2].absolute_delta, 0.0);
    assert_eq!(deltas[3].absolute_delta, -50.0);
    assert!((deltas[3].percent_change + 50.0).abs() < 1e-9);

    let shown = select_deltas(&deltas, 0.0, 10);
    assert_eq!(shown.len(), 3);
}
