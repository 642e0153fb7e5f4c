use std::collections::BTreeMap;

use analytics_core::{InsightKind, Position, RiskLevel};

use crate::shared_math::{daily_returns, pearson_correlation};
use crate::{analyze_diversification, correlate, recommend_rebalancing};

/// Deterministic wiggly series with a given drift
fn walk(len: usize, start: f64, drift: f64, phase: f64) -> Vec<f64> {
    (0..len)
        .map(|i| start * (1.0 + drift * i as f64) + ((i as f64 + phase) * 0.7).sin())
        .collect()
}

#[test]
fn test_correlation_symmetric_and_self_one() {
    let a = walk(90, 100.0, 0.002, 0.0);
    let b = walk(90, 50.0, -0.001, 1.3);

    let ra = daily_returns(&a);
    let rb = daily_returns(&b);
    assert!((pearson_correlation(&ra, &rb) - pearson_correlation(&rb, &ra)).abs() < 1e-12);
    assert!((pearson_correlation(&ra, &ra) - 1.0).abs() < 1e-10);

    let mut forward = BTreeMap::new();
    forward.insert("AAA".to_string(), a.clone());
    forward.insert("BBB".to_string(), b.clone());
    let mut renamed = BTreeMap::new();
    renamed.insert("AAA".to_string(), b);
    renamed.insert("BBB".to_string(), a);
    let r1 = correlate(&forward)[0].correlation;
    let r2 = correlate(&renamed)[0].correlation;
    assert!((r1 - r2).abs() < 1e-12);
}

#[test]
fn test_unequal_lengths_use_common_tail() {
    let long = walk(120, 80.0, 0.001, 0.5);
    let short = long[40..].to_vec();
    let mut prices = BTreeMap::new();
    prices.insert("LONG".to_string(), long);
    prices.insert("SHORT".to_string(), short);

    let pairs = correlate(&prices);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].observations, 79);
    assert!((pairs[0].correlation - 1.0).abs() < 1e-10);
}

#[test]
fn test_full_portfolio_pipeline() {
    let tech = walk(91, 100.0, 0.003, 0.0);
    let mut prices = BTreeMap::new();
    prices.insert("AAPL".to_string(), tech.clone());
    prices.insert("MSFT".to_string(), tech.iter().map(|p| p * 2.0).collect());
    prices.insert("XOM".to_string(), walk(91, 60.0, 0.0, 2.1));

    let positions = vec![
        Position::new("AAPL", 45_000.0).with_sector("Technology").with_region("US"),
        Position::new("MSFT", 35_000.0).with_sector("Technology").with_region("US"),
        Position::new("XOM", 20_000.0).with_sector("Energy").with_region("US"),
    ];

    let correlations = correlate(&prices);
    assert_eq!(correlations.len(), 3);

    let report = analyze_diversification(&positions, &correlations).unwrap();
    assert_eq!(report.concentration_risk.risk_level, RiskLevel::High);
    assert!(report
        .correlation_insights
        .iter()
        .any(|i| i.kind == InsightKind::HighCorrelation));

    let recs = recommend_rebalancing(&positions, &correlations).unwrap();
    // MSFT for the correlated pair, then both Technology holdings
    assert_eq!(recs[0].symbol, "MSFT");
    assert!((recs[0].recommended_weight - 0.175).abs() < 1e-10);
    assert_eq!(recs.iter().filter(|r| r.reason.contains("Technology")).count(), 2);
    for rec in &recs {
        assert!((0.0..=1.0).contains(&rec.recommended_weight));
    }
}
