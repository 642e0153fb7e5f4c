use std::collections::HashMap;

use analytics_core::*;
use async_trait::async_trait;
use serde_json::json;

use crate::benchmark::{build_benchmark, FromPeerMetrics};
use crate::{MetricNormalizer, SecurityScorer};

fn quote(price: f64) -> Quote {
    Quote {
        price,
        change_percent: Some(0.8),
    }
}

fn strong_metrics() -> MetricSet {
    MetricSet::new()
        .with(CanonicalMetric::PeRatio, 14.0)
        .with(CanonicalMetric::PbRatio, 1.8)
        .with(CanonicalMetric::PsRatio, 2.5)
        .with(CanonicalMetric::EvToEbitda, 9.0)
        .with(CanonicalMetric::RevenueGrowth, 0.3)
        .with(CanonicalMetric::EpsGrowth, 0.25)
        .with(CanonicalMetric::EbitdaGrowth, 0.2)
        .with(CanonicalMetric::NetMargin, 0.25)
        .with(CanonicalMetric::Roe, 0.3)
        .with(CanonicalMetric::Roa, 0.12)
        .with(CanonicalMetric::FcfYield, 0.07)
        .with(CanonicalMetric::CashFlowPerShare, 4.0)
        .with(CanonicalMetric::DebtToEquity, 0.4)
        .with(CanonicalMetric::CurrentRatio, 2.5)
        .with(CanonicalMetric::QuickRatio, 1.8)
        .with(CanonicalMetric::InterestCoverage, 12.0)
}

fn uptrend(len: usize) -> Vec<f64> {
    (0..len).map(|i| 50.0 + i as f64 * 0.4).collect()
}

struct MockFetcher {
    bags: HashMap<String, RawMetricBag>,
}

#[async_trait]
impl MetricFetcher for MockFetcher {
    async fn fetch_metrics(&self, symbol: &str) -> Result<RawMetricBag, AnalyticsError> {
        self.bags
            .get(symbol)
            .cloned()
            .ok_or_else(|| AnalyticsError::provider(symbol, "not found"))
    }
}

fn raw(entries: &[(&str, serde_json::Value)]) -> RawMetricBag {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn test_strong_security_scores_high_and_complete() {
    let snapshot = SecuritySnapshot::new("AAPL", quote(190.0))
        .with_sector("Technology")
        .with_metrics(strong_metrics())
        .with_history(uptrend(300));

    let result = SecurityScorer::new().score(&snapshot, None).unwrap();

    for category in ScoreCategory::ALL {
        let s = result.category_scores.get(category);
        assert!((0.0..=100.0).contains(&s), "{:?} out of range: {}", category, s);
    }
    assert!(result.overall_score >= 80, "overall {}", result.overall_score);
    assert_eq!(result.grade, Grade::from_score(result.overall_score));
    assert!(result.sector_comparison.is_none());
    assert!(!result.partial_data);
    assert!(result.missing_inputs.is_empty());
    assert!(!result.reasons.strengths.is_empty());
    assert!(result.reasons.strengths.len() <= 8);
}

#[test]
fn test_empty_metrics_are_partial_not_errors() {
    let snapshot = SecuritySnapshot::new("NEWCO", quote(12.0));
    let result = SecurityScorer::new().score(&snapshot, None).unwrap();

    assert!(result.partial_data);
    assert!(result.missing_inputs.contains(&"price_history".to_string()));
    assert!(result.missing_inputs.contains(&"pe_ratio".to_string()));
    assert!(result.missing_inputs.contains(&"fcf_yield".to_string()));
    assert_eq!(result.category_scores.value, 0.0);
    assert_eq!(result.category_scores.debt_liquidity, 0.0);
    // Only the daily-change fallback (0.8% -> 5) contributes
    assert_eq!(result.category_scores.momentum, 5.0);
    assert_eq!(result.overall_score, 1);
    assert_eq!(result.grade, Grade::F);
}

#[test]
fn test_invalid_snapshots_rejected() {
    let scorer = SecurityScorer::default();

    let blank = SecuritySnapshot::new("  ", quote(10.0));
    assert!(matches!(scorer.score(&blank, None), Err(AnalyticsError::DataUnavailable(_))));

    let zero_price = SecuritySnapshot::new("X", quote(0.0));
    assert!(matches!(scorer.score(&zero_price, None), Err(AnalyticsError::InvalidInput(_))));

    let nan_price = SecuritySnapshot::new("X", quote(f64::NAN));
    assert!(matches!(scorer.score(&nan_price, None), Err(AnalyticsError::InvalidInput(_))));

    let bad_history =
        SecuritySnapshot::new("X", quote(10.0)).with_history(vec![10.0, f64::INFINITY]);
    assert!(matches!(scorer.score(&bad_history, None), Err(AnalyticsError::InvalidInput(_))));
}

#[test]
fn test_sector_comparison_deltas() {
    let peers = vec![MetricSet::new()
        .with(CanonicalMetric::PeRatio, 20.0)
        .with(CanonicalMetric::NetMargin, 0.1)];
    let benchmark = SectorBenchmark::from_peer_metrics("Technology", &peers).unwrap();
    assert_eq!(benchmark.category_scores.value, Some(25.0));
    assert_eq!(benchmark.category_scores.profitability, Some(15.0));

    let snapshot = SecuritySnapshot::new("MSFT", quote(400.0))
        .with_sector("Technology")
        .with_metrics(
            MetricSet::new()
                .with(CanonicalMetric::PeRatio, 10.0)
                .with(CanonicalMetric::NetMargin, 0.2),
        );
    let result = SecurityScorer::new().score(&snapshot, Some(&benchmark)).unwrap();

    assert_eq!(result.category_scores.value, 30.0);
    assert_eq!(result.category_scores.profitability, 35.0);

    let cmp = result.sector_comparison.unwrap();
    assert_eq!(cmp.sector, "Technology");
    assert_eq!(cmp.vs_sector.value, Some(5.0));
    assert_eq!(cmp.vs_sector.profitability, Some(20.0));
    assert_eq!(cmp.vs_sector.growth, None);
    assert_eq!(cmp.vs_sector.momentum, None);
    assert_eq!(cmp.sector_average, benchmark.category_scores);
    assert!(result
        .reasons
        .opportunities
        .iter()
        .any(|o| o.contains("Valuation discount")));
}

#[test]
fn test_security_matching_its_peers_has_zero_deltas() {
    let peer = MetricSet::new()
        .with(CanonicalMetric::PeRatio, 20.0)
        .with(CanonicalMetric::NetMargin, 0.1)
        .with(CanonicalMetric::DebtToEquity, 1.0);
    let benchmark =
        SectorBenchmark::from_peer_metrics("Industrials", &[peer.clone(), peer.clone()]).unwrap();

    let snapshot = SecuritySnapshot::new("CAT", quote(350.0))
        .with_sector("Industrials")
        .with_metrics(peer);
    let result = SecurityScorer::new().score(&snapshot, Some(&benchmark)).unwrap();

    // Headline score is still sector-relative: P/E equal to the peer average -> 20
    assert_eq!(result.category_scores.value, 20.0);

    let cmp = result.sector_comparison.unwrap();
    assert_eq!(cmp.vs_sector.value, Some(0.0));
    assert_eq!(cmp.vs_sector.profitability, Some(0.0));
    assert_eq!(cmp.vs_sector.debt_liquidity, Some(0.0));
    assert_eq!(cmp.vs_sector.growth, None);
    assert_eq!(cmp.vs_sector.cash_flow, None);
    assert_eq!(cmp.vs_sector.momentum, None);
}

#[test]
fn test_garp_opportunity() {
    let snapshot = SecuritySnapshot::new("GRW", quote(50.0)).with_metrics(
        MetricSet::new()
            .with(CanonicalMetric::PeRatio, 18.0)
            .with(CanonicalMetric::RevenueGrowth, 0.25),
    );
    let result = SecurityScorer::new().score(&snapshot, None).unwrap();
    assert!(result
        .reasons
        .opportunities
        .contains(&"Growth at a reasonable price".to_string()));
}

#[test]
fn test_raw_provider_bag_end_to_end() {
    let bag = raw(&[
        ("peTTM", json!(22.0)),
        ("netProfitMarginTTM", json!(18.0)),
        ("roeTTM", json!("24.5")),
        ("totalDebt/totalEquityQuarterly", json!(0.3)),
        ("currentRatioQuarterly", json!(1.7)),
    ]);
    let metrics = MetricNormalizer::normalize(&bag);
    assert!((metrics.get(CanonicalMetric::NetMargin).unwrap() - 0.18).abs() < 1e-10);
    assert!((metrics.get(CanonicalMetric::Roe).unwrap() - 0.245).abs() < 1e-10);

    let snapshot = SecuritySnapshot::new("NVDA", quote(120.0))
        .with_sector("Technology")
        .with_metrics(metrics);
    let result = SecurityScorer::new().score(&snapshot, None).unwrap();

    // margin 0.18 > 0.15 -> 30, roe 0.245 > 0.2 -> 35
    assert_eq!(result.category_scores.profitability, 65.0);
    // D/E 0.3 < 0.7 * 0.5 -> 35; current 1.7 -> 20
    assert_eq!(result.category_scores.debt_liquidity, 55.0);
    assert!(result.partial_data);
}

#[tokio::test]
async fn test_build_benchmark_skips_failed_peers() {
    let mut bags = HashMap::new();
    bags.insert("XOM".to_string(), raw(&[("peTTM", json!(10.0)), ("roeTTM", json!(0.2))]));
    bags.insert("CVX".to_string(), raw(&[("peTTM", json!(14.0))]));
    let fetcher = MockFetcher { bags };

    let peers: Vec<String> = ["XOM", "CVX", "MISSING"].iter().map(|s| s.to_string()).collect();
    let benchmark = build_benchmark("Energy", &peers, &fetcher).await.unwrap();

    assert_eq!(benchmark.sector, "Energy");
    assert_eq!(benchmark.sample_size, 2);
    assert_eq!(benchmark.averages.get(CanonicalMetric::PeRatio), Some(12.0));
    assert_eq!(benchmark.category_scores.momentum, None);
}

#[tokio::test]
async fn test_build_benchmark_unavailable_when_all_peers_fail() {
    let fetcher = MockFetcher { bags: HashMap::new() };
    let peers = vec!["A".to_string(), "B".to_string()];
    assert!(build_benchmark("Utilities", &peers, &fetcher).await.is_none());
    assert!(build_benchmark("Utilities", &[], &fetcher).await.is_none());
}
