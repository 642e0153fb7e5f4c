use std::collections::HashMap;

use analytics_core::{
    AllocationSlice, AnalyticsError, ConcentrationRisk, CorrelationInsight, CorrelationPair,
    DiversificationReport, InsightKind, InsightRecommendation, Position, RiskLevel,
};

use crate::shared_math::herfindahl_index;
use crate::weights::portfolio_weights;

pub const HIGH_CORRELATION: f64 = 0.7;
pub const LOW_CORRELATION: f64 = 0.3;
pub const NEGATIVE_CORRELATION: f64 = -0.3;
pub const MAX_LOW_CORRELATION_PAIRS: usize = 3;

pub fn analyze_diversification(
    positions: &[Position],
    correlations: &[CorrelationPair],
) -> Result<DiversificationReport, AnalyticsError> {
    let weights = portfolio_weights(positions)?;

    let sector_allocation = allocate(positions, &weights, Position::sector_or_unknown);
    let region_allocation = allocate(positions, &weights, Position::region_or_unknown);

    Ok(DiversificationReport {
        sector_allocation,
        region_allocation,
        concentration_risk: concentration(&weights),
        correlation_insights: correlation_insights(correlations),
    })
}

/// Groups weights by tag, largest share first (ties by name).
fn allocate(
    positions: &[Position],
    weights: &[f64],
    tag: fn(&Position) -> &str,
) -> Vec<AllocationSlice> {
    let mut groups: HashMap<&str, (f64, usize)> = HashMap::new();
    for (position, weight) in positions.iter().zip(weights) {
        let entry = groups.entry(tag(position)).or_insert((0.0, 0));
        entry.0 += weight;
        entry.1 += 1;
    }

    let mut slices: Vec<AllocationSlice> = groups
        .into_iter()
        .map(|(category, (percentage, count))| AllocationSlice {
            category: category.to_string(),
            percentage,
            count,
        })
        .collect();
    slices.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    slices
}

fn concentration(weights: &[f64]) -> ConcentrationRisk {
    let mut sorted = weights.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let herfindahl_index = herfindahl_index(weights);
    let max_single_holding = sorted.first().copied().unwrap_or(0.0);
    let top5_concentration: f64 = sorted.iter().take(5).sum();

    ConcentrationRisk {
        herfindahl_index,
        max_single_holding,
        top5_concentration,
        risk_level: RiskLevel::classify(herfindahl_index, max_single_holding, top5_concentration),
    }
}

/// Only non-empty groups produce an insight.
pub fn correlation_insights(correlations: &[CorrelationPair]) -> Vec<CorrelationInsight> {
    let high: Vec<CorrelationPair> = correlations
        .iter()
        .filter(|c| c.correlation.abs() > HIGH_CORRELATION)
        .cloned()
        .collect();
    let low: Vec<CorrelationPair> = correlations
        .iter()
        .filter(|c| c.correlation.abs() < LOW_CORRELATION)
        .take(MAX_LOW_CORRELATION_PAIRS)
        .cloned()
        .collect();
    let negative: Vec<CorrelationPair> = correlations
        .iter()
        .filter(|c| c.correlation < NEGATIVE_CORRELATION)
        .cloned()
        .collect();

    [
        (InsightKind::HighCorrelation, high, InsightRecommendation::ReduceCorrelatedExposure),
        (InsightKind::LowCorrelation, low, InsightRecommendation::WellDiversified),
        (InsightKind::NegativeCorrelation, negative, InsightRecommendation::NaturalHedge),
    ]
    .into_iter()
    .filter(|(_, pairs, _)| !pairs.is_empty())
    .map(|(kind, pairs, recommendation)| CorrelationInsight {
        kind,
        pairs,
        recommendation,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics_core::Significance;

    fn pair(a: &str, b: &str, r: f64) -> CorrelationPair {
        CorrelationPair {
            symbol1: a.to_string(),
            symbol2: b.to_string(),
            correlation: r,
            significance: Significance::from_correlation(r),
            observations: 60,
        }
    }

    #[test]
    fn test_single_holding_is_fully_concentrated() {
        let report = analyze_diversification(&[Position::new("AAPL", 5000.0)], &[]).unwrap();
        let risk = &report.concentration_risk;
        assert!((risk.herfindahl_index - 1.0).abs() < 1e-10);
        assert!((risk.max_single_holding - 1.0).abs() < 1e-10);
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(report.sector_allocation[0].category, "Unknown");
        assert!(report.correlation_insights.is_empty());
    }

    #[test]
    fn test_allocation_groups_and_sorts() {
        let positions = vec![
            Position::new("AAPL", 40.0).with_sector("Technology").with_region("US"),
            Position::new("MSFT", 20.0).with_sector("Technology").with_region("US"),
            Position::new("SAP", 25.0).with_sector("Technology").with_region("EU"),
            Position::new("XOM", 15.0).with_sector("Energy"),
        ];
        let report = analyze_diversification(&positions, &[]).unwrap();

        assert_eq!(report.sector_allocation.len(), 2);
        assert_eq!(report.sector_allocation[0].category, "Technology");
        assert_eq!(report.sector_allocation[0].count, 3);
        assert!((report.sector_allocation[0].percentage - 0.85).abs() < 1e-10);

        let regions: Vec<&str> = report
            .region_allocation
            .iter()
            .map(|s| s.category.as_str())
            .collect();
        assert_eq!(regions, vec!["US", "EU", "Unknown"]);
        let total: f64 = report.region_allocation.iter().map(|s| s.percentage).sum();
        assert!((total - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_twenty_equal_holdings_low_risk() {
        let positions: Vec<Position> =
            (0..20).map(|i| Position::new(format!("S{i}"), 1.0)).collect();
        let report = analyze_diversification(&positions, &[]).unwrap();
        let risk = &report.concentration_risk;
        assert!((risk.herfindahl_index - 0.05).abs() < 1e-10);
        assert!((risk.top5_concentration - 0.25).abs() < 1e-10);
        assert_eq!(risk.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_insight_grouping() {
        let correlations = vec![
            pair("A", "B", 0.9),
            pair("A", "C", 0.1),
            pair("A", "D", -0.5),
            pair("B", "C", 0.2),
            pair("B", "D", 0.05),
            pair("C", "D", -0.1),
        ];
        let insights = correlation_insights(&correlations);
        assert_eq!(insights.len(), 3);

        assert_eq!(insights[0].kind, InsightKind::HighCorrelation);
        assert_eq!(insights[0].recommendation, InsightRecommendation::ReduceCorrelatedExposure);
        assert_eq!(insights[0].pairs.len(), 1);

        assert_eq!(insights[1].kind, InsightKind::LowCorrelation);
        assert_eq!(insights[1].pairs.len(), MAX_LOW_CORRELATION_PAIRS);

        assert_eq!(insights[2].kind, InsightKind::NegativeCorrelation);
        assert_eq!(insights[2].recommendation, InsightRecommendation::NaturalHedge);
        assert_eq!(insights[2].pairs[0].symbol2, "D");
    }

    #[test]
    fn test_invalid_portfolio_rejected() {
        assert!(matches!(
            analyze_diversification(&[], &[]),
            Err(AnalyticsError::InvalidInput(_))
        ));
    }
}
