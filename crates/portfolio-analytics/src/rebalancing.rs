use std::collections::BTreeMap;

use analytics_core::{
    AnalyticsError, CorrelationPair, Position, RebalanceAction, RebalancingRecommendation,
};

use crate::weights::portfolio_weights;

pub const REBALANCE_CORRELATION: f64 = 0.8;
pub const SECTOR_OVERWEIGHT: f64 = 0.4;
const CORRELATED_TARGET_FACTOR: f64 = 0.5;
const SECTOR_TARGET_FACTOR: f64 = 0.8;

/// Advisory reductions for tightly correlated pairs and overweight sectors.
pub fn recommend_rebalancing(
    positions: &[Position],
    correlations: &[CorrelationPair],
) -> Result<Vec<RebalancingRecommendation>, AnalyticsError> {
    let weights = portfolio_weights(positions)?;
    let weight_of = |symbol: &str| {
        positions
            .iter()
            .zip(&weights)
            .find(|(p, _)| p.symbol == symbol)
            .map(|(_, w)| *w)
    };

    let mut recommendations = Vec::new();

    for pair in correlations.iter().filter(|c| c.correlation.abs() > REBALANCE_CORRELATION) {
        let (Some(w1), Some(w2)) = (weight_of(&pair.symbol1), weight_of(&pair.symbol2)) else {
            continue;
        };
        // Reduce the smaller holding; ties reduce symbol1
        let (symbol, weight, partner) = if w1 > w2 {
            (&pair.symbol2, w2, &pair.symbol1)
        } else {
            (&pair.symbol1, w1, &pair.symbol2)
        };
        recommendations.push(RebalancingRecommendation {
            action: RebalanceAction::Reduce,
            symbol: symbol.clone(),
            current_weight: weight,
            recommended_weight: (weight * CORRELATED_TARGET_FACTOR).clamp(0.0, 1.0),
            reason: format!(
                "High correlation ({:.1}%) with {}",
                pair.correlation * 100.0,
                partner
            ),
        });
    }

    let mut sector_weights: BTreeMap<&str, f64> = BTreeMap::new();
    for (position, weight) in positions.iter().zip(&weights) {
        *sector_weights.entry(position.sector_or_unknown()).or_insert(0.0) += weight;
    }

    for (sector, sector_weight) in sector_weights.iter().filter(|(_, w)| **w > SECTOR_OVERWEIGHT) {
        for (position, weight) in positions
            .iter()
            .zip(&weights)
            .filter(|(p, _)| p.sector_or_unknown() == *sector)
        {
            recommendations.push(RebalancingRecommendation {
                action: RebalanceAction::Reduce,
                symbol: position.symbol.clone(),
                current_weight: *weight,
                recommended_weight: (weight * SECTOR_TARGET_FACTOR).clamp(0.0, 1.0),
                reason: format!("Overweight in sector {} ({:.1}%)", sector, sector_weight * 100.0),
            });
        }
    }

    Ok(recommendations)
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
    fn test_reduces_smaller_of_correlated_pair() {
        let positions = vec![
            Position::new("AMD", 30.0).with_sector("Technology"),
            Position::new("NVDA", 10.0).with_sector("Semis"),
            Position::new("KO", 30.0).with_sector("Consumer Defensive"),
            Position::new("XOM", 30.0).with_sector("Energy"),
        ];
        let recs = recommend_rebalancing(&positions, &[pair("AMD", "NVDA", 0.92)]).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].symbol, "NVDA");
        assert_eq!(recs[0].action, RebalanceAction::Reduce);
        assert!((recs[0].current_weight - 0.1).abs() < 1e-10);
        assert!((recs[0].recommended_weight - 0.05).abs() < 1e-10);
        assert!(recs[0].reason.contains("AMD"));
        assert!(recs[0].reason.contains("92.0%"));
    }

    #[test]
    fn test_tie_reduces_symbol1_and_ignores_unheld() {
        let positions = vec![
            Position::new("A", 25.0),
            Position::new("B", 25.0).with_sector("X"),
            Position::new("C", 25.0).with_sector("Y"),
            Position::new("D", 25.0).with_sector("Z"),
        ];
        let pairs = [pair("B", "C", -0.85), pair("C", "Q", 0.99)];
        let recs = recommend_rebalancing(&positions, &pairs).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].symbol, "B");
    }

    #[test]
    fn test_overweight_sector_reduced_by_fifth() {
        let positions = vec![
            Position::new("AAPL", 30.0).with_sector("Technology"),
            Position::new("MSFT", 20.0).with_sector("Technology"),
            Position::new("JNJ", 25.0).with_sector("Healthcare"),
            Position::new("XOM", 25.0).with_sector("Energy"),
        ];
        let recs = recommend_rebalancing(&positions, &[]).unwrap();
        assert_eq!(recs.len(), 2);
        for rec in &recs {
            assert!((rec.recommended_weight - rec.current_weight * 0.8).abs() < 1e-10);
            assert!(rec.reason.contains("Technology"));
            assert!(rec.reason.contains("50.0%"));
        }
    }

    #[test]
    fn test_targets_within_bounds() {
        let positions = vec![Position::new("ONLY", 100.0)];
        let recs = recommend_rebalancing(&positions, &[]).unwrap();
        assert_eq!(recs.len(), 1);
        for rec in recs {
            assert!((0.0..=1.0).contains(&rec.recommended_weight));
            assert!(rec.recommended_weight <= rec.current_weight);
        }
    }
}
