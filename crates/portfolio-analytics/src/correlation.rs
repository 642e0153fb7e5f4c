use std::collections::BTreeMap;

use analytics_core::{CorrelationPair, Significance};
use tracing::debug;

use crate::shared_math::{paired_returns, pearson_correlation};

/// Fewer prices than this cannot produce a single return
pub const MIN_PRICES: usize = 2;

/// Pairwise return correlations for every unordered pair of usable series.
///
/// Keys are iterated in order, so `symbol1 < symbol2` in every pair.
pub fn correlate(prices: &BTreeMap<String, Vec<f64>>) -> Vec<CorrelationPair> {
    let usable: Vec<(&String, &Vec<f64>)> = prices
        .iter()
        .filter(|(symbol, series)| {
            let ok = series.len() >= MIN_PRICES;
            if !ok {
                debug!("Excluding {} from correlation: {} prices", symbol, series.len());
            }
            ok
        })
        .collect();

    let mut pairs = Vec::with_capacity(usable.len() * usable.len().saturating_sub(1) / 2);
    for (i, (sym_a, series_a)) in usable.iter().enumerate() {
        for (sym_b, series_b) in usable.iter().skip(i + 1) {
            let (ra, rb) = paired_returns(series_a, series_b);
            let correlation = pearson_correlation(&ra, &rb);
            pairs.push(CorrelationPair {
                symbol1: (*sym_a).clone(),
                symbol2: (*sym_b).clone(),
                correlation,
                significance: Significance::from_correlation(correlation),
                observations: ra.len(),
            });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(entries: &[(&str, Vec<f64>)]) -> BTreeMap<String, Vec<f64>> {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_pairs_ordered_and_complete() {
        let prices = series(&[
            ("MSFT", vec![10.0, 11.0, 10.5, 12.0]),
            ("AAPL", vec![20.0, 22.0, 21.0, 24.0]),
            ("XOM", vec![30.0, 29.0, 31.0, 30.0]),
        ]);
        let pairs = correlate(&prices);
        assert_eq!(pairs.len(), 3);
        for p in &pairs {
            assert!(p.symbol1 < p.symbol2);
            assert!((-1.0..=1.0).contains(&p.correlation));
        }
        let aapl_msft = pairs.iter().find(|p| p.symbol1 == "AAPL" && p.symbol2 == "MSFT").unwrap();
        // Same percentage moves
        assert!((aapl_msft.correlation - 1.0).abs() < 1e-10);
        assert_eq!(aapl_msft.significance, Significance::High);
        assert_eq!(aapl_msft.observations, 3);
    }

    #[test]
    fn test_single_price_series_excluded() {
        let prices = series(&[
            ("A", vec![1.0, 2.0, 3.0]),
            ("B", vec![5.0]),
            ("C", vec![3.0, 2.0, 4.0]),
        ]);
        let pairs = correlate(&prices);
        assert_eq!(pairs.len(), 1);
        assert!(!pairs.iter().any(|p| p.involves("B")));
    }

    #[test]
    fn test_two_price_series_pairs_at_zero() {
        let prices = series(&[("A", vec![1.0, 2.0, 3.0, 2.5]), ("B", vec![5.0, 6.0])]);
        let pairs = correlate(&prices);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].correlation, 0.0);
        assert_eq!(pairs[0].observations, 1);
        assert_eq!(pairs[0].significance, Significance::Low);
    }

    #[test]
    fn test_flat_series_correlates_zero() {
        let prices = series(&[("A", vec![5.0, 5.0, 5.0, 5.0]), ("B", vec![1.0, 2.0, 1.5, 3.0])]);
        let pairs = correlate(&prices);
        assert_eq!(pairs[0].correlation, 0.0);
        assert_eq!(pairs[0].significance, Significance::Low);
    }

    #[test]
    fn test_empty_input() {
        assert!(correlate(&BTreeMap::new()).is_empty());
    }
}
