use analytics_core::{portfolio_total, AnalyticsError, Position};

/// Position values as fractions of the portfolio total, in input order.
pub fn portfolio_weights(positions: &[Position]) -> Result<Vec<f64>, AnalyticsError> {
    let total = portfolio_total(positions)?;
    Ok(positions.iter().map(|p| p.value / total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let positions = vec![Position::new("A", 300.0), Position::new("B", 100.0)];
        let w = portfolio_weights(&positions).unwrap();
        assert!((w[0] - 0.75).abs() < 1e-10);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_portfolios() {
        assert!(portfolio_weights(&[]).is_err());
        assert!(portfolio_weights(&[Position::new("A", -1.0)]).is_err());
        assert!(portfolio_weights(&[Position::new("A", f64::NAN)]).is_err());
        assert!(portfolio_weights(&[Position::new("A", 0.0), Position::new("B", 0.0)]).is_err());
    }
}
