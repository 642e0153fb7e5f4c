//! Helpers shared by the scoring, portfolio and scenario crates.

use crate::{AnalyticsError, Position};

/// Fractional return from the close `lookback` steps before the latest one.
///
/// `[100, 110, 120]` with a lookback of 2 is `0.2`. Needs more than
/// `lookback` values and a non-zero base.
pub fn trailing_return(values: &[f64], lookback: usize) -> Option<f64> {
    if lookback == 0 || values.len() <= lookback {
        return None;
    }
    let base = values[values.len() - 1 - lookback];
    let last = values[values.len() - 1];
    if base == 0.0 {
        return None;
    }
    Some((last - base) / base)
}

/// Total value of a portfolio, rejecting empty portfolios, negative or
/// non-finite values and a non-positive total.
pub fn portfolio_total(positions: &[Position]) -> Result<f64, AnalyticsError> {
    if positions.is_empty() {
        return Err(AnalyticsError::InvalidInput("portfolio is empty".to_string()));
    }
    if let Some(bad) = positions.iter().find(|p| !p.value.is_finite() || p.value < 0.0) {
        return Err(AnalyticsError::InvalidInput(format!(
            "{}: position value must be finite and non-negative, got {}",
            bad.symbol, bad.value
        )));
    }

    let total: f64 = positions.iter().map(|p| p.value).sum();
    if total <= 0.0 {
        return Err(AnalyticsError::InvalidInput(
            "portfolio total value must be positive".to_string(),
        ));
    }
    Ok(total)
}
