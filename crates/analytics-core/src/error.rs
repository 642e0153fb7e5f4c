use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A required identity (symbol, scenario id, ...) cannot be resolved at all.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The market-data collaborator failed or timed out for one item.
    #[error("Provider unavailable for {symbol}: {reason}")]
    ProviderUnavailable { symbol: String, reason: String },

    /// Malformed input: bad portfolio shape, non-finite numbers, ...
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnalyticsError {
    pub fn provider(symbol: &str, reason: impl Into<String>) -> Self {
        AnalyticsError::ProviderUnavailable {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
