use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{AnalyticsError, Quote, RawMetricBag, SecurityProfile};

/// External market-data collaborator (quotes, daily closes, fundamentals, tags).
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, AnalyticsError>;

    /// Daily closing prices ordered oldest to newest.
    async fn get_historical_prices(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<f64>, AnalyticsError>;

    async fn get_fundamentals(&self, symbol: &str) -> Result<RawMetricBag, AnalyticsError>;

    async fn get_profile(&self, symbol: &str) -> Result<SecurityProfile, AnalyticsError>;
}

/// Raw fundamentals source used by the sector benchmark builder
#[async_trait]
pub trait MetricFetcher: Send + Sync {
    async fn fetch_metrics(&self, symbol: &str) -> Result<RawMetricBag, AnalyticsError>;
}
