use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use analytics_core::{
    AnalyticsError, MarketDataProvider, MetricFetcher, Quote, RawMetricBag, SecurityProfile,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::EngineConfig;
use crate::pacing::Pacer;

/// Wraps a market-data provider with bounded concurrency, call pacing and a
/// per-call timeout. Timeouts surface as `ProviderUnavailable`.
pub struct PacedProvider {
    inner: Arc<dyn MarketDataProvider>,
    semaphore: Arc<Semaphore>,
    pacer: Arc<Pacer>,
    timeout: Duration,
}

impl PacedProvider {
    pub fn new(
        inner: Arc<dyn MarketDataProvider>,
        max_concurrent: usize,
        pacing: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            inner,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            pacer: Arc::new(Pacer::new(pacing)),
            timeout,
        }
    }

    pub fn from_config(inner: Arc<dyn MarketDataProvider>, config: &EngineConfig) -> Self {
        Self::new(
            inner,
            config.max_concurrent_fetches,
            config.fetch_pacing(),
            config.fetch_timeout(),
        )
    }

    async fn guarded<T, F>(&self, symbol: &str, call: &str, fut: F) -> Result<T, AnalyticsError>
    where
        F: Future<Output = Result<T, AnalyticsError>>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| AnalyticsError::provider(symbol, "fetch limiter closed"))?;
        self.pacer.wait().await;

        debug!("{} {}", call, symbol);
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::provider(
                symbol,
                format!("{} timed out after {:?}", call, self.timeout),
            )),
        }
    }
}

#[async_trait]
impl MarketDataProvider for PacedProvider {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, AnalyticsError> {
        self.guarded(symbol, "quote", self.inner.get_quote(symbol)).await
    }

    async fn get_historical_prices(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<f64>, AnalyticsError> {
        self.guarded(symbol, "history", self.inner.get_historical_prices(symbol, from, to))
            .await
    }

    async fn get_fundamentals(&self, symbol: &str) -> Result<RawMetricBag, AnalyticsError> {
        self.guarded(symbol, "fundamentals", self.inner.get_fundamentals(symbol))
            .await
    }

    async fn get_profile(&self, symbol: &str) -> Result<SecurityProfile, AnalyticsError> {
        self.guarded(symbol, "profile", self.inner.get_profile(symbol)).await
    }
}

#[async_trait]
impl MetricFetcher for PacedProvider {
    async fn fetch_metrics(&self, symbol: &str) -> Result<RawMetricBag, AnalyticsError> {
        self.get_fundamentals(symbol).await
    }
}
