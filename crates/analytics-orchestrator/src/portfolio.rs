use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use analytics_core::{
    AnalyticsError, CorrelationPair, DiversificationReport, MarketDataProvider, Position,
    RebalancingRecommendation, ScenarioImpactReport,
};
use chrono::Utc;
use portfolio_analytics::{
    analyze_diversification, correlate, portfolio_weights, recommend_rebalancing,
};
use scenario_risk::{ScenarioLibrary, ScenarioSimulator};
use serde::{Deserialize, Serialize};

use crate::batch::{SkipReason, SkippedItem};
use crate::config::EngineConfig;
use crate::provider::PacedProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInsights {
    pub correlations: Vec<CorrelationPair>,
    pub diversification: DiversificationReport,
    pub rebalancing: Vec<RebalancingRecommendation>,
    /// Symbols whose price window could not be fetched
    pub skipped: Vec<SkippedItem>,
}

pub struct PortfolioAnalyzer {
    provider: Arc<PacedProvider>,
    config: EngineConfig,
}

impl PortfolioAnalyzer {
    pub fn new(provider: Arc<PacedProvider>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    /// Correlations over the configured window, then diversification and
    /// rebalancing advice. Symbols without prices drop out of the matrix only.
    pub async fn analyze(
        &self,
        positions: &[Position],
    ) -> Result<PortfolioInsights, AnalyticsError> {
        portfolio_weights(positions)?;
        let positions = self.with_profile_tags(positions).await;

        tracing::info!("Analyzing portfolio of {} positions", positions.len());
        let (prices, skipped) = self.fetch_windows(&positions).await;

        let correlations = correlate(&prices);
        let diversification = analyze_diversification(&positions, &correlations)?;
        let rebalancing = recommend_rebalancing(&positions, &correlations)?;

        tracing::info!(
            "Portfolio analysis complete: {} pairs, risk {:?}, {} recommendations",
            correlations.len(),
            diversification.concentration_risk.risk_level,
            rebalancing.len()
        );

        Ok(PortfolioInsights {
            correlations,
            diversification,
            rebalancing,
            skipped,
        })
    }

    /// Apply a library scenario using the configured noise bound and seed.
    pub async fn stress_test(
        &self,
        positions: &[Position],
        scenario_id: &str,
    ) -> Result<ScenarioImpactReport, AnalyticsError> {
        let scenario = ScenarioLibrary::require(scenario_id)?;
        portfolio_weights(positions)?;
        let positions = self.with_profile_tags(positions).await;

        let mut simulator = ScenarioSimulator::new(self.config.scenario_seed)
            .with_noise_bound(self.config.scenario_noise_pct);
        simulator.simulate(&positions, &scenario)
    }

    async fn fetch_windows(
        &self,
        positions: &[Position],
    ) -> (BTreeMap<String, Vec<f64>>, Vec<SkippedItem>) {
        let to = Utc::now().date_naive();
        let from = to - chrono::Duration::days(self.config.correlation_days);

        let symbols: BTreeSet<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
        let provider = self.provider.as_ref();
        let futures: Vec<_> = symbols
            .into_iter()
            .map(|symbol| async move {
                (symbol, provider.get_historical_prices(symbol, from, to).await)
            })
            .collect();

        let mut prices = BTreeMap::new();
        let mut skipped = Vec::new();
        for (symbol, result) in futures::future::join_all(futures).await {
            match result {
                Ok(series) => {
                    prices.insert(symbol.to_string(), series);
                }
                Err(e) => {
                    tracing::warn!("No price window for {}: {}", symbol, e);
                    skipped.push(SkippedItem {
                        symbol: symbol.to_string(),
                        reason: SkipReason::from(e),
                    });
                }
            }
        }
        (prices, skipped)
    }

    /// Fill missing sector/region tags from profiles; lookup failures leave them unset.
    async fn with_profile_tags(&self, positions: &[Position]) -> Vec<Position> {
        let provider = self.provider.as_ref();
        let futures: Vec<_> = positions
            .iter()
            .map(|position| async move {
                let mut position = position.clone();
                if position.sector.is_some() && position.region.is_some() {
                    return position;
                }
                match provider.get_profile(&position.symbol).await {
                    Ok(profile) => {
                        if position.sector.is_none() {
                            position.sector = profile.sector;
                        }
                        if position.region.is_none() {
                            position.region = profile.region;
                        }
                    }
                    Err(e) => tracing::debug!("No profile for {}: {}", position.symbol, e),
                }
                position
            })
            .collect();
        futures::future::join_all(futures).await
    }
}
