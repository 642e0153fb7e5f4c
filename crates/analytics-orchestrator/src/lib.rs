//! Batch driver tying the analytics crates to a market-data provider.
//!
//! All provider traffic goes through one [`PacedProvider`], so concurrency,
//! pacing and timeouts hold across scoring, benchmarks and portfolio work.

pub mod batch;
pub mod benchmark_cache;
pub mod config;
pub mod logging;
pub mod pacing;
pub mod portfolio;
pub mod provider;

use std::sync::Arc;

use analytics_core::{AnalyticsError, MarketDataProvider, Position, ScenarioImpactReport};
use security_scoring::SectorPeers;

pub use batch::{BatchReport, BatchScorer, SkipReason, SkippedItem};
pub use benchmark_cache::BenchmarkCache;
pub use config::EngineConfig;
pub use logging::init_logging;
pub use pacing::Pacer;
pub use portfolio::{PortfolioAnalyzer, PortfolioInsights};
pub use provider::PacedProvider;

pub struct AnalyticsEngine {
    scorer: BatchScorer,
    portfolio: PortfolioAnalyzer,
}

impl AnalyticsEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: EngineConfig) -> Self {
        let paced = Arc::new(PacedProvider::from_config(provider, &config));
        Self {
            scorer: BatchScorer::new(Arc::clone(&paced), config.clone()),
            portfolio: PortfolioAnalyzer::new(paced, config),
        }
    }

    pub fn with_peers(mut self, peers: SectorPeers) -> Self {
        self.scorer = self.scorer.with_peers(peers);
        self
    }

    pub async fn score_batch(&self, symbols: &[String]) -> BatchReport {
        self.scorer.score_batch(symbols).await
    }

    pub async fn analyze_portfolio(
        &self,
        positions: &[Position],
    ) -> Result<PortfolioInsights, AnalyticsError> {
        self.portfolio.analyze(positions).await
    }

    pub async fn stress_test(
        &self,
        positions: &[Position],
        scenario_id: &str,
    ) -> Result<ScenarioImpactReport, AnalyticsError> {
        self.portfolio.stress_test(positions, scenario_id).await
    }
}
