use std::collections::HashSet;
use std::sync::Arc;

use analytics_core::{
    trailing_return, AnalyticsError, IndexComparison, MarketDataProvider, RawMetricBag, ScoreResult,
    SecuritySnapshot,
};
use chrono::{DateTime, NaiveDate, Utc};
use security_scoring::{build_benchmark, MetricNormalizer, SectorPeers, SecurityScorer};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::benchmark_cache::BenchmarkCache;
use crate::config::EngineConfig;
use crate::provider::PacedProvider;

/// Why an item produced no result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    DataUnavailable(String),
    ProviderUnavailable(String),
    InvalidInput(String),
    DeadlineReached,
    TaskFailed(String),
}

impl From<AnalyticsError> for SkipReason {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::DataUnavailable(msg) => SkipReason::DataUnavailable(msg),
            AnalyticsError::ProviderUnavailable { reason, .. } => {
                SkipReason::ProviderUnavailable(reason)
            }
            AnalyticsError::InvalidInput(msg) => SkipReason::InvalidInput(msg),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedItem {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// In input order
    pub results: Vec<ScoreResult>,
    pub skipped: Vec<SkippedItem>,
    pub benchmarks_built: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    pub fn deadline_reached(&self) -> bool {
        self.skipped.iter().any(|s| s.reason == SkipReason::DeadlineReached)
    }
}

/// State shared by every item of one run
struct RunContext {
    provider: Arc<PacedProvider>,
    scorer: SecurityScorer,
    peers: SectorPeers,
    cache: BenchmarkCache,
    index: Option<(String, Vec<f64>)>,
    from: NaiveDate,
    to: NaiveDate,
    deadline: Option<Instant>,
}

pub struct BatchScorer {
    provider: Arc<PacedProvider>,
    peers: SectorPeers,
    config: EngineConfig,
}

impl BatchScorer {
    pub fn new(provider: Arc<PacedProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            peers: SectorPeers::default().with_limit(config.max_peers),
            config,
        }
    }

    pub fn with_peers(mut self, peers: SectorPeers) -> Self {
        self.peers = peers.with_limit(self.config.max_peers);
        self
    }

    /// Score every symbol. Item failures are recorded, never propagated.
    pub async fn score_batch(&self, symbols: &[String]) -> BatchReport {
        let started_at = Utc::now();
        let started = Instant::now();
        tracing::info!("Starting batch scoring of {} symbols", symbols.len());

        let to = started_at.date_naive();
        let from = to - chrono::Duration::days(self.config.history_days);

        let ctx = Arc::new(RunContext {
            provider: Arc::clone(&self.provider),
            scorer: SecurityScorer::new(),
            peers: self.peers.clone(),
            cache: BenchmarkCache::new(),
            index: self.fetch_index(from, to).await,
            from,
            to,
            deadline: self.config.batch_deadline().map(|d| started + d),
        });

        // Items start no faster than fetches can be served
        let starts = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let mut tasks = JoinSet::new();
        for (idx, symbol) in symbols.iter().enumerate() {
            let ctx = Arc::clone(&ctx);
            let starts = Arc::clone(&starts);
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let _permit = starts.acquire_owned().await;
                if ctx.deadline.is_some_and(|d| Instant::now() >= d) {
                    return (idx, symbol, Err(SkipReason::DeadlineReached));
                }
                let result = score_one(&ctx, &symbol).await.map_err(SkipReason::from);
                (idx, symbol, result)
            });
        }

        let mut scored: Vec<(usize, ScoreResult)> = Vec::new();
        let mut skipped: Vec<(usize, SkippedItem)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, symbol, Ok(result))) => {
                    tracing::debug!(
                        "Scored {}: {} ({})",
                        symbol,
                        result.overall_score,
                        result.grade
                    );
                    scored.push((idx, result));
                }
                Ok((idx, symbol, Err(reason))) => {
                    tracing::warn!("Skipping {}: {:?}", symbol, reason);
                    skipped.push((idx, SkippedItem { symbol, reason }));
                }
                Err(e) => {
                    tracing::error!("Task error: {}", e);
                }
            }
        }

        // A panicked task never reports its symbol back
        if scored.len() + skipped.len() < symbols.len() {
            let seen: HashSet<usize> = scored
                .iter()
                .map(|(i, _)| *i)
                .chain(skipped.iter().map(|(i, _)| *i))
                .collect();
            for (idx, symbol) in symbols.iter().enumerate().filter(|(i, _)| !seen.contains(i)) {
                skipped.push((
                    idx,
                    SkippedItem {
                        symbol: symbol.clone(),
                        reason: SkipReason::TaskFailed("scoring task aborted".to_string()),
                    },
                ));
            }
        }

        scored.sort_by_key(|(i, _)| *i);
        skipped.sort_by_key(|(i, _)| *i);

        let report = BatchReport {
            results: scored.into_iter().map(|(_, r)| r).collect(),
            skipped: skipped.into_iter().map(|(_, s)| s).collect(),
            benchmarks_built: ctx.cache.built(),
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "Batch complete: {}/{} scored, {} skipped in {:?}",
            report.results.len(),
            symbols.len(),
            report.skipped.len(),
            started.elapsed()
        );
        report
    }

    async fn fetch_index(&self, from: NaiveDate, to: NaiveDate) -> Option<(String, Vec<f64>)> {
        let symbol = self.config.index_symbol.as_ref()?;
        match self.provider.get_historical_prices(symbol, from, to).await {
            Ok(prices) if prices.len() >= 2 => Some((symbol.clone(), prices)),
            Ok(_) => {
                tracing::warn!("Index {} returned too little history", symbol);
                None
            }
            Err(e) => {
                tracing::warn!("Index {} unavailable: {}", symbol, e);
                None
            }
        }
    }
}

async fn score_one(ctx: &RunContext, symbol: &str) -> Result<ScoreResult, AnalyticsError> {
    let provider = ctx.provider.as_ref();
    let (profile, quote, fundamentals, history) = tokio::join!(
        provider.get_profile(symbol),
        provider.get_quote(symbol),
        provider.get_fundamentals(symbol),
        provider.get_historical_prices(symbol, ctx.from, ctx.to),
    );

    let profile = profile?;
    let quote = quote?;
    let fundamentals = fundamentals.unwrap_or_else(|e| {
        tracing::warn!("Fundamentals unavailable for {}: {}", symbol, e);
        RawMetricBag::new()
    });
    let history = history.unwrap_or_else(|e| {
        tracing::warn!("History unavailable for {}: {}", symbol, e);
        Vec::new()
    });

    let mut snapshot = SecuritySnapshot::new(symbol, quote)
        .with_metrics(MetricNormalizer::normalize(&fundamentals))
        .with_history(history);
    if let Some(sector) = profile.sector.clone() {
        snapshot = snapshot.with_sector(sector);
    }
    if let Some(region) = profile.region.clone() {
        snapshot = snapshot.with_region(region);
    }
    if let Some(comparison) = index_comparison(ctx, &snapshot.history) {
        snapshot = snapshot.with_index_comparison(comparison);
    }

    let benchmark = match profile.sector.as_deref() {
        Some(sector) => sector_benchmark(ctx, sector).await,
        None => None,
    };

    ctx.scorer.score(&snapshot, benchmark.as_deref())
}

async fn sector_benchmark(
    ctx: &RunContext,
    sector: &str,
) -> Option<Arc<analytics_core::SectorBenchmark>> {
    let peers = ctx.peers.peers_for(sector);
    if peers.is_empty() {
        return None;
    }
    ctx.cache
        .get_or_build(sector, || async {
            build_benchmark(sector, peers, ctx.provider.as_ref()).await.map(Arc::new)
        })
        .await
}

/// Percent return of the security minus the index over their common window
fn index_comparison(ctx: &RunContext, history: &[f64]) -> Option<IndexComparison> {
    let (index_symbol, index_prices) = ctx.index.as_ref()?;
    let lookback = history.len().min(index_prices.len()).checked_sub(1)?;
    let own = trailing_return(history, lookback)?;
    let index = trailing_return(index_prices, lookback)?;
    Some(IndexComparison {
        index_symbol: index_symbol.clone(),
        relative_return_pct: (own - index) * 100.0,
    })
}
