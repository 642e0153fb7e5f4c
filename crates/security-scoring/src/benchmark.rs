use std::collections::BTreeMap;

use analytics_core::{CanonicalMetric, MetricFetcher, MetricSet, SectorBenchmark};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categories::static_category_scores;
use crate::normalizer::MetricNormalizer;

pub const MAX_PEERS_PER_SECTOR: usize = 10;

/// Sector name -> representative peer symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPeers {
    peers: BTreeMap<String, Vec<String>>,
}

impl Default for SectorPeers {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "Technology",
                &["AAPL", "MSFT", "GOOGL", "NVDA", "META", "AMD", "INTC", "CRM", "ORCL", "ADBE"],
            ),
            ("Financial Services", &["JPM", "BAC", "WFC", "GS", "MS", "C", "BLK", "SCHW"]),
            ("Healthcare", &["JNJ", "PFE", "UNH", "ABBV", "MRK", "TMO", "ABT", "DHR"]),
            ("Consumer Cyclical", &["AMZN", "HD", "NKE", "MCD", "SBUX", "NFLX", "TSLA"]),
            ("Consumer Defensive", &["WMT", "PG", "KO", "PEP", "COST"]),
            ("Energy", &["XOM", "CVX", "COP", "SLB", "EOG"]),
            ("Industrials", &["BA", "CAT", "GE", "HON", "UNP"]),
            ("Communication Services", &["GOOGL", "META", "NFLX", "DIS", "VZ"]),
            ("Utilities", &["NEE", "DUK", "SO", "D", "AEP"]),
            ("Real Estate", &["AMT", "EQIX", "PLD", "PSA", "WELL"]),
            ("Basic Materials", &["LIN", "APD", "FCX", "NEM", "SHW"]),
        ];
        let mut peers = Self::empty();
        for (sector, symbols) in table {
            peers.set(*sector, symbols.iter().map(|s| s.to_string()).collect());
        }
        peers
    }
}

impl SectorPeers {
    pub fn empty() -> Self {
        Self { peers: BTreeMap::new() }
    }

    /// Replace the peer list for a sector; keeps at most [`MAX_PEERS_PER_SECTOR`].
    pub fn set(&mut self, sector: impl Into<String>, mut symbols: Vec<String>) {
        symbols.truncate(MAX_PEERS_PER_SECTOR);
        self.peers.insert(sector.into(), symbols);
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        for symbols in self.peers.values_mut() {
            symbols.truncate(limit.min(MAX_PEERS_PER_SECTOR));
        }
        self
    }

    pub fn peers_for(&self, sector: &str) -> &[String] {
        self.peers.get(sector).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.peers.keys().map(String::as_str)
    }
}

/// Averages peer metrics into a benchmark. Implemented for [`SectorBenchmark`].
pub trait FromPeerMetrics: Sized {
    fn from_peer_metrics(sector: &str, peers: &[MetricSet]) -> Option<Self>;
}

impl FromPeerMetrics for SectorBenchmark {
    fn from_peer_metrics(sector: &str, peers: &[MetricSet]) -> Option<Self> {
        let mut averages = MetricSet::new();
        for metric in CanonicalMetric::ALL {
            let values: Vec<f64> = peers.iter().filter_map(|p| p.get(metric)).collect();
            if !values.is_empty() {
                averages.insert(metric, values.iter().sum::<f64>() / values.len() as f64);
            }
        }

        if averages.is_empty() {
            return None;
        }

        let sample_size = peers.iter().filter(|p| !p.is_empty()).count();
        let category_scores = static_category_scores(sector, &averages);

        Some(SectorBenchmark {
            sector: sector.to_string(),
            averages,
            sample_size,
            category_scores,
        })
    }
}

/// Fetch and normalize each peer concurrently, then average. Failed peers are
/// logged and skipped; pacing is the fetcher's job.
pub async fn build_benchmark(
    sector: &str,
    peer_symbols: &[String],
    fetcher: &dyn MetricFetcher,
) -> Option<SectorBenchmark> {
    if peer_symbols.is_empty() {
        debug!("No peers configured for sector {}", sector);
        return None;
    }

    let futures: Vec<_> = peer_symbols
        .iter()
        .take(MAX_PEERS_PER_SECTOR)
        .map(|symbol| async move {
            match fetcher.fetch_metrics(symbol).await {
                Ok(raw) => Some(MetricNormalizer::normalize(&raw)),
                Err(e) => {
                    warn!("Skipping peer {} for sector {}: {}", symbol, sector, e);
                    None
                }
            }
        })
        .collect();

    let peers: Vec<MetricSet> = futures::future::join_all(futures)
        .await
        .into_iter()
        .flatten()
        .collect();

    let benchmark = SectorBenchmark::from_peer_metrics(sector, &peers);
    match &benchmark {
        Some(b) => debug!("Built {} benchmark from {} peers", sector, b.sample_size),
        None => warn!("No usable peer metrics for sector {}", sector),
    }
    benchmark
}
