pub mod benchmark;
pub mod categories;
pub mod engine;
pub mod normalizer;
#[cfg(test)]
mod tests;

pub use benchmark::{build_benchmark, FromPeerMetrics, SectorPeers, MAX_PEERS_PER_SECTOR};
pub use engine::SecurityScorer;
pub use normalizer::MetricNormalizer;
