use std::future::Future;
use std::sync::Arc;

use analytics_core::SectorBenchmark;
use dashmap::DashMap;
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Option<Arc<SectorBenchmark>>>>;

/// Sector benchmarks for one run. Concurrent requests for the same sector
/// share a single build; an unavailable result is cached too.
#[derive(Default)]
pub struct BenchmarkCache {
    slots: DashMap<String, Slot>,
}

impl BenchmarkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_build<F, Fut>(&self, sector: &str, build: F) -> Option<Arc<SectorBenchmark>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Arc<SectorBenchmark>>>,
    {
        // Clone the slot out so the map shard is not held across the await
        let slot: Slot = self
            .slots
            .entry(sector.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        slot.get_or_init(build).await.clone()
    }

    /// Sectors with a finished build, available or not
    pub fn built(&self) -> usize {
        self.slots.iter().filter(|e| e.value().initialized()).count()
    }

    pub fn get(&self, sector: &str) -> Option<Arc<SectorBenchmark>> {
        self.slots.get(sector).and_then(|slot| slot.get().cloned().flatten())
    }
}
