use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use scenario_risk::DEFAULT_NOISE_BOUND_PCT;
use security_scoring::MAX_PEERS_PER_SECTOR;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    // Provider access
    pub max_concurrent_fetches: usize,  // 4
    pub fetch_pacing_ms: u64,           // 200
    pub fetch_timeout_secs: u64,        // 10

    // Windows (calendar days)
    pub history_days: i64,              // 365
    pub correlation_days: i64,          // 90

    // Benchmarks
    pub max_peers: usize,               // 10
    pub index_symbol: Option<String>,   // SPY

    // Scenario simulation
    pub scenario_noise_pct: f64,        // 2.0
    pub scenario_seed: Option<u64>,

    // Batch runs
    pub batch_deadline_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            fetch_pacing_ms: 200,
            fetch_timeout_secs: 10,
            history_days: 365,
            correlation_days: 90,
            max_peers: MAX_PEERS_PER_SECTOR,
            index_symbol: Some("SPY".to_string()),
            scenario_noise_pct: DEFAULT_NOISE_BOUND_PCT,
            scenario_seed: None,
            batch_deadline_secs: None,
        }
    }
}

impl EngineConfig {
    /// Load `.env` if present, then read `ANALYTICS_*` variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_concurrent_fetches: lookup("ANALYTICS_MAX_CONCURRENT_FETCHES")
                .unwrap_or_else(|| defaults.max_concurrent_fetches.to_string())
                .parse()
                .context("ANALYTICS_MAX_CONCURRENT_FETCHES must be an integer")?,
            fetch_pacing_ms: lookup("ANALYTICS_FETCH_PACING_MS")
                .unwrap_or_else(|| defaults.fetch_pacing_ms.to_string())
                .parse()
                .context("ANALYTICS_FETCH_PACING_MS must be an integer")?,
            fetch_timeout_secs: lookup("ANALYTICS_FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|| defaults.fetch_timeout_secs.to_string())
                .parse()
                .context("ANALYTICS_FETCH_TIMEOUT_SECS must be an integer")?,
            history_days: lookup("ANALYTICS_HISTORY_DAYS")
                .unwrap_or_else(|| defaults.history_days.to_string())
                .parse()
                .context("ANALYTICS_HISTORY_DAYS must be an integer")?,
            correlation_days: lookup("ANALYTICS_CORRELATION_DAYS")
                .unwrap_or_else(|| defaults.correlation_days.to_string())
                .parse()
                .context("ANALYTICS_CORRELATION_DAYS must be an integer")?,
            max_peers: lookup("ANALYTICS_MAX_PEERS")
                .unwrap_or_else(|| defaults.max_peers.to_string())
                .parse()
                .context("ANALYTICS_MAX_PEERS must be an integer")?,
            // Set but empty disables the index comparison
            index_symbol: match lookup("ANALYTICS_INDEX_SYMBOL") {
                Some(s) if s.trim().is_empty() => None,
                Some(s) => Some(s.trim().to_string()),
                None => defaults.index_symbol,
            },
            scenario_noise_pct: lookup("ANALYTICS_SCENARIO_NOISE_PCT")
                .unwrap_or_else(|| defaults.scenario_noise_pct.to_string())
                .parse()
                .context("ANALYTICS_SCENARIO_NOISE_PCT must be a number")?,
            scenario_seed: lookup("ANALYTICS_SCENARIO_SEED")
                .map(|s| s.parse())
                .transpose()
                .context("ANALYTICS_SCENARIO_SEED must be an unsigned integer")?,
            batch_deadline_secs: lookup("ANALYTICS_BATCH_DEADLINE_SECS")
                .map(|s| s.parse())
                .transpose()
                .context("ANALYTICS_BATCH_DEADLINE_SECS must be an integer")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_fetches == 0 {
            bail!("max_concurrent_fetches must be at least 1");
        }
        if !self.scenario_noise_pct.is_finite() || self.scenario_noise_pct < 0.0 {
            bail!("scenario_noise_pct must be non-negative, got {}", self.scenario_noise_pct);
        }
        if self.history_days <= 0 || self.correlation_days <= 0 {
            bail!("history and correlation windows must be positive");
        }
        Ok(())
    }

    pub fn fetch_pacing(&self) -> Duration {
        Duration::from_millis(self.fetch_pacing_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn batch_deadline(&self) -> Option<Duration> {
        self.batch_deadline_secs.map(Duration::from_secs)
    }
}
