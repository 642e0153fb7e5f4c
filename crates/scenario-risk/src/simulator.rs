use analytics_core::{
    portfolio_total, AnalyticsError, HoldingImpact, Position, RiskScenario, ScenarioImpactReport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Per-holding noise half-width, in percentage points
pub const DEFAULT_NOISE_BOUND_PCT: f64 = 2.0;

/// Applies a scenario to a portfolio. Seeded simulators are reproducible;
/// unseeded ones draw from entropy.
pub struct ScenarioSimulator {
    rng: StdRng,
    noise_bound: f64,
}

impl ScenarioSimulator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            noise_bound: DEFAULT_NOISE_BOUND_PCT,
        }
    }

    pub fn with_noise_bound(mut self, bound_pct: f64) -> Self {
        self.noise_bound = bound_pct;
        self
    }

    pub fn simulate(
        &mut self,
        positions: &[Position],
        scenario: &RiskScenario,
    ) -> Result<ScenarioImpactReport, AnalyticsError> {
        if !self.noise_bound.is_finite() || self.noise_bound < 0.0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "noise bound must be non-negative, got {}",
                self.noise_bound
            )));
        }
        let current_value = portfolio_total(positions)?;

        let mut holdings_impact: Vec<HoldingImpact> = positions
            .iter()
            .map(|position| {
                let impact = scenario.impact_for(position.sector.as_deref()) + self.noise();
                let projected_value = position.value * (1.0 + impact / 100.0);
                HoldingImpact {
                    symbol: position.symbol.clone(),
                    sector: position.sector.clone(),
                    current_value: position.value,
                    projected_value,
                    change: projected_value - position.value,
                    change_percent: impact,
                }
            })
            .collect();

        holdings_impact.sort_by(|a, b| {
            a.change_percent
                .partial_cmp(&b.change_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let projected_value: f64 = holdings_impact.iter().map(|h| h.projected_value).sum();
        let projected_change = projected_value - current_value;
        let projected_change_percent = projected_change / current_value * 100.0;

        debug!(
            "Scenario {}: {:.2}% portfolio vs {:.2}% market",
            scenario.id, projected_change_percent, scenario.market_impact
        );

        Ok(ScenarioImpactReport {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            current_value,
            projected_value,
            projected_change,
            projected_change_percent,
            market_impact_percent: scenario.market_impact,
            vs_market_percent: projected_change_percent - scenario.market_impact,
            worst_hit: holdings_impact.first().cloned(),
            best_performer: holdings_impact.last().cloned(),
            holdings_impact,
        })
    }

    fn noise(&mut self) -> f64 {
        if self.noise_bound > 0.0 {
            self.rng.gen_range(-self.noise_bound..=self.noise_bound)
        } else {
            0.0
        }
    }
}

impl Default for ScenarioSimulator {
    fn default() -> Self {
        Self::new(None)
    }
}
