use analytics_core::{
    AnalyticsError, CanonicalMetric, CategoryScores, Grade, MetricSet, PartialCategoryScores,
    ScoreCategory, ScoreResult, SectorBenchmark, SectorComparison, SecuritySnapshot,
};
use tracing::debug;

use crate::categories::{
    fcf_yield, score_cash_flow, score_debt_liquidity, score_growth, score_momentum,
    score_profitability, score_value, static_category_scores, ReasonCollector, ScoringContext,
    FALLBACK_SECTOR_PE,
};

/// Metrics the model reads directly. Cash-flow yield alternates are checked
/// through [`fcf_yield`] instead.
const MODEL_INPUTS: [CanonicalMetric; 15] = [
    CanonicalMetric::PeRatio,
    CanonicalMetric::PbRatio,
    CanonicalMetric::PsRatio,
    CanonicalMetric::EvToEbitda,
    CanonicalMetric::RevenueGrowth,
    CanonicalMetric::EpsGrowth,
    CanonicalMetric::EbitdaGrowth,
    CanonicalMetric::NetMargin,
    CanonicalMetric::Roe,
    CanonicalMetric::Roa,
    CanonicalMetric::CashFlowPerShare,
    CanonicalMetric::DebtToEquity,
    CanonicalMetric::CurrentRatio,
    CanonicalMetric::QuickRatio,
    CanonicalMetric::InterestCoverage,
];

/// Revenue growth above which a below-sector P/E reads as growth at a reasonable price
const GARP_MIN_REVENUE_GROWTH: f64 = 0.15;

pub struct SecurityScorer;

impl SecurityScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score one security, optionally against its sector benchmark.
    ///
    /// Missing optional metrics never fail the call; they lower the affected
    /// category and show up in `missing_inputs`.
    pub fn score(
        &self,
        snapshot: &SecuritySnapshot,
        benchmark: Option<&SectorBenchmark>,
    ) -> Result<ScoreResult, AnalyticsError> {
        Self::validate(snapshot)?;

        let metrics = &snapshot.metrics;
        let ctx = ScoringContext {
            sector: snapshot.sector.as_deref(),
            sector_averages: benchmark.map(|b| &b.averages),
        };
        let mut reasons = ReasonCollector::new();

        let mut scores = CategoryScores::default();
        scores.set(ScoreCategory::Value, score_value(metrics, &ctx, &mut reasons).score);
        scores.set(ScoreCategory::Growth, score_growth(metrics, &ctx, &mut reasons).score);
        scores.set(
            ScoreCategory::Profitability,
            score_profitability(metrics, &ctx, &mut reasons).score,
        );
        scores.set(ScoreCategory::CashFlow, score_cash_flow(metrics, &mut reasons).score);
        scores.set(
            ScoreCategory::Momentum,
            score_momentum(
                &snapshot.history,
                snapshot.quote.change_percent,
                snapshot.index_comparison.as_ref(),
                &mut reasons,
            )
            .score,
        );
        scores.set(
            ScoreCategory::DebtLiquidity,
            score_debt_liquidity(metrics, &ctx, &mut reasons).score,
        );

        Self::growth_at_reasonable_price(metrics, &ctx, &mut reasons);

        let overall_score = scores.overall();
        let missing_inputs = Self::missing_inputs(snapshot);

        debug!(
            "Scored {}: {} ({} missing inputs)",
            snapshot.symbol,
            overall_score,
            missing_inputs.len()
        );

        Ok(ScoreResult {
            symbol: snapshot.symbol.clone(),
            overall_score,
            grade: Grade::from_score(overall_score),
            category_scores: scores,
            sector_comparison: benchmark.map(|b| Self::compare(metrics, b)),
            reasons: reasons.finish(),
            partial_data: !missing_inputs.is_empty(),
            missing_inputs,
        })
    }

    fn validate(snapshot: &SecuritySnapshot) -> Result<(), AnalyticsError> {
        if snapshot.symbol.trim().is_empty() {
            return Err(AnalyticsError::DataUnavailable("empty symbol".to_string()));
        }
        let price = snapshot.quote.price;
        if !price.is_finite() || price <= 0.0 {
            return Err(AnalyticsError::InvalidInput(format!(
                "{}: quote price must be positive and finite, got {}",
                snapshot.symbol, price
            )));
        }
        if snapshot.history.iter().any(|p| !p.is_finite()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "{}: price history contains non-finite values",
                snapshot.symbol
            )));
        }
        Ok(())
    }

    fn growth_at_reasonable_price(
        metrics: &MetricSet,
        ctx: &ScoringContext,
        reasons: &mut ReasonCollector,
    ) {
        let pe = metrics.get(CanonicalMetric::PeRatio).filter(|v| *v > 0.0);
        let growth = metrics.get(CanonicalMetric::RevenueGrowth);
        if let (Some(pe), Some(growth)) = (pe, growth) {
            let sector_pe = ctx.sector_avg(CanonicalMetric::PeRatio).unwrap_or(FALLBACK_SECTOR_PE);
            if growth > GARP_MIN_REVENUE_GROWTH && pe < sector_pe {
                reasons.opportunity("Growth at a reasonable price".to_string());
            }
        }
    }

    /// Deltas against the benchmark on the benchmark's own scale: the subject is
    /// rescored with the same static thresholds the peers were. Categories the
    /// subject has no inputs for count as 0, as in the headline score.
    fn compare(metrics: &MetricSet, benchmark: &SectorBenchmark) -> SectorComparison {
        let subject = static_category_scores(&benchmark.sector, metrics);
        let mut vs_sector = PartialCategoryScores::default();
        for category in ScoreCategory::ALL {
            let delta = benchmark
                .category_scores
                .get(category)
                .map(|sector_score| subject.get(category).unwrap_or(0.0) - sector_score);
            vs_sector.set(category, delta);
        }
        SectorComparison {
            sector: benchmark.sector.clone(),
            sector_average: benchmark.category_scores,
            vs_sector,
        }
    }

    fn missing_inputs(snapshot: &SecuritySnapshot) -> Vec<String> {
        let mut missing: Vec<String> = MODEL_INPUTS
            .iter()
            .filter(|m| !snapshot.metrics.contains(**m))
            .map(|m| m.as_str().to_string())
            .collect();
        if fcf_yield(&snapshot.metrics).is_none() {
            missing.push(CanonicalMetric::FcfYield.as_str().to_string());
        }
        if snapshot.history.is_empty() {
            missing.push("price_history".to_string());
        }
        missing
    }
}

impl Default for SecurityScorer {
    fn default() -> Self {
        Self::new()
    }
}
