//! Category scoring functions shared by the security scorer and the sector
//! benchmark builder, so a security and its sector land on the same 0-100 scale.
//!
//! Every function adds points only for inputs that are present. A present but
//! poor value still earns the lowest band; an absent one earns nothing.

use analytics_core::{
    trailing_return, CanonicalMetric, IndexComparison, MetricSet, PartialCategoryScores,
    ScoreCategory, ScoreReasons,
};

/// Static sector P/E used when no benchmark average is available
pub const FALLBACK_SECTOR_PE: f64 = 25.0;
pub const FALLBACK_SECTOR_REVENUE_GROWTH: f64 = 0.15;
pub const FALLBACK_SECTOR_NET_MARGIN: f64 = 0.15;

pub const MAX_STRENGTHS: usize = 8;
pub const MAX_WEAKNESSES: usize = 5;
pub const MAX_OPPORTUNITIES: usize = 3;
pub const MAX_THREATS: usize = 3;

/// Trading days per lookback window
const DAYS_3M: usize = 63;
const DAYS_6M: usize = 126;
const DAYS_12M: usize = 252;

/// Typical debt-to-equity when no peer average exists, keyed by sector archetype
pub fn debt_to_equity_norm(sector: Option<&str>) -> f64 {
    match sector {
        Some("Financial Services") | Some("Financials") => 8.0,
        Some("Energy") => 3.0,
        Some("Technology") => 0.5,
        _ => 1.5,
    }
}

/// Sector averages the thresholds are drawn from, when a benchmark exists
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringContext<'a> {
    pub sector: Option<&'a str>,
    pub sector_averages: Option<&'a MetricSet>,
}

impl<'a> ScoringContext<'a> {
    /// Positive peer average for a metric. Non-positive averages cannot anchor a
    /// relative band, so they count as missing.
    pub fn sector_avg(&self, metric: CanonicalMetric) -> Option<f64> {
        self.sector_averages
            .and_then(|avg| avg.get(metric))
            .filter(|v| *v > 0.0)
    }
}

/// Result of one category: capped score and how many inputs fed it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryOutcome {
    pub score: f64,
    pub inputs: usize,
}

impl CategoryOutcome {
    fn new() -> Self {
        Self { score: 0.0, inputs: 0 }
    }

    fn add(&mut self, points: f64) {
        self.score += points;
        self.inputs += 1;
    }

    fn capped(mut self) -> Self {
        self.score = self.score.clamp(0.0, 100.0);
        self
    }

    /// None when no input was present at all
    pub fn available(&self) -> Option<f64> {
        (self.inputs > 0).then_some(self.score)
    }
}

/// Collects narrative triggers and enforces the per-list caps
#[derive(Debug, Default)]
pub struct ReasonCollector {
    reasons: ScoreReasons,
}

impl ReasonCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strength(&mut self, text: String) {
        push_capped(&mut self.reasons.strengths, text, MAX_STRENGTHS);
    }

    pub fn weakness(&mut self, text: String) {
        push_capped(&mut self.reasons.weaknesses, text, MAX_WEAKNESSES);
    }

    pub fn opportunity(&mut self, text: String) {
        push_capped(&mut self.reasons.opportunities, text, MAX_OPPORTUNITIES);
    }

    pub fn threat(&mut self, text: String) {
        push_capped(&mut self.reasons.threats, text, MAX_THREATS);
    }

    pub fn finish(self) -> ScoreReasons {
        self.reasons
    }
}

fn push_capped(list: &mut Vec<String>, text: String, cap: usize) {
    if list.len() < cap {
        list.push(text);
    }
}

/// Points for a lower-is-better ratio against `reference`:
/// first band whose `multiple * reference` exceeds `value` wins.
fn lower_is_better(value: f64, reference: f64, bands: &[(f64, f64)], floor: f64) -> f64 {
    bands
        .iter()
        .find(|(multiple, _)| value < reference * multiple)
        .map(|(_, points)| *points)
        .unwrap_or(floor)
}

/// Points for a higher-is-better value against absolute breakpoints
fn higher_is_better(value: f64, bands: &[(f64, f64)], floor: f64) -> f64 {
    bands
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(floor)
}

fn pct(v: f64) -> f64 {
    v * 100.0
}

pub fn score_value(
    metrics: &MetricSet,
    ctx: &ScoringContext,
    reasons: &mut ReasonCollector,
) -> CategoryOutcome {
    let mut out = CategoryOutcome::new();

    if let Some(pe) = metrics.get(CanonicalMetric::PeRatio).filter(|v| *v > 0.0) {
        let sector_pe = ctx.sector_avg(CanonicalMetric::PeRatio).unwrap_or(FALLBACK_SECTOR_PE);
        out.add(lower_is_better(pe, sector_pe, &[(0.8, 30.0), (1.0, 25.0), (1.2, 20.0)], 15.0));
        if pe < sector_pe * 0.7 {
            reasons.strength(format!("Low P/E vs sector ({:.1} vs {:.1})", pe, sector_pe));
        } else if pe > sector_pe * 1.5 {
            reasons.weakness(format!("High P/E vs sector ({:.1} vs {:.1})", pe, sector_pe));
        }
        if ctx.sector_avg(CanonicalMetric::PeRatio).is_some() && pe < sector_pe * 0.8 {
            reasons.opportunity("Valuation discount to sector peers".to_string());
        }
    }

    if let Some(pb) = metrics.get(CanonicalMetric::PbRatio).filter(|v| *v > 0.0) {
        match ctx.sector_avg(CanonicalMetric::PbRatio) {
            Some(sector_pb) => {
                let bands = [(0.8, 25.0), (1.0, 20.0), (1.2, 15.0)];
                out.add(lower_is_better(pb, sector_pb, &bands, 10.0));
                if pb < sector_pb * 0.7 {
                    reasons.strength(format!("Low P/B vs sector ({:.1} vs {:.1})", pb, sector_pb));
                }
            }
            None => {
                out.add(lower_is_better(pb, 1.0, &[(2.0, 25.0), (4.0, 20.0), (6.0, 15.0)], 10.0))
            }
        }
    }

    if let Some(ps) = metrics.get(CanonicalMetric::PsRatio).filter(|v| *v > 0.0) {
        match ctx.sector_avg(CanonicalMetric::PsRatio) {
            Some(sector_ps) => {
                let bands = [(0.8, 20.0), (1.0, 15.0), (1.2, 10.0)];
                out.add(lower_is_better(ps, sector_ps, &bands, 5.0))
            }
            None => {
                out.add(lower_is_better(ps, 1.0, &[(3.0, 20.0), (6.0, 15.0), (10.0, 10.0)], 5.0))
            }
        }
    }

    if let Some(ev) = metrics.get(CanonicalMetric::EvToEbitda).filter(|v| *v > 0.0) {
        match ctx.sector_avg(CanonicalMetric::EvToEbitda) {
            Some(sector_ev) => {
                let bands = [(0.8, 25.0), (1.0, 20.0), (1.2, 15.0)];
                out.add(lower_is_better(ev, sector_ev, &bands, 10.0))
            }
            None => {
                let bands = [(12.0, 25.0), (18.0, 20.0), (25.0, 15.0)];
                out.add(lower_is_better(ev, 1.0, &bands, 10.0))
            }
        }
    }

    out.capped()
}

pub fn score_growth(
    metrics: &MetricSet,
    ctx: &ScoringContext,
    reasons: &mut ReasonCollector,
) -> CategoryOutcome {
    let mut out = CategoryOutcome::new();

    if let Some(growth) = metrics.get(CanonicalMetric::RevenueGrowth) {
        let sector_growth = ctx
            .sector_avg(CanonicalMetric::RevenueGrowth)
            .unwrap_or(FALLBACK_SECTOR_REVENUE_GROWTH);
        out.add(if growth > sector_growth * 1.5 {
            40.0
        } else if growth > sector_growth {
            35.0
        } else if growth > 0.0 {
            25.0
        } else {
            10.0
        });
        if growth > sector_growth * 1.3 {
            reasons.strength(format!(
                "Revenue growth above sector ({:.1}% vs {:.1}%)",
                pct(growth),
                pct(sector_growth)
            ));
        } else if growth < 0.0 {
            reasons.weakness(format!("Revenue contracting ({:.1}%)", pct(growth)));
        }
    }

    if let Some(growth) = metrics.get(CanonicalMetric::EpsGrowth) {
        out.add(match ctx.sector_avg(CanonicalMetric::EpsGrowth) {
            Some(sector) if growth > sector * 1.5 => 30.0,
            Some(sector) if growth > sector => 25.0,
            Some(_) if growth > 0.0 => 20.0,
            Some(_) => 10.0,
            None => higher_is_better(growth, &[(0.2, 30.0), (0.1, 25.0), (0.0, 20.0)], 10.0),
        });
    }

    if let Some(growth) = metrics.get(CanonicalMetric::EbitdaGrowth) {
        out.add(match ctx.sector_avg(CanonicalMetric::EbitdaGrowth) {
            Some(sector) if growth > sector => 30.0,
            Some(_) if growth > 0.0 => 20.0,
            Some(_) => 10.0,
            None => higher_is_better(growth, &[(0.15, 30.0), (0.0, 20.0)], 10.0),
        });
    }

    out.capped()
}

pub fn score_profitability(
    metrics: &MetricSet,
    ctx: &ScoringContext,
    reasons: &mut ReasonCollector,
) -> CategoryOutcome {
    let mut out = CategoryOutcome::new();

    if let Some(margin) = metrics.get(CanonicalMetric::NetMargin) {
        let sector_margin = ctx
            .sector_avg(CanonicalMetric::NetMargin)
            .unwrap_or(FALLBACK_SECTOR_NET_MARGIN);
        out.add(if margin > sector_margin * 1.3 {
            35.0
        } else if margin > sector_margin {
            30.0
        } else if margin > 0.1 {
            25.0
        } else if margin > 0.0 {
            15.0
        } else {
            0.0
        });
        if margin > sector_margin * 1.2 {
            reasons.strength(format!(
                "Net margin above sector ({:.1}% vs {:.1}%)",
                pct(margin),
                pct(sector_margin)
            ));
        } else if margin < 0.0 {
            reasons.weakness(format!("Negative net margin ({:.1}%)", pct(margin)));
        }
    }

    if let Some(roe) = metrics.get(CanonicalMetric::Roe) {
        out.add(match ctx.sector_avg(CanonicalMetric::Roe) {
            Some(sector) if roe > sector * 1.3 => 35.0,
            Some(sector) if roe > sector => 30.0,
            Some(_) if roe > 0.0 => 20.0,
            Some(_) => 10.0,
            None => {
                let bands = [(0.2, 35.0), (0.15, 30.0), (0.1, 25.0), (0.0, 20.0)];
                higher_is_better(roe, &bands, 10.0)
            }
        });
    }

    if let Some(roa) = metrics.get(CanonicalMetric::Roa) {
        out.add(match ctx.sector_avg(CanonicalMetric::Roa) {
            Some(sector) if roa > sector * 1.3 => 30.0,
            Some(sector) if roa > sector => 25.0,
            Some(_) if roa > 0.0 => 20.0,
            Some(_) => 10.0,
            None => higher_is_better(roa, &[(0.1, 30.0), (0.05, 25.0), (0.0, 20.0)], 10.0),
        });
    }

    out.capped()
}

/// Direct FCF yield, else the inverse of price/FCF, else the inverse of EV/FCF
pub fn fcf_yield(metrics: &MetricSet) -> Option<f64> {
    metrics
        .get(CanonicalMetric::FcfYield)
        .or_else(|| {
            metrics
                .get(CanonicalMetric::PriceToFcf)
                .filter(|v| *v > 0.0)
                .map(|p| 1.0 / p)
        })
        .or_else(|| {
            metrics
                .get(CanonicalMetric::EvToFcf)
                .filter(|v| *v > 0.0)
                .map(|p| 1.0 / p)
        })
}

pub fn score_cash_flow(metrics: &MetricSet, reasons: &mut ReasonCollector) -> CategoryOutcome {
    let mut out = CategoryOutcome::new();

    match fcf_yield(metrics).filter(|y| *y > 0.0) {
        Some(y) => {
            out.add(higher_is_better(y, &[(0.05, 40.0), (0.03, 35.0)], 25.0));
            if y > 0.05 {
                reasons.strength(format!("High free cash flow yield ({:.1}%)", pct(y)));
            }
        }
        None => {
            if let Some(pfcf) = metrics.get(CanonicalMetric::PriceToFcf) {
                // Present but unusable yield still counts as an input
                out.add(if pfcf > 0.0 && pfcf < 15.0 { 30.0 } else { 0.0 });
            }
        }
    }

    if let Some(cfps) = metrics.get(CanonicalMetric::CashFlowPerShare) {
        if cfps > 0.0 {
            out.add(30.0);
            reasons.strength("Positive cash flow per share".to_string());
        } else {
            out.add(0.0);
            if cfps < 0.0 {
                reasons.weakness("Negative cash flow per share".to_string());
            }
        }
    }

    out.capped()
}

/// Percent return from the close `lookback` sessions before the latest one
fn trailing_return_pct(prices: &[f64], lookback: usize) -> Option<f64> {
    trailing_return(prices, lookback).map(pct)
}

pub fn score_momentum(
    history: &[f64],
    daily_change_pct: Option<f64>,
    index: Option<&IndexComparison>,
    reasons: &mut ReasonCollector,
) -> CategoryOutcome {
    let mut out = CategoryOutcome::new();

    if let Some(r) = trailing_return_pct(history, DAYS_3M) {
        out.add(higher_is_better(r, &[(10.0, 20.0), (5.0, 15.0), (0.0, 10.0)], 5.0));
    }
    if let Some(r) = trailing_return_pct(history, DAYS_6M) {
        out.add(higher_is_better(r, &[(20.0, 20.0), (10.0, 15.0), (0.0, 10.0)], 5.0));
    }
    if let Some(r) = trailing_return_pct(history, DAYS_12M) {
        out.add(higher_is_better(r, &[(30.0, 20.0), (15.0, 15.0), (0.0, 10.0)], 5.0));
    }

    if history.len() > DAYS_12M {
        let window = &history[history.len() - DAYS_12M..];
        let high = window.iter().copied().fold(f64::MIN, f64::max);
        if let (Some(current), true) = (history.last(), high > 0.0) {
            let proximity = current / high * 100.0;
            out.add(higher_is_better(proximity, &[(95.0, 20.0), (90.0, 15.0), (80.0, 10.0)], 5.0));
            if proximity > 95.0 {
                reasons.opportunity("Trading near its 52-week high".to_string());
            }
        }
    }

    if history.is_empty() {
        if let Some(change) = daily_change_pct {
            out.add(higher_is_better(change, &[(2.0, 15.0), (1.0, 10.0), (0.0, 5.0)], 0.0));
        }
    }

    if let Some(cmp) = index {
        let rel = cmp.relative_return_pct;
        out.add(higher_is_better(rel, &[(5.0, 20.0), (0.0, 15.0), (-5.0, 10.0)], 5.0));
        if rel > 5.0 {
            reasons.strength(format!("Outperforming {} (+{:.1}%)", cmp.index_symbol, rel));
        } else if rel < -10.0 {
            reasons.weakness(format!("Underperforming {} ({:.1}%)", cmp.index_symbol, rel));
        }
    }

    out.capped()
}

pub fn score_debt_liquidity(
    metrics: &MetricSet,
    ctx: &ScoringContext,
    reasons: &mut ReasonCollector,
) -> CategoryOutcome {
    let mut out = CategoryOutcome::new();

    if let Some(dte) = metrics.get(CanonicalMetric::DebtToEquity).map(f64::abs) {
        let norm = ctx
            .sector_avg(CanonicalMetric::DebtToEquity)
            .unwrap_or_else(|| debt_to_equity_norm(ctx.sector));
        if dte < norm * 0.7 {
            out.add(35.0);
            reasons.strength(format!("Low debt vs sector (D/E {:.2} vs {:.1})", dte, norm));
        } else if dte < norm {
            out.add(30.0);
        } else if dte < norm * 1.5 {
            out.add(20.0);
        } else {
            out.add(10.0);
            reasons.weakness(format!("High debt vs sector (D/E {:.2} vs {:.1})", dte, norm));
        }
    }

    if let Some(current) = metrics.get(CanonicalMetric::CurrentRatio) {
        out.add(higher_is_better(current, &[(2.0, 25.0), (1.5, 20.0), (1.0, 15.0)], 10.0));
        if current > 2.0 {
            reasons.strength(format!("Strong liquidity (current ratio {:.2})", current));
        } else if current < 1.0 {
            reasons.threat(format!("Liquidity pressure (current ratio {:.2})", current));
        }
    }

    if let Some(quick) = metrics.get(CanonicalMetric::QuickRatio) {
        out.add(higher_is_better(quick, &[(1.5, 20.0), (1.0, 15.0), (0.5, 10.0)], 5.0));
    }

    if let Some(coverage) = metrics.get(CanonicalMetric::InterestCoverage).filter(|v| *v > 0.0) {
        out.add(higher_is_better(coverage, &[(5.0, 20.0), (3.0, 15.0), (1.0, 10.0)], 5.0));
        if coverage < 1.5 {
            reasons.threat(format!("Thin interest coverage ({:.1}x)", coverage));
        }
    }

    out.capped()
}

/// Category scores on static thresholds, the scale sector benchmarks use.
/// Momentum needs price history, so it stays unavailable; categories with no
/// inputs are `None`.
pub fn static_category_scores(sector: &str, metrics: &MetricSet) -> PartialCategoryScores {
    let ctx = ScoringContext { sector: Some(sector), sector_averages: None };
    let mut discard = ReasonCollector::new();

    let mut scores = PartialCategoryScores::default();
    scores.set(ScoreCategory::Value, score_value(metrics, &ctx, &mut discard).available());
    scores.set(ScoreCategory::Growth, score_growth(metrics, &ctx, &mut discard).available());
    scores.set(
        ScoreCategory::Profitability,
        score_profitability(metrics, &ctx, &mut discard).available(),
    );
    scores.set(ScoreCategory::CashFlow, score_cash_flow(metrics, &mut discard).available());
    scores.set(
        ScoreCategory::DebtLiquidity,
        score_debt_liquidity(metrics, &ctx, &mut discard).available(),
    );
    scores
}
