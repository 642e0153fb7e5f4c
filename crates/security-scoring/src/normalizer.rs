//! Canonicalizes provider fundamentals into the fixed [`CanonicalMetric`] vocabulary.
//!
//! Providers spell the same ratio several ways and disagree on units. Every
//! spelling this engine accepts lives in [`ALIASES`]; nothing else in the
//! workspace looks at raw field names.
//!
//! Unit handling is a heuristic, not a guarantee: a [`MetricUnit::Fraction`]
//! value with magnitude above 1 is read as a whole-number percentage and divided
//! by 100. Anything at or below 1 keeps its fractional reading, so a genuine 0.5%
//! margin reported as `0.5` is read as 50%.

use analytics_core::{CanonicalMetric, MetricSet, MetricUnit, RawMetricBag};
use serde_json::Value;

/// Provider field names per canonical metric, highest priority first
pub const ALIASES: &[(CanonicalMetric, &[&str])] = &[
    (
        CanonicalMetric::PeRatio,
        &["peTTM", "peBasicExclExtraTTM", "peExclExtraTTM", "pe", "priceToEarnings", "peRatio"],
    ),
    (CanonicalMetric::PbRatio, &["pbTTM", "pbQuarterly", "pbAnnual", "pb", "priceToBook"]),
    (CanonicalMetric::PsRatio, &["psTTM", "psAnnual", "ps", "priceToSales"]),
    (
        CanonicalMetric::EvToEbitda,
        &["evEbitdaTTM", "currentEv/ebitdaTTM", "evEbitda", "enterpriseValueToEbitda"],
    ),
    (
        CanonicalMetric::RevenueGrowth,
        &[
            "revenueGrowthTTMYoy",
            "revenueGrowth3Y",
            "revenueGrowthTTM",
            "revenueGrowth",
            "salesGrowth",
        ],
    ),
    (
        CanonicalMetric::EpsGrowth,
        &["epsGrowthTTMYoy", "epsGrowth3Y", "epsGrowthTTM", "epsGrowth"],
    ),
    (CanonicalMetric::EbitdaGrowth, &["ebitdaCagr5Y", "ebitdaGrowthTTM", "ebitdaGrowth"]),
    (
        CanonicalMetric::NetMargin,
        &["netProfitMarginTTM", "netProfitMarginAnnual", "netProfitMargin", "profitMargin"],
    ),
    (
        CanonicalMetric::OperatingMargin,
        &["operatingMarginTTM", "operatingMarginAnnual", "operatingMargin"],
    ),
    (CanonicalMetric::Roe, &["roeTTM", "roeRfy", "roe", "returnOnEquity"]),
    (CanonicalMetric::Roa, &["roaTTM", "roaRfy", "roa", "returnOnAssets"]),
    (CanonicalMetric::FcfYield, &["fcfYieldTTM", "freeCashFlowYield", "fcfYield"]),
    (CanonicalMetric::PriceToFcf, &["pfcfShareTTM", "pfcfShareAnnual", "priceToFreeCashFlow"]),
    (
        CanonicalMetric::EvToFcf,
        &["currentEv/freeCashFlowTTM", "currentEv/freeCashFlowAnnual", "evToFcf"],
    ),
    (
        CanonicalMetric::CashFlowPerShare,
        &[
            "cashFlowPerShareTTM",
            "cashFlowPerShareQuarterly",
            "cashFlowPerShareAnnual",
            "cashFlowPerShare",
        ],
    ),
    (
        CanonicalMetric::DebtToEquity,
        &[
            "totalDebt/totalEquityQuarterly",
            "totalDebt/totalEquityAnnual",
            "longTermDebt/equityQuarterly",
            "debtToEquityTTM",
            "debtToEquity",
            "totalDebtToEquity",
        ],
    ),
    (
        CanonicalMetric::CurrentRatio,
        &["currentRatioQuarterly", "currentRatioAnnual", "currentRatioTTM", "currentRatio"],
    ),
    (
        CanonicalMetric::QuickRatio,
        &["quickRatioQuarterly", "quickRatioAnnual", "quickRatioTTM", "quickRatio"],
    ),
    (
        CanonicalMetric::InterestCoverage,
        &["netInterestCoverageTTM", "netInterestCoverageAnnual", "interestCoverage"],
    ),
];

pub struct MetricNormalizer;

impl MetricNormalizer {
    pub fn aliases(metric: CanonicalMetric) -> &'static [&'static str] {
        ALIASES
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }

    /// First present, numeric, finite alias wins, rescaled per the metric's unit.
    pub fn resolve(raw: &RawMetricBag, metric: CanonicalMetric) -> Option<f64> {
        Self::aliases(metric)
            .iter()
            .find_map(|name| raw.get(*name).and_then(numeric))
            .map(|v| rescale(metric.unit(), v))
    }

    pub fn normalize(raw: &RawMetricBag) -> MetricSet {
        let mut set = MetricSet::new();
        for metric in CanonicalMetric::ALL {
            if let Some(v) = Self::resolve(raw, metric) {
                set.insert(metric, v);
            }
        }
        set
    }
}

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn rescale(unit: MetricUnit, value: f64) -> f64 {
    match unit {
        MetricUnit::Fraction if value.abs() > 1.0 => value / 100.0,
        _ => value,
    }
}
