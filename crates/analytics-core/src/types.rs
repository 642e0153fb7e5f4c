use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Latest quote for a security
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    /// Daily change in percent units (1.5 = +1.5%)
    #[serde(default)]
    pub change_percent: Option<f64>,
}

/// Identity and classification tags for a security
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityProfile {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

/// Fundamentals exactly as a provider delivered them (any field names, any units)
pub type RawMetricBag = HashMap<String, serde_json::Value>;

/// How a canonical metric is expressed once normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    /// Unbounded multiple such as P/E or a current ratio
    Multiple,
    /// Ratio conceptually bounded to [-1, 1] (margins, growth, returns, yields)
    Fraction,
}

/// Closed vocabulary of fundamental metrics understood by the scoring model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalMetric {
    PeRatio,
    PbRatio,
    PsRatio,
    EvToEbitda,
    RevenueGrowth,
    EpsGrowth,
    EbitdaGrowth,
    NetMargin,
    OperatingMargin,
    Roe,
    Roa,
    FcfYield,
    PriceToFcf,
    EvToFcf,
    CashFlowPerShare,
    DebtToEquity,
    CurrentRatio,
    QuickRatio,
    InterestCoverage,
}

impl CanonicalMetric {
    pub const ALL: [CanonicalMetric; 19] = [
        CanonicalMetric::PeRatio,
        CanonicalMetric::PbRatio,
        CanonicalMetric::PsRatio,
        CanonicalMetric::EvToEbitda,
        CanonicalMetric::RevenueGrowth,
        CanonicalMetric::EpsGrowth,
        CanonicalMetric::EbitdaGrowth,
        CanonicalMetric::NetMargin,
        CanonicalMetric::OperatingMargin,
        CanonicalMetric::Roe,
        CanonicalMetric::Roa,
        CanonicalMetric::FcfYield,
        CanonicalMetric::PriceToFcf,
        CanonicalMetric::EvToFcf,
        CanonicalMetric::CashFlowPerShare,
        CanonicalMetric::DebtToEquity,
        CanonicalMetric::CurrentRatio,
        CanonicalMetric::QuickRatio,
        CanonicalMetric::InterestCoverage,
    ];

    pub fn unit(&self) -> MetricUnit {
        match self {
            CanonicalMetric::RevenueGrowth
            | CanonicalMetric::EpsGrowth
            | CanonicalMetric::EbitdaGrowth
            | CanonicalMetric::NetMargin
            | CanonicalMetric::OperatingMargin
            | CanonicalMetric::Roe
            | CanonicalMetric::Roa
            | CanonicalMetric::FcfYield => MetricUnit::Fraction,
            _ => MetricUnit::Multiple,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalMetric::PeRatio => "pe_ratio",
            CanonicalMetric::PbRatio => "pb_ratio",
            CanonicalMetric::PsRatio => "ps_ratio",
            CanonicalMetric::EvToEbitda => "ev_to_ebitda",
            CanonicalMetric::RevenueGrowth => "revenue_growth",
            CanonicalMetric::EpsGrowth => "eps_growth",
            CanonicalMetric::EbitdaGrowth => "ebitda_growth",
            CanonicalMetric::NetMargin => "net_margin",
            CanonicalMetric::OperatingMargin => "operating_margin",
            CanonicalMetric::Roe => "roe",
            CanonicalMetric::Roa => "roa",
            CanonicalMetric::FcfYield => "fcf_yield",
            CanonicalMetric::PriceToFcf => "price_to_fcf",
            CanonicalMetric::EvToFcf => "ev_to_fcf",
            CanonicalMetric::CashFlowPerShare => "cash_flow_per_share",
            CanonicalMetric::DebtToEquity => "debt_to_equity",
            CanonicalMetric::CurrentRatio => "current_ratio",
            CanonicalMetric::QuickRatio => "quick_ratio",
            CanonicalMetric::InterestCoverage => "interest_coverage",
        }
    }
}

impl fmt::Display for CanonicalMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized fundamentals. A missing key means the metric is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<CanonicalMetric, f64>);

impl MetricSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, metric: CanonicalMetric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    /// Non-finite values are dropped so absence stays the only "no data" state.
    pub fn insert(&mut self, metric: CanonicalMetric, value: f64) {
        if value.is_finite() {
            self.0.insert(metric, value);
        }
    }

    pub fn with(mut self, metric: CanonicalMetric, value: f64) -> Self {
        self.insert(metric, value);
        self
    }

    pub fn contains(&self, metric: CanonicalMetric) -> bool {
        self.0.contains_key(&metric)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Trailing performance relative to a market index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexComparison {
    pub index_symbol: String,
    /// Security return minus index return over the common window, percent units
    pub relative_return_pct: f64,
}

/// Everything the scorer needs for one security
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySnapshot {
    pub symbol: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub quote: Quote,
    #[serde(default)]
    pub metrics: MetricSet,
    /// Daily closes, oldest to newest
    #[serde(default)]
    pub history: Vec<f64>,
    #[serde(default)]
    pub index_comparison: Option<IndexComparison>,
}

impl SecuritySnapshot {
    pub fn new(symbol: impl Into<String>, quote: Quote) -> Self {
        Self {
            symbol: symbol.into(),
            sector: None,
            region: None,
            quote,
            metrics: MetricSet::new(),
            history: Vec::new(),
            index_comparison: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_metrics(mut self, metrics: MetricSet) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_history(mut self, history: Vec<f64>) -> Self {
        self.history = history;
        self
    }

    pub fn with_index_comparison(mut self, comparison: IndexComparison) -> Self {
        self.index_comparison = Some(comparison);
        self
    }
}

/// The six scoring categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Value,
    Growth,
    Profitability,
    CashFlow,
    Momentum,
    DebtLiquidity,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 6] = [
        ScoreCategory::Value,
        ScoreCategory::Growth,
        ScoreCategory::Profitability,
        ScoreCategory::CashFlow,
        ScoreCategory::Momentum,
        ScoreCategory::DebtLiquidity,
    ];

    /// Weight in basis points of the overall score. Sums to exactly 100.
    pub fn weight_points(&self) -> u32 {
        match self {
            ScoreCategory::Value => 15,
            ScoreCategory::Growth => 20,
            ScoreCategory::Profitability => 25,
            ScoreCategory::CashFlow => 15,
            ScoreCategory::Momentum => 10,
            ScoreCategory::DebtLiquidity => 15,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight_points() as f64 / 100.0
    }
}

/// Computed category scores, each in 0..=100
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub value: f64,
    pub growth: f64,
    pub profitability: f64,
    pub cash_flow: f64,
    pub momentum: f64,
    pub debt_liquidity: f64,
}

impl CategoryScores {
    pub fn get(&self, category: ScoreCategory) -> f64 {
        match category {
            ScoreCategory::Value => self.value,
            ScoreCategory::Growth => self.growth,
            ScoreCategory::Profitability => self.profitability,
            ScoreCategory::CashFlow => self.cash_flow,
            ScoreCategory::Momentum => self.momentum,
            ScoreCategory::DebtLiquidity => self.debt_liquidity,
        }
    }

    pub fn set(&mut self, category: ScoreCategory, score: f64) {
        let slot = match category {
            ScoreCategory::Value => &mut self.value,
            ScoreCategory::Growth => &mut self.growth,
            ScoreCategory::Profitability => &mut self.profitability,
            ScoreCategory::CashFlow => &mut self.cash_flow,
            ScoreCategory::Momentum => &mut self.momentum,
            ScoreCategory::DebtLiquidity => &mut self.debt_liquidity,
        };
        *slot = score;
    }

    /// round(Σ weight_i * score_i)
    pub fn overall(&self) -> u8 {
        let weighted: f64 = ScoreCategory::ALL
            .iter()
            .map(|c| c.weight_points() as f64 * self.get(*c))
            .sum::<f64>()
            / 100.0;
        weighted.round().clamp(0.0, 100.0) as u8
    }
}

/// Per-category values where any category may be unavailable
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialCategoryScores {
    pub value: Option<f64>,
    pub growth: Option<f64>,
    pub profitability: Option<f64>,
    pub cash_flow: Option<f64>,
    pub momentum: Option<f64>,
    pub debt_liquidity: Option<f64>,
}

impl PartialCategoryScores {
    pub fn get(&self, category: ScoreCategory) -> Option<f64> {
        match category {
            ScoreCategory::Value => self.value,
            ScoreCategory::Growth => self.growth,
            ScoreCategory::Profitability => self.profitability,
            ScoreCategory::CashFlow => self.cash_flow,
            ScoreCategory::Momentum => self.momentum,
            ScoreCategory::DebtLiquidity => self.debt_liquidity,
        }
    }

    pub fn set(&mut self, category: ScoreCategory, score: Option<f64>) {
        let slot = match category {
            ScoreCategory::Value => &mut self.value,
            ScoreCategory::Growth => &mut self.growth,
            ScoreCategory::Profitability => &mut self.profitability,
            ScoreCategory::CashFlow => &mut self.cash_flow,
            ScoreCategory::Momentum => &mut self.momentum,
            ScoreCategory::DebtLiquidity => &mut self.debt_liquidity,
        };
        *slot = score;
    }

    pub fn available_count(&self) -> usize {
        ScoreCategory::ALL.iter().filter(|c| self.get(**c).is_some()).count()
    }
}

/// Peer-averaged baseline for one sector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorBenchmark {
    pub sector: String,
    /// Arithmetic mean per metric over the peers that reported it
    pub averages: MetricSet,
    /// Peers that contributed at least one metric
    pub sample_size: usize,
    pub category_scores: PartialCategoryScores,
}

/// Letter grade, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 95 => Grade::APlus,
            s if s >= 90 => Grade::A,
            s if s >= 85 => Grade::AMinus,
            s if s >= 80 => Grade::BPlus,
            s if s >= 75 => Grade::B,
            s if s >= 70 => Grade::BMinus,
            s if s >= 65 => Grade::CPlus,
            s if s >= 60 => Grade::C,
            s if s >= 55 => Grade::CMinus,
            s if s >= 50 => Grade::D,
            _ => Grade::F,
        }
    }

    /// 0 for A+ down to 10 for F
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::CMinus => "C-",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Security versus its sector benchmark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorComparison {
    pub sector: String,
    pub sector_average: PartialCategoryScores,
    /// score - benchmark score; None where the benchmark category is unavailable
    pub vs_sector: PartialCategoryScores,
}

/// Narrative triggers produced by threshold crossings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreReasons {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub symbol: String,
    pub overall_score: u8,
    pub grade: Grade,
    pub category_scores: CategoryScores,
    pub sector_comparison: Option<SectorComparison>,
    pub reasons: ScoreReasons,
    /// Some optional metrics or the price history were missing
    pub partial_data: bool,
    pub missing_inputs: Vec<String>,
}

/// A portfolio holding. `value` is a weight or a money amount; consumers normalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub value: f64,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl Position {
    pub fn new(symbol: impl Into<String>, value: f64) -> Self {
        Self {
            symbol: symbol.into(),
            value,
            sector: None,
            region: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn sector_or_unknown(&self) -> &str {
        self.sector.as_deref().unwrap_or(UNKNOWN_TAG)
    }

    pub fn region_or_unknown(&self) -> &str {
        self.region.as_deref().unwrap_or(UNKNOWN_TAG)
    }
}

pub const UNKNOWN_TAG: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Medium,
    Low,
}

impl Significance {
    pub fn from_correlation(r: f64) -> Self {
        let abs = r.abs();
        if abs > 0.7 {
            Significance::High
        } else if abs > 0.4 {
            Significance::Medium
        } else {
            Significance::Low
        }
    }
}

/// Unordered pair; `symbol1 < symbol2`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub symbol1: String,
    pub symbol2: String,
    pub correlation: f64,
    pub significance: Significance,
    /// Number of daily return pairs the coefficient was computed from
    pub observations: usize,
}

impl CorrelationPair {
    pub fn involves(&self, symbol: &str) -> bool {
        self.symbol1 == symbol || self.symbol2 == symbol
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub category: String,
    /// Fraction of total portfolio weight
    pub percentage: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn classify(
        herfindahl_index: f64,
        max_single_holding: f64,
        top5_concentration: f64,
    ) -> Self {
        if herfindahl_index > 0.25 || max_single_holding > 0.3 || top5_concentration > 0.7 {
            RiskLevel::High
        } else if herfindahl_index > 0.15 || max_single_holding > 0.2 || top5_concentration > 0.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcentrationRisk {
    pub herfindahl_index: f64,
    pub max_single_holding: f64,
    pub top5_concentration: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    HighCorrelation,
    LowCorrelation,
    NegativeCorrelation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightRecommendation {
    ReduceCorrelatedExposure,
    WellDiversified,
    NaturalHedge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationInsight {
    pub kind: InsightKind,
    pub pairs: Vec<CorrelationPair>,
    pub recommendation: InsightRecommendation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversificationReport {
    pub sector_allocation: Vec<AllocationSlice>,
    pub region_allocation: Vec<AllocationSlice>,
    pub concentration_risk: ConcentrationRisk,
    pub correlation_insights: Vec<CorrelationInsight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceAction {
    Reduce,
    Increase,
    Add,
    Remove,
}

/// Advisory only; never applied automatically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalancingRecommendation {
    pub action: RebalanceAction,
    pub symbol: String,
    pub current_weight: f64,
    pub recommended_weight: f64,
    pub reason: String,
}

/// Macro scenario expressed as per-sector percent impacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskScenario {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sector_impacts: BTreeMap<String, f64>,
    pub default_impact: f64,
    pub market_impact: f64,
}

impl RiskScenario {
    pub fn impact_for(&self, sector: Option<&str>) -> f64 {
        sector
            .and_then(|s| self.sector_impacts.get(s))
            .copied()
            .unwrap_or(self.default_impact)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingImpact {
    pub symbol: String,
    pub sector: Option<String>,
    pub current_value: f64,
    pub projected_value: f64,
    pub change: f64,
    /// Realized impact in percent, noise included
    pub change_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioImpactReport {
    pub scenario_id: String,
    pub scenario_name: String,
    pub current_value: f64,
    pub projected_value: f64,
    pub projected_change: f64,
    pub projected_change_percent: f64,
    pub market_impact_percent: f64,
    /// Portfolio change minus the scenario's market impact
    pub vs_market_percent: f64,
    /// Sorted by realized impact, worst first
    pub holdings_impact: Vec<HoldingImpact>,
    pub worst_hit: Option<HoldingImpact>,
    pub best_performer: Option<HoldingImpact>,
}
