//! Pre-built macro scenarios
//!
//! Sector impacts are expected percent moves; sectors not listed take the
//! scenario's default impact.

use std::collections::BTreeMap;

use analytics_core::{AnalyticsError, RiskScenario};

pub struct ScenarioLibrary;

impl ScenarioLibrary {
    /// Get all available scenarios
    pub fn all_scenarios() -> Vec<RiskScenario> {
        vec![
            Self::inflation_high(),
            Self::recession_2025(),
            Self::tech_crash(),
            Self::soft_landing(),
        ]
    }

    pub fn ids() -> Vec<String> {
        Self::all_scenarios().into_iter().map(|s| s.id).collect()
    }

    /// Get scenario by ID
    pub fn get_scenario(id: &str) -> Option<RiskScenario> {
        Self::all_scenarios().into_iter().find(|s| s.id == id)
    }

    /// Like [`get_scenario`](Self::get_scenario), but unknown ids are an error
    pub fn require(id: &str) -> Result<RiskScenario, AnalyticsError> {
        Self::get_scenario(id)
            .ok_or_else(|| AnalyticsError::DataUnavailable(format!("unknown scenario '{}'", id)))
    }

    fn build(
        id: &str,
        name: &str,
        description: &str,
        impacts: &[(&str, f64)],
        default_impact: f64,
        market_impact: f64,
    ) -> RiskScenario {
        RiskScenario {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            sector_impacts: impacts
                .iter()
                .map(|(sector, impact)| (sector.to_string(), *impact))
                .collect::<BTreeMap<_, _>>(),
            default_impact,
            market_impact,
        }
    }

    fn inflation_high() -> RiskScenario {
        Self::build(
            "inflation_high",
            "Persistent High Inflation (5%)",
            "Inflation stays elevated and keeps rates high. Growth and consumer names suffer.",
            &[
                ("Technology", -15.0),
                ("Consumer Cyclical", -10.0),
                ("Real Estate", -12.0),
                ("Financial Services", 5.0),
                ("Energy", 10.0),
                ("Healthcare", -2.0),
                ("Utilities", -5.0),
                ("Communication Services", -10.0),
                ("Industrials", -5.0),
                ("Basic Materials", 5.0),
            ],
            -8.0,
            -10.0,
        )
    }

    fn recession_2025() -> RiskScenario {
        Self::build(
            "recession_2025",
            "Global Recession 2025",
            "Severe economic slowdown with falling demand and earnings.",
            &[
                ("Technology", -20.0),
                ("Consumer Cyclical", -25.0),
                ("Real Estate", -15.0),
                ("Financial Services", -15.0),
                ("Energy", -20.0),
                ("Healthcare", 5.0),
                ("Utilities", 2.0),
                ("Communication Services", -15.0),
                ("Industrials", -20.0),
                ("Basic Materials", -15.0),
            ],
            -15.0,
            -20.0,
        )
    }

    fn tech_crash() -> RiskScenario {
        Self::build(
            "tech_crash",
            "AI / Tech Bubble Burst",
            "Sharp correction in stretched technology valuations.",
            &[
                ("Technology", -35.0),
                ("Consumer Cyclical", -10.0),
                ("Communication Services", -20.0),
                ("Real Estate", -5.0),
                ("Financial Services", -5.0),
                ("Energy", -2.0),
                ("Healthcare", 0.0),
                ("Utilities", 0.0),
                ("Industrials", -5.0),
                ("Basic Materials", -2.0),
            ],
            -5.0,
            -12.0,
        )
    }

    fn soft_landing() -> RiskScenario {
        Self::build(
            "soft_landing",
            "Soft Landing",
            "The economy cools without a recession while rates come down gradually.",
            &[
                ("Technology", 10.0),
                ("Consumer Cyclical", 8.0),
                ("Real Estate", 15.0),
                ("Financial Services", 5.0),
                ("Energy", -5.0),
                ("Healthcare", 5.0),
                ("Utilities", 8.0),
                ("Communication Services", 8.0),
                ("Industrials", 5.0),
                ("Basic Materials", 5.0),
            ],
            5.0,
            8.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scenarios() {
        let scenarios = ScenarioLibrary::all_scenarios();
        assert_eq!(scenarios.len(), 4);
        assert_eq!(
            ScenarioLibrary::ids(),
            vec!["inflation_high", "recession_2025", "tech_crash", "soft_landing"]
        );
    }

    #[test]
    fn test_get_scenario_by_id() {
        let scenario = ScenarioLibrary::get_scenario("recession_2025").unwrap();
        assert_eq!(scenario.impact_for(Some("Technology")), -20.0);
        assert_eq!(scenario.impact_for(Some("Crypto")), -15.0);
        assert_eq!(scenario.impact_for(None), -15.0);
        assert_eq!(scenario.market_impact, -20.0);
    }

    #[test]
    fn test_zero_impact_is_not_default() {
        let scenario = ScenarioLibrary::get_scenario("tech_crash").unwrap();
        assert_eq!(scenario.impact_for(Some("Healthcare")), 0.0);
    }

    #[test]
    fn test_unknown_scenario() {
        assert!(ScenarioLibrary::get_scenario("zombie_apocalypse").is_none());
        assert!(matches!(
            ScenarioLibrary::require("zombie_apocalypse"),
            Err(AnalyticsError::DataUnavailable(_))
        ));
    }
}
