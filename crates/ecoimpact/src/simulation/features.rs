use crate::simulation::artifacts::ModelKind;
use crate::simulation::domain::{CountryProfile, ScenarioInput};
use crate::simulation::resolver::CountryProfileResolver;
use serde::Serialize;
use std::sync::Arc;

pub const TYPE: &str = "Type";
pub const REGION: &str = "Region";
pub const INCOME_GROUP: &str = "Income group";
pub const YEAR: &str = "Year";
pub const CARBON_PRICE_USD: &str = "Carbon_Price_USD";
pub const FOSSIL_FUEL_DEPENDENCY: &str = "Fossil_Fuel_Dependency_%";
pub const POPULATION_LOG: &str = "Population_Log";
pub const GDP: &str = "GDP";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    /// `None` when the category is empty. Other values pass through verbatim.
    Category(Option<&'a str>),
    Number(f64),
}

impl<'a> FeatureValue<'a> {
    fn category(value: &'a str) -> Self {
        Self::Category((!value.is_empty()).then_some(value))
    }
}

/// Fixed-schema input for one model. Names and values share the length `N`,
/// so a record cannot be built with fields out of order or missing.
pub trait FeatureRecord<const N: usize> {
    const MODEL: ModelKind;
    const SCHEMA: [&'static str; N];

    fn values(&self) -> [FeatureValue<'_>; N];
}

/// Categorical fields of `record` that are blank.
pub fn blank_categories<const N: usize, R: FeatureRecord<N>>(record: &R) -> Vec<&'static str> {
    R::SCHEMA
        .into_iter()
        .zip(record.values())
        .filter_map(|(name, value)| match value {
            FeatureValue::Category(None) => Some(name),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueFeatures {
    #[serde(rename = "Type")]
    pub policy_type: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Income group")]
    pub income_group: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Carbon_Price_USD")]
    pub carbon_price_usd: f64,
    #[serde(rename = "Fossil_Fuel_Dependency_%")]
    pub fossil_share_pct: f64,
    #[serde(rename = "Population_Log")]
    pub population_log: f64,
    #[serde(rename = "GDP")]
    pub gdp_usd: f64,
}

impl FeatureRecord<8> for RevenueFeatures {
    const MODEL: ModelKind = ModelKind::Revenue;
    const SCHEMA: [&'static str; 8] = [
        TYPE,
        REGION,
        INCOME_GROUP,
        YEAR,
        CARBON_PRICE_USD,
        FOSSIL_FUEL_DEPENDENCY,
        POPULATION_LOG,
        GDP,
    ];

    fn values(&self) -> [FeatureValue<'_>; 8] {
        [
            FeatureValue::category(&self.policy_type),
            FeatureValue::category(&self.region),
            FeatureValue::category(&self.income_group),
            FeatureValue::Number(f64::from(self.year)),
            FeatureValue::Number(self.carbon_price_usd),
            FeatureValue::Number(self.fossil_share_pct),
            FeatureValue::Number(self.population_log),
            FeatureValue::Number(self.gdp_usd),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessFeatures {
    #[serde(rename = "Type")]
    pub policy_type: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Income group")]
    pub income_group: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Fossil_Fuel_Dependency_%")]
    pub fossil_share_pct: f64,
    #[serde(rename = "GDP")]
    pub gdp_usd: f64,
}

impl FeatureRecord<6> for SuccessFeatures {
    const MODEL: ModelKind = ModelKind::Success;
    const SCHEMA: [&'static str; 6] = [TYPE, REGION, INCOME_GROUP, YEAR, FOSSIL_FUEL_DEPENDENCY, GDP];

    fn values(&self) -> [FeatureValue<'_>; 6] {
        [
            FeatureValue::category(&self.policy_type),
            FeatureValue::category(&self.region),
            FeatureValue::category(&self.income_group),
            FeatureValue::Number(f64::from(self.year)),
            FeatureValue::Number(self.fossil_share_pct),
            FeatureValue::Number(self.gdp_usd),
        ]
    }
}

/// Both model inputs for one simulated year, with the profile they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledFeatures {
    pub profile: CountryProfile,
    pub revenue: RevenueFeatures,
    pub success: SuccessFeatures,
}

impl AssembledFeatures {
    pub fn from_profile(scenario: &ScenarioInput, profile: CountryProfile) -> Self {
        let policy_type = scenario.policy_type().model_label().to_string();

        let revenue = RevenueFeatures {
            policy_type: policy_type.clone(),
            region: profile.region.clone(),
            income_group: profile.income_group.clone(),
            year: profile.year,
            carbon_price_usd: scenario.price_usd_per_ton(),
            fossil_share_pct: profile.fossil_share_pct,
            population_log: profile.log_population(),
            gdp_usd: profile.gdp_usd,
        };
        let success = SuccessFeatures {
            policy_type,
            region: profile.region.clone(),
            income_group: profile.income_group.clone(),
            year: profile.year,
            fossil_share_pct: profile.fossil_share_pct,
            gdp_usd: profile.gdp_usd,
        };

        Self {
            profile,
            revenue,
            success,
        }
    }
}

pub struct FeatureAssembler {
    resolver: Arc<CountryProfileResolver>,
}

impl FeatureAssembler {
    pub fn new(resolver: Arc<CountryProfileResolver>) -> Self {
        Self { resolver }
    }

    pub fn assemble(&self, scenario: &ScenarioInput, year: i32) -> AssembledFeatures {
        let profile = self.resolver.resolve(scenario.country(), year);
        AssembledFeatures::from_profile(scenario, profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::domain::{FieldSource, PolicyType, ProfileSources};

    fn profile() -> CountryProfile {
        CountryProfile {
            country: "Pakistan".to_string(),
            year: 2024,
            region: "East Asia & Pacific".to_string(),
            income_group: "Upper middle income".to_string(),
            gdp_usd: 3.4e11,
            population: 19.0f64.exp(),
            fossil_share_pct: 62.5,
            sources: ProfileSources {
                gdp: FieldSource::Exact { year: 2024 },
                population: FieldSource::Default,
                fossil_share: FieldSource::Exact { year: 2024 },
            },
        }
    }

    #[test]
    fn records_follow_schema_order() {
        let scenario =
            ScenarioInput::new("Pakistan", PolicyType::CarbonTax, 25.0, 2024, 1).expect("valid");
        let features = AssembledFeatures::from_profile(&scenario, profile());

        let revenue = features.revenue.values();
        assert_eq!(revenue[0], FeatureValue::Category(Some("Carbon tax")));
        assert_eq!(revenue[4], FeatureValue::Number(25.0));
        match revenue[6] {
            FeatureValue::Number(log) => assert!((log - 19.0).abs() < 1e-9),
            other => panic!("expected population log, got {other:?}"),
        }

        let success = features.success.values();
        assert_eq!(SuccessFeatures::SCHEMA[4], FOSSIL_FUEL_DEPENDENCY);
        assert_eq!(success[4], FeatureValue::Number(62.5));
        assert_eq!(success[5], FeatureValue::Number(3.4e11));
    }

    #[test]
    fn blank_categories_are_reported_by_name() {
        let scenario =
            ScenarioInput::new("Pakistan", PolicyType::Ets, 10.0, 2024, 1).expect("valid");
        let mut features = AssembledFeatures::from_profile(&scenario, profile());
        features.success.region = String::new();
        assert_eq!(blank_categories(&features.success), vec![REGION]);
        assert!(blank_categories(&features.revenue).is_empty());

        features.revenue.income_group = " Upper middle income ".to_string();
        assert_eq!(
            features.revenue.values()[2],
            FeatureValue::Category(Some(" Upper middle income "))
        );
    }
}
