use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_DURATION_YEARS: u8 = 20;

pub const DEFAULT_REGION: &str = "East Asia & Pacific";
pub const DEFAULT_INCOME_GROUP: &str = "Upper middle income";

pub const HIGH_INCOME: &str = "High income";
pub const UPPER_MIDDLE_INCOME: &str = "Upper middle income";
pub const LOWER_MIDDLE_INCOME: &str = "Lower middle income";
pub const LOW_INCOME: &str = "Low income";

pub const EAST_ASIA_PACIFIC: &str = "East Asia & Pacific";
pub const EUROPE_CENTRAL_ASIA: &str = "Europe & Central Asia";
pub const NORTH_AMERICA: &str = "North America";
pub const LATIN_AMERICA_CARIBBEAN: &str = "Latin America & Caribbean";
pub const MIDDLE_EAST_NORTH_AFRICA: &str = "Middle East & North Africa";
pub const SUB_SAHARAN_AFRICA: &str = "Sub-Saharan Africa";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    CarbonTax,
    Ets,
}

impl PolicyType {
    /// Category label the trained models were fitted on.
    pub const fn model_label(self) -> &'static str {
        match self {
            Self::CarbonTax => "Carbon tax",
            Self::Ets => "ETS",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CarbonTax => "Carbon Tax",
            Self::Ets => "ETS",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PolicyType {
    type Err = ScenarioError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "carbonTax" | "Carbon Tax" | "Carbon tax" | "carbon_tax" | "carbon-tax" => {
                Ok(Self::CarbonTax)
            }
            "ets" | "ETS" => Ok(Self::Ets),
            other => Err(ScenarioError::UnknownPolicyType(other.to_string())),
        }
    }
}

/// A single policy scenario. Bounds are checked at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    country: String,
    policy_type: PolicyType,
    price_usd_per_ton: f64,
    start_year: i32,
    duration_years: u8,
}

impl ScenarioInput {
    pub fn new(
        country: impl Into<String>,
        policy_type: PolicyType,
        price_usd_per_ton: f64,
        start_year: i32,
        duration_years: u8,
    ) -> Result<Self, ScenarioError> {
        let country = country.into();
        if country.trim().is_empty() {
            return Err(ScenarioError::EmptyCountry);
        }
        if !price_usd_per_ton.is_finite() || price_usd_per_ton < 0.0 {
            return Err(ScenarioError::InvalidPrice(price_usd_per_ton));
        }
        if !(1..=MAX_DURATION_YEARS).contains(&duration_years) {
            return Err(ScenarioError::DurationOutOfRange(duration_years));
        }
        if start_year
            .checked_add(i32::from(duration_years) - 1)
            .is_none()
        {
            return Err(ScenarioError::YearOutOfRange {
                start_year,
                duration_years,
            });
        }

        Ok(Self {
            country,
            policy_type,
            price_usd_per_ton,
            start_year,
            duration_years,
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn policy_type(&self) -> PolicyType {
        self.policy_type
    }

    pub fn price_usd_per_ton(&self) -> f64 {
        self.price_usd_per_ton
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn duration_years(&self) -> u8 {
        self.duration_years
    }

    /// Last simulated year; cannot overflow once constructed.
    pub fn end_year(&self) -> i32 {
        self.start_year + i32::from(self.duration_years) - 1
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        let start = self.start_year;
        (0..i32::from(self.duration_years)).map(move |offset| start + offset)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioError {
    #[error("country must not be empty")]
    EmptyCountry,
    #[error("carbon price must be a finite, non-negative USD/ton value (got {0})")]
    InvalidPrice(f64),
    #[error("duration must be between 1 and {MAX_DURATION_YEARS} years (got {0})")]
    DurationOutOfRange(u8),
    #[error("a {duration_years}-year scenario starting in {start_year} runs past the last representable year")]
    YearOutOfRange { start_year: i32, duration_years: u8 },
    #[error("policy type must be 'Carbon Tax' or 'ETS' (or 'carbonTax'/'ets'), got '{0}'")]
    UnknownPolicyType(String),
}

/// Where a resolved numeric field came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSource {
    Exact { year: i32 },
    Backfill { year: i32 },
    GroupMedian { year: i32, matches: usize },
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSources {
    pub gdp: FieldSource,
    pub population: FieldSource,
    pub fossil_share: FieldSource,
}

/// Country metadata for one (country, year), always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryProfile {
    pub country: String,
    pub year: i32,
    pub region: String,
    pub income_group: String,
    pub gdp_usd: f64,
    pub population: f64,
    pub fossil_share_pct: f64,
    pub sources: ProfileSources,
}

impl CountryProfile {
    pub fn log_population(&self) -> f64 {
        self.population.ln()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const LOW_CEILING: f64 = 0.35;
    pub const MEDIUM_CEILING: f64 = 0.65;

    /// Tier from the probability that the policy gets abolished.
    pub fn from_abolished_probability(abolished: f64) -> Self {
        if abolished < Self::LOW_CEILING {
            Self::Low
        } else if abolished < Self::MEDIUM_CEILING {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessPrediction {
    pub probability: f64,
    pub abolished_probability: f64,
    pub risk_tier: RiskTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub revenue_million_usd: f64,
    pub success_probability: f64,
    pub risk_tier: RiskTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FossilSeriesPoint {
    pub year: i32,
    pub fossil_share_pct: f64,
    pub is_model_baseline: bool,
}
