use crate::simulation::domain::{
    CountryProfile, PolicyType, ScenarioInput, EAST_ASIA_PACIFIC, EUROPE_CENTRAL_ASIA,
    HIGH_INCOME, LATIN_AMERICA_CARIBBEAN, LOWER_MIDDLE_INCOME, LOW_INCOME,
    MIDDLE_EAST_NORTH_AFRICA, NORTH_AMERICA, SUB_SAHARAN_AFRICA, UPPER_MIDDLE_INCOME,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageFactor {
    RegionBase,
    IncomeGroup,
    PolicyType,
    CarbonPrice,
    FossilDependency,
    EconomySize,
    Population,
    YearTrend,
    Emissions,
}

/// One named term of the coverage score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageComponent {
    pub factor: CoverageFactor,
    pub contribution: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageBreakdown {
    pub components: Vec<CoverageComponent>,
    /// Sum of the components before clamping.
    pub unclamped: f64,
    pub total: f64,
}

fn region_base(region: &str) -> f64 {
    match region {
        EUROPE_CENTRAL_ASIA => 52.0,
        NORTH_AMERICA => 48.0,
        EAST_ASIA_PACIFIC => 42.0,
        LATIN_AMERICA_CARIBBEAN => 38.0,
        MIDDLE_EAST_NORTH_AFRICA => 32.0,
        SUB_SAHARAN_AFRICA => 28.0,
        _ => 40.0,
    }
}

fn income_adjustment(income_group: &str) -> f64 {
    match income_group {
        HIGH_INCOME => 12.0,
        UPPER_MIDDLE_INCOME => 6.0,
        LOWER_MIDDLE_INCOME => 0.0,
        LOW_INCOME => -8.0,
        _ => 0.0,
    }
}

/// Diminishing returns: 0.4 at $50, 0.7 at $100, capped at 0.9.
pub fn price_curve(price_usd_per_ton: f64) -> f64 {
    let price = price_usd_per_ton;
    if price <= 50.0 {
        price / 50.0 * 0.4
    } else if price <= 100.0 {
        0.4 + (price - 50.0) / 50.0 * 0.3
    } else {
        0.7 + ((price - 100.0) / 100.0 * 0.2).min(0.2)
    }
}

fn gdp_adjustment(gdp_usd: f64) -> f64 {
    if gdp_usd <= 0.0 {
        return 0.0;
    }
    let magnitude = gdp_usd.log10();
    if magnitude > 12.5 {
        4.0
    } else if magnitude > 12.0 {
        2.5
    } else if magnitude > 11.5 {
        1.0
    } else {
        0.0
    }
}

fn population_adjustment(log_population: f64) -> f64 {
    if log_population > 19.0 {
        1.5
    } else if log_population > 18.0 {
        0.5
    } else {
        0.0
    }
}

fn emissions_adjustment(co2_tons: Option<f64>) -> f64 {
    match co2_tons {
        Some(tons) if tons > 0.0 => {
            let magnitude = tons.log10();
            if magnitude > 9.0 {
                -2.0
            } else if magnitude > 8.5 {
                0.5
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Every term of the emission coverage estimate, in the order they are applied.
pub fn explain_coverage(
    scenario: &ScenarioInput,
    year: i32,
    profile: &CountryProfile,
    co2_emissions_tons: Option<f64>,
) -> CoverageBreakdown {
    let price = scenario.price_usd_per_ton();
    let policy_bonus = match scenario.policy_type() {
        PolicyType::Ets => 7.0,
        PolicyType::CarbonTax => 0.0,
    };

    let components = vec![
        CoverageComponent {
            factor: CoverageFactor::RegionBase,
            contribution: region_base(&profile.region),
            notes: profile.region.clone(),
        },
        CoverageComponent {
            factor: CoverageFactor::IncomeGroup,
            contribution: income_adjustment(&profile.income_group),
            notes: profile.income_group.clone(),
        },
        CoverageComponent {
            factor: CoverageFactor::PolicyType,
            contribution: policy_bonus,
            notes: scenario.policy_type().label().to_string(),
        },
        CoverageComponent {
            factor: CoverageFactor::CarbonPrice,
            contribution: price_curve(price) * 25.0,
            notes: format!("{price} USD/ton"),
        },
        CoverageComponent {
            factor: CoverageFactor::FossilDependency,
            contribution: (100.0 - profile.fossil_share_pct) / 100.0 * 8.0,
            notes: format!("{:.1}% fossil share", profile.fossil_share_pct),
        },
        CoverageComponent {
            factor: CoverageFactor::EconomySize,
            contribution: gdp_adjustment(profile.gdp_usd),
            notes: format!("GDP {:.3e} USD", profile.gdp_usd),
        },
        CoverageComponent {
            factor: CoverageFactor::Population,
            contribution: population_adjustment(profile.log_population()),
            notes: format!("log population {:.2}", profile.log_population()),
        },
        CoverageComponent {
            factor: CoverageFactor::YearTrend,
            contribution: f64::from(year.saturating_sub(2020).max(0)) * 0.3,
            notes: year.to_string(),
        },
        CoverageComponent {
            factor: CoverageFactor::Emissions,
            contribution: emissions_adjustment(co2_emissions_tons),
            notes: match co2_emissions_tons {
                Some(tons) => format!("{tons:.3e} t CO2"),
                None => "emissions unknown".to_string(),
            },
        },
    ];

    let unclamped: f64 = components.iter().map(|component| component.contribution).sum();
    CoverageBreakdown {
        components,
        unclamped,
        total: unclamped.clamp(0.0, 100.0),
    }
}

/// Share of emissions the policy is expected to cover, in [0, 100].
pub fn estimate_coverage(
    scenario: &ScenarioInput,
    year: i32,
    profile: &CountryProfile,
    co2_emissions_tons: Option<f64>,
) -> f64 {
    explain_coverage(scenario, year, profile, co2_emissions_tons).total
}
