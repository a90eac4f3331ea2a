use crate::simulation::domain::{
    EAST_ASIA_PACIFIC, EUROPE_CENTRAL_ASIA, HIGH_INCOME, NORTH_AMERICA, UPPER_MIDDLE_INCOME,
};

pub const DEFAULT_LOG_POPULATION: f64 = 18.5;
pub const DEFAULT_GDP_USD: f64 = 0.5e12;
pub const DEFAULT_FOSSIL_SHARE_PCT: f64 = 70.0;

/// Log-population used when no dataset value survives the cascade.
pub fn log_population(region: &str, income_group: &str) -> f64 {
    match (region, income_group) {
        (EAST_ASIA_PACIFIC, UPPER_MIDDLE_INCOME) => 19.0,
        (NORTH_AMERICA, HIGH_INCOME) => 18.3,
        (EUROPE_CENTRAL_ASIA, HIGH_INCOME) => 18.2,
        _ => DEFAULT_LOG_POPULATION,
    }
}

pub fn gdp_usd(income_group: &str) -> f64 {
    match income_group {
        HIGH_INCOME => 4.0e12,
        UPPER_MIDDLE_INCOME => 1.5e12,
        _ => DEFAULT_GDP_USD,
    }
}

/// Regional fossil share, also the projector's baseline when its model cannot run.
pub fn fossil_share_pct(region: &str) -> f64 {
    match region {
        EAST_ASIA_PACIFIC => 75.0,
        NORTH_AMERICA => 80.0,
        EUROPE_CENTRAL_ASIA => 65.0,
        _ => DEFAULT_FOSSIL_SHARE_PCT,
    }
}
