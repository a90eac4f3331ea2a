use crate::config::DataConfig;
use crate::simulation::artifacts::{ArtifactLoader, ArtifactStatus, ModelArtifacts};
use crate::simulation::coverage::estimate_coverage;
use crate::simulation::dataset::{DatasetCache, TableCache};
use crate::simulation::domain::{CountryProfile, RiskTier, ScenarioInput};
use crate::simulation::events::EventSink;
use crate::simulation::features::FeatureAssembler;
use crate::simulation::fossil::{FossilProjection, FossilTrendProjector};
use crate::simulation::prediction::{PredictionError, PredictionOrchestrator};
use crate::simulation::resolver::{CountryContext, CountryProfileResolver};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("simulator is not ready; missing {}", .missing.join(", "))]
    NotReady { missing: Vec<&'static str> },
    #[error("prediction failed for {country} in {year}: {source}")]
    Prediction {
        country: String,
        year: i32,
        #[source]
        source: PredictionError,
    },
}

impl SimulationError {
    /// Missing artifacts rather than bad input.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::NotReady { .. } => true,
            Self::Prediction { source, .. } => source.is_unavailable(),
        }
    }
}

/// Outputs for one simulated year.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyPrediction {
    pub year: i32,
    pub revenue_million_usd: f64,
    /// `None` unless both revenue and price are positive.
    #[serde(rename = "co2CoveredMillionTons")]
    pub co2_covered_million_tons: Option<f64>,
    #[serde(rename = "revenuePercentGDP")]
    pub revenue_percent_gdp: Option<f64>,
    pub success_probability: f64,
    pub risk_tier: RiskTier,
    pub emission_coverage_pct: f64,
    pub profile: CountryProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub scenario: ScenarioInput,
    /// Taken from the final simulated year.
    pub success_probability: f64,
    pub risk_tier: RiskTier,
    pub yearly: Vec<YearlyPrediction>,
    pub overall_revenue_million_usd: f64,
    pub country_context: CountryContext,
    pub fossil_projection: FossilProjection,
    pub generated_at: DateTime<Utc>,
}

impl SimulationReport {
    pub fn mean_revenue_percent_gdp(&self) -> Option<f64> {
        mean(self.yearly.iter().filter_map(|year| year.revenue_percent_gdp))
    }

    pub fn mean_emission_coverage(&self) -> Option<f64> {
        mean(self.yearly.iter().map(|year| year.emission_coverage_pct))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Runs scenarios year by year against shared, read-only artifacts.
pub struct PolicySimulator {
    resolver: Arc<CountryProfileResolver>,
    assembler: FeatureAssembler,
    orchestrator: PredictionOrchestrator,
    projector: FossilTrendProjector,
}

impl PolicySimulator {
    pub fn new(resolver: Arc<CountryProfileResolver>, artifacts: Arc<ModelArtifacts>) -> Self {
        Self {
            assembler: FeatureAssembler::new(Arc::clone(&resolver)),
            orchestrator: PredictionOrchestrator::new(Arc::clone(&artifacts)),
            projector: FossilTrendProjector::new(artifacts, Arc::clone(&resolver)),
            resolver,
        }
    }

    /// Wires file-backed caches and loads artifacts. The dataset itself is
    /// read on first use.
    pub fn from_config(config: &DataConfig, events: Arc<dyn EventSink>) -> Self {
        let dataset = Arc::new(DatasetCache::from_path(&config.dataset_path));
        let co2 = Arc::new(match &config.co2_path {
            Some(path) => TableCache::from_path(path),
            None => TableCache::unavailable(),
        });
        let resolver = Arc::new(
            CountryProfileResolver::new(dataset)
                .with_co2_series(co2)
                .with_events(events),
        );
        let artifacts = Arc::new(ArtifactLoader::from_config(config).load());
        Self::new(resolver, artifacts)
    }

    pub fn resolver(&self) -> &CountryProfileResolver {
        &self.resolver
    }

    pub fn status(&self) -> ArtifactStatus {
        self.orchestrator.artifacts().status()
    }

    pub fn simulate(&self, scenario: &ScenarioInput) -> Result<SimulationReport, SimulationError> {
        let status = self.status();
        if !status.is_ready() {
            return Err(SimulationError::NotReady {
                missing: status.missing_for_prediction(),
            });
        }

        tracing::info!(
            country = scenario.country(),
            policy = %scenario.policy_type(),
            price = scenario.price_usd_per_ton(),
            start_year = scenario.start_year(),
            duration = scenario.duration_years(),
            "simulating scenario"
        );

        let mut latest = self.simulate_year(scenario, scenario.start_year())?;
        let country_context = self.resolver.country_context(&latest.profile);
        let mut yearly = Vec::with_capacity(usize::from(scenario.duration_years()));
        for year in scenario.years().skip(1) {
            let next = self.simulate_year(scenario, year)?;
            yearly.push(std::mem::replace(&mut latest, next));
        }
        let success_probability = latest.success_probability;
        let risk_tier = latest.risk_tier;
        yearly.push(latest);

        let overall_revenue_million_usd = yearly.iter().map(|year| year.revenue_million_usd).sum();

        let fossil_projection = self.projector.projection(
            scenario.country(),
            scenario.start_year(),
            scenario.duration_years(),
            Some(scenario.price_usd_per_ton()),
        );

        Ok(SimulationReport {
            scenario: scenario.clone(),
            success_probability,
            risk_tier,
            yearly,
            overall_revenue_million_usd,
            country_context,
            fossil_projection,
            generated_at: Utc::now(),
        })
    }

    pub fn simulate_year(
        &self,
        scenario: &ScenarioInput,
        year: i32,
    ) -> Result<YearlyPrediction, SimulationError> {
        let features = self.assembler.assemble(scenario, year);
        let prediction = self.orchestrator.predict(&features).map_err(|source| {
            tracing::warn!(country = %features.profile.country, year, error = %source, "year failed");
            SimulationError::Prediction {
                country: features.profile.country.clone(),
                year,
                source,
            }
        })?;

        let profile = features.profile;
        let price = scenario.price_usd_per_ton();
        let revenue = prediction.revenue_million_usd;
        let revenue_usd = revenue * 1e6;

        let co2_covered_million_tons =
            (revenue > 0.0 && price > 0.0).then(|| revenue_usd / price / 1e6);
        let revenue_percent_gdp =
            (profile.gdp_usd > 0.0).then(|| revenue_usd / profile.gdp_usd * 100.0);
        let co2_emissions = self.resolver.co2_emissions(&profile.country, year);
        let emission_coverage_pct = estimate_coverage(scenario, year, &profile, co2_emissions);

        tracing::debug!(
            year,
            revenue_million_usd = revenue,
            success_probability = prediction.success_probability,
            emission_coverage_pct,
            "year simulated"
        );

        Ok(YearlyPrediction {
            year,
            revenue_million_usd: revenue,
            co2_covered_million_tons,
            revenue_percent_gdp,
            success_probability: prediction.success_probability,
            risk_tier: prediction.risk_tier,
            emission_coverage_pct,
            profile,
        })
    }

    /// Fossil share series alone; needs no revenue or success artifacts.
    pub fn project_fossil(
        &self,
        country: &str,
        start_year: i32,
        duration_years: u8,
        price_usd_per_ton: Option<f64>,
    ) -> FossilProjection {
        self.projector
            .projection(country, start_year, duration_years, price_usd_per_ton)
    }
}
