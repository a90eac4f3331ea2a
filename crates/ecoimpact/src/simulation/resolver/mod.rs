mod cascade;
pub mod defaults;
mod lookup;

pub use cascade::{backfill_years, Strategy, BACKFILL_FLOOR_YEAR, CASCADE};
pub use lookup::{Membership, MembershipOrigin};

use crate::simulation::dataset::{
    normalize_country, Co2Series, CountryYearRow, DatasetCache, EnergyMixView, TableCache,
};
use crate::simulation::domain::{CountryProfile, FieldSource, ProfileSources};
use crate::simulation::events::{
    EventCode, EventSink, ResolutionEvent, Severity, TracingEventSink,
};
use lookup::MembershipIndex;
use serde::Serialize;
use std::sync::{Arc, OnceLock};

/// Dataset-backed facts shown alongside a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryContext {
    #[serde(rename = "annualCO2Tons")]
    pub annual_co2_tons: Option<f64>,
    #[serde(rename = "gdpUSD")]
    pub gdp_usd: Option<f64>,
    pub population: Option<f64>,
    pub region: String,
    pub income_group: String,
    pub energy_mix_kwh_per_capita: Option<EnergyMixView>,
    pub data_year: Option<i32>,
}

/// Resolves country metadata through the dataset cascade, never failing.
pub struct CountryProfileResolver {
    dataset: Arc<DatasetCache>,
    co2: Arc<TableCache<Co2Series>>,
    memberships: OnceLock<MembershipIndex>,
    events: Arc<dyn EventSink>,
}

impl CountryProfileResolver {
    pub fn new(dataset: Arc<DatasetCache>) -> Self {
        Self {
            dataset,
            co2: Arc::new(TableCache::unavailable()),
            memberships: OnceLock::new(),
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn with_co2_series(mut self, co2: Arc<TableCache<Co2Series>>) -> Self {
        self.co2 = co2;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn events(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    pub fn region_of(&self, country: &str) -> String {
        self.membership(&normalize_country(country)).region
    }

    pub fn income_group_of(&self, country: &str) -> String {
        self.membership(&normalize_country(country)).income_group
    }

    pub fn membership(&self, country: &str) -> Membership {
        self.memberships
            .get_or_init(|| MembershipIndex::build(self.dataset.get()))
            .lookup(country)
    }

    pub fn resolve(&self, country: &str, year: i32) -> CountryProfile {
        let country = normalize_country(country);
        let membership = self.membership(&country);
        self.report_membership(&country, year, &membership);

        let found = match self.dataset.get() {
            Some(dataset) => cascade::run(dataset, &country, year, &membership),
            None => {
                self.emit(ResolutionEvent::warning(
                    EventCode::DatasetUnavailable,
                    &country,
                    Some(year),
                    "country dataset unavailable; using static defaults",
                ));
                None
            }
        };

        if let Some((strategy, matched)) = &found {
            let note = match strategy {
                Strategy::ExactMatch => None,
                Strategy::TemporalBackfill => Some((
                    EventCode::TemporalBackfill,
                    format!("no row for {year}; {}", describe_source(matched.source)),
                )),
                Strategy::GroupMedian => Some((
                    EventCode::GroupMedian,
                    format!(
                        "no country rows; {} of {} / {}",
                        describe_source(matched.source),
                        membership.region,
                        membership.income_group
                    ),
                )),
            };
            if let Some((code, detail)) = note {
                self.emit(ResolutionEvent::info(
                    code,
                    &country,
                    Some(year),
                    format!("{}: {detail}", strategy.name()),
                ));
            }
        }
        let matched = found.map(|(_, matched)| matched);

        let (gdp_usd, gdp_source) = match matched.and_then(|m| m.gdp_usd.map(|v| (v, m.source))) {
            Some(found) => found,
            None => {
                let value = defaults::gdp_usd(&membership.income_group);
                self.emit(ResolutionEvent::warning(
                    EventCode::GdpDefaulted,
                    &country,
                    Some(year),
                    format!(
                        "GDP not found; using {} default of {value:e} USD",
                        membership.income_group
                    ),
                ));
                (value, FieldSource::Default)
            }
        };

        let (population, population_source) =
            match matched.and_then(|m| m.population.map(|v| (v, m.source))) {
                Some(found) => found,
                None => {
                    let log_population =
                        defaults::log_population(&membership.region, &membership.income_group);
                    self.emit(ResolutionEvent::warning(
                        EventCode::PopulationDefaulted,
                        &country,
                        Some(year),
                        format!("population not found; using log-population {log_population:.2}"),
                    ));
                    (log_population.exp(), FieldSource::Default)
                }
            };

        let (fossil_share_pct, fossil_source) =
            match matched.and_then(|m| m.fossil_share_pct.map(|v| (v, m.source))) {
                Some((raw, source)) => {
                    let clamped = raw.clamp(0.0, 100.0);
                    if clamped != raw {
                        self.emit(ResolutionEvent::warning(
                            EventCode::FossilShareClamped,
                            &country,
                            Some(year),
                            format!("fossil share {raw} outside [0, 100]; clamped to {clamped}"),
                        ));
                    }
                    (clamped, source)
                }
                None => {
                    let value = defaults::fossil_share_pct(&membership.region);
                    self.emit(ResolutionEvent::warning(
                        EventCode::FossilShareDefaulted,
                        &country,
                        Some(year),
                        format!(
                            "fossil share not found; using {} default of {value}%",
                            membership.region
                        ),
                    ));
                    (value, FieldSource::Default)
                }
            };

        CountryProfile {
            country,
            year,
            region: membership.region,
            income_group: membership.income_group,
            gdp_usd,
            population,
            fossil_share_pct,
            sources: ProfileSources {
                gdp: gdp_source,
                population: population_source,
                fossil_share: fossil_source,
            },
        }
    }

    /// The country's own row for `year`, or the nearest backfilled one.
    pub fn dataset_row(&self, country: &str, year: i32) -> Option<&CountryYearRow> {
        let dataset = self.dataset.get()?;
        std::iter::once(year)
            .chain(backfill_years(year))
            .find_map(|candidate| dataset.row(country, candidate))
    }

    /// Annual CO2 emissions in tons, from the dataset or the supplemental series.
    pub fn co2_emissions(&self, country: &str, year: i32) -> Option<f64> {
        let country = normalize_country(country);
        let from_dataset = self
            .dataset_row(&country, year)
            .and_then(|row| row.annual_co2_tons)
            .filter(|tons| *tons > 0.0);
        if from_dataset.is_some() {
            return from_dataset;
        }

        let series = self.co2.get()?;
        let (found_year, tons) = std::iter::once(year)
            .chain(backfill_years(year))
            .find_map(|candidate| series.tons(&country, candidate).map(|tons| (candidate, tons)))?;
        if tons <= 0.0 {
            return None;
        }
        self.emit(ResolutionEvent::info(
            EventCode::Co2SupplementalSource,
            &country,
            Some(year),
            format!("CO2 emissions taken from supplemental series ({found_year})"),
        ));
        Some(tons)
    }

    pub fn country_context(&self, profile: &CountryProfile) -> CountryContext {
        let row = self.dataset_row(&profile.country, profile.year);
        CountryContext {
            annual_co2_tons: self.co2_emissions(&profile.country, profile.year),
            gdp_usd: row.and_then(|row| row.gdp_usd).filter(|gdp| *gdp > 0.0),
            population: row.and_then(|row| row.population),
            region: profile.region.clone(),
            income_group: profile.income_group.clone(),
            energy_mix_kwh_per_capita: row.map(|row| row.energy_mix.kwh_per_capita()),
            data_year: row.map(|row| row.year),
        }
    }

    fn report_membership(&self, country: &str, year: i32, membership: &Membership) {
        let (severity, origin) = match membership.origin {
            MembershipOrigin::Dataset => return,
            MembershipOrigin::StaticTable => (Severity::Info, "static table"),
            MembershipOrigin::Default => (Severity::Warning, "default"),
        };
        let details = [
            (
                EventCode::RegionFallback,
                format!("region '{}' from {origin}", membership.region),
            ),
            (
                EventCode::IncomeGroupFallback,
                format!("income group '{}' from {origin}", membership.income_group),
            ),
        ];
        for (code, detail) in details {
            self.emit(ResolutionEvent {
                severity,
                ..ResolutionEvent::warning(code, country, Some(year), detail)
            });
        }
    }

    fn emit(&self, event: ResolutionEvent) {
        self.events.emit(event);
    }
}

fn describe_source(source: FieldSource) -> String {
    match source {
        FieldSource::Exact { year } => format!("exact row for {year}"),
        FieldSource::Backfill { year } => format!("backfilled from {year}"),
        FieldSource::GroupMedian { year, matches } => {
            format!("median of {matches} rows for {year}")
        }
        FieldSource::Default => "static default".to_string(),
    }
}
