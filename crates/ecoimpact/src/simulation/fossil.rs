use crate::simulation::artifacts::{FossilDeltaTable, ModelArtifacts, Regressor};
use crate::simulation::dataset::normalize_country;
use crate::simulation::domain::FossilSeriesPoint;
use crate::simulation::events::{EventCode, EventSink, ResolutionEvent};
use crate::simulation::resolver::{defaults, CountryProfileResolver};
use serde::Serialize;
use std::sync::Arc;

/// Yearly change assumed when nothing learned applies, percentage points.
pub const DEFAULT_YEARLY_DELTA: f64 = -0.5;

/// Multiplier on the yearly delta from the carbon price, USD/ton.
pub fn price_factor(price_usd_per_ton: Option<f64>) -> f64 {
    match price_usd_per_ton {
        Some(price) if price >= 50.0 => 1.5,
        Some(price) if price >= 25.0 => 1.2,
        Some(price) if price >= 10.0 => 1.1,
        _ => 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineSource {
    Model,
    RegionalConstant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaSource {
    Country,
    Region,
    GlobalMedian,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeltaStrategy {
    Country,
    Region,
    GlobalMedian,
}

const DELTA_CASCADE: [DeltaStrategy; 3] = [
    DeltaStrategy::Country,
    DeltaStrategy::Region,
    DeltaStrategy::GlobalMedian,
];

impl DeltaStrategy {
    fn attempt(self, deltas: &FossilDeltaTable, country: &str, region: &str) -> Option<f64> {
        match self {
            Self::Country => deltas.country(country),
            Self::Region => deltas.region(region),
            Self::GlobalMedian => deltas.global_median(),
        }
    }

    fn source(self) -> DeltaSource {
        match self {
            Self::Country => DeltaSource::Country,
            Self::Region => DeltaSource::Region,
            Self::GlobalMedian => DeltaSource::GlobalMedian,
        }
    }
}

/// Inputs and output of one projection, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FossilProjection {
    pub country: String,
    pub region: String,
    pub baseline_pct: f64,
    pub baseline_source: BaselineSource,
    pub yearly_delta: f64,
    pub delta_source: DeltaSource,
    pub price_factor: f64,
    pub points: Vec<FossilSeriesPoint>,
}

pub struct FossilTrendProjector {
    artifacts: Arc<ModelArtifacts>,
    resolver: Arc<CountryProfileResolver>,
    events: Arc<dyn EventSink>,
}

impl FossilTrendProjector {
    pub fn new(artifacts: Arc<ModelArtifacts>, resolver: Arc<CountryProfileResolver>) -> Self {
        let events = resolver.events();
        Self {
            artifacts,
            resolver,
            events,
        }
    }

    pub fn project(
        &self,
        country: &str,
        start_year: i32,
        duration_years: u8,
        price_usd_per_ton: Option<f64>,
    ) -> Vec<FossilSeriesPoint> {
        self.projection(country, start_year, duration_years, price_usd_per_ton)
            .points
    }

    pub fn projection(
        &self,
        country: &str,
        start_year: i32,
        duration_years: u8,
        price_usd_per_ton: Option<f64>,
    ) -> FossilProjection {
        let country = normalize_country(country);
        let membership = self.resolver.membership(&country);

        let modelled = self.model_baseline(
            &country,
            start_year,
            &membership.region,
            &membership.income_group,
        );
        let (baseline_pct, baseline_source, yearly_delta, delta_source) = match modelled {
            Some(baseline) => {
                let (delta, source) = self.yearly_delta(&country, &membership.region);
                (baseline, BaselineSource::Model, delta, source)
            }
            None => {
                let baseline = defaults::fossil_share_pct(&membership.region);
                self.events.emit(ResolutionEvent::warning(
                    EventCode::FossilBaselineFallback,
                    &country,
                    Some(start_year),
                    format!(
                        "fossil share model unavailable; using {} baseline {baseline}% and delta {DEFAULT_YEARLY_DELTA}",
                        membership.region
                    ),
                ));
                (
                    baseline,
                    BaselineSource::RegionalConstant,
                    DEFAULT_YEARLY_DELTA,
                    DeltaSource::Default,
                )
            }
        };

        let factor = price_factor(price_usd_per_ton.filter(|price| *price > 0.0));
        let points = extrapolate(baseline_pct, yearly_delta * factor, start_year, duration_years);

        FossilProjection {
            country,
            region: membership.region,
            baseline_pct,
            baseline_source,
            yearly_delta,
            delta_source,
            price_factor: factor,
            points,
        }
    }

    /// Model estimate for `year`, or `None` when the model cannot run for this country.
    fn model_baseline(
        &self,
        country: &str,
        year: i32,
        region: &str,
        income_group: &str,
    ) -> Option<f64> {
        let model = self.artifacts.fossil_model()?;
        let encoders = self.artifacts.fossil_encoders()?;
        let country_code = encoders.country_code(country)?;
        let region_code = encoders.region_code(region).unwrap_or(0);
        let income_code = encoders.income_code(income_group).unwrap_or(0);

        let features = [
            f64::from(year),
            country_code as f64,
            region_code as f64,
            income_code as f64,
        ];
        let predicted = model.predict(&features);
        if !predicted.is_finite() {
            return None;
        }
        Some(predicted.clamp(0.0, 100.0))
    }

    pub fn yearly_delta(&self, country: &str, region: &str) -> (f64, DeltaSource) {
        let found = self.artifacts.fossil_deltas().and_then(|deltas| {
            DELTA_CASCADE.iter().find_map(|strategy| {
                strategy
                    .attempt(deltas, country, region)
                    .filter(|delta| delta.is_finite())
                    .map(|delta| (delta, strategy.source()))
            })
        });

        match found {
            Some((delta, DeltaSource::Country)) => (delta, DeltaSource::Country),
            Some((delta, source)) => {
                let (code, label) = match source {
                    DeltaSource::Region => (EventCode::FossilDeltaRegional, "regional"),
                    _ => (EventCode::FossilDeltaGlobalMedian, "global median"),
                };
                self.events.emit(ResolutionEvent::info(
                    code,
                    country,
                    None,
                    format!("using {label} yearly fossil share delta {delta:.3}"),
                ));
                (delta, source)
            }
            None => {
                self.events.emit(ResolutionEvent::warning(
                    EventCode::FossilDeltaDefault,
                    country,
                    None,
                    format!("no learned fossil share delta; using {DEFAULT_YEARLY_DELTA}"),
                ));
                (DEFAULT_YEARLY_DELTA, DeltaSource::Default)
            }
        }
    }
}

/// Point 0 is the baseline as given; later points step by `delta`, clamped to [0, 100].
pub fn extrapolate(
    baseline: f64,
    delta: f64,
    start_year: i32,
    duration_years: u8,
) -> Vec<FossilSeriesPoint> {
    let mut points = Vec::with_capacity(usize::from(duration_years));
    let mut current = baseline;
    for offset in 0..i32::from(duration_years) {
        let is_model_baseline = offset == 0;
        if !is_model_baseline {
            current = (current + delta).clamp(0.0, 100.0);
        }
        points.push(FossilSeriesPoint {
            year: start_year.saturating_add(offset),
            fossil_share_pct: current,
            is_model_baseline,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_factor_steps_at_thresholds() {
        assert_eq!(price_factor(None), 1.0);
        assert_eq!(price_factor(Some(9.99)), 1.0);
        assert_eq!(price_factor(Some(10.0)), 1.1);
        assert_eq!(price_factor(Some(25.0)), 1.2);
        assert_eq!(price_factor(Some(49.0)), 1.2);
        assert_eq!(price_factor(Some(50.0)), 1.5);
    }

    #[test]
    fn extrapolation_keeps_baseline_and_clamps() {
        let points = extrapolate(1.0, -0.75, 2024, 3);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].fossil_share_pct, 1.0);
        assert!(points[0].is_model_baseline);
        assert_eq!(points[1].fossil_share_pct, 0.25);
        assert_eq!(points[2].fossil_share_pct, 0.0);
        assert!(points[1..].iter().all(|point| !point.is_model_baseline));
        assert_eq!(points[2].year, 2026);
    }

    #[test]
    fn extrapolation_years_saturate_near_max() {
        let points = extrapolate(50.0, -1.0, i32::MAX - 1, 3);
        let years: Vec<i32> = points.iter().map(|point| point.year).collect();
        assert_eq!(years, vec![i32::MAX - 1, i32::MAX, i32::MAX]);
        assert_eq!(points[2].fossil_share_pct, 48.0);
    }
}
