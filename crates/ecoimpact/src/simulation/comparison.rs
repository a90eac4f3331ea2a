use crate::simulation::domain::ScenarioInput;
use crate::simulation::simulator::{PolicySimulator, SimulationError, SimulationReport};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    TotalRevenue,
    MeanRevenuePercentGdp,
    FinalSuccessProbability,
    MeanEmissionCoverage,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 4] = [
        Self::TotalRevenue,
        Self::MeanRevenuePercentGdp,
        Self::FinalSuccessProbability,
        Self::MeanEmissionCoverage,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalRevenue => "Total revenue (M USD)",
            Self::MeanRevenuePercentGdp => "Mean revenue (% GDP)",
            Self::FinalSuccessProbability => "Final success probability",
            Self::MeanEmissionCoverage => "Mean emission coverage (%)",
        }
    }

    fn value(self, report: &SimulationReport) -> Option<f64> {
        match self {
            Self::TotalRevenue => Some(report.overall_revenue_million_usd),
            Self::MeanRevenuePercentGdp => report.mean_revenue_percent_gdp(),
            Self::FinalSuccessProbability => Some(report.success_probability),
            Self::MeanEmissionCoverage => report.mean_emission_coverage(),
        }
    }
}

impl fmt::Display for ComparisonMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSide {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub metric: ComparisonMetric,
    pub first: Option<f64>,
    pub second: Option<f64>,
    /// `second - first`, when both sides have a value.
    pub difference: Option<f64>,
    pub better: Option<ScenarioSide>,
}

impl MetricComparison {
    /// Higher is better; a tie goes to the first scenario.
    pub fn new(metric: ComparisonMetric, first: Option<f64>, second: Option<f64>) -> Self {
        let (difference, better) = match (first, second) {
            (Some(first), Some(second)) => {
                let better = if second > first {
                    ScenarioSide::Second
                } else {
                    ScenarioSide::First
                };
                (Some(second - first), Some(better))
            }
            (Some(_), None) => (None, Some(ScenarioSide::First)),
            (None, Some(_)) => (None, Some(ScenarioSide::Second)),
            (None, None) => (None, None),
        };
        Self {
            metric,
            first,
            second,
            difference,
            better,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub first: SimulationReport,
    pub second: SimulationReport,
    pub metrics: Vec<MetricComparison>,
}

impl ScenarioComparison {
    pub fn from_reports(first: SimulationReport, second: SimulationReport) -> Self {
        let metrics = ComparisonMetric::ALL
            .into_iter()
            .map(|metric| MetricComparison::new(metric, metric.value(&first), metric.value(&second)))
            .collect();
        Self {
            first,
            second,
            metrics,
        }
    }

    pub fn metric(&self, metric: ComparisonMetric) -> Option<&MetricComparison> {
        self.metrics.iter().find(|entry| entry.metric == metric)
    }
}

impl PolicySimulator {
    /// Runs both scenarios; either failing fails the comparison.
    pub fn compare(
        &self,
        first: &ScenarioInput,
        second: &ScenarioInput,
    ) -> Result<ScenarioComparison, SimulationError> {
        let first = self.simulate(first)?;
        let second = self.simulate(second)?;
        Ok(ScenarioComparison::from_reports(first, second))
    }
}
