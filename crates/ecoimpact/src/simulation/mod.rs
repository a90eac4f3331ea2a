pub mod artifacts;
mod comparison;
pub mod coverage;
pub mod dataset;
pub mod domain;
pub mod encoding;
pub mod events;
pub mod features;
pub mod fossil;
pub mod prediction;
pub mod resolver;
mod simulator;
pub(crate) mod stats;

pub use comparison::{ComparisonMetric, MetricComparison, ScenarioComparison, ScenarioSide};
pub use simulator::{PolicySimulator, SimulationError, SimulationReport, YearlyPrediction};
