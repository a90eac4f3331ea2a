use crate::config::ConfigError;
use crate::simulation::dataset::DatasetError;
use crate::simulation::domain::ScenarioError;
use crate::simulation::SimulationError;
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Dataset(DatasetError),
    Scenario(ScenarioError),
    Simulation(SimulationError),
    Output(serde_json::Error),
}

impl AppError {
    /// True when the failure is missing artifacts or data rather than bad input.
    pub fn is_unavailable(&self) -> bool {
        match self {
            AppError::Simulation(err) => err.is_unavailable(),
            AppError::Dataset(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Scenario(err) => write!(f, "invalid scenario: {}", err),
            AppError::Simulation(err) => write!(f, "simulation error: {}", err),
            AppError::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Scenario(err) => Some(err),
            AppError::Simulation(err) => Some(err),
            AppError::Output(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<ScenarioError> for AppError {
    fn from(value: ScenarioError) -> Self {
        Self::Scenario(value)
    }
}

impl From<SimulationError> for AppError {
    fn from(value: SimulationError) -> Self {
        Self::Simulation(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_covers_missing_artifacts_only() {
        let not_ready = AppError::from(SimulationError::NotReady {
            missing: vec!["revenue model"],
        });
        assert!(not_ready.is_unavailable());
        assert_eq!(
            not_ready.to_string(),
            "simulation error: simulator is not ready; missing revenue model"
        );

        let bad_input = AppError::from(ScenarioError::DurationOutOfRange(30));
        assert!(!bad_input.is_unavailable());
    }
}
