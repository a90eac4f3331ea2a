use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the simulator.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub data: DataConfig,
    pub simulation: SimulationDefaults,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let dataset_path = path_var("APP_DATASET_PATH", "data/ecoimpact_complete_dataset.csv")?;
        let models_dir = path_var("APP_MODELS_DIR", "models")?;
        let encoders_dir = path_var("APP_ENCODERS_DIR", "encoders")?;
        let co2_path = match env::var("APP_CO2_PATH") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(PathBuf::from(value.trim())),
            Err(_) => None,
        };

        let start_year = env::var("APP_DEFAULT_START_YEAR")
            .unwrap_or_else(|_| "2024".to_string())
            .trim()
            .parse::<i32>()
            .map_err(|_| ConfigError::InvalidStartYear)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            data: DataConfig {
                dataset_path,
                co2_path,
                models_dir,
                encoders_dir,
            },
            simulation: SimulationDefaults { start_year },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn path_var(name: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyPath { var: name }),
        Ok(value) => Ok(PathBuf::from(value.trim())),
        Err(_) => Ok(PathBuf::from(default)),
    }
}

/// Locations of the tabular dataset and serialized artifacts.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub dataset_path: PathBuf,
    pub co2_path: Option<PathBuf>,
    pub models_dir: PathBuf,
    pub encoders_dir: PathBuf,
}

/// Defaults applied when a scenario omits optional inputs.
#[derive(Debug, Clone)]
pub struct SimulationDefaults {
    pub start_year: i32,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidStartYear,
    EmptyPath { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStartYear => {
                write!(f, "APP_DEFAULT_START_YEAR must be a valid integer year")
            }
            ConfigError::EmptyPath { var } => write!(f, "{var} must not be empty when set"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn reset_env() {
        for var in [
            "APP_ENV",
            "APP_LOG_LEVEL",
            "APP_DATASET_PATH",
            "APP_CO2_PATH",
            "APP_MODELS_DIR",
            "APP_ENCODERS_DIR",
            "APP_DEFAULT_START_YEAR",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(
            config.data.dataset_path,
            PathBuf::from("data/ecoimpact_complete_dataset.csv")
        );
        assert_eq!(config.data.models_dir, PathBuf::from("models"));
        assert_eq!(config.data.encoders_dir, PathBuf::from("encoders"));
        assert!(config.data.co2_path.is_none());
        assert_eq!(config.simulation.start_year, 2024);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn rejects_non_numeric_start_year() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DEFAULT_START_YEAR", "next year");
        let error = AppConfig::load().expect_err("start year must parse");
        assert!(matches!(error, ConfigError::InvalidStartYear));
        reset_env();
    }

    #[test]
    fn rejects_blank_model_directory() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MODELS_DIR", "  ");
        let error = AppConfig::load().expect_err("blank path rejected");
        assert!(matches!(
            error,
            ConfigError::EmptyPath {
                var: "APP_MODELS_DIR"
            }
        ));
        reset_env();
    }

    #[test]
    fn reads_overrides_and_production_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("APP_CO2_PATH", "data/co2.csv");
        env::set_var("APP_DEFAULT_START_YEAR", "2030");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.data.co2_path, Some(PathBuf::from("data/co2.csv")));
        assert_eq!(config.simulation.start_year, 2030);
        reset_env();
    }
}
