use clap::Args;
use ecoimpact::config::{AppConfig, DataConfig};
use ecoimpact::error::AppError;
use ecoimpact::simulation::domain::{PolicyType, ScenarioError, ScenarioInput};
use ecoimpact::simulation::events::{RecordingEventSink, ResolutionEvent, TracingEventSink};
use ecoimpact::simulation::PolicySimulator;
use ecoimpact::telemetry;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line overrides for the configured data locations.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct DataOverrides {
    /// Country dataset CSV (overrides APP_DATASET_PATH)
    #[arg(long, global = true)]
    pub(crate) dataset: Option<PathBuf>,
    /// Supplemental CO2 emissions CSV (overrides APP_CO2_PATH)
    #[arg(long, global = true)]
    pub(crate) co2: Option<PathBuf>,
    /// Directory holding the model artifacts (overrides APP_MODELS_DIR)
    #[arg(long, global = true)]
    pub(crate) models_dir: Option<PathBuf>,
    /// Directory holding the encoding tables (overrides APP_ENCODERS_DIR)
    #[arg(long, global = true)]
    pub(crate) encoders_dir: Option<PathBuf>,
}

impl DataOverrides {
    fn apply(&self, data: &mut DataConfig) {
        if let Some(path) = &self.dataset {
            data.dataset_path = path.clone();
        }
        if let Some(path) = &self.co2 {
            data.co2_path = Some(path.clone());
        }
        if let Some(dir) = &self.models_dir {
            data.models_dir = dir.clone();
        }
        if let Some(dir) = &self.encoders_dir {
            data.encoders_dir = dir.clone();
        }
    }
}

/// Configuration, logging and a simulator wired to an event recorder.
pub(crate) struct Runtime {
    pub(crate) config: AppConfig,
    pub(crate) simulator: PolicySimulator,
    pub(crate) events: Arc<RecordingEventSink>,
}

impl Runtime {
    pub(crate) fn build(overrides: &DataOverrides) -> Result<Self, AppError> {
        let mut config = AppConfig::load()?;
        overrides.apply(&mut config.data);
        telemetry::init(&config.telemetry)?;
        tracing::debug!(
            environment = ?config.environment,
            dataset = %config.data.dataset_path.display(),
            models_dir = %config.data.models_dir.display(),
            encoders_dir = %config.data.encoders_dir.display(),
            "runtime configured"
        );

        let events = Arc::new(RecordingEventSink::forwarding(TracingEventSink));
        let simulator = PolicySimulator::from_config(&config.data, events.clone());
        Ok(Self {
            config,
            simulator,
            events,
        })
    }

    /// Recorded events with repeats of the same (code, country, detail) dropped.
    pub(crate) fn distinct_events(&self) -> Vec<ResolutionEvent> {
        let mut seen = HashSet::new();
        self.events
            .events()
            .into_iter()
            .filter(|event| seen.insert((event.code, event.country.clone(), event.detail.clone())))
            .collect()
    }
}

pub(crate) fn parse_policy(raw: &str) -> Result<PolicyType, String> {
    raw.parse::<PolicyType>().map_err(|err| err.to_string())
}

/// `Country:policy:price:duration[:start_year]`, as given to `compare`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScenarioSpec {
    pub(crate) country: String,
    pub(crate) policy: PolicyType,
    pub(crate) price: f64,
    pub(crate) duration: u8,
    pub(crate) start_year: Option<i32>,
}

impl ScenarioSpec {
    pub(crate) fn into_input(self, default_start_year: i32) -> Result<ScenarioInput, ScenarioError> {
        ScenarioInput::new(
            self.country,
            self.policy,
            self.price,
            self.start_year.unwrap_or(default_start_year),
            self.duration,
        )
    }
}

pub(crate) fn parse_scenario_spec(raw: &str) -> Result<ScenarioSpec, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let (country, policy, price, duration, start_year) = match parts.as_slice() {
        [country, policy, price, duration] => (*country, *policy, *price, *duration, None),
        [country, policy, price, duration, start] => {
            (*country, *policy, *price, *duration, Some(*start))
        }
        _ => {
            return Err(format!(
                "expected Country:policy:price:duration[:start_year], got '{raw}'"
            ))
        }
    };

    if country.is_empty() {
        return Err("scenario country must not be empty".to_string());
    }
    let price = price
        .parse::<f64>()
        .map_err(|err| format!("invalid price '{price}' ({err})"))?;
    let duration = duration
        .parse::<u8>()
        .map_err(|err| format!("invalid duration '{duration}' ({err})"))?;
    let start_year = start_year
        .map(|start| {
            start
                .parse::<i32>()
                .map_err(|err| format!("invalid start year '{start}' ({err})"))
        })
        .transpose()?;

    Ok(ScenarioSpec {
        country: country.to_string(),
        policy: parse_policy(policy)?,
        price,
        duration,
        start_year,
    })
}
