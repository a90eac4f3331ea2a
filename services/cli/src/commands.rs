use crate::infra::{parse_policy, parse_scenario_spec, DataOverrides, Runtime, ScenarioSpec};
use crate::render;
use clap::Args;
use ecoimpact::error::AppError;
use ecoimpact::simulation::artifacts::ArtifactStatus;
use ecoimpact::simulation::dataset::CountryDataset;
use ecoimpact::simulation::domain::{PolicyType, ScenarioInput};
use ecoimpact::simulation::events::ResolutionEvent;
use ecoimpact::simulation::SimulationError;
use serde::Serialize;

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Country or jurisdiction name as it appears in the dataset
    #[arg(long)]
    pub(crate) country: String,
    /// Policy type: "Carbon Tax"/carbonTax or ETS/ets
    #[arg(long, value_parser = parse_policy)]
    pub(crate) policy: PolicyType,
    /// Carbon price in USD per ton of CO2
    #[arg(long)]
    pub(crate) price: f64,
    /// Number of years to simulate (1-20)
    #[arg(long)]
    pub(crate) duration: u8,
    /// First simulated year (defaults to APP_DEFAULT_START_YEAR)
    #[arg(long)]
    pub(crate) start_year: Option<i32>,
    /// Print the per-term coverage breakdown for the first year
    #[arg(long)]
    pub(crate) explain: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompareArgs {
    /// First scenario as Country:policy:price:duration[:start_year]
    #[arg(value_parser = parse_scenario_spec)]
    pub(crate) first: ScenarioSpec,
    /// Second scenario as Country:policy:price:duration[:start_year]
    #[arg(value_parser = parse_scenario_spec)]
    pub(crate) second: ScenarioSpec,
}

#[derive(Args, Debug)]
pub(crate) struct FossilArgs {
    /// Country or jurisdiction name
    #[arg(long)]
    pub(crate) country: String,
    /// First projected year (defaults to APP_DEFAULT_START_YEAR)
    #[arg(long)]
    pub(crate) start_year: Option<i32>,
    /// Number of projected years (1-20)
    #[arg(long, default_value_t = 10)]
    pub(crate) duration: u8,
    /// Carbon price in USD per ton; steepens the decline at 10, 25 and 50
    #[arg(long)]
    pub(crate) price: Option<f64>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatusArgs {
    /// Exit with an error unless predictions can run and the dataset loads
    #[arg(long)]
    pub(crate) require_ready: bool,
}

#[derive(Serialize)]
struct WithEvents<'a, T: Serialize> {
    #[serde(flatten)]
    body: &'a T,
    events: Vec<ResolutionEvent>,
}

fn print_json<T: Serialize>(body: &T, events: Vec<ResolutionEvent>) -> Result<(), AppError> {
    let output = serde_json::to_string_pretty(&WithEvents { body, events })?;
    println!("{output}");
    Ok(())
}

pub(crate) fn run_simulate(
    args: SimulateArgs,
    overrides: &DataOverrides,
    json: bool,
) -> Result<(), AppError> {
    let runtime = Runtime::build(overrides)?;
    let scenario = ScenarioInput::new(
        args.country,
        args.policy,
        args.price,
        args.start_year.unwrap_or(runtime.config.simulation.start_year),
        args.duration,
    )?;

    let report = runtime.simulator.simulate(&scenario)?;
    if json {
        return print_json(&report, runtime.distinct_events());
    }

    render::simulation_report(&report);
    if args.explain {
        if let Some(first) = report.yearly.first() {
            let co2 = report.country_context.annual_co2_tons;
            render::coverage_breakdown(&scenario, first.year, &first.profile, co2);
        }
    }
    render::events(&runtime.distinct_events());
    Ok(())
}

pub(crate) fn run_compare(
    args: CompareArgs,
    overrides: &DataOverrides,
    json: bool,
) -> Result<(), AppError> {
    let runtime = Runtime::build(overrides)?;
    let start_year = runtime.config.simulation.start_year;
    let first = args.first.into_input(start_year)?;
    let second = args.second.into_input(start_year)?;

    let comparison = runtime.simulator.compare(&first, &second)?;
    if json {
        return print_json(&comparison, runtime.distinct_events());
    }

    render::comparison(&comparison);
    render::events(&runtime.distinct_events());
    Ok(())
}

pub(crate) fn run_fossil(
    args: FossilArgs,
    overrides: &DataOverrides,
    json: bool,
) -> Result<(), AppError> {
    let runtime = Runtime::build(overrides)?;
    let start_year = args
        .start_year
        .unwrap_or(runtime.config.simulation.start_year);
    // Same bounds as a policy scenario.
    let scenario = ScenarioInput::new(
        args.country,
        PolicyType::CarbonTax,
        args.price.unwrap_or(0.0),
        start_year,
        args.duration,
    )?;

    let projection = runtime.simulator.project_fossil(
        scenario.country(),
        scenario.start_year(),
        scenario.duration_years(),
        args.price,
    );
    if json {
        return print_json(&projection, runtime.distinct_events());
    }

    render::fossil_projection(&projection);
    render::events(&runtime.distinct_events());
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport {
    artifacts: ArtifactStatus,
    ready: bool,
    missing: Vec<&'static str>,
    dataset_path: String,
    dataset_rows: Option<usize>,
    dataset_error: Option<String>,
}

pub(crate) fn run_status(
    args: StatusArgs,
    overrides: &DataOverrides,
    json: bool,
) -> Result<(), AppError> {
    let runtime = Runtime::build(overrides)?;
    let status = runtime.simulator.status();
    let dataset_path = &runtime.config.data.dataset_path;
    let dataset = CountryDataset::from_path(dataset_path);

    let report = StatusReport {
        artifacts: status,
        ready: status.is_ready(),
        missing: status.missing_for_prediction(),
        dataset_path: dataset_path.display().to_string(),
        dataset_rows: dataset.as_ref().ok().map(CountryDataset::len),
        dataset_error: dataset.as_ref().err().map(ToString::to_string),
    };
    if json {
        print_json(&report, runtime.distinct_events())?;
    } else {
        render::status(
            &status,
            &report.dataset_path,
            report.dataset_rows,
            report.dataset_error.as_deref(),
        );
    }

    if args.require_ready {
        if !status.is_ready() {
            return Err(SimulationError::NotReady {
                missing: status.missing_for_prediction(),
            }
            .into());
        }
        dataset?;
    }
    Ok(())
}
