use crate::commands::{
    run_compare, run_fossil, run_simulate, run_status, CompareArgs, FossilArgs, SimulateArgs,
    StatusArgs,
};
use crate::infra::DataOverrides;
use clap::{Parser, Subcommand};
use ecoimpact::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "ecoimpact",
    about = "Simulate carbon pricing policies: revenue, success risk, coverage and fossil share",
    version
)]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(flatten)]
    data: DataOverrides,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate one policy scenario year by year
    Simulate(SimulateArgs),
    /// Simulate two scenarios and compare their headline metrics
    Compare(CompareArgs),
    /// Project a country's fossil fuel share without running the policy models
    Fossil(FossilArgs),
    /// Report which artifacts and data files are available (default command)
    Status(StatusArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Status(StatusArgs::default()));

    match command {
        Command::Simulate(args) => run_simulate(args, &cli.data, cli.json),
        Command::Compare(args) => run_compare(args, &cli.data, cli.json),
        Command::Fossil(args) => run_fossil(args, &cli.data, cli.json),
        Command::Status(args) => run_status(args, &cli.data, cli.json),
    }
}
