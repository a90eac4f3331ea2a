mod cli;
mod commands;
mod infra;
mod render;

use ecoimpact::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
