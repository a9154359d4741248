mod app;
mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use freight_cost_calculator::util::logging;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match app::resolve_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.log_filter);

    match app::run(&cli, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
