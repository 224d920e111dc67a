//! `kube-snapshot`: extract portable manifest templates from a cluster.
mod cli;
mod exit_codes;
mod run;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::{engine_error, level_for_verbosity, LogDestination};

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let destination = match &cli.log_file {
        Some(path) => LogDestination::TerminalAndFile(path.clone()),
        None => LogDestination::Terminal,
    };
    engine_logging::initialize(destination, level_for_verbosity(cli.verbose, cli.quiet));

    match run::run(&cli) {
        Ok(_) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::from(exit_codes::for_error(&err))
        }
    }
}
