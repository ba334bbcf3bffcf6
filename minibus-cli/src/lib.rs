//! Command-line interface for the minibus fleet optimizer.
//!
//! Three subcommands read a JSON request from disk and print a JSON result:
//! `optimize` plans routes, `schedule` assigns costed routes to departure
//! slots, and `advise` turns live route conditions into re-optimization
//! decisions. Tunables merge from defaults, configuration files, `MINIBUS_*`
//! environment variables and flags, in increasing precedence.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod advise;
mod error;
mod fs;
mod optimize;
mod output;
mod schedule;

pub use error::CliError;

use advise::AdviseArgs;
use optimize::{DefaultRouteSolverBuilder, OptimizeArgs};
use schedule::ScheduleArgs;

pub(crate) const ARG_REQUEST: &str = "request-path";
pub(crate) const ENV_OPTIMIZE_REQUEST: &str = "MINIBUS_CMDS_OPTIMIZE_REQUEST_PATH";
pub(crate) const ENV_SCHEDULE_REQUEST: &str = "MINIBUS_CMDS_SCHEDULE_REQUEST_PATH";
pub(crate) const ENV_ADVISE_REQUEST: &str = "MINIBUS_CMDS_ADVISE_REQUEST_PATH";

/// Run the minibus CLI with the current process arguments and environment.
///
/// Results are written to stdout as pretty JSON. When a command fails after
/// argument parsing, a `{ "status", "message" }` report is written instead
/// and the error is returned to the caller.
///
/// # Errors
/// Returns the [`CliError`] raised by argument parsing, configuration
/// merging, input loading, or the selected command.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    let outcome = dispatch(cli.command, &mut stdout);
    if let Err(err) = &outcome {
        output::write_error_report(&mut stdout, err)?;
    }
    outcome
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Optimize(args) => {
            optimize::run_optimize_with(args, &DefaultRouteSolverBuilder, writer)
        }
        Command::Schedule(args) => schedule::run_schedule_with(args, writer),
        Command::Advise(args) => advise::run_advise_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "minibus",
    about = "Route, schedule and monitor a minibus fleet",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan capacitated routes for one request.
    Optimize(OptimizeArgs),
    /// Assign costed routes to half-hour departure slots.
    Schedule(ScheduleArgs),
    /// Recommend reroutes or reschedules from live conditions.
    Advise(AdviseArgs),
}

#[cfg(test)]
mod tests;
