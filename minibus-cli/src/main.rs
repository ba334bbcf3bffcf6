//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use minibus_cli::CliError;

fn main() -> ExitCode {
    match minibus_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "failures are reported on stderr")]
fn report(err: &CliError) {
    eprintln!("minibus: {err}");
}
