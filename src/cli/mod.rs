use std::process::ExitCode;

use anyhow::Result;

pub mod args;
pub mod commands;
mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

/// Run a parsed command line, print its output and pick the exit code.
pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let verbose = args.verbose();
    let silent = args.silent();

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success.into());
    };

    let result = run::run(args)?;
    report::print(&result, verbose, silent);

    let status = if result.exit_on_errors && result.error_count > 0 {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    };
    Ok(status.into())
}
