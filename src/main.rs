use std::process::ExitCode;

use clap::Parser;
use tsctl::cli::{Arguments, ExitStatus};

fn main() -> ExitCode {
    let args = Arguments::parse();

    match tsctl::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            print_error(&err);
            ExitStatus::from_error(&err).into()
        }
    }
}

/// Print `err` and the causes its message does not already include.
fn print_error(err: &anyhow::Error) {
    let mut printed = vec![err.to_string()];
    eprintln!("Error: {}", printed[0]);
    for cause in err.chain().skip(1) {
        let cause = cause.to_string();
        if !printed.iter().any(|shown| shown.contains(&cause)) {
            eprintln!("  caused by: {}", cause);
            printed.push(cause);
        }
    }
}
