//! Homecheck CLI entry point.

use clap::Parser;
use homecheck_inspector::{
    init_tracing, render_report, runner, write_report, Cli, InspectResult, RunOutcome,
    EXIT_CHECKS_FAILED,
};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_tracing(cli.log_format) {
        eprintln!("{}", err);
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Invalid configuration");
            eprintln!("{}", err);
            return ExitCode::from(EXIT_CHECKS_FAILED);
        }
    };

    let mut outcome = runner::run(&config).await;
    if let Err(err) = write_report(&config.report_path, &outcome.report) {
        tracing::error!(error = %err, "Could not write report");
        outcome.report.push_error(err.to_string());
        outcome.exit_code = outcome.exit_code.max(err.exit_code());
    }

    if let Err(err) = print_outcome(&outcome) {
        eprintln!("{}", err);
    }
    ExitCode::from(outcome.exit_code)
}

fn print_outcome(outcome: &RunOutcome) -> InspectResult<()> {
    let json = render_report(&outcome.report)?;
    if outcome.is_ok() {
        println!("Home inspection OK");
        println!("{}", json);
    } else {
        eprintln!("Home inspection FAILED");
        eprintln!("{}", json);
    }
    Ok(())
}
