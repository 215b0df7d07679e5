//! gopack CLI - Command-line utility for packaging Go modules into
//! distributable zip archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;
mod upload;

use clap::Parser;
use error::USAGE_EXIT_CODE;
use error::UsageError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "GOPACK_LOG";

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    if let Some(shell) = cli.completions {
        commands::completion::execute(shell);
        return ExitCode::SUCCESS;
    }

    init_tracing(cli.verbose);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match commands::pack::execute(&cli, &*formatter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(usage) = err.downcast_ref::<UsageError>() {
                eprint!("{usage}");
                return ExitCode::from(USAGE_EXIT_CODE);
            }
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
