//! rolling-ta command-line interface
//!
//! Reads a CSV price table, runs one primitive and writes an aligned CSV.
//! Logs go to stderr; set `RUST_LOG` or pass `-v` for more detail.

use std::process::ExitCode;

use clap::Parser;
use rolling_ta_cli::args::Args;
use rolling_ta_cli::commands;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match commands::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
