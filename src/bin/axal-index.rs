//! axal-index entry point: writes class_mapping.json for a directory

use anyhow::Context;
use axal::cli::IndexCli;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("AXAL_LOG"))
        .init();

    let cli = match IndexCli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            return code;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: IndexCli) -> anyhow::Result<()> {
    let directory = cli.directory.clone();
    axal::commands::index::run(cli)
        .with_context(|| format!("Failed to index {}", directory.display()))?;
    Ok(())
}
