use crate::cli::Cli;
use crate::commands::discover;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::instrument::{FileDriver, RunReport};
use crate::output;
use tracing::info;

/// Instrument every source file under the requested directory
pub fn run(args: Cli) -> Result<RunReport> {
    let config = Config::load()?;
    run_with_config(args, &config)
}

pub fn run_with_config(args: Cli, config: &Config) -> Result<RunReport> {
    info!(directory = %args.directory.display(), "Instrumenting");
    let files = discover(&args.directory, config)?;

    let mut driver = FileDriver::new(config)?;
    let report = driver.process_all(&files)?;

    println!("{}", output::format_summary(&report));
    Ok(report)
}
