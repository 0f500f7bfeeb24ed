use crate::cli::IndexCli;
use crate::commands::discover;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::index::{IndexReport, TypeIndexer};
use crate::output;
use tracing::info;

/// Build the type mapping for a directory and write it next to the sources
pub fn run(args: IndexCli) -> Result<IndexReport> {
    let config = Config::load()?;
    run_with_config(args, &config)
}

pub fn run_with_config(args: IndexCli, config: &Config) -> Result<IndexReport> {
    info!(directory = %args.directory.display(), "Indexing types");
    let files = discover(&args.directory, config)?;

    let mut indexer = TypeIndexer::new()?;
    let report = indexer.build(&files)?;
    let written = report.index.write(&args.directory, &config.index)?;

    println!("{}", output::format_index_summary(&report, &written));
    Ok(report)
}
