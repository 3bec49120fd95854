//! tut-sed CLI
//!
//! Command-line interface for the TUT-SED 2017 dataset tools.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use tut_sed::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("tut-sed v{}", env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Commands::Merge {
            sources,
            target,
            move_files,
            dry_run,
        } => commands::merge(sources, target, *move_files, *dry_run).context("merge failed"),
        Commands::PrepareMeta { input, output } => {
            commands::prepare_meta(input, output).context("prepare-meta failed")
        }
        Commands::Info { dataset } => commands::info(dataset).context("info failed"),
        Commands::Get {
            index,
            dataset,
            mono,
            output,
        } => commands::get(*index, dataset, *mono, output.as_deref())
            .with_context(|| format!("fetching sample {} failed", index)),
        Commands::Validate { dataset, decode } => {
            commands::validate(dataset, *decode).context("validation failed")
        }
    };

    if let Err(err) = &result {
        if let Some(tut_err) = err.downcast_ref::<tut_sed::TutSedError>() {
            for suggestion in tut_err.recovery_suggestions() {
                eprintln!("hint: {}", suggestion);
            }
        }
    }

    result
}
