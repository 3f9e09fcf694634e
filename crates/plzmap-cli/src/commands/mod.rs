//! Command implementations

mod config;
mod export;
mod inspect;
mod run;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run(args) => run::execute(args, &config, &output, cli.dry_run),
        Commands::Export(args) => export::execute(args, &config, &output, cli.dry_run),
        Commands::Inspect(args) => inspect::execute(args, &config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}
