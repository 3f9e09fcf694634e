//! plzmap CLI - Command-line interface
//!
//! Runs the postal-code pipeline over the configured data directory and
//! writes the resulting map layers.

mod cli;
mod commands;
mod config_loader;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod progress;

use clap::Parser;
use cli::Cli;

fn main() {
    // stdout carries --json and GeoJSON output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(error) = commands::execute(cli) {
        errors::from_anyhow(error).display();
        std::process::exit(1);
    }
}
