use clap::{Parser, Subcommand, ValueEnum};
use plzmap_core::config::Source;
use plzmap_core::models::ValidityMode;
use plzmap_pipeline::Layer;
use std::path::PathBuf;

/// plzmap - Postal-code map layers for charging stations and residents
#[derive(Parser, Debug)]
#[command(name = "plzmap")]
#[command(about = "Join charging-station and resident data with postal-code geometries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Configuration file (defaults to ./plzmap.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the source CSV files
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// State name the charging stations are filtered to
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// How malformed rows are handled
    #[arg(long, global = true)]
    pub validity: Option<ValidityArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ValidityArg {
    /// Abort on the first malformed row
    Strict,
    /// Drop malformed rows with a warning
    Lenient,
}

impl From<ValidityArg> for ValidityMode {
    fn from(arg: ValidityArg) -> Self {
        match arg {
            ValidityArg::Strict => ValidityMode::Strict,
            ValidityArg::Lenient => ValidityMode::Lenient,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline and summarize both layers
    Run(RunArgs),

    /// Write one layer as GeoJSON
    Export(ExportArgs),

    /// Show the columns and row count of one source file
    Inspect(InspectArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Number of postal codes listed per layer
    #[arg(long, default_value = "10")]
    pub top: usize,

    /// Save the result tables as a JSON snapshot
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Layer to export
    #[arg(long, value_enum)]
    pub layer: LayerArg,

    /// Output file (prints to stdout when omitted)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Read results from a snapshot written by `run --save` instead of running
    #[arg(long, value_name = "PATH")]
    pub from_snapshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LayerArg {
    Residents,
    ChargingStations,
}

impl From<LayerArg> for Layer {
    fn from(arg: LayerArg) -> Self {
        match arg {
            LayerArg::Residents => Layer::Residents,
            LayerArg::ChargingStations => Layer::ChargingStations,
        }
    }
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Source file to inspect
    #[arg(value_enum)]
    pub source: SourceArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    PostalGeometries,
    DistrictGeometries,
    ChargingStations,
    Residents,
}

impl From<SourceArg> for Source {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::PostalGeometries => Source::PostalGeometries,
            SourceArg::DistrictGeometries => Source::DistrictGeometries,
            SourceArg::ChargingStations => Source::ChargingStations,
            SourceArg::Residents => Source::Residents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "plzmap",
            "export",
            "--layer",
            "charging-stations",
            "--validity",
            "lenient",
            "--data-dir",
            "/data",
        ])
        .unwrap();

        assert!(matches!(cli.validity, Some(ValidityArg::Lenient)));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/data")));
        match cli.command {
            Commands::Export(args) => assert!(matches!(args.layer, LayerArg::ChargingStations)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["plzmap", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.top, 10);
                assert!(args.save.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_layer_rejected() {
        assert!(Cli::try_parse_from(["plzmap", "export", "--layer", "districts"]).is_err());
    }
}
