//! Configuration loading utilities for CLI commands

use crate::cli::Cli;
use anyhow::{Context, Result};
use plzmap_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when --config is absent
pub const DEFAULT_CONFIG_FILE: &str = "plzmap.toml";

/// Load layered configuration: defaults, file, environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file(cli.config.as_deref()) {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
    }

    let mut config = config.load_from_env();
    config.update_from_cli(overrides(cli));
    Ok(config)
}

/// Explicit config path, or the default file if it exists
fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

fn overrides(cli: &Cli) -> CliConfigOverrides {
    CliConfigOverrides {
        data_dir: cli.data_dir.clone(),
        region: cli.region.clone(),
        validity: cli.validity.map(Into::into),
    }
}
