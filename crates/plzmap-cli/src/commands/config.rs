//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, InspectConfigOutput};
use anyhow::{Context, Result};
use plzmap_core::config::{ConfigSource, LayeredConfig, Source};

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let effective = config.resolve().context("Invalid configuration")?;

    let values: Vec<ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry { key, value, source: source_label(source).to_string() })
        .collect();

    if output.is_json() {
        output.result(InspectConfigOutput {
            file: config.file.as_ref().map(|p| p.display().to_string()),
            values,
            effective,
        })?;
        return Ok(());
    }

    output.section("Configuration");
    match &config.file {
        Some(path) => output.kv("Config file", path.display()),
        None => output.kv("Config file", "(none, using defaults)"),
    }
    output.table(values);

    output.section("Source Files");
    for source in Source::ALL {
        output.kv(source.as_str(), effective.source_path(source).display());
    }

    output.section("Filters");
    output.kv(
        "Charging postal range",
        format!("({}, {})", effective.charging.postal_range.lower, effective.charging.postal_range.upper),
    );
    output.kv(
        "Resident postal range",
        format!("({}, {})", effective.residents.postal_range.lower, effective.residents.postal_range.upper),
    );
    output.kv(
        "Decimal separator",
        format!("'{}' -> '{}'", effective.decimal.source_separator, effective.decimal.target_separator),
    );

    Ok(())
}

fn source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "file",
        ConfigSource::Environment => "environment",
        ConfigSource::Cli => "cli",
    }
}
