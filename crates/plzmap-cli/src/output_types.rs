use chrono::{DateTime, Utc};
use plzmap_core::config::PipelineConfig;
use plzmap_core::models::RowStats;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Output for run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub generated_at: DateTime<Utc>,
    pub data_dir: String,
    pub region: String,
    pub validity: String,
    pub charging_stations: LayerSummary,
    pub residents: LayerSummary,
    /// Station count per rated power, rounded to whole kW
    pub power_distribution: BTreeMap<u64, usize>,
    pub geometry_keys: usize,
    pub duplicate_geometry_keys: usize,
    pub district_rows: usize,
    pub saved_to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LayerSummary {
    pub features: usize,
    pub value_range: Option<(u64, u64)>,
    pub stats: RowStats,
    pub top: Vec<TopEntry>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct TopEntry {
    #[tabled(rename = "PLZ")]
    pub postal_code: u32,
    #[tabled(rename = "Value")]
    pub value: u64,
}

/// Row accounting of one layer, as a table row
#[derive(Debug, Serialize, Tabled)]
pub struct StatsRow {
    #[tabled(rename = "Layer")]
    pub layer: String,
    #[tabled(rename = "Input")]
    pub input: usize,
    #[tabled(rename = "Filtered")]
    pub filtered_out: usize,
    #[tabled(rename = "Malformed")]
    pub malformed: usize,
    #[tabled(rename = "No geometry")]
    pub unmatched: usize,
    #[tabled(rename = "Output")]
    pub output: usize,
}

impl StatsRow {
    pub fn new(layer: &str, stats: &RowStats) -> Self {
        Self {
            layer: layer.to_string(),
            input: stats.input,
            filtered_out: stats.filtered_out,
            malformed: stats.malformed,
            unmatched: stats.unmatched,
            output: stats.output,
        }
    }
}

/// Output for export command
#[derive(Debug, Serialize)]
pub struct ExportOutput {
    pub layer: String,
    pub value_property: String,
    pub features: usize,
    pub value_range: Option<(u64, u64)>,
    pub bounds: Option<[f64; 4]>,
    pub path: String,
}

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectSourceOutput {
    pub source: String,
    pub path: String,
    pub row_count: usize,
    pub duplicate_rows: usize,
    pub columns: Vec<String>,
    pub expected_columns: Vec<String>,
    pub missing_columns: Vec<String>,
    pub geometries: Option<GeometryCheck>,
}

#[derive(Debug, Serialize)]
pub struct GeometryCheck {
    pub column: String,
    pub empty: usize,
    pub invalid: usize,
    /// Parsed geometries per type
    pub types: BTreeMap<String, usize>,
    pub repeated_keys: bool,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct InspectConfigOutput {
    pub file: Option<String>,
    pub values: Vec<ConfigEntry>,
    pub effective: PipelineConfig,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
