use crate::error::{PlzmapError, Result};
use crate::models::{PostalRange, ValidityMode};
use crate::parse::DecimalFormat;
use crate::table::TableFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// The four input files of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    PostalGeometries,
    DistrictGeometries,
    ChargingStations,
    Residents,
}

impl Source {
    pub const ALL: [Source; 4] = [
        Source::PostalGeometries,
        Source::DistrictGeometries,
        Source::ChargingStations,
        Source::Residents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::PostalGeometries => "postal_geometries",
            Source::DistrictGeometries => "district_geometries",
            Source::ChargingStations => "charging_stations",
            Source::Residents => "residents",
        }
    }
}

/// File names, relative to the data directory unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub postal_geometries: PathBuf,
    pub district_geometries: PathBuf,
    pub charging_stations: PathBuf,
    pub residents: PathBuf,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            postal_geometries: "geodata_berlin_plz.csv".into(),
            district_geometries: "geodata_berlin_dis.csv".into(),
            charging_stations: "Ladesaeulenregister_SEP.csv".into(),
            residents: "plz_einwohner.csv".into(),
        }
    }
}

impl SourceFiles {
    pub fn get(&self, source: Source) -> &Path {
        match source {
            Source::PostalGeometries => &self.postal_geometries,
            Source::DistrictGeometries => &self.district_geometries,
            Source::ChargingStations => &self.charging_stations,
            Source::Residents => &self.residents,
        }
    }
}

/// Layout of the postal-code and district geometry tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryTableConfig {
    pub delimiter: char,
    pub key_column: String,
    pub geometry_column: String,
}

impl Default for GeometryTableConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            key_column: "PLZ".to_string(),
            geometry_column: "geometry".to_string(),
        }
    }
}

/// Source column names of the charging-station register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingColumns {
    pub postal_code: String,
    pub state: String,
    pub latitude: String,
    pub longitude: String,
    pub power: String,
}

impl Default for ChargingColumns {
    fn default() -> Self {
        Self {
            postal_code: "Postleitzahl".to_string(),
            state: "Bundesland".to_string(),
            latitude: "Breitengrad".to_string(),
            longitude: "Längengrad".to_string(),
            power: "Nennleistung Ladeeinrichtung [kW]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargingConfig {
    pub delimiter: char,
    pub skip_lines: usize,
    pub trim_headers: bool,
    pub region: String,
    pub postal_range: PostalRange,
    pub columns: ChargingColumns,
}

impl Default for ChargingConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            skip_lines: 10,
            trim_headers: true,
            region: "Berlin".to_string(),
            postal_range: PostalRange::new(10115, 14200),
            columns: ChargingColumns::default(),
        }
    }
}

/// Source column names of the resident table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentColumns {
    pub postal_code: String,
    pub residents: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ResidentColumns {
    fn default() -> Self {
        Self {
            postal_code: "plz".to_string(),
            residents: "einwohner".to_string(),
            latitude: "lat".to_string(),
            longitude: "lon".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentConfig {
    pub delimiter: char,
    pub postal_range: PostalRange,
    pub columns: ResidentColumns,
}

impl Default for ResidentConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            postal_range: PostalRange::new(10000, 14200),
            columns: ResidentColumns::default(),
        }
    }
}

/// Fully resolved pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub validity: ValidityMode,
    pub decimal: DecimalFormat,
    pub sources: SourceFiles,
    pub geometry: GeometryTableConfig,
    pub charging: ChargingConfig,
    pub residents: ResidentConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("datasets"),
            validity: ValidityMode::Strict,
            decimal: DecimalFormat::default(),
            sources: SourceFiles::default(),
            geometry: GeometryTableConfig::default(),
            charging: ChargingConfig::default(),
            residents: ResidentConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Path of a source file
    pub fn source_path(&self, source: Source) -> PathBuf {
        let file = self.sources.get(source);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }

    /// How a source file is laid out
    pub fn table_format(&self, source: Source) -> TableFormat {
        match source {
            Source::PostalGeometries | Source::DistrictGeometries => {
                TableFormat::new(self.geometry.delimiter)
            }
            Source::ChargingStations => TableFormat::new(self.charging.delimiter)
                .skip_lines(self.charging.skip_lines)
                .trim_headers(self.charging.trim_headers),
            Source::Residents => TableFormat::new(self.residents.delimiter),
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        check_range("charging.postal_range", self.charging.postal_range)?;
        check_range("residents.postal_range", self.residents.postal_range)?;

        if self.decimal.source_separator == self.decimal.target_separator {
            return Err(invalid(
                "decimal",
                format!(
                    "source and target separator are both '{}'",
                    self.decimal.source_separator
                ),
            ));
        }

        for (key, delimiter) in [
            ("geometry.delimiter", self.geometry.delimiter),
            ("charging.delimiter", self.charging.delimiter),
            ("residents.delimiter", self.residents.delimiter),
        ] {
            if !delimiter.is_ascii() {
                return Err(invalid(key, format!("'{}' is not an ASCII character", delimiter)));
            }
        }

        if self.charging.region.trim().is_empty() {
            return Err(PlzmapError::ConfigMissing { key: "charging.region".to_string() });
        }

        let columns = [
            ("geometry.key_column", &self.geometry.key_column),
            ("geometry.geometry_column", &self.geometry.geometry_column),
            ("charging.columns.postal_code", &self.charging.columns.postal_code),
            ("charging.columns.state", &self.charging.columns.state),
            ("charging.columns.latitude", &self.charging.columns.latitude),
            ("charging.columns.longitude", &self.charging.columns.longitude),
            ("charging.columns.power", &self.charging.columns.power),
            ("residents.columns.postal_code", &self.residents.columns.postal_code),
            ("residents.columns.residents", &self.residents.columns.residents),
            ("residents.columns.latitude", &self.residents.columns.latitude),
            ("residents.columns.longitude", &self.residents.columns.longitude),
        ];
        for (key, column) in columns {
            if column.trim().is_empty() {
                return Err(PlzmapError::ConfigMissing { key: key.to_string() });
            }
        }

        Ok(())
    }
}

fn check_range(key: &str, range: PostalRange) -> Result<()> {
    if range.lower >= range.upper {
        return Err(invalid(
            key,
            format!("lower bound {} must be below upper bound {}", range.lower, range.upper),
        ));
    }
    Ok(())
}

fn invalid(key: &str, reason: String) -> PlzmapError {
    PlzmapError::ConfigInvalid { key: key.to_string(), reason }
}

/// Layered configuration for plzmap
///
/// The full table layout comes from defaults or the config file. The knobs
/// an operator changes per run (`data_dir`, `region`, `validity`) are also
/// layered over environment variables and CLI flags.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub data_dir: ConfigValue<PathBuf>,
    pub region: ConfigValue<String>,
    pub validity: ConfigValue<ValidityMode>,
    pub pipeline: PipelineConfig,
    pub file: Option<PathBuf>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let pipeline = PipelineConfig::default();
        Self {
            data_dir: ConfigValue::new(pipeline.data_dir.clone(), ConfigSource::Default),
            region: ConfigValue::new(pipeline.charging.region.clone(), ConfigSource::Default),
            validity: ConfigValue::new(pipeline.validity, ConfigSource::Default),
            pipeline,
            file: None,
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| PlzmapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let pipeline: PipelineConfig =
            toml::from_str(&content).map_err(|e| PlzmapError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Only keys that are actually present count as file-sourced
        let table: toml::Table =
            toml::from_str(&content).map_err(|e| PlzmapError::Serialization(e.to_string()))?;
        let charging_region = table
            .get("charging")
            .and_then(|c| c.get("region"))
            .is_some();

        if table.contains_key("data_dir") {
            self.data_dir.update(pipeline.data_dir.clone(), ConfigSource::File);
        }

        if charging_region {
            self.region.update(pipeline.charging.region.clone(), ConfigSource::File);
        }

        if table.contains_key("validity") {
            self.validity.update(pipeline.validity, ConfigSource::File);
        }

        self.pipeline = pipeline;
        self.file = Some(path.as_ref().to_path_buf());
        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(self) -> Self {
        self.load_from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from a variable lookup (`PLZMAP_*` keys)
    pub fn load_from_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // PLZMAP_DATA_DIR
        if let Some(dir) = lookup("PLZMAP_DATA_DIR") {
            self.data_dir.update(PathBuf::from(dir), ConfigSource::Environment);
        }

        // PLZMAP_REGION
        if let Some(region) = lookup("PLZMAP_REGION") {
            if region.trim().is_empty() {
                tracing::warn!("Ignoring empty PLZMAP_REGION");
            } else {
                self.region.update(region, ConfigSource::Environment);
            }
        }

        // PLZMAP_VALIDITY
        if let Some(validity_str) = lookup("PLZMAP_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid PLZMAP_VALIDITY value '{}': expected strict or lenient",
                    validity_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data_dir.update(data_dir, ConfigSource::Cli);
        }

        if let Some(region) = overrides.region {
            self.region.update(region, ConfigSource::Cli);
        }

        if let Some(validity) = overrides.validity {
            self.validity.update(validity, ConfigSource::Cli);
        }
    }

    /// Apply the layered values and validate the result
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = self.pipeline.clone();
        config.data_dir = self.data_dir.value.clone();
        config.charging.region = self.region.value.clone();
        config.validity = self.validity.value;
        config.validate()?;
        Ok(config)
    }

    /// Get the layered values as a map for inspection
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        map.insert(
            "data_dir".to_string(),
            (self.data_dir.value.display().to_string(), self.data_dir.source),
        );

        map.insert("region".to_string(), (self.region.value.clone(), self.region.source));

        map.insert(
            "validity".to_string(),
            (format!("{:?}", self.validity.value), self.validity.source),
        );

        map
    }
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub region: Option<String>,
    pub validity: Option<ValidityMode>,
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(PlzmapError::ConfigInvalid {
            key: "validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}
