//! End-to-end run: load the sources once, clean, join and aggregate

use plzmap_core::config::{PipelineConfig, Source};
use plzmap_core::error::Result;
use plzmap_core::helpers::timed;
use plzmap_core::models::{ChargingStation, GeometryLookup, PostalCodeCount, ResidentArea};
use plzmap_core::table::RawTable;
use serde::{Deserialize, Serialize};

use crate::aggregate::count_by_postal_code;
use crate::charging::preprocess_charging_stations;
use crate::geojoin::Joined;
use crate::residents::preprocess_residents;

/// Progress information for a pipeline run
#[derive(Debug, Clone)]
pub struct StageProgress {
    pub stage: PipelineStage,
    /// Rows the stage works on (source files while loading)
    pub total: usize,
    pub message: String,
}

/// Current stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Loading,
    BuildingLookup,
    ChargingStations,
    Residents,
    Aggregating,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Loading => "load",
            PipelineStage::BuildingLookup => "lookup",
            PipelineStage::ChargingStations => "charging_stations",
            PipelineStage::Residents => "residents",
            PipelineStage::Aggregating => "aggregate",
        }
    }
}

/// The four source files, read once per run
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub postal_geometries: RawTable,
    pub district_geometries: RawTable,
    pub charging_stations: RawTable,
    pub residents: RawTable,
}

impl SourceTables {
    /// Read every configured source file
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let read = |source: Source| {
            let path = config.source_path(source);
            tracing::debug!(source = source.as_str(), path = %path.display(), "Reading source");
            RawTable::read(&path, &config.table_format(source))
        };

        timed(PipelineStage::Loading.as_str(), || -> Result<Self> {
            Ok(Self {
                postal_geometries: read(Source::PostalGeometries)?,
                district_geometries: read(Source::DistrictGeometries)?,
                charging_stations: read(Source::ChargingStations)?,
                residents: read(Source::Residents)?,
            })
        })
    }
}

/// Result tables of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub charging: Joined<ChargingStation>,
    pub counts: Vec<PostalCodeCount>,
    pub residents: Joined<ResidentArea>,
    /// Rows in the district geometry file; loaded but not joined
    pub district_rows: usize,
    /// Distinct postal codes in the geometry lookup
    pub geometry_keys: usize,
    pub duplicate_geometry_keys: usize,
}

/// Batch pipeline over one configuration
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<PipelineOutput> {
        self.run_with_progress(|_| {})
    }

    /// Load the sources and process them, reporting each stage
    pub fn run_with_progress<F>(&self, mut progress: F) -> Result<PipelineOutput>
    where
        F: FnMut(StageProgress),
    {
        progress(StageProgress {
            stage: PipelineStage::Loading,
            total: Source::ALL.len(),
            message: format!("Reading source files from {}", self.config.data_dir.display()),
        });

        let tables = SourceTables::load(&self.config)?;
        self.process_with_progress(&tables, progress)
    }

    /// Process tables that are already in memory
    pub fn process(&self, tables: &SourceTables) -> Result<PipelineOutput> {
        self.process_with_progress(tables, |_| {})
    }

    fn process_with_progress<F>(&self, tables: &SourceTables, mut progress: F) -> Result<PipelineOutput>
    where
        F: FnMut(StageProgress),
    {
        let config = &self.config;

        progress(StageProgress {
            stage: PipelineStage::BuildingLookup,
            total: tables.postal_geometries.len(),
            message: "Building postal-code geometry lookup".to_string(),
        });
        let lookup = timed(PipelineStage::BuildingLookup.as_str(), || {
            GeometryLookup::from_table(
                &tables.postal_geometries,
                &config.geometry.key_column,
                &config.geometry.geometry_column,
            )
        })?;

        progress(StageProgress {
            stage: PipelineStage::ChargingStations,
            total: tables.charging_stations.len(),
            message: format!("Cleaning charging stations for {}", config.charging.region),
        });
        let charging = timed(PipelineStage::ChargingStations.as_str(), || {
            preprocess_charging_stations(&tables.charging_stations, &lookup, config)
        })?;

        progress(StageProgress {
            stage: PipelineStage::Aggregating,
            total: charging.len(),
            message: "Counting stations per postal code".to_string(),
        });
        let counts = timed(PipelineStage::Aggregating.as_str(), || count_by_postal_code(&charging.rows));

        progress(StageProgress {
            stage: PipelineStage::Residents,
            total: tables.residents.len(),
            message: "Cleaning resident counts".to_string(),
        });
        let residents = timed(PipelineStage::Residents.as_str(), || {
            preprocess_residents(&tables.residents, &lookup, config)
        })?;

        tracing::info!(
            stations = charging.len(),
            postal_codes = counts.len(),
            resident_areas = residents.len(),
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            charging,
            counts,
            residents,
            district_rows: tables.district_geometries.len(),
            geometry_keys: lookup.len(),
            duplicate_geometry_keys: lookup.duplicate_keys(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "POLYGON ((13.3 52.5, 13.4 52.5, 13.4 52.6, 13.3 52.5))";

    fn tables() -> SourceTables {
        let geometries = RawTable::new(
            "geodata_berlin_plz.csv",
            vec!["PLZ".into(), "geometry".into()],
            ["10117", "10200"].iter().map(|c| vec![c.to_string(), SQUARE.to_string()]).collect(),
        );
        let charging = RawTable::new(
            "Ladesaeulenregister_SEP.csv",
            ["Postleitzahl", "Bundesland", "Breitengrad", "Längengrad", "Nennleistung Ladeeinrichtung [kW]"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![
                vec!["10200".into(), "Berlin".into(), "52,51".into(), "13,41".into(), "22".into()],
                vec!["10117".into(), "Berlin".into(), "52,52".into(), "13,39".into(), "11".into()],
                vec!["10200".into(), "Berlin".into(), "52,51".into(), "13,42".into(), "50".into()],
                vec!["14200".into(), "Berlin".into(), "52,4".into(), "13,2".into(), "22".into()],
            ],
        );
        let residents = RawTable::new(
            "plz_einwohner.csv",
            vec!["plz".into(), "einwohner".into(), "lat".into(), "lon".into()],
            vec![vec!["10117".into(), "12000".into(), "52.52".into(), "13.39".into()]],
        );
        SourceTables {
            postal_geometries: geometries,
            district_geometries: RawTable::new("geodata_berlin_dis.csv", vec![], vec![]),
            charging_stations: charging,
            residents,
        }
    }

    #[test]
    fn test_process_scenario() {
        let output = Pipeline::new(PipelineConfig::default()).process(&tables()).unwrap();

        let counts: Vec<(u32, usize)> = output.counts.iter().map(|c| (c.postal_code, c.count)).collect();
        assert_eq!(counts, vec![(10117, 1), (10200, 2)]);
        assert_eq!(output.charging.stats.filtered_out, 1);
        assert_eq!(output.residents.len(), 1);
        assert_eq!(output.geometry_keys, 2);
    }

    #[test]
    fn test_progress_reports_every_stage() {
        let mut stages = Vec::new();
        Pipeline::new(PipelineConfig::default())
            .process_with_progress(&tables(), |p| stages.push((p.stage, p.total)))
            .unwrap();
        assert_eq!(
            stages,
            vec![
                (PipelineStage::BuildingLookup, 2),
                (PipelineStage::ChargingStations, 4),
                (PipelineStage::Aggregating, 3),
                (PipelineStage::Residents, 1),
            ]
        );
    }

    #[test]
    fn test_missing_data_dir_is_file_access_error() {
        let config = PipelineConfig { data_dir: "/nonexistent/plzmap".into(), ..Default::default() };
        let err = Pipeline::new(config).run().unwrap_err();
        assert!(matches!(err, plzmap_core::error::PlzmapError::FileAccess { .. }));
    }
}
