//! plzmap Pipeline - Preprocessing, geo-join and aggregation
//!
//! Turns the raw source tables into the two map layers: residents per
//! postal code and charging stations per postal code.

pub mod aggregate;
pub mod charging;
mod clean;
pub mod export;
pub mod geojoin;
pub mod pipeline;
pub mod residents;

pub use aggregate::count_by_postal_code;
pub use charging::preprocess_charging_stations;
pub use export::{Layer, LayerExport, LayerFeature};
pub use geojoin::{geo_join, Joined};
pub use pipeline::{Pipeline, PipelineOutput, PipelineStage, SourceTables, StageProgress};
pub use residents::preprocess_residents;
