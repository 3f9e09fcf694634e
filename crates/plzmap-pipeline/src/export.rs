//! Map layers as GeoJSON feature collections
//!
//! A layer is one feature per postal-code row, carrying the postal code,
//! the layer value and the centroid of the geometry. The collection also
//! carries the value range a renderer needs for colour scaling.

use std::fmt;
use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, JsonObject};
use plzmap_core::error::{PlzmapError, Result};
use plzmap_core::models::{GeoRecord, Geometry, PostalCodeCount, ResidentArea};
use plzmap_geo::models::merge_bounds;
use plzmap_geo::GeometryExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::pipeline::PipelineOutput;

/// Which result table becomes the map layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layer {
    Residents,
    ChargingStations,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Residents => "residents",
            Layer::ChargingStations => "charging-stations",
        }
    }

    /// Feature property holding the layer value
    pub fn value_property(&self) -> &'static str {
        match self {
            Layer::Residents => "Einwohner",
            Layer::ChargingStations => "Number",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One postal-code area of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFeature {
    pub postal_code: u32,
    pub value: u64,
    pub geometry: Geometry,
    pub centroid: Option<[f64; 2]>,
}

impl LayerFeature {
    fn new(postal_code: u32, value: u64, geometry: &Geometry) -> Self {
        Self { postal_code, value, centroid: geometry.centroid_coords(), geometry: geometry.clone() }
    }
}

/// A layer ready to be written as GeoJSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerExport {
    pub layer: Layer,
    pub features: Vec<LayerFeature>,
}

impl LayerExport {
    /// Resident counts, one feature per geo-joined resident row
    pub fn residents(rows: &[GeoRecord<ResidentArea>]) -> Self {
        let features = rows
            .iter()
            .map(|row| LayerFeature::new(row.record.postal_code, row.record.residents, &row.geometry))
            .collect();
        Self { layer: Layer::Residents, features }
    }

    /// Station counts, one feature per postal code
    pub fn charging_stations(counts: &[PostalCodeCount]) -> Self {
        let features = counts
            .iter()
            .map(|c| LayerFeature::new(c.postal_code, c.count as u64, &c.geometry))
            .collect();
        Self { layer: Layer::ChargingStations, features }
    }

    pub fn from_output(output: &PipelineOutput, layer: Layer) -> Self {
        match layer {
            Layer::Residents => Self::residents(&output.residents.rows),
            Layer::ChargingStations => Self::charging_stations(&output.counts),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Smallest and largest layer value, `None` for an empty layer
    pub fn value_range(&self) -> Option<(u64, u64)> {
        let min = self.features.iter().map(|f| f.value).min()?;
        let max = self.features.iter().map(|f| f.value).max()?;
        Some((min, max))
    }

    /// Bounding box over every feature geometry
    pub fn bounds(&self) -> Option<[f64; 4]> {
        self.features
            .iter()
            .fold(None, |acc, f| merge_bounds(acc, f.geometry.bounds()))
    }

    pub fn to_feature_collection(&self) -> Result<FeatureCollection> {
        let value_property = self.layer.value_property();

        let features = self
            .features
            .iter()
            .map(|f| {
                let geometry = geojson::Geometry::from_json_value(f.geometry.to_geojson())
                    .map_err(|e| PlzmapError::Serialization(e.to_string()))?;

                let mut properties = JsonObject::new();
                properties.insert("PLZ".to_string(), json!(f.postal_code));
                properties.insert(value_property.to_string(), json!(f.value));
                properties.insert("centroid".to_string(), json!(f.centroid));

                Ok(Feature {
                    bbox: f.geometry.bounds().map(|b| b.to_vec()),
                    geometry: Some(geometry),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut members = JsonObject::new();
        members.insert("layer".to_string(), json!(self.layer.as_str()));
        members.insert("value_property".to_string(), json!(value_property));
        members.insert(
            "value_range".to_string(),
            self.value_range().map_or(Value::Null, |(min, max)| json!([min, max])),
        );

        Ok(FeatureCollection {
            bbox: self.bounds().map(|b| b.to_vec()),
            features,
            foreign_members: Some(members),
        })
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_feature_collection()?)?)
    }

    /// Write the layer as a GeoJSON file
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = self.to_geojson_string()?;
        fs::write(path, content).map_err(|source| PlzmapError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(layer = %self.layer, features = self.len(), path = %path.display(), "Layer written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64) -> Geometry {
        Geometry::polygon(vec![vec![
            [offset, 0.0],
            [offset + 2.0, 0.0],
            [offset + 2.0, 2.0],
            [offset, 2.0],
            [offset, 0.0],
        ]])
    }

    fn counts() -> Vec<PostalCodeCount> {
        vec![
            PostalCodeCount { postal_code: 10117, count: 1, geometry: square(0.0) },
            PostalCodeCount { postal_code: 10200, count: 2, geometry: square(4.0) },
        ]
    }

    #[test]
    fn test_charging_layer_features() {
        let export = LayerExport::charging_stations(&counts());

        assert_eq!(export.len(), 2);
        assert_eq!(export.value_range(), Some((1, 2)));
        let [x, y] = export.features[1].centroid.unwrap();
        assert!((x - 5.0).abs() < 1e-9 && (y - 1.0).abs() < 1e-9);
        assert_eq!(export.bounds(), Some([0.0, 0.0, 6.0, 2.0]));
    }

    #[test]
    fn test_feature_collection_properties() {
        let collection = LayerExport::charging_stations(&counts()).to_feature_collection().unwrap();

        let properties = collection.features[1].properties.as_ref().unwrap();
        assert_eq!(properties["PLZ"], json!(10200));
        assert_eq!(properties["Number"], json!(2));
        assert_eq!(properties["centroid"].as_array().map(Vec::len), Some(2));

        let members = collection.foreign_members.as_ref().unwrap();
        assert_eq!(members["layer"], json!("charging-stations"));
        assert_eq!(members["value_range"], json!([1, 2]));
    }

    #[test]
    fn test_residents_layer_uses_einwohner() {
        let rows = vec![GeoRecord {
            record: ResidentArea { postal_code: 10115, residents: 20000, latitude: 52.5, longitude: 13.4 },
            geometry: square(0.0),
        }];
        let text = LayerExport::residents(&rows).to_geojson_string().unwrap();

        let parsed: geojson::GeoJson = text.parse().unwrap();
        let geojson::GeoJson::FeatureCollection(collection) = parsed else {
            panic!("expected a feature collection");
        };
        let properties = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["Einwohner"], json!(20000));
    }

    #[test]
    fn test_empty_layer() {
        let export = LayerExport::charging_stations(&[]);
        assert!(export.value_range().is_none());

        let collection = export.to_feature_collection().unwrap();
        assert!(collection.features.is_empty());
        assert!(collection.bbox.is_none());
    }

    #[test]
    fn test_layer_names_match_serde() {
        for layer in [Layer::Residents, Layer::ChargingStations] {
            assert_eq!(serde_json::to_value(layer).unwrap(), json!(layer.to_string()));
        }
        assert_eq!(Layer::ChargingStations.value_property(), "Number");
    }
}
