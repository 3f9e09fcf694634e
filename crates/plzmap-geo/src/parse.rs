//! WKT text to canonical geometry

use std::str::FromStr;

use thiserror::Error;

use crate::models::{from_geo_geometry, Geometry};
use crate::validation::validate_geometry;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WktError {
    #[error("empty geometry text")]
    Empty,

    #[error("not valid WKT: {0}")]
    Syntax(String),

    #[error("cannot convert WKT geometry: {0}")]
    Conversion(String),

    #[error("invalid geometry: {0}")]
    Invalid(String),
}

/// Parse a WKT string into a validated canonical geometry
pub fn parse_wkt(text: &str) -> Result<Geometry, WktError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WktError::Empty);
    }

    let parsed = ::wkt::Wkt::<f64>::from_str(text).map_err(|e| WktError::Syntax(e.to_string()))?;
    let geo_geom = geo::Geometry::<f64>::try_from(parsed)
        .map_err(|e| WktError::Conversion(e.to_string()))?;

    let geometry = from_geo_geometry(&geo_geom)
        .ok_or_else(|| WktError::Conversion("geometry collection without exactly one member".to_string()))?;

    let validation = validate_geometry(&geometry);
    if !validation.is_valid {
        return Err(WktError::Invalid(validation.summary().unwrap_or_default()));
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeometryType;
    use proptest::prelude::*;

    #[test]
    fn test_parse_polygon() {
        let geom = parse_wkt("POLYGON ((13.37 52.51, 13.40 52.51, 13.40 52.53, 13.37 52.51))").unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::Polygon);
        if let Geometry::Polygon { coordinates } = geom {
            assert_eq!(coordinates[0].len(), 4);
            assert_eq!(coordinates[0][1], [13.40, 52.51]);
        }
    }

    #[test]
    fn test_parse_multipolygon() {
        let geom = parse_wkt(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
        )
        .unwrap();
        assert_eq!(geom.geometry_type(), GeometryType::MultiPolygon);
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_wkt("POINT (13.4 52.52)").unwrap(), Geometry::point(13.4, 52.52));
    }

    #[test]
    fn test_garbage_is_syntax_error() {
        assert!(matches!(parse_wkt("POLYGON ((13.37 52.51"), Err(WktError::Syntax(_))));
        assert!(matches!(parse_wkt("not a geometry"), Err(WktError::Syntax(_))));
    }

    #[test]
    fn test_blank_is_empty() {
        assert_eq!(parse_wkt("   "), Err(WktError::Empty));
    }

    #[test]
    fn test_empty_geometries_are_rejected() {
        for text in ["POINT EMPTY", "MULTIPOINT EMPTY", "POLYGON EMPTY", "MULTIPOLYGON EMPTY"] {
            assert!(matches!(parse_wkt(text), Err(WktError::Invalid(_))), "{} should be invalid", text);
        }
        assert!(parse_wkt("LINESTRING EMPTY").is_err());
        assert!(parse_wkt("GEOMETRYCOLLECTION EMPTY").is_err());
    }

    proptest! {
        #[test]
        fn point_text_parses_to_same_coordinates(x in -180.0f64..180.0, y in -90.0f64..90.0) {
            prop_assert_eq!(parse_wkt(&format!("POINT ({} {})", x, y)), Ok(Geometry::point(x, y)));
        }
    }

    #[test]
    fn test_degenerate_polygon_is_invalid() {
        assert!(matches!(parse_wkt("POLYGON ((0 0, 1 1, 0 0))"), Err(WktError::Invalid(_))));
    }
}
