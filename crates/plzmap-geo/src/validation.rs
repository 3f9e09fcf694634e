use crate::models::Geometry;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// Fold a nested result in, prefixing its locations
    fn absorb(&mut self, prefix: &str, nested: ValidationResult) {
        for error in nested.errors {
            self.add_error(format!("{}.{}", prefix, error.location), error.reason);
        }
    }

    fn absorb_flat(&mut self, nested: ValidationResult) {
        for error in nested.errors {
            self.add_error(error.location, error.reason);
        }
    }

    /// First error as a one-line message
    pub fn summary(&self) -> Option<String> {
        self.errors.first().map(|e| format!("{}: {}", e.location, e.reason))
    }
}

/// Validate a canonical geometry
///
/// Checks that every coordinate is finite, line strings have at least two
/// positions, and polygon rings are closed with at least four positions.
pub fn validate_geometry(geometry: &Geometry) -> ValidationResult {
    match geometry {
        Geometry::Point { coordinates } => validate_positions("Point", std::slice::from_ref(coordinates)),
        Geometry::LineString { coordinates } => validate_linestring("LineString", coordinates),
        Geometry::Polygon { coordinates } => validate_polygon("Polygon", coordinates),
        Geometry::MultiPoint { coordinates } => {
            let mut result = non_empty("MultiPoint", coordinates.len());
            result.absorb_flat(validate_positions("MultiPoint", coordinates));
            result
        }
        Geometry::MultiLineString { coordinates } => {
            let mut result = non_empty("MultiLineString", coordinates.len());
            for (i, line) in coordinates.iter().enumerate() {
                result.absorb(&format!("MultiLineString[{}]", i), validate_linestring("LineString", line));
            }
            result
        }
        Geometry::MultiPolygon { coordinates } => {
            let mut result = non_empty("MultiPolygon", coordinates.len());
            for (i, polygon) in coordinates.iter().enumerate() {
                result.absorb(&format!("MultiPolygon[{}]", i), validate_polygon("Polygon", polygon));
            }
            result
        }
    }
}

/// Empty multi-geometries (`POINT EMPTY` reads as one) carry no location
fn non_empty(kind: &str, members: usize) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if members == 0 {
        result.add_error(kind.to_string(), format!("{} is empty", kind));
    }
    result
}

fn validate_positions(location: &str, positions: &[[f64; 2]]) -> ValidationResult {
    let mut result = ValidationResult::valid();
    for (i, c) in positions.iter().enumerate() {
        if !c[0].is_finite() || !c[1].is_finite() {
            result.add_error(format!("{}[{}]", location, i), "Coordinates must be finite".to_string());
        }
    }
    result
}

fn validate_linestring(location: &str, coords: &[[f64; 2]]) -> ValidationResult {
    if coords.len() < 2 {
        let mut result = ValidationResult::valid();
        result.add_error(
            location.to_string(),
            format!("LineString must have at least 2 points, found {}", coords.len()),
        );
        return result;
    }
    validate_positions(location, coords)
}

fn validate_polygon(location: &str, rings: &[Vec<[f64; 2]>]) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if rings.is_empty() {
        result.add_error(location.to_string(), "Polygon has no exterior ring".to_string());
        return result;
    }

    for (i, ring) in rings.iter().enumerate() {
        let ring_location = if i == 0 {
            format!("{} exterior", location)
        } else {
            format!("{} interior[{}]", location, i - 1)
        };

        if ring.len() < 4 {
            result.add_error(
                ring_location.clone(),
                format!("Ring must have at least 4 points, found {}", ring.len()),
            );
        }

        if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
            if first != last {
                result.add_error(
                    ring_location.clone(),
                    "Ring must be closed (first point == last point)".to_string(),
                );
            }
        }

        for error in validate_positions(&ring_location, ring).errors {
            result.add_error(error.location, error.reason);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_polygon() {
        let geom = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]);
        assert!(validate_geometry(&geom).is_valid);
    }

    #[test]
    fn test_open_ring_is_invalid() {
        let geom = Geometry::polygon(vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]]);
        let result = validate_geometry(&geom);
        assert!(!result.is_valid);
        assert!(result.summary().unwrap().contains("closed"));
    }

    #[test]
    fn test_empty_polygon_is_invalid() {
        let geom = Geometry::polygon(vec![vec![]]);
        assert!(!validate_geometry(&geom).is_valid);
    }

    #[test]
    fn test_empty_multi_geometries_are_invalid() {
        for geom in [
            Geometry::MultiPoint { coordinates: vec![] },
            Geometry::MultiLineString { coordinates: vec![] },
            Geometry::MultiPolygon { coordinates: vec![] },
        ] {
            let result = validate_geometry(&geom);
            assert!(!result.is_valid);
            assert!(result.summary().unwrap().ends_with("is empty"));
        }
    }

    #[test]
    fn test_non_finite_point() {
        assert!(!validate_geometry(&Geometry::point(f64::NAN, 52.5)).is_valid);
        assert!(validate_geometry(&Geometry::point(13.4, 52.5)).is_valid);
    }

    #[test]
    fn test_multipolygon_member_location() {
        let geom = Geometry::MultiPolygon {
            coordinates: vec![
                vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                vec![vec![[0.0, 0.0], [1.0, 0.0]]],
            ],
        };
        let result = validate_geometry(&geom);
        assert!(!result.is_valid);
        assert!(result.errors[0].location.starts_with("MultiPolygon[1]"));
    }
}
