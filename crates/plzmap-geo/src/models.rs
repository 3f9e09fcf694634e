//! Conversions between canonical geometries and `geo` crate types.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::centroid::Centroid;
use geo::Geometry as GeoGeometry;

pub use plzmap_core::models::{Geometry, GeometryType};

fn line_string(coords: &[[f64; 2]]) -> geo::LineString {
    geo::LineString::new(coords.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect())
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            line_string(exterior),
            interiors.iter().map(|ring| line_string(ring)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

fn coords_of(ls: &geo::LineString) -> Vec<[f64; 2]> {
    ls.coords().map(|c| [c.x, c.y]).collect()
}

fn rings_of(p: &geo::Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(p.exterior()).chain(p.interiors()).map(coords_of).collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(line_string(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| line_string(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| polygon(p)).collect()),
        ),
    }
}

/// Convert a geo::Geometry to a canonical Geometry
///
/// A collection converts only when it holds exactly one member; anything
/// else has no canonical form and yields `None`.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Option<Geometry> {
    let converted = match geom {
        GeoGeometry::Point(p) => Geometry::Point { coordinates: [p.x(), p.y()] },
        GeoGeometry::Line(l) => Geometry::LineString {
            coordinates: vec![[l.start.x, l.start.y], [l.end.x, l.end.y]],
        },
        GeoGeometry::LineString(ls) => Geometry::LineString { coordinates: coords_of(ls) },
        GeoGeometry::Polygon(p) => Geometry::Polygon { coordinates: rings_of(p) },
        GeoGeometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect(),
        },
        GeoGeometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(coords_of).collect(),
        },
        GeoGeometry::MultiPolygon(mp) => Geometry::MultiPolygon {
            coordinates: mp.iter().map(rings_of).collect(),
        },
        GeoGeometry::GeometryCollection(gc) => {
            return match gc.0.as_slice() {
                [single] => from_geo_geometry(single),
                _ => None,
            };
        }
        GeoGeometry::Rect(r) => Geometry::Polygon { coordinates: rings_of(&r.to_polygon()) },
        GeoGeometry::Triangle(t) => Geometry::Polygon { coordinates: rings_of(&t.to_polygon()) },
    };
    Some(converted)
}

/// Extension trait for Geometry with geo-crate operations
pub trait GeometryExt {
    /// Convert to geo::Geometry
    fn to_geo(&self) -> GeoGeometry;

    /// Get the centroid as coordinates
    fn centroid_coords(&self) -> Option<[f64; 2]>;

    /// Bounding box as `[min_x, min_y, max_x, max_y]`
    fn bounds(&self) -> Option<[f64; 4]>;
}

impl GeometryExt for Geometry {
    fn to_geo(&self) -> GeoGeometry {
        to_geo_geometry(self)
    }

    fn centroid_coords(&self) -> Option<[f64; 2]> {
        self.to_geo().centroid().map(|p| [p.x(), p.y()])
    }

    fn bounds(&self) -> Option<[f64; 4]> {
        self.to_geo()
            .bounding_rect()
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
    }
}

/// Union of bounding boxes
pub fn merge_bounds(a: Option<[f64; 4]>, b: Option<[f64; 4]>) -> Option<[f64; 4]> {
    match (a, b) {
        (Some(a), Some(b)) => {
            Some([a[0].min(b[0]), a[1].min(b[1]), a[2].max(b[2]), a[3].max(b[3])])
        }
        (a, None) => a,
        (None, b) => b,
    }
}
