//! plzmap Geo - WKT parsing, geometry validation and geo-crate operations
//!
//! This crate turns the WKT cells of the geometry tables into canonical
//! [`Geometry`](plzmap_core::models::Geometry) values and provides the
//! spatial helpers used by the layer export.

pub mod models;
pub mod validation;
pub mod parse;

pub use models::GeometryExt;
pub use parse::{parse_wkt, WktError};
