pub mod geometry;
pub mod lookup;
pub mod records;

pub use geometry::{Geometry, GeometryType, ValidityMode};
pub use lookup::GeometryLookup;
pub use records::{
    ChargingStation, GeoRecord, PostalCodeCount, PostalCoded, PostalRange, ResidentArea,
    RowOutcome, RowStats,
};
