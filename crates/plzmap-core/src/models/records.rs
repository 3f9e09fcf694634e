//! Cleaned, geo-joined and aggregated records.

use serde::{Deserialize, Serialize};

use super::geometry::Geometry;

/// Records that carry a postal code (the join key)
pub trait PostalCoded {
    fn postal_code(&self) -> u32;
}

/// Open postal-code interval; both bounds are excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalRange {
    pub lower: u32,
    pub upper: u32,
}

impl PostalRange {
    pub fn new(lower: u32, upper: u32) -> Self {
        Self { lower, upper }
    }

    /// `lower < code < upper`
    pub fn contains(&self, code: u32) -> bool {
        code > self.lower && code < self.upper
    }
}

/// Charging station after column selection, renaming and decimal cleanup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub postal_code: u32,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
    pub power_kw: f64,
}

impl PostalCoded for ChargingStation {
    fn postal_code(&self) -> u32 {
        self.postal_code
    }
}

/// Resident count for one postal-code area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentArea {
    pub postal_code: u32,
    pub residents: u64,
    pub latitude: f64,
    pub longitude: f64,
}

impl PostalCoded for ResidentArea {
    fn postal_code(&self) -> u32 {
        self.postal_code
    }
}

/// A cleaned record enriched with the geometry of its postal code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord<T> {
    #[serde(flatten)]
    pub record: T,
    pub geometry: Geometry,
}

impl<T: PostalCoded> PostalCoded for GeoRecord<T> {
    fn postal_code(&self) -> u32 {
        self.record.postal_code()
    }
}

/// Number of rows sharing one postal code, with a representative geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostalCodeCount {
    pub postal_code: u32,
    pub count: usize,
    pub geometry: Geometry,
}

impl PostalCoded for PostalCodeCount {
    fn postal_code(&self) -> u32 {
        self.postal_code
    }
}

/// What happened to a row on its way through a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Kept, with a parsed geometry
    Matched,
    /// Outside the configured region or postal range
    FilteredOut,
    /// No geometry for its postal code
    Unmatched,
    /// Bad value or bad WKT, dropped in lenient mode
    Malformed,
}

/// Per-stage row accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowStats {
    pub input: usize,
    pub filtered_out: usize,
    pub malformed: usize,
    pub unmatched: usize,
    pub output: usize,
}

impl RowStats {
    pub fn with_input(input: usize) -> Self {
        Self { input, ..Default::default() }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Matched => self.output += 1,
            RowOutcome::FilteredOut => self.filtered_out += 1,
            RowOutcome::Unmatched => self.unmatched += 1,
            RowOutcome::Malformed => self.malformed += 1,
        }
    }

    /// Fold the stats of a later stage into this one
    pub fn merge(&mut self, later: RowStats) {
        self.filtered_out += later.filtered_out;
        self.malformed += later.malformed;
        self.unmatched += later.unmatched;
        self.output = later.output;
    }

    /// Rows removed for any reason
    pub fn dropped(&self) -> usize {
        self.filtered_out + self.malformed + self.unmatched
    }
}
