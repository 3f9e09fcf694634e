//! Left join of cleaned records with the postal-code geometry lookup

use std::collections::HashMap;

use plzmap_core::error::{PlzmapError, Result};
use plzmap_core::helpers::sort_by_key_stable;
use plzmap_core::models::{
    Geometry, GeoRecord, GeometryLookup, PostalCoded, RowOutcome, RowStats, ValidityMode,
};
use plzmap_geo::{parse_wkt, WktError};
use serde::{Deserialize, Serialize};

/// Rows that survived a stage, plus what happened to the others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joined<T> {
    pub rows: Vec<GeoRecord<T>>,
    pub stats: RowStats,
}

impl<T> Joined<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sort by postal code, attach geometries, drop rows without one
///
/// Records keep their relative order within a postal code. A postal code
/// with several geometries in the lookup yields one output row per
/// geometry. WKT text is parsed once per postal code; a malformed entry
/// aborts in [`ValidityMode::Strict`] and is dropped in
/// [`ValidityMode::Lenient`].
pub fn geo_join<T>(mut records: Vec<T>, lookup: &GeometryLookup, mode: ValidityMode) -> Result<Joined<T>>
where
    T: PostalCoded + Clone,
{
    let mut stats = RowStats::with_input(records.len());
    sort_by_key_stable(&mut records, true, |r| r.postal_code());

    let mut parsed: HashMap<u32, Vec<std::result::Result<Geometry, WktError>>> = HashMap::new();
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let code = record.postal_code();
        let candidates = lookup.get(code);
        if candidates.is_empty() {
            stats.record(RowOutcome::Unmatched);
            continue;
        }

        let geometries = parsed.entry(code).or_insert_with(|| {
            candidates.iter().map(|wkt| parse_wkt(wkt)).collect::<Vec<_>>()
        });

        for geometry in geometries.iter() {
            match geometry {
                Ok(geometry) => {
                    rows.push(GeoRecord { record: record.clone(), geometry: geometry.clone() });
                    stats.record(RowOutcome::Matched);
                }
                Err(e) if mode.is_strict() => {
                    return Err(PlzmapError::InvalidGeometry { postal_code: code, reason: e.to_string() });
                }
                Err(e) => {
                    tracing::warn!(postal_code = code, error = %e, "Dropping row with malformed geometry");
                    stats.record(RowOutcome::Malformed);
                }
            }
        }
    }

    tracing::debug!(
        input = stats.input,
        output = stats.output,
        unmatched = stats.unmatched,
        malformed = stats.malformed,
        "Geo-join finished"
    );

    Ok(Joined { rows, stats })
}
