//! Per-postal-code counting of geo-joined rows

use std::collections::HashMap;

use plzmap_core::models::{GeoRecord, PostalCodeCount, PostalCoded};

/// Count rows per postal code
///
/// Groups appear in order of first appearance and keep the geometry of
/// their first row.
pub fn count_by_postal_code<T: PostalCoded>(rows: &[GeoRecord<T>]) -> Vec<PostalCodeCount> {
    let mut positions: HashMap<u32, usize> = HashMap::new();
    let mut counts: Vec<PostalCodeCount> = Vec::new();

    for row in rows {
        let code = row.postal_code();
        match positions.get(&code) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                positions.insert(code, counts.len());
                counts.push(PostalCodeCount { postal_code: code, count: 1, geometry: row.geometry.clone() });
            }
        }
    }

    counts
}
