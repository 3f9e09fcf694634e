//! Postal code to WKT geometry lookup

use std::collections::HashMap;

use crate::error::Result;
use crate::parse::{parse_postal_code, CellRef};
use crate::table::RawTable;

/// Geometry strings keyed by postal code
///
/// Keys should be unique. A repeated key keeps every geometry and the
/// geo-join then emits one row per geometry.
#[derive(Debug, Clone, Default)]
pub struct GeometryLookup {
    entries: HashMap<u32, Vec<String>>,
    duplicate_keys: usize,
}

impl GeometryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup from a geometry table
    ///
    /// Rows with an empty key, a numeric key that cannot be a postal code, or
    /// an empty geometry cell are skipped as null.
    pub fn from_table(table: &RawTable, key_column: &str, geometry_column: &str) -> Result<Self> {
        let key_idx = table.column_index(key_column)?;
        let geometry_idx = table.column_index(geometry_column)?;

        let mut lookup = Self::new();
        for (row_idx, row) in table.rows().iter().enumerate() {
            let cell = CellRef { dataset: table.name(), row: row_idx + 1, column: key_column };
            let Some(code) = parse_postal_code(&row[key_idx], cell)? else {
                continue;
            };
            let wkt = row[geometry_idx].trim();
            if wkt.is_empty() {
                continue;
            }
            lookup.insert(code, wkt);
        }

        if lookup.duplicate_keys > 0 {
            tracing::warn!(
                table = table.name(),
                duplicates = lookup.duplicate_keys,
                "Geometry table has repeated postal codes; joins will yield one row per geometry"
            );
        }

        Ok(lookup)
    }

    pub fn insert(&mut self, postal_code: u32, wkt: impl Into<String>) {
        let geometries = self.entries.entry(postal_code).or_default();
        if !geometries.is_empty() {
            self.duplicate_keys += 1;
        }
        geometries.push(wkt.into());
    }

    /// All geometries for a postal code, empty if unmatched
    pub fn get(&self, postal_code: u32) -> &[String] {
        self.entries.get(&postal_code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct postal codes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }
}
