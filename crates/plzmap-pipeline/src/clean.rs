//! Row-by-row cleaning under the validity policy

use plzmap_core::error::{PlzmapError, Result};
use plzmap_core::models::{RowOutcome, RowStats, ValidityMode};
use plzmap_core::parse::{parse_postal_code, parse_whole_number, CellRef, DecimalFormat};
use plzmap_core::table::RawTable;

/// Result of cleaning one raw row
pub(crate) enum Cleaned<T> {
    Keep(T),
    Filtered,
    Malformed(PlzmapError),
}

impl<T> Cleaned<T> {
    /// Keep a parsed record, or mark the row malformed
    pub fn from_parsed(parsed: Result<T>) -> Self {
        match parsed {
            Ok(record) => Cleaned::Keep(record),
            Err(err) => Cleaned::Malformed(err),
        }
    }
}

/// Clean every row of a projected table
///
/// Errors returned by `clean` abort in both modes; `Malformed` rows abort
/// only in strict mode.
pub(crate) fn clean_rows<T, F>(table: &RawTable, mode: ValidityMode, mut clean: F) -> Result<(Vec<T>, RowStats)>
where
    F: FnMut(Row<'_>) -> Result<Cleaned<T>>,
{
    let mut stats = RowStats::with_input(table.len());
    let mut records = Vec::new();

    for (idx, cells) in table.rows().iter().enumerate() {
        let row = Row { dataset: table.name(), number: idx + 1, columns: table.columns(), cells };
        match clean(row)? {
            Cleaned::Keep(record) => records.push(record),
            Cleaned::Filtered => stats.record(RowOutcome::FilteredOut),
            Cleaned::Malformed(err) if mode.is_strict() => return Err(err),
            Cleaned::Malformed(err) => {
                tracing::warn!(dataset = table.name(), row = idx + 1, error = %err, "Dropping malformed row");
                stats.record(RowOutcome::Malformed);
            }
        }
    }

    Ok((records, stats))
}

/// One row of a projected table, addressed by position
#[derive(Clone, Copy)]
pub(crate) struct Row<'a> {
    dataset: &'a str,
    number: usize,
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    pub fn cell(&self, idx: usize) -> CellRef<'a> {
        CellRef { dataset: self.dataset, row: self.number, column: &self.columns[idx] }
    }

    pub fn text(&self, idx: usize) -> &'a str {
        self.cells[idx].trim()
    }

    pub fn postal_code(&self, idx: usize) -> Result<Option<u32>> {
        parse_postal_code(&self.cells[idx], self.cell(idx))
    }

    pub fn decimal(&self, idx: usize, format: &DecimalFormat) -> Result<f64> {
        let value = &self.cells[idx];
        format.parse(value).ok_or_else(|| {
            self.cell(idx).error(&format.normalize(value), "expected a decimal number")
        })
    }

    pub fn count(&self, idx: usize) -> Result<u64> {
        let value = &self.cells[idx];
        parse_whole_number(value).ok_or_else(|| self.cell(idx).error(value, "expected a whole number"))
    }
}
