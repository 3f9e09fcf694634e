//! Cell-level parsing: postal codes, locale decimals and counts

use serde::{Deserialize, Serialize};

use crate::error::{PlzmapError, Result};

/// Decimal mark used by a source locale and the one the parser expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalFormat {
    pub source_separator: char,
    pub target_separator: char,
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self { source_separator: ',', target_separator: '.' }
    }
}

impl DecimalFormat {
    /// Replace every source separator with the target separator
    pub fn normalize(&self, value: &str) -> String {
        value.trim().replace(self.source_separator, &self.target_separator.to_string())
    }

    /// Normalize, then parse as `f64`
    pub fn parse(&self, value: &str) -> Option<f64> {
        let normalized = self.normalize(value);
        let normalized = if self.target_separator == '.' {
            normalized
        } else {
            normalized.replace(self.target_separator, ".")
        };
        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Location of a cell, for error messages
#[derive(Debug, Clone, Copy)]
pub struct CellRef<'a> {
    pub dataset: &'a str,
    pub row: usize,
    pub column: &'a str,
}

impl CellRef<'_> {
    pub fn error(&self, value: &str, reason: impl Into<String>) -> PlzmapError {
        PlzmapError::Parse {
            dataset: self.dataset.to_string(),
            row: self.row,
            column: self.column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parse a whole number, accepting a zero fractional part ("10115.0")
pub fn parse_whole_number(value: &str) -> Option<u64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
        Some(float as u64)
    } else {
        None
    }
}

/// Parse a postal code cell
///
/// An empty cell yields `Ok(None)` (treated as null), as does a number that
/// cannot be a postal code (negative, fractional or beyond `u32`); such
/// rows fall outside every postal range. Text that is not a number fails.
pub fn parse_postal_code(value: &str, cell: CellRef<'_>) -> Result<Option<u32>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Some(code) = parse_whole_number(trimmed).and_then(|n| u32::try_from(n).ok()) {
        return Ok(Some(code));
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(None),
        _ => Err(cell.error(value, "expected a numeric postal code")),
    }
}
