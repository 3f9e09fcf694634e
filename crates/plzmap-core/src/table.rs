//! Delimited-text loading into untyped tables
//!
//! Source files are read once into a [`RawTable`]: a header row plus text
//! cells. Typed records are built from it by the preprocessors.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlzmapError, Result};

/// How a delimited source file is laid out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFormat {
    /// Field delimiter, a single ASCII character
    pub delimiter: char,
    /// Lines skipped before the header row
    #[serde(default)]
    pub skip_lines: usize,
    /// Trim whitespace around header names
    #[serde(default)]
    pub trim_headers: bool,
}

impl TableFormat {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter, skip_lines: 0, trim_headers: false }
    }

    pub fn skip_lines(mut self, lines: usize) -> Self {
        self.skip_lines = lines;
        self
    }

    pub fn trim_headers(mut self, trim: bool) -> Self {
        self.trim_headers = trim;
        self
    }

    fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PlzmapError::ConfigInvalid {
                key: "delimiter".to_string(),
                reason: format!("'{}' is not an ASCII character", self.delimiter),
            })
        }
    }
}

/// Header plus rows of text cells
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table in memory; short rows are padded with empty cells
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self { name: name.into(), columns, rows }
    }

    /// Read a delimited file from disk
    pub fn read(path: &Path, format: &TableFormat) -> Result<Self> {
        let file = File::open(path).map_err(|source| PlzmapError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();

        Self::from_reader(name, file, format).map_err(|e| match e {
            PlzmapError::Csv { reason, .. } => PlzmapError::Csv { path: path.to_path_buf(), reason },
            other => other,
        })
    }

    /// Read delimited text from any reader
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R, format: &TableFormat) -> Result<Self> {
        let name = name.into();
        let delimiter = format.delimiter_byte()?;

        let mut reader = BufReader::new(reader);
        let mut skipped = Vec::new();
        for _ in 0..format.skip_lines {
            skipped.clear();
            if reader.read_until(b'\n', &mut skipped)? == 0 {
                break;
            }
        }

        let csv_error = |e: csv::Error| PlzmapError::Csv {
            path: name.clone().into(),
            reason: e.to_string(),
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let header = if idx == 0 { header.trim_start_matches('\u{feff}') } else { header };
                if format.trim_headers {
                    header.trim().to_string()
                } else {
                    header.to_string()
                }
            })
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(csv_error)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!(table = %name, columns = columns.len(), rows = rows.len(), "Loaded table");

        Ok(Self::new(name, columns, rows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column; a missing column is a schema mismatch
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns.iter().position(|c| c == column).ok_or_else(|| {
            PlzmapError::MissingColumn { dataset: self.name.clone(), column: column.to_string() }
        })
    }

    /// Project onto the given columns, in the given order
    pub fn select(&self, columns: &[&str]) -> Result<RawTable> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(RawTable {
            name: self.name.clone(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}
