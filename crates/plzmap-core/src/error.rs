//! Error types for plzmap

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlzmapError {
    // Input errors
    #[error("Cannot read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed delimited text in {path}: {reason}")]
    Csv { path: PathBuf, reason: String },

    // Schema errors
    #[error("Column '{column}' not found in {dataset}")]
    MissingColumn { dataset: String, column: String },

    // Data errors
    #[error("Cannot parse {column} = '{value}' in {dataset} row {row}: {reason}")]
    Parse {
        dataset: String,
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Invalid geometry for postal code {postal_code}: {reason}")]
    InvalidGeometry { postal_code: u32, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PlzmapError {
    fn from(err: serde_json::Error) -> Self {
        PlzmapError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlzmapError>;
