//! plzmap Core - Domain models, tabular input, and configuration
//!
//! This crate contains the data model, error types and typed configuration
//! shared by the pipeline and the CLI, plus the CSV table loader and
//! small helper utilities.

pub mod config;
pub mod error;
pub mod helpers;
pub mod models;
pub mod parse;
pub mod table;

pub use error::{PlzmapError, Result};
