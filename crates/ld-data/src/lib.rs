//! Ingestion of uploaded response files
//!
//! Reading, parsing and validating JSON into [`ld_core::ResponseRecord`]s,
//! plus a generator for sample datasets.

pub mod ingest;
pub mod sample;
pub mod validate;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use ingest::{ingest_bytes, ingest_file, is_supported_file, read_records, records_from_bytes};
pub use sample::{sample_document, SampleGenerator};
pub use validate::{parse_records, validate, ValidationError};

/// Errors that can occur while ingesting a file
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Invalid JSON format: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Please upload a JSON file ({0})")]
    UnsupportedFileType(String),

    #[error("Failed to process file: {0}")]
    Processing(String),
}

impl From<std::io::Error> for DataError {
    fn from(error: std::io::Error) -> Self {
        DataError::Processing(error.to_string())
    }
}

impl From<JoinError> for DataError {
    fn from(error: JoinError) -> Self {
        DataError::Processing(error.to_string())
    }
}
