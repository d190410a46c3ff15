//! Error types for the formgrid library.

use std::io;
use thiserror::Error;

/// Result type alias for formgrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during form extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document markup could not be parsed. Fatal to the affected
    /// document only; batch processing skips it and continues.
    #[error("malformed document {source_id}: {reason}")]
    MalformedDocument {
        /// Stable identifier of the source document
        source_id: String,
        /// What could not be parsed
        reason: String,
    },

    /// Error reading a zip container (docx or bundle).
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error writing CSV output.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing or deserializing JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid extraction configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The input set contained no documents at all.
    #[error("no documents found in {0}")]
    NoDocuments(String),

    /// Error during rendering (CSV, JSON).
    #[error("rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Build a malformed-document error for a source id.
    pub fn malformed(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }
}
