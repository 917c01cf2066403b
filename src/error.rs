//! All error types for the pocodec crate.
//!
//! These are returned from all fallible operations (reading, writing, source
//! table loading, translation batching). Malformed PO lines are never an error:
//! the parser skips them.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate key '{key}' at row {row} (already seen at row {first_row})")]
    DuplicateKey {
        key: String,
        row: usize,
        first_row: usize,
    },

    #[error("source table must have a header and at least one data row")]
    EmptySourceTable,

    #[error("translation response size mismatch: got {got}, want {expected}")]
    BatchSizeMismatch { got: usize, expected: usize },

    #[error("invalid batch size: {0}")]
    InvalidBatchSize(usize),

    #[error("unsupported language for {provider}: {language}")]
    UnsupportedLanguage { provider: String, language: String },

    #[error("translation error: {message}")]
    Translation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("file {} already exists, overwrite not allowed", .0.display())]
    FileExists(PathBuf),
}

impl Error {
    /// Creates a new translation error with optional source error
    pub fn translation_error(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Error::Translation {
            message: message.into(),
            source,
        }
    }

    pub fn unsupported_language(provider: impl Into<String>, language: impl Into<String>) -> Self {
        Error::UnsupportedLanguage {
            provider: provider.into(),
            language: language.into(),
        }
    }
}
