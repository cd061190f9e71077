use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Failure while turning a data file into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The data file does not exist.
    #[error("data file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the header / schema.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A Parquet column has an Arrow type the loader cannot interpret.
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType {
        column: &'static str,
        data_type: String,
    },

    /// A row could not be parsed and the row policy is `abort`.
    #[error("row {row}: {source}")]
    Parse {
        row: usize,
        #[source]
        source: ParseError,
    },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected JSON layout: {0}")]
    JsonLayout(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

// ---------------------------------------------------------------------------
// Field-level parse errors
// ---------------------------------------------------------------------------

/// Why a single field of a row was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("'{field}' is empty")]
    Missing { field: &'static str },

    #[error("'{field}': '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("'{field}': '{value}' is not a calendar date")]
    InvalidDate { field: &'static str, value: String },

    #[error("malformed row: {0}")]
    Malformed(String),

    #[error("'{field}': {value} is out of range")]
    OutOfRange { field: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The pipeline was invoked before any dataset was loaded.
    #[error("no dataset loaded")]
    InvalidInput,
}
