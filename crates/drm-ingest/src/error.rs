//! Error types for runsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading runsheets and schedules.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Sheet file not found.
    #[error("sheet not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV record.
    #[error("failed to parse {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The sheet has no rows at all.
    #[error("sheet is empty: {path}")]
    EmptySheet { path: PathBuf },

    /// A required header is absent.
    #[error("required column '{column}' not found")]
    MissingColumn { column: String },

    /// A schedule had the right column but no sales orders in it.
    #[error("no sales orders found in the production schedule")]
    NoSalesOrders,
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
