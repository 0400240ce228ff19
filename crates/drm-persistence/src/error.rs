//! Persistence error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid station cache: {reason}")]
    InvalidFormat {
        path: PathBuf,
        reason: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Station cache version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    #[error("Failed to serialize station cache")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// The background save task panicked or was cancelled.
    #[error("Save task did not complete")]
    TaskFailed {
        #[source]
        source: tokio::task::JoinError,
    },

    /// Temp file written but could not be renamed over the target.
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// A message suitable for showing to the station operator.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::InvalidFormat { path, .. } => {
                format!(
                    "The saved scanning state at {} is damaged and was not loaded.",
                    path.display()
                )
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
                ..
            } => {
                format!(
                    "The saved scanning state was written by a newer version \
                    (cache version {found}, this build reads up to {max_supported})."
                )
            }
            Self::Serialization { .. } | Self::TaskFailed { .. } => {
                "An error occurred while saving the scanning state.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the scanning state to {}. Check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
