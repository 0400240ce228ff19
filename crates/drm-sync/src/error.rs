use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {what}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid JSON in {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The remote collaborator cannot be reached.
    #[error("{0} is unavailable")]
    Unavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, SyncError>;
