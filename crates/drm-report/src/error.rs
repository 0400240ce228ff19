use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no manifest loaded")]
    NothingToReport,
    #[error("manifest has a header but no entries")]
    NoEntries,
    #[error("failed to write report CSV")]
    Csv(#[from] csv::Error),
    #[error("failed to write report")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
