//! Completion reports: one CSV row per manifest row with notes and status.

mod envelope;
mod error;
mod rows;
mod writer;

pub use envelope::{CompletionReport, ReportKind, report_filename};
pub use error::{ReportError, Result};
pub use rows::{CompletionStatus, ReportRow, build_report, report_headers};
pub use writer::{report_csv_string, write_report_csv};
