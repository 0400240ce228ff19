//! Report rows: display cells plus notes and completion status.

use std::fmt;

use serde::Serialize;

use drm_core::ManifestSession;
use drm_model::DISPLAY_HEADERS;

use crate::error::{ReportError, Result};

/// Column headers of a completion report.
pub fn report_headers() -> Vec<&'static str> {
    DISPLAY_HEADERS
        .iter()
        .copied()
        .chain(["Notes", "Status"])
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionStatus {
    #[serde(rename = "Complete")]
    Complete,
    #[serde(rename = "Not Complete")]
    NotComplete,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::NotComplete => "Not Complete",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Data-row index in the manifest table.
    pub index: usize,
    /// Cells in display order; blanks render as `-`.
    pub cells: Vec<String>,
    pub notes: String,
    pub status: CompletionStatus,
}

impl ReportRow {
    /// Cells, notes and status in header order.
    pub fn record(&self) -> Vec<&str> {
        self.cells
            .iter()
            .map(String::as_str)
            .chain([self.notes.as_str(), self.status.as_str()])
            .collect()
    }
}

/// One report row per data row of the session's table.
///
/// A row is complete when its order has expected codes and all of them are
/// scanned; rows without a sales order are never complete.
pub fn build_report(session: &ManifestSession) -> Result<Vec<ReportRow>> {
    let table = session.table();
    if table.is_empty() {
        return Err(ReportError::NothingToReport);
    }
    if !table.has_data() {
        return Err(ReportError::NoEntries);
    }
    let positions = session.layout().display_positions();
    let rows = table
        .records(session.layout())
        .map(|row| {
            let complete = row
                .sales_order
                .as_ref()
                .is_some_and(|so| session.progress(so).is_complete());
            ReportRow {
                index: row.index,
                cells: positions
                    .iter()
                    .map(|&position| row.cell(position).display_or_dash())
                    .collect(),
                notes: session
                    .note(row.index)
                    .map_or_else(|| "-".to_string(), str::to_string),
                status: if complete {
                    CompletionStatus::Complete
                } else {
                    CompletionStatus::NotComplete
                },
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!(rows = rows.len(), "built completion report");
    Ok(rows)
}
