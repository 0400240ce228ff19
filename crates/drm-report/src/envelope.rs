use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use drm_model::DepotId;

use crate::rows::{CompletionStatus, ReportRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Final,
}

/// A finished report as handed to the report store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub id: Uuid,
    pub depot_id: DepotId,
    pub depot_name: String,
    pub kind: ReportKind,
    pub created: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
    pub filename: String,
}

impl CompletionReport {
    pub fn new(
        depot_id: DepotId,
        depot_name: impl Into<String>,
        rows: Vec<ReportRow>,
        created: DateTime<Utc>,
    ) -> Self {
        let filename = report_filename(&depot_id, created);
        Self {
            id: Uuid::new_v4(),
            depot_id,
            depot_name: depot_name.into(),
            kind: ReportKind::Final,
            created,
            rows,
            filename,
        }
    }

    pub fn complete_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.status == CompletionStatus::Complete)
            .count()
    }
}

/// `final_<depot>_<timestamp>.csv`, safe for file systems.
pub fn report_filename(depot_id: &DepotId, created: DateTime<Utc>) -> String {
    let depot: String = depot_id
        .as_str()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("final_{}_{}.csv", depot, created.format("%Y%m%dT%H%M%SZ"))
}
