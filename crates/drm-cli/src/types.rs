use std::path::PathBuf;

use drm_core::{ManifestSession, MergeSummary, RunProgress, RunSummary, SessionSummary, SoProgress};
use drm_model::{RouteInfo, SalesOrder, ScheduleEntry};

/// One sales order as listed by `derive`, `status --run` and `schedule`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub so: SalesOrder,
    pub route: RouteInfo,
    /// Number of data rows carrying this order.
    pub rows: usize,
    pub progress: SoProgress,
}

impl OrderLine {
    pub fn of(session: &ManifestSession, so: &SalesOrder) -> Self {
        Self {
            so: so.clone(),
            route: session.first_run_drop(so),
            rows: session.manifest().rows_for(so).len(),
            progress: session.progress(so),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeriveResult {
    pub file: String,
    pub sha256: Option<String>,
    pub summary: SessionSummary,
    /// In first-row order.
    pub orders: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file: String,
    pub merge: MergeSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanTally {
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub remote: usize,
    pub publish_failures: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusResult {
    Runs {
        summary: SessionSummary,
        runs: Vec<RunProgress>,
    },
    Run {
        run: String,
        summary: RunSummary,
        orders: Vec<OrderLine>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleLine {
    pub entry: ScheduleEntry,
    pub order: OrderLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResult {
    pub csv: PathBuf,
    pub envelope: PathBuf,
    pub rows: usize,
    pub complete: usize,
}
