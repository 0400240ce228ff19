//! Moving manifests between the shared store and a station.

use chrono::Utc;
use tracing::{info, warn};

use drm_core::{ManifestSession, merge_payload};
use drm_model::{ColumnLayout, DepotId, FileMeta, ManifestTable};

use crate::error::Result;
use crate::store::ManifestStore;

/// What one depot received from [`push_manifest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub depot: DepotId,
    /// False when the incoming sheet was stored alone.
    pub merged: bool,
    pub total_rows: usize,
    pub expected_codes: usize,
}

/// Merge `incoming` onto each depot's latest stored manifest and store the result.
///
/// A depot whose stored manifest cannot be fetched gets the incoming sheet
/// alone. Stored scans are not touched.
pub async fn push_manifest<S: ManifestStore>(
    store: &S,
    depots: &[DepotId],
    incoming: &ManifestTable,
    files: &[FileMeta],
    layout: &ColumnLayout,
    pushed_by: &str,
) -> Result<Vec<PushReport>> {
    let pushed_at = Utc::now();
    let stamped: Vec<FileMeta> = files
        .iter()
        .cloned()
        .map(|meta| meta.with_push(pushed_by, pushed_at))
        .collect();
    let mut reports = Vec::with_capacity(depots.len());
    for depot in depots {
        let existing = match store.latest(depot).await {
            Ok(existing) => existing,
            Err(error) => {
                warn!(depot = %depot, error = %error, "could not fetch stored manifest; pushing upload alone");
                None
            }
        };
        let payload = merge_payload(existing.as_ref(), incoming, &stamped, layout);
        let report = PushReport {
            depot: depot.clone(),
            merged: existing.is_some(),
            total_rows: payload.table_data.len(),
            expected_codes: payload
                .generated
                .as_ref()
                .map_or(0, |generated| generated.values().map(Vec::len).sum()),
        };
        store.insert(depot, payload).await?;
        info!(
            depot = %depot,
            merged = report.merged,
            rows = report.total_rows,
            "pushed manifest"
        );
        reports.push(report);
    }
    Ok(reports)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Local rows or scans exist and were preserved.
    KeptLocal,
    NoRemote,
    Loaded { rows: usize },
}

/// Load the depot's stored manifest into `session`.
///
/// With `preserve_local`, a session holding any rows or scans is left alone.
/// Indices are always re-derived from the stored table.
pub async fn hydrate_session<S: ManifestStore>(
    session: &mut ManifestSession,
    store: &S,
    preserve_local: bool,
) -> Result<HydrateOutcome> {
    if preserve_local && session.has_local_work() {
        info!(depot = %session.depot_id(), "keeping local manifest");
        return Ok(HydrateOutcome::KeptLocal);
    }
    let Some(payload) = store.latest(session.depot_id()).await? else {
        return Ok(HydrateOutcome::NoRemote);
    };
    let rows = payload.table_data.len();
    session.load_table(payload.table_data, payload.files_meta);
    info!(depot = %session.depot_id(), rows, "loaded stored manifest");
    Ok(HydrateOutcome::Loaded { rows })
}
