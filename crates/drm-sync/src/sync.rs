//! Applying the shared scan log to a local session.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use drm_core::{AppliedScan, ManifestSession, ScanReceipt};
use drm_model::{DepotId, OriginId, ScanEvent, ScanLogInsert};

use crate::error::Result;
use crate::log::ScanLog;
use crate::store::ManifestStore;

/// Events fetched from the log when a station starts.
pub const DEFAULT_BACKLOG_LIMIT: usize = 200;

/// How an incoming event relates to this station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Apply,
    OtherDepot,
    /// Published by this station; already applied locally.
    OwnEcho,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BacklogSummary {
    pub fetched: usize,
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearReport {
    /// `None` when the scan log could not be cleared.
    pub scans_removed: Option<usize>,
    pub manifest_cleared: bool,
}

pub struct ScanSync<L> {
    log: L,
    depot_id: DepotId,
    origin_id: OriginId,
    backlog_limit: usize,
}

impl<L: ScanLog> ScanSync<L> {
    pub fn new(log: L, depot_id: DepotId, origin_id: OriginId) -> Self {
        Self {
            log,
            depot_id,
            origin_id,
            backlog_limit: DEFAULT_BACKLOG_LIMIT,
        }
    }

    #[must_use]
    pub fn with_backlog_limit(mut self, limit: usize) -> Self {
        self.backlog_limit = limit;
        self
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn depot_id(&self) -> &DepotId {
        &self.depot_id
    }

    pub fn origin_id(&self) -> &OriginId {
        &self.origin_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.log.subscribe()
    }

    pub fn insert_for(&self, receipt: &ScanReceipt) -> ScanLogInsert {
        ScanLogInsert {
            so: receipt.so.clone(),
            code: receipt.code.clone(),
            run: Some(receipt.route.run.clone()),
            drop: Some(receipt.route.drop.clone()),
            depot_id: self.depot_id.clone(),
            origin_id: self.origin_id.clone(),
        }
    }

    /// Send an accepted scan to the shared log. Failures are logged, not retried.
    pub async fn publish(&self, receipt: &ScanReceipt) -> bool {
        match self.log.append(self.insert_for(receipt)).await {
            Ok(event) => {
                debug!(code = %event.code, depot_id = %event.depot_id, "published scan");
                true
            }
            Err(error) => {
                warn!(
                    code = %receipt.code,
                    depot_id = %self.depot_id,
                    error = %error,
                    "scan not published; local scan stands"
                );
                false
            }
        }
    }

    pub fn classify(&self, event: &ScanEvent) -> Disposition {
        if event.depot_id != self.depot_id {
            Disposition::OtherDepot
        } else if event.origin_id == self.origin_id {
            Disposition::OwnEcho
        } else {
            Disposition::Apply
        }
    }

    /// Apply `event` unless it belongs elsewhere or is our own echo.
    pub fn apply_remote(
        &self,
        session: &mut ManifestSession,
        event: &ScanEvent,
        refresh_status: bool,
    ) -> Option<AppliedScan> {
        match self.classify(event) {
            Disposition::Apply => Some(session.apply_remote_scan(
                &event.so,
                &event.code,
                event.run.as_deref(),
                event.drop.as_deref(),
                refresh_status,
            )),
            disposition => {
                debug!(code = %event.code, ?disposition, "ignoring scan event");
                None
            }
        }
    }

    /// Replay the recent log. Only the newest event may refresh the route status.
    pub async fn hydrate_backlog(&self, session: &mut ManifestSession) -> Result<BacklogSummary> {
        let events = self.log.backlog(&self.depot_id, self.backlog_limit).await?;
        let mut summary = BacklogSummary {
            fetched: events.len(),
            ..BacklogSummary::default()
        };
        let last = events.len().saturating_sub(1);
        for (index, event) in events.iter().enumerate() {
            match self.apply_remote(session, event, index == last) {
                Some(applied) if applied.added => summary.applied += 1,
                _ => summary.skipped += 1,
            }
        }
        info!(
            depot_id = %self.depot_id,
            fetched = summary.fetched,
            applied = summary.applied,
            "replayed scan backlog"
        );
        Ok(summary)
    }

    /// Clear the depot remotely where possible, then locally regardless.
    pub async fn clear_depot<S: ManifestStore>(
        &self,
        session: &mut ManifestSession,
        store: &S,
    ) -> ClearReport {
        let scans_removed = match self.log.clear(&self.depot_id).await {
            Ok(removed) => Some(removed),
            Err(error) => {
                warn!(depot_id = %self.depot_id, error = %error, "could not clear shared scans");
                None
            }
        };
        let manifest_cleared = match store.clear(&self.depot_id).await {
            Ok(()) => true,
            Err(error) => {
                warn!(depot_id = %self.depot_id, error = %error, "could not clear stored manifest");
                false
            }
        };
        session.clear();
        ClearReport {
            scans_removed,
            manifest_cleared,
        }
    }
}
