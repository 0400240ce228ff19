//! The shared append-only scan log.

mod jsonl;
mod memory;

use std::future::Future;

use tokio::sync::broadcast;

use drm_model::{DepotId, ScanEvent, ScanLogInsert};

use crate::error::Result;

pub use jsonl::JsonlScanLog;
pub use memory::MemoryScanLog;

/// Buffered live events per subscriber before it starts lagging.
pub const LIVE_CHANNEL_CAPACITY: usize = 256;

pub trait ScanLog: Send + Sync {
    /// Append one scan and notify live subscribers.
    fn append(&self, insert: ScanLogInsert) -> impl Future<Output = Result<ScanEvent>> + Send;

    /// The newest `limit` events of `depot`, oldest first.
    fn backlog(
        &self,
        depot: &DepotId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ScanEvent>>> + Send;

    /// Remove every event of `depot`; returns how many were removed.
    fn clear(&self, depot: &DepotId) -> impl Future<Output = Result<usize>> + Send;

    /// Live events of every depot. Consumers filter by depot themselves.
    fn subscribe(&self) -> broadcast::Receiver<ScanEvent>;
}

/// Keep the last `limit` events of `depot`, preserving log order.
fn depot_tail<'a>(
    events: impl IntoIterator<Item = &'a ScanEvent>,
    depot: &DepotId,
    limit: usize,
) -> Vec<ScanEvent> {
    let matching: Vec<&ScanEvent> = events
        .into_iter()
        .filter(|event| &event.depot_id == depot)
        .collect();
    let skip = matching.len().saturating_sub(limit);
    matching.into_iter().skip(skip).cloned().collect()
}
