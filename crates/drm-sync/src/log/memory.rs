use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

use drm_model::{DepotId, ScanEvent, ScanLogInsert};

use super::{LIVE_CHANNEL_CAPACITY, ScanLog, depot_tail};
use crate::error::{Result, SyncError};

/// In-process scan log. Clones share the same log.
#[derive(Debug, Clone)]
pub struct MemoryScanLog {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    events: Mutex<Vec<ScanEvent>>,
    sender: broadcast::Sender<ScanEvent>,
    available: AtomicBool,
}

impl Default for MemoryScanLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScanLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                events: Mutex::new(Vec::new()),
                sender,
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Simulate losing or regaining the connection to the log.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.inner.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_available(&self) -> Result<()> {
        if self.inner.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Unavailable("scan log"))
        }
    }
}

impl ScanLog for MemoryScanLog {
    async fn append(&self, insert: ScanLogInsert) -> Result<ScanEvent> {
        self.ensure_available()?;
        let event = ScanEvent::from_insert(insert, Utc::now());
        self.inner.events.lock().await.push(event.clone());
        let receivers = self.inner.sender.send(event.clone()).unwrap_or(0);
        debug!(code = %event.code, receivers, "appended scan event");
        Ok(event)
    }

    async fn backlog(&self, depot: &DepotId, limit: usize) -> Result<Vec<ScanEvent>> {
        self.ensure_available()?;
        let events = self.inner.events.lock().await;
        Ok(depot_tail(events.iter(), depot, limit))
    }

    async fn clear(&self, depot: &DepotId) -> Result<usize> {
        self.ensure_available()?;
        let mut events = self.inner.events.lock().await;
        let before = events.len();
        events.retain(|event| &event.depot_id != depot);
        Ok(before - events.len())
    }

    fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.inner.sender.subscribe()
    }
}
