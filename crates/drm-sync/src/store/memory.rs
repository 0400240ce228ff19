use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use drm_model::{DepotId, ManifestPayload};

use super::ManifestStore;
use crate::error::{Result, SyncError};

/// In-process manifest store keeping every inserted payload. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryManifestStore {
    payloads: Arc<Mutex<BTreeMap<DepotId, Vec<ManifestPayload>>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryManifestStore {
    fn default() -> Self {
        Self {
            payloads: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of payloads inserted for `depot`.
    pub async fn history_len(&self, depot: &DepotId) -> usize {
        self.payloads.lock().await.get(depot).map_or(0, Vec::len)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(SyncError::Unavailable("manifest store"))
        }
    }
}

impl ManifestStore for MemoryManifestStore {
    async fn latest(&self, depot: &DepotId) -> Result<Option<ManifestPayload>> {
        self.ensure_available()?;
        let payloads = self.payloads.lock().await;
        Ok(payloads.get(depot).and_then(|history| history.last()).cloned())
    }

    async fn insert(&self, depot: &DepotId, payload: ManifestPayload) -> Result<()> {
        self.ensure_available()?;
        self.payloads
            .lock()
            .await
            .entry(depot.clone())
            .or_default()
            .push(payload);
        Ok(())
    }

    async fn clear(&self, depot: &DepotId) -> Result<()> {
        self.ensure_available()?;
        self.payloads.lock().await.remove(depot);
        Ok(())
    }
}
