//! The shared per-depot manifest store.

mod file;
mod memory;

use std::future::Future;

use drm_model::{DepotId, ManifestPayload};

use crate::error::Result;

pub use file::FileManifestStore;
pub use memory::MemoryManifestStore;

pub trait ManifestStore: Send + Sync {
    /// The most recently inserted payload for `depot`.
    fn latest(
        &self,
        depot: &DepotId,
    ) -> impl Future<Output = Result<Option<ManifestPayload>>> + Send;

    fn insert(
        &self,
        depot: &DepotId,
        payload: ManifestPayload,
    ) -> impl Future<Output = Result<()>> + Send;

    fn clear(&self, depot: &DepotId) -> impl Future<Output = Result<()>> + Send;
}
