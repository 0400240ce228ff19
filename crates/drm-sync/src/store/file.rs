use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use drm_model::{DepotId, ManifestPayload};

use super::ManifestStore;
use crate::error::{Result, SyncError};

/// One `<depot>.json` file per depot holding its latest payload.
#[derive(Debug, Clone)]
pub struct FileManifestStore {
    dir: PathBuf,
}

impl FileManifestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, depot: &DepotId) -> PathBuf {
        let stem: String = depot
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }
}

impl ManifestStore for FileManifestStore {
    async fn latest(&self, depot: &DepotId) -> Result<Option<ManifestPayload>> {
        let path = self.path_for(depot);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(depot = %depot, "no stored manifest");
                return Ok(None);
            }
            Err(e) => {
                return Err(SyncError::Io {
                    operation: "read",
                    path,
                    source: e,
                });
            }
        };
        let payload = serde_json::from_slice(&bytes)
            .map_err(|source| SyncError::Decode { path, source })?;
        Ok(Some(payload))
    }

    async fn insert(&self, depot: &DepotId, payload: ManifestPayload) -> Result<()> {
        let bytes = serde_json::to_vec(&payload).map_err(|source| SyncError::Encode {
            what: "manifest payload",
            source,
        })?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SyncError::Io {
                operation: "create directory",
                path: self.dir.clone(),
                source: e,
            })?;
        let path = self.path_for(depot);
        let temp = path.with_extension("json.tmp");
        fs::write(&temp, &bytes).await.map_err(|e| SyncError::Io {
            operation: "write",
            path: temp.clone(),
            source: e,
        })?;
        fs::rename(&temp, &path).await.map_err(|e| SyncError::Io {
            operation: "replace",
            path: path.clone(),
            source: e,
        })?;
        info!(
            depot = %depot,
            rows = payload.table_data.len(),
            path = %path.display(),
            "stored manifest"
        );
        Ok(())
    }

    async fn clear(&self, depot: &DepotId) -> Result<()> {
        let path = self.path_for(depot);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::Io {
                operation: "remove",
                path,
                source: e,
            }),
        }
    }
}
