use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cache::StationCache;
use crate::error::{PersistenceError, Result};

/// Write the cache as JSON, atomically (temp file + rename).
pub fn save_cache(cache: &mut StationCache, path: &Path) -> Result<()> {
    cache.touch();
    let bytes = serde_json::to_vec_pretty(cache)
        .map_err(|source| PersistenceError::Serialization { source })?;

    let temp_path = path.with_extension("json.tmp");
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(&bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved station cache");
    Ok(())
}

/// Save on the blocking pool so the station loop keeps running.
pub async fn save_cache_async(mut cache: StationCache, path: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || save_cache(&mut cache, &path))
        .await
        .map_err(|source| PersistenceError::TaskFailed { source })?
}
