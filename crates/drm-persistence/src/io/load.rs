use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::cache::{CURRENT_CACHE_VERSION, StationCache};
use crate::error::{PersistenceError, Result};

/// Read and validate a cache file.
pub fn read_cache(path: &Path) -> Result<StationCache> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let cache: StationCache =
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::InvalidFormat {
            path: path.to_path_buf(),
            reason: source.to_string(),
            source,
        })?;
    if cache.version > CURRENT_CACHE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: cache.version,
            max_supported: CURRENT_CACHE_VERSION,
            path: path.to_path_buf(),
        });
    }
    info!(
        path = %path.display(),
        rows = cache.session.table.len(),
        "loaded station cache"
    );
    Ok(cache)
}

/// Load the cache, treating a missing or unreadable file as empty state.
pub fn load_cache(path: &Path) -> StationCache {
    match read_cache(path) {
        Ok(cache) => cache,
        Err(PersistenceError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no station cache yet");
            StationCache::default()
        }
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "{}",
                error.user_message()
            );
            StationCache::default()
        }
    }
}
