//! Local station cache.
//!
//! The cache is a single JSON document holding the table, file metadata,
//! scanned sets, row notes and schedule of one station. Writes are atomic
//! (temp file + rename). A missing or damaged cache loads as empty state so
//! a station can always start.

mod cache;
mod error;
mod io;

pub use cache::{CURRENT_CACHE_VERSION, StationCache};
pub use error::{PersistenceError, Result};
pub use io::{load_cache, read_cache, save_cache, save_cache_async};
