//! Synchronisation between scanning stations.
//!
//! Stations of one depot share an append-only scan log and a manifest
//! store. Local scans are authoritative: publishing is best-effort, and
//! remote events are applied idempotently after depot isolation and
//! self-echo suppression.

pub mod error;
pub mod hydrate;
pub mod log;
pub mod station;
pub mod store;
pub mod sync;

pub use error::{Result, SyncError};
pub use hydrate::{HydrateOutcome, PushReport, hydrate_session, push_manifest};
pub use log::{JsonlScanLog, LIVE_CHANNEL_CAPACITY, MemoryScanLog, ScanLog};
pub use station::{Station, StationCommand, StationEvent};
pub use store::{FileManifestStore, ManifestStore, MemoryManifestStore};
pub use sync::{BacklogSummary, ClearReport, DEFAULT_BACKLOG_LIMIT, Disposition, ScanSync};
