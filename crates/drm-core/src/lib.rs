//! Manifest derivation, upload reconciliation and the barcode scan state machine.

pub mod autoscan;
pub mod derive;
pub mod merge;
pub mod progress;
pub mod scan;
pub mod session;
pub mod status;

pub use autoscan::{AUTOSCAN_DELAY, AutoScanGate, InputDecision};
pub use derive::derive_manifest;
pub use merge::{merge_files_meta, merge_payload, merge_tables};
pub use progress::{
    RunProgress, RunSummary, SoProgress, SoState, TileState, natural_cmp, orders_by_run,
    run_key, run_progress, run_summary,
};
pub use scan::{
    MIN_BARCODE_LENGTH, NoticeLevel, ScanOptions, ScanOutcome, ScanReceipt, ScannedSets,
    match_scan, next_unscanned, record_scan, scanned_count,
};
pub use session::{
    AppliedScan, ManifestSession, MarkOutcome, MergeSummary, SessionSnapshot, SessionSummary,
};
pub use status::RouteStatus;
