//! Runsheet ingestion.
//!
//! The workbook parser itself is an external collaborator; this crate reads
//! the 2-D cell array it produces (exported as CSV) into a `ManifestTable`
//! and extracts production-schedule entries.

pub mod error;
pub mod schedule;
pub mod sheet;

pub use error::{IngestError, Result};
pub use schedule::{CREATED_FROM_HEADER, extract_so, parse_schedule, schedule_from_runsheet};
pub use sheet::{LoadedSheet, parse_manifest_csv, read_manifest_csv, sha256_hex};
