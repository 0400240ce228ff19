//! Data model for delivery runsheet marking.

pub mod cell;
pub mod coerce;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod scan;
pub mod schedule;
pub mod table;

pub use cell::Cell;
pub use coerce::{
    coerce_count, normalize_code, normalize_so, parse_weight, row_has_meaningful_data,
};
pub use error::{ModelError, Result};
pub use ids::{
    ConsignmentCode, DepotId, MAX_SEQUENCE, OriginId, SEQUENCE_SUFFIX_LEN, SalesOrder,
};
pub use manifest::{FileMeta, GeneratedIndex, Manifest, ManifestPayload, RowLookup};
pub use scan::{ScanEvent, ScanLogInsert};
pub use schedule::ScheduleEntry;
pub use table::{ColumnLayout, DISPLAY_HEADERS, ManifestRow, ManifestTable, RouteInfo};
