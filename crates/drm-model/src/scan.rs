//! Scan events exchanged through the shared per-depot scan log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ConsignmentCode, DepotId, OriginId, SalesOrder};

/// Outbound insert request for the shared scan log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLogInsert {
    pub so: SalesOrder,
    pub code: ConsignmentCode,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub drop: Option<String>,
    pub depot_id: DepotId,
    pub origin_id: OriginId,
}

/// A row of the shared scan log, as delivered by backlog queries and live pushes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub so: SalesOrder,
    pub code: ConsignmentCode,
    #[serde(default)]
    pub run: Option<String>,
    #[serde(default)]
    pub drop: Option<String>,
    pub depot_id: DepotId,
    pub origin_id: OriginId,
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    /// Stamp an insert request with the time the log accepted it.
    pub fn from_insert(insert: ScanLogInsert, timestamp: DateTime<Utc>) -> Self {
        Self {
            so: insert.so,
            code: insert.code,
            run: insert.run,
            drop: insert.drop,
            depot_id: insert.depot_id,
            origin_id: insert.origin_id,
            timestamp,
        }
    }
}
