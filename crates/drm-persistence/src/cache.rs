use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drm_core::SessionSnapshot;
use drm_model::DepotId;

/// Schema version written into every cache file.
pub const CURRENT_CACHE_VERSION: u32 = 1;

/// Everything a station keeps between runs.
///
/// Derived indices are not stored; a restored session re-derives them from
/// the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationCache {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depot_id: Option<DepotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub session: SessionSnapshot,
}

impl Default for StationCache {
    fn default() -> Self {
        Self {
            version: CURRENT_CACHE_VERSION,
            depot_id: None,
            saved_at: None,
            session: SessionSnapshot::default(),
        }
    }
}

impl StationCache {
    pub fn new(depot_id: DepotId, session: SessionSnapshot) -> Self {
        Self {
            depot_id: Some(depot_id),
            session,
            ..Self::default()
        }
    }

    pub fn touch(&mut self) {
        self.saved_at = Some(Utc::now());
    }

    /// True when the cache holds neither rows nor scans.
    pub fn is_empty(&self) -> bool {
        !self.session.table.has_data() && self.session.scanned.values().all(BTreeSet::is_empty)
    }
}
