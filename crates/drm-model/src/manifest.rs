//! Derived manifest indices and the payload exchanged with the manifest store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ConsignmentCode, SalesOrder};
use crate::table::ManifestTable;

/// Expected-code index keyed by sales order.
pub type GeneratedIndex = BTreeMap<SalesOrder, Vec<ConsignmentCode>>;

/// Data-row indices keyed by sales order, in table order.
pub type RowLookup = BTreeMap<SalesOrder, Vec<usize>>;

/// The expected-code and row-lookup indices of one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated: GeneratedIndex,
    pub row_lookup: RowLookup,
}

impl Manifest {
    pub fn expected(&self, so: &SalesOrder) -> Option<&[ConsignmentCode]> {
        self.generated.get(so).map(Vec::as_slice)
    }

    /// Number of expected codes for `so` (0 when it has none).
    pub fn expected_count(&self, so: &SalesOrder) -> usize {
        self.generated.get(so).map_or(0, Vec::len)
    }

    pub fn is_expected(&self, so: &SalesOrder, code: &ConsignmentCode) -> bool {
        self.generated
            .get(so)
            .is_some_and(|codes| codes.contains(code))
    }

    pub fn rows_for(&self, so: &SalesOrder) -> &[usize] {
        self.row_lookup.get(so).map_or(&[], Vec::as_slice)
    }

    /// The first data row recorded for `so`.
    pub fn first_row(&self, so: &SalesOrder) -> Option<usize> {
        self.row_lookup.get(so).and_then(|rows| rows.first().copied())
    }

    pub fn total_expected(&self) -> usize {
        self.generated.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.row_lookup.is_empty()
    }
}

/// Which uploaded file contributed how many rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub name: String,
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, rows: usize) -> Self {
        Self {
            name: name.into(),
            rows,
            pushed_by: None,
            pushed_at: None,
            sha256: None,
        }
    }

    #[must_use]
    pub fn with_push(mut self, pushed_by: impl Into<String>, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_by = Some(pushed_by.into());
        self.pushed_at = Some(pushed_at);
        self
    }

    #[must_use]
    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }
}

/// A manifest as stored per depot in the shared store.
///
/// The stored indices are informational; readers re-derive from `table_data`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPayload {
    #[serde(default)]
    pub table_data: ManifestTable,
    #[serde(default)]
    pub files_meta: Vec<FileMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_lookup: Option<RowLookup>,
}

impl ManifestPayload {
    pub fn new(table_data: ManifestTable, files_meta: Vec<FileMeta>, manifest: Manifest) -> Self {
        Self {
            table_data,
            files_meta,
            generated: Some(manifest.generated),
            row_lookup: Some(manifest.row_lookup),
        }
    }
}
