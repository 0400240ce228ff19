//! The manifest session: one depot's table, indices, scans and notes.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use drm_model::{
    ColumnLayout, ConsignmentCode, DepotId, FileMeta, Manifest, ManifestTable, RouteInfo,
    SalesOrder, ScheduleEntry,
};

use crate::autoscan::{AutoScanGate, InputDecision};
use crate::derive::derive_manifest;
use crate::merge::{merge_files_meta, merge_tables};
use crate::progress::{self, RunProgress, RunSummary, SoProgress};
use crate::scan::{
    ScanOptions, ScanOutcome, ScanReceipt, ScannedSets, match_scan, next_unscanned, record_scan,
    scanned_count,
};
use crate::status::RouteStatus;

/// The persistable part of a session. Indices are re-derived on restore.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    #[serde(default)]
    pub table: ManifestTable,
    #[serde(default)]
    pub files_meta: Vec<FileMeta>,
    #[serde(default)]
    pub scanned: ScannedSets,
    #[serde(default)]
    pub notes: BTreeMap<usize, String>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

/// Result of manually marking the next item of a row's sales order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    RowNotFound { row: usize },
    NoSalesOrder { row: usize },
    /// The order has no pieces, so there is nothing to mark.
    NothingExpected { so: SalesOrder },
    AlreadyComplete(ScanReceipt),
    Marked(ScanReceipt),
}

/// A scan applied from another station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedScan {
    /// False when the code was already known.
    pub added: bool,
    pub receipt: ScanReceipt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub files: usize,
    pub added_rows: usize,
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub rows: usize,
    pub orders: usize,
    pub expected: usize,
    pub scanned: usize,
    pub complete: usize,
}

#[derive(Debug, Clone)]
pub struct ManifestSession {
    depot_id: DepotId,
    layout: ColumnLayout,
    options: ScanOptions,
    table: ManifestTable,
    manifest: Manifest,
    files: Vec<FileMeta>,
    scanned: ScannedSets,
    notes: BTreeMap<usize, String>,
    schedule: Vec<ScheduleEntry>,
    status: RouteStatus,
    gate: AutoScanGate,
    dirty: bool,
}

impl ManifestSession {
    pub fn new(depot_id: DepotId, layout: ColumnLayout, options: ScanOptions) -> Self {
        Self {
            depot_id,
            layout,
            options,
            table: ManifestTable::default(),
            manifest: Manifest::default(),
            files: Vec::new(),
            scanned: ScannedSets::new(),
            notes: BTreeMap::new(),
            schedule: Vec::new(),
            status: RouteStatus::Idle,
            gate: AutoScanGate::new(options.min_barcode_length, options.autoscan_delay),
            dirty: false,
        }
    }

    pub fn from_snapshot(
        depot_id: DepotId,
        layout: ColumnLayout,
        options: ScanOptions,
        snapshot: SessionSnapshot,
    ) -> Self {
        let mut session = Self::new(depot_id, layout, options);
        session.table = snapshot.table;
        session.files = snapshot.files_meta;
        session.scanned = snapshot.scanned;
        session.notes = snapshot.notes;
        session.schedule = snapshot.schedule;
        session.rederive();
        session.dirty = false;
        session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            table: self.table.clone(),
            files_meta: self.files.clone(),
            scanned: self.scanned.clone(),
            notes: self.notes.clone(),
            schedule: self.schedule.clone(),
        }
    }

    pub fn depot_id(&self) -> &DepotId {
        &self.depot_id
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn table(&self) -> &ManifestTable {
        &self.table
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn files(&self) -> &[FileMeta] {
        &self.files
    }

    pub fn scanned(&self) -> &ScannedSets {
        &self.scanned
    }

    pub fn route_status(&self) -> &RouteStatus {
        &self.status
    }

    /// True when there are data rows or any recorded scans.
    pub fn has_local_work(&self) -> bool {
        self.table.has_data() || self.scanned.values().any(|set| !set.is_empty())
    }

    /// True once since the last call if anything persistable changed.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replace the table wholesale, e.g. with a stored payload.
    pub fn load_table(&mut self, table: ManifestTable, files: Vec<FileMeta>) {
        self.table = table;
        self.files = files;
        self.rederive();
        self.status = RouteStatus::Idle;
        self.dirty = true;
    }

    /// Append an uploaded sheet to the current table and re-derive.
    pub fn merge_upload(&mut self, incoming: &ManifestTable, files: &[FileMeta]) -> MergeSummary {
        let before = self.table.len();
        self.table = merge_tables(&self.table, incoming);
        self.files = merge_files_meta(&self.files, files);
        self.rederive();
        self.status = RouteStatus::Idle;
        self.dirty = true;
        let summary = MergeSummary {
            files: files.len(),
            added_rows: self.table.len().saturating_sub(before),
            total_rows: self.table.len(),
        };
        info!(
            depot = %self.depot_id,
            files = summary.files,
            added_rows = summary.added_rows,
            total_rows = summary.total_rows,
            "merged upload"
        );
        summary
    }

    /// Match one submitted barcode. Runs to completion without suspending.
    pub fn handle_scan(&mut self, raw: &str) -> ScanOutcome {
        self.gate.cancel();
        let table = &self.table;
        let layout = &self.layout;
        let manifest = &self.manifest;
        let outcome = match_scan(raw, manifest, &mut self.scanned, &self.options, |so| {
            route_for(table, layout, manifest, so)
        });
        match &outcome {
            ScanOutcome::Accepted(receipt) => {
                debug!(so = %receipt.so, code = %receipt.code, progress = %receipt, "scan accepted");
                self.status = RouteStatus::routed(receipt);
                self.dirty = true;
            }
            ScanOutcome::Duplicate(receipt) => {
                debug!(code = %receipt.code, "duplicate scan");
                self.status = RouteStatus::routed(receipt);
            }
            ScanOutcome::NotFound { input } => {
                debug!(input = %input, "scan not found");
                self.status = RouteStatus::NotFound {
                    input: input.clone(),
                };
            }
            ScanOutcome::TooShort { .. } | ScanOutcome::Ignored => {}
        }
        outcome
    }

    /// Feed the live input field through the autoscan gate.
    pub fn on_input(&mut self, raw: &str, now: Instant) -> InputDecision {
        self.gate.on_input(raw, now, &self.manifest)
    }

    /// Submit the pending autoscan value if its deadline has passed.
    pub fn poll_autoscan(&mut self, now: Instant) -> Option<ScanOutcome> {
        let value = self.gate.poll(now)?;
        Some(self.handle_scan(&value))
    }

    pub fn autoscan_deadline(&self) -> Option<Instant> {
        self.gate.deadline()
    }

    /// Mark the first unscanned expected item of the order on `row`.
    pub fn mark_next_for_row(&mut self, row: usize) -> MarkOutcome {
        let Some(record) = self.table.record(&self.layout, row) else {
            return MarkOutcome::RowNotFound { row };
        };
        let Some(so) = record.sales_order else {
            return MarkOutcome::NoSalesOrder { row };
        };
        let total = self.manifest.expected_count(&so);
        if total == 0 {
            return MarkOutcome::NothingExpected { so };
        }
        let route = self.first_run_drop(&so);
        let Some(code) = next_unscanned(&self.manifest, &self.scanned, &so).cloned() else {
            let receipt = ScanReceipt {
                scanned: scanned_count(&self.manifest, &self.scanned, &so),
                code: ConsignmentCode::for_sequence(&so, total),
                so,
                route,
                total,
            };
            return MarkOutcome::AlreadyComplete(receipt);
        };
        record_scan(&mut self.scanned, &so, &code);
        let receipt = ScanReceipt {
            scanned: scanned_count(&self.manifest, &self.scanned, &so),
            so,
            code,
            route,
            total,
        };
        debug!(so = %receipt.so, code = %receipt.code, "manual mark");
        self.status = RouteStatus::routed(&receipt);
        self.dirty = true;
        MarkOutcome::Marked(receipt)
    }

    /// Apply a scan made elsewhere.
    ///
    /// Codes unknown to the local index are still recorded, but progress only
    /// counts expected codes, so they never complete an order.
    pub fn apply_remote_scan(
        &mut self,
        so: &SalesOrder,
        code: &ConsignmentCode,
        run: Option<&str>,
        drop: Option<&str>,
        refresh_status: bool,
    ) -> AppliedScan {
        let added = record_scan(&mut self.scanned, so, code);
        if added {
            self.dirty = true;
            if !self.manifest.is_expected(so, code) {
                debug!(so = %so, code = %code, "remote scan outside local manifest");
            }
        }
        let fallback = self.first_run_drop(so);
        let receipt = ScanReceipt {
            so: so.clone(),
            code: code.clone(),
            route: RouteInfo {
                run: run.map_or(fallback.run, str::to_string),
                drop: drop.map_or(fallback.drop, str::to_string),
            },
            scanned: scanned_count(&self.manifest, &self.scanned, so),
            total: self.manifest.expected_count(so),
        };
        if refresh_status {
            self.status = RouteStatus::routed(&receipt);
        }
        AppliedScan { added, receipt }
    }

    /// Union `other` into the local scanned sets; returns how many codes were new.
    pub fn merge_scanned(&mut self, other: &ScannedSets) -> usize {
        let mut added = 0;
        for (so, codes) in other {
            for code in codes {
                if record_scan(&mut self.scanned, so, code) {
                    added += 1;
                }
            }
        }
        if added > 0 {
            self.dirty = true;
        }
        added
    }

    /// Drop the manifest, scans and notes. The schedule is kept.
    pub fn clear(&mut self) {
        self.table = ManifestTable::default();
        self.manifest = Manifest::default();
        self.files.clear();
        self.scanned.clear();
        self.notes.clear();
        self.status = RouteStatus::Idle;
        self.gate.cancel();
        self.dirty = true;
        info!(depot = %self.depot_id, "cleared session");
    }

    /// Attach a note to a data row; blank text removes it. False for unknown rows.
    pub fn set_note(&mut self, row: usize, text: &str) -> bool {
        if row >= self.table.len() {
            return false;
        }
        let text = text.trim();
        if text.is_empty() {
            self.notes.remove(&row);
        } else {
            self.notes.insert(row, text.to_string());
        }
        self.dirty = true;
        true
    }

    pub fn note(&self, row: usize) -> Option<&str> {
        self.notes.get(&row).map(String::as_str)
    }

    pub fn notes(&self) -> &BTreeMap<usize, String> {
        &self.notes
    }

    pub fn set_schedule(&mut self, entries: Vec<ScheduleEntry>) {
        self.schedule = entries;
        self.dirty = true;
    }

    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    /// Run and drop of the first row recorded for `so`.
    pub fn first_run_drop(&self, so: &SalesOrder) -> RouteInfo {
        route_for(&self.table, &self.layout, &self.manifest, so)
    }

    pub fn progress(&self, so: &SalesOrder) -> SoProgress {
        SoProgress::of(&self.manifest, &self.scanned, so)
    }

    pub fn run_progress(&self) -> Vec<RunProgress> {
        progress::run_progress(&self.table, &self.layout, &self.manifest, &self.scanned)
    }

    pub fn run_summary(&self, run: &str) -> RunSummary {
        progress::run_summary(&self.table, &self.layout, run)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            rows: self.table.len(),
            orders: self.manifest.row_lookup.len(),
            expected: self.manifest.total_expected(),
            scanned: self
                .manifest
                .generated
                .keys()
                .map(|so| scanned_count(&self.manifest, &self.scanned, so))
                .sum(),
            complete: self
                .manifest
                .generated
                .keys()
                .filter(|so| self.progress(so).is_complete())
                .count(),
        }
    }

    fn rederive(&mut self) {
        self.manifest = derive_manifest(&self.table, &self.layout);
        let rows = self.table.len();
        self.notes.retain(|row, _| *row < rows);
    }
}

fn route_for(
    table: &ManifestTable,
    layout: &ColumnLayout,
    manifest: &Manifest,
    so: &SalesOrder,
) -> RouteInfo {
    manifest
        .first_row(so)
        .and_then(|row| table.record(layout, row))
        .map(|row| RouteInfo::from_row(&row))
        .unwrap_or_default()
}
