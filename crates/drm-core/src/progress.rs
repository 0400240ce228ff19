//! Per-order and per-run progress.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use drm_model::{ColumnLayout, Manifest, ManifestTable, SalesOrder};

use crate::scan::{ScannedSets, scanned_count};

/// Scan state of a single sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SoState {
    NotStarted,
    Partial,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoProgress {
    pub so: SalesOrder,
    pub scanned: usize,
    pub expected: usize,
    pub state: SoState,
}

impl SoProgress {
    /// A sales order with nothing expected is never complete.
    pub fn new(so: SalesOrder, scanned: usize, expected: usize) -> Self {
        let state = if expected > 0 && scanned >= expected {
            SoState::Complete
        } else if scanned > 0 {
            SoState::Partial
        } else {
            SoState::NotStarted
        };
        Self {
            so,
            scanned,
            expected,
            state,
        }
    }

    pub fn of(manifest: &Manifest, scanned: &ScannedSets, so: &SalesOrder) -> Self {
        Self::new(
            so.clone(),
            scanned_count(manifest, scanned, so),
            manifest.expected_count(so),
        )
    }

    pub fn is_complete(&self) -> bool {
        self.state == SoState::Complete
    }
}

/// Tile colour of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Idle,
    Partial,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProgress {
    /// Upper-cased run identifier.
    pub run: String,
    pub orders: usize,
    pub total: usize,
    pub scanned: usize,
}

impl RunProgress {
    pub fn tile(&self) -> TileState {
        if self.total > 0 && self.scanned >= self.total {
            TileState::Complete
        } else if self.scanned > 0 {
            TileState::Partial
        } else {
            TileState::Idle
        }
    }
}

/// Totals shown when a run is selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub weight: f64,
    pub drops: usize,
    pub fp: u32,
}

/// Upper-cased run key of a raw run value.
pub fn run_key(run: &str) -> String {
    run.trim().to_uppercase()
}

/// Sales orders grouped by run. Rows without a run or a sales order are skipped.
pub fn orders_by_run(
    table: &ManifestTable,
    layout: &ColumnLayout,
) -> BTreeMap<String, BTreeSet<SalesOrder>> {
    let mut runs: BTreeMap<String, BTreeSet<SalesOrder>> = BTreeMap::new();
    for row in table.records(layout) {
        let (Some(run), Some(so)) = (row.run.as_deref(), row.sales_order) else {
            continue;
        };
        runs.entry(run_key(run)).or_default().insert(so);
    }
    runs
}

/// Progress of every run, naturally ordered (`R2` before `R10`).
pub fn run_progress(
    table: &ManifestTable,
    layout: &ColumnLayout,
    manifest: &Manifest,
    scanned: &ScannedSets,
) -> Vec<RunProgress> {
    let mut runs: Vec<RunProgress> = orders_by_run(table, layout)
        .into_iter()
        .map(|(run, orders)| {
            let (total, done) = orders.iter().fold((0, 0), |(total, done), so| {
                (
                    total + manifest.expected_count(so),
                    done + scanned_count(manifest, scanned, so),
                )
            });
            RunProgress {
                run,
                orders: orders.len(),
                total,
                scanned: done,
            }
        })
        .collect();
    runs.sort_by(|a, b| natural_cmp(&a.run, &b.run));
    runs
}

/// Weight, distinct drops and FP total over the rows of `run`.
pub fn run_summary(table: &ManifestTable, layout: &ColumnLayout, run: &str) -> RunSummary {
    let wanted = run_key(run);
    let mut drops = BTreeSet::new();
    let mut summary = RunSummary::default();
    for row in table.records(layout) {
        if row.run.as_deref().map(run_key).as_deref() != Some(wanted.as_str()) {
            continue;
        }
        if let Some(drop) = row.drop {
            drops.insert(drop);
        }
        summary.fp = summary.fp.saturating_add(row.fp);
        summary.weight += row.weight.unwrap_or(0.0);
    }
    summary.drops = drops.len();
    summary
}

/// Case-insensitive comparison treating digit runs as numbers.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a).into_iter();
    let mut right = chunks(b).into_iter();
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let order = match (&l, &r) {
                    (Chunk::Number(x), Chunk::Number(y)) => {
                        let x = x.trim_start_matches('0');
                        let y = y.trim_start_matches('0');
                        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
                    }
                    (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
                    (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

enum Chunk {
    Number(String),
    Text(String),
}

fn chunks(value: &str) -> Vec<Chunk> {
    let mut out: Vec<Chunk> = Vec::new();
    for ch in value.chars() {
        let digit = ch.is_ascii_digit();
        if let Some(last) = out.last_mut() {
            match last {
                Chunk::Number(current) if digit => {
                    current.push(ch);
                    continue;
                }
                Chunk::Text(current) if !digit => {
                    current.extend(ch.to_lowercase());
                    continue;
                }
                _ => {}
            }
        }
        out.push(if digit {
            Chunk::Number(ch.to_string())
        } else {
            Chunk::Text(ch.to_lowercase().collect())
        });
    }
    out
}
