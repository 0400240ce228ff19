//! The scan matcher: validate a barcode and consume it at most once.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use drm_model::{ConsignmentCode, Manifest, RouteInfo, SalesOrder};

use crate::autoscan::AUTOSCAN_DELAY;

/// Codes accepted so far, keyed by sales order.
pub type ScannedSets = BTreeMap<SalesOrder, BTreeSet<ConsignmentCode>>;

/// Shortest barcode accepted by the matcher.
pub const MIN_BARCODE_LENGTH: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub min_barcode_length: usize,
    pub autoscan_delay: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            min_barcode_length: MIN_BARCODE_LENGTH,
            autoscan_delay: AUTOSCAN_DELAY,
        }
    }
}

/// Progress of one sales order right after a scan was applied or recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReceipt {
    pub so: SalesOrder,
    pub code: ConsignmentCode,
    pub route: RouteInfo,
    pub scanned: usize,
    pub total: usize,
}

impl ScanReceipt {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.scanned >= self.total
    }
}

impl fmt::Display for ScanReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scanned, self.total)
    }
}

/// Result of matching one barcode against the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Blank input; nothing to do.
    Ignored,
    TooShort { input: String, min_length: usize },
    /// The code is not an expected code of its candidate sales order.
    NotFound { input: String },
    /// Already consumed. Not an error; counts are unchanged.
    Duplicate(ScanReceipt),
    Accepted(ScanReceipt),
}

/// How a user-facing notice for an outcome should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

impl ScanOutcome {
    pub fn receipt(&self) -> Option<&ScanReceipt> {
        match self {
            Self::Duplicate(receipt) | Self::Accepted(receipt) => Some(receipt),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Notice shown to the operator, `None` for ignored input.
    pub fn notice(&self) -> Option<(NoticeLevel, String)> {
        match self {
            Self::Ignored => None,
            Self::TooShort { min_length, .. } => Some((
                NoticeLevel::Error,
                format!("Barcode must be at least {min_length} characters."),
            )),
            Self::NotFound { input } => Some((
                NoticeLevel::Error,
                format!("Sales order not found or barcode invalid: {input}"),
            )),
            Self::Duplicate(receipt) => Some((
                NoticeLevel::Info,
                format!("{} has already been scanned ({receipt}).", receipt.code),
            )),
            Self::Accepted(receipt) => Some((
                NoticeLevel::Success,
                format!("Marked {receipt} for {}.", receipt.so),
            )),
        }
    }
}

/// Match `raw` against `manifest`, recording it in `scanned` on acceptance.
///
/// Only an accepted scan mutates `scanned`. `route` resolves the run and drop
/// shown for a recognised sales order.
pub fn match_scan(
    raw: &str,
    manifest: &Manifest,
    scanned: &mut ScannedSets,
    options: &ScanOptions,
    route: impl Fn(&SalesOrder) -> RouteInfo,
) -> ScanOutcome {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ScanOutcome::Ignored;
    }
    if trimmed.chars().count() < options.min_barcode_length {
        return ScanOutcome::TooShort {
            input: trimmed.to_string(),
            min_length: options.min_barcode_length,
        };
    }
    let Ok(code) = ConsignmentCode::new(trimmed) else {
        return ScanOutcome::Ignored;
    };
    let Some(so) = code
        .candidate_sales_order()
        .filter(|so| manifest.is_expected(so, &code))
    else {
        return ScanOutcome::NotFound {
            input: code.to_string(),
        };
    };
    let total = manifest.expected_count(&so);
    let already = scanned.get(&so).is_some_and(|set| set.contains(&code));
    if !already {
        scanned.entry(so.clone()).or_default().insert(code.clone());
    }
    let receipt = ScanReceipt {
        scanned: scanned_count(manifest, scanned, &so),
        route: route(&so),
        so,
        code,
        total,
    };
    if already {
        ScanOutcome::Duplicate(receipt)
    } else {
        ScanOutcome::Accepted(receipt)
    }
}

/// Record `code` under `so`; false when it was already present.
pub fn record_scan(scanned: &mut ScannedSets, so: &SalesOrder, code: &ConsignmentCode) -> bool {
    scanned.entry(so.clone()).or_default().insert(code.clone())
}

/// Scanned codes of `so` that are also expected codes of `so`.
///
/// Remote scans outside the local manifest stay recorded but never count.
pub fn scanned_count(manifest: &Manifest, scanned: &ScannedSets, so: &SalesOrder) -> usize {
    let (Some(done), Some(expected)) = (scanned.get(so), manifest.expected(so)) else {
        return 0;
    };
    expected.iter().filter(|code| done.contains(*code)).count()
}

/// First expected code of `so`, in sequence order, that has not been scanned.
pub fn next_unscanned<'a>(
    manifest: &'a Manifest,
    scanned: &ScannedSets,
    so: &SalesOrder,
) -> Option<&'a ConsignmentCode> {
    let done = scanned.get(so);
    manifest
        .expected(so)?
        .iter()
        .find(|code| !done.is_some_and(|set| set.contains(*code)))
}
