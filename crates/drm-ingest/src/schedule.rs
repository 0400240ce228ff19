//! Production schedules: map "Created From" text back onto sales orders.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use drm_model::{ColumnLayout, ManifestTable, SalesOrder, ScheduleEntry};

use crate::error::{IngestError, Result};

/// Header naming the free-text source column of a schedule.
pub const CREATED_FROM_HEADER: &str = "created from";

static SO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SO\d+").expect("static sales order pattern"));

/// Pull the first `SO<digits>` token out of free text, case-insensitively.
pub fn extract_so(text: &str) -> Option<SalesOrder> {
    let upper = text.to_uppercase();
    SO_PATTERN
        .find(&upper)
        .and_then(|found| SalesOrder::new(found.as_str()).ok())
}

/// Parse an uploaded production schedule.
///
/// Each sales order is kept once, at its first occurrence.
pub fn parse_schedule(table: &ManifestTable) -> Result<Vec<ScheduleEntry>> {
    let column =
        table
            .header_position(CREATED_FROM_HEADER)
            .ok_or_else(|| IngestError::MissingColumn {
                column: "Created From".to_string(),
            })?;
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();
    for row in table.rows() {
        let Some(raw) = row.get(column).and_then(|cell| cell.as_text()) else {
            continue;
        };
        let Some(so) = extract_so(&raw) else {
            continue;
        };
        if !seen.insert(so.clone()) {
            continue;
        }
        entries.push(ScheduleEntry {
            created_from: raw,
            so,
        });
    }
    if entries.is_empty() {
        return Err(IngestError::NoSalesOrders);
    }
    debug!(entries = entries.len(), "parsed production schedule");
    Ok(entries)
}

/// One entry per sales-order row of a runsheet, preferring its "Created From" text.
pub fn schedule_from_runsheet(table: &ManifestTable, layout: &ColumnLayout) -> Vec<ScheduleEntry> {
    let created = table.header_position(CREATED_FROM_HEADER);
    table
        .records(layout)
        .filter_map(|row| {
            let so = row.sales_order.clone()?;
            let source = created.unwrap_or(layout.sales_order);
            let created_from = row.cell(source).to_string();
            Some(ScheduleEntry { created_from, so })
        })
        .collect()
}
