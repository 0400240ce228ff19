//! Expected-code and row-lookup derivation.

use drm_model::{
    ColumnLayout, ConsignmentCode, MAX_SEQUENCE, Manifest, ManifestRow, ManifestTable,
};
use tracing::warn;

/// Derive both manifest indices from a full table.
///
/// Sequence numbers are global per sales order: two rows of `SO100` with two
/// pieces each yield `SO100001..SO100004`. Rows without a sales order are
/// skipped; a sales order whose rows carry no pieces gets a row-lookup entry
/// but no expected-code entry. An order never gets more than
/// [`MAX_SEQUENCE`] codes; pieces beyond that are logged and dropped.
pub fn derive_manifest(table: &ManifestTable, layout: &ColumnLayout) -> Manifest {
    let mut manifest = Manifest::default();
    for row in table.records(layout) {
        accumulate_row(&mut manifest, &row);
    }
    manifest
}

fn accumulate_row(manifest: &mut Manifest, row: &ManifestRow<'_>) {
    let Some(so) = row.sales_order.as_ref() else {
        return;
    };
    manifest
        .row_lookup
        .entry(so.clone())
        .or_default()
        .push(row.index);
    let total = row.pieces() as usize;
    if total == 0 {
        return;
    }
    let codes = manifest.generated.entry(so.clone()).or_default();
    let start = codes.len();
    let wanted = start.saturating_add(total);
    let end = wanted.min(MAX_SEQUENCE);
    if end < wanted {
        warn!(
            so = %so,
            row = row.index,
            pieces = total,
            max = MAX_SEQUENCE,
            "piece count exceeds the sequence range, extra items get no code"
        );
    }
    codes.extend((start + 1..=end).map(|sequence| ConsignmentCode::for_sequence(so, sequence)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use drm_model::{Cell, SalesOrder};

    fn row(so: &str, fp: f64, ch: f64, fl: f64) -> Vec<Cell> {
        let mut cells = vec![Cell::Empty; 15];
        cells[4] = Cell::from(so);
        cells[10] = Cell::Number(fp);
        cells[11] = Cell::Number(ch);
        cells[12] = Cell::Number(fl);
        cells
    }

    #[test]
    fn sums_piece_columns() {
        let table = ManifestTable::new(vec![Cell::from("h")], vec![row("SO1", 1.0, 1.0, 1.0)]);
        let manifest = derive_manifest(&table, &ColumnLayout::default());
        let so = SalesOrder::new("SO1").unwrap();
        let codes: Vec<&str> = manifest.generated[&so].iter().map(ConsignmentCode::as_str).collect();
        assert_eq!(codes, vec!["SO1001", "SO1002", "SO1003"]);
    }

    #[test]
    fn orders_stop_at_the_last_three_digit_sequence() {
        let table = ManifestTable::new(
            vec![],
            vec![row("SO11111", 1e9, 0.0, 0.0), row("SO11111", 5.0, 0.0, 0.0)],
        );
        let manifest = derive_manifest(&table, &ColumnLayout::default());
        let so = SalesOrder::new("SO11111").unwrap();
        let codes = &manifest.generated[&so];
        assert_eq!(codes.len(), MAX_SEQUENCE);
        assert_eq!(codes.last().map(ConsignmentCode::as_str), Some("SO11111999"));
        assert_eq!(manifest.rows_for(&so), &[0, 1]);
    }

    #[test]
    fn capped_orders_do_not_collide_with_longer_orders() {
        let table = ManifestTable::new(
            vec![],
            vec![row("SO1111", 1500.0, 0.0, 0.0), row("SO11111", 1.0, 0.0, 0.0)],
        );
        let manifest = derive_manifest(&table, &ColumnLayout::default());
        let short = SalesOrder::new("SO1111").unwrap();
        let long = SalesOrder::new("SO11111").unwrap();
        let code = ConsignmentCode::new("SO11111001").unwrap();
        assert!(manifest.is_expected(&long, &code));
        assert!(!manifest.is_expected(&short, &code));
    }

    #[test]
    fn rows_without_sales_order_contribute_nothing() {
        let table = ManifestTable::new(vec![], vec![row("", 5.0, 0.0, 0.0)]);
        let manifest = derive_manifest(&table, &ColumnLayout::default());
        assert!(manifest.is_empty());
    }
}
