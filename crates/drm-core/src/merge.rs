//! Upload reconciliation: concatenate tables, never merge indices.

use drm_model::{ColumnLayout, FileMeta, ManifestPayload, ManifestTable};

use crate::derive::derive_manifest;

/// Merge an incoming sheet onto an existing table.
///
/// The existing header wins when it has content. Bodies are concatenated
/// without deduplication; blank rows are filtered by the table constructor.
pub fn merge_tables(existing: &ManifestTable, incoming: &ManifestTable) -> ManifestTable {
    let header = if existing.has_header() {
        existing.header()
    } else {
        incoming.header()
    };
    let rows = existing
        .rows()
        .iter()
        .chain(incoming.rows())
        .cloned()
        .collect();
    ManifestTable::new(header.to_vec(), rows)
}

/// File metadata in contribution order, existing entries first.
pub fn merge_files_meta(existing: &[FileMeta], incoming: &[FileMeta]) -> Vec<FileMeta> {
    existing.iter().chain(incoming).cloned().collect()
}

/// Build the payload to store for a depot after an upload.
///
/// With no stored payload the incoming sheet is stored alone. Indices are
/// always re-derived from the merged table.
pub fn merge_payload(
    existing: Option<&ManifestPayload>,
    incoming: &ManifestTable,
    incoming_files: &[FileMeta],
    layout: &ColumnLayout,
) -> ManifestPayload {
    let (table, files) = match existing {
        Some(stored) => (
            merge_tables(&stored.table_data, incoming),
            merge_files_meta(&stored.files_meta, incoming_files),
        ),
        None => (incoming.clone(), incoming_files.to_vec()),
    };
    let manifest = derive_manifest(&table, layout);
    ManifestPayload::new(table, files, manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drm_model::Cell;

    fn table(header: &[&str], rows: &[&[&str]]) -> ManifestTable {
        ManifestTable::new(
            header.iter().map(|h| Cell::from(*h)).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        )
    }

    #[test]
    fn existing_header_wins_when_present() {
        let merged = merge_tables(&table(&["A"], &[&["1"]]), &table(&["B"], &[&["2"]]));
        assert_eq!(merged.header(), &[Cell::from("A")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn incoming_header_used_for_empty_existing() {
        let merged = merge_tables(&ManifestTable::default(), &table(&["B"], &[&["2"]]));
        assert_eq!(merged.header(), &[Cell::from("B")]);
        assert_eq!(merged.rows(), &[vec![Cell::from("2")]]);
    }

    #[test]
    fn file_meta_keeps_order() {
        let merged = merge_files_meta(&[FileMeta::new("a.csv", 1)], &[FileMeta::new("b.csv", 2)]);
        let names: Vec<&str> = merged.iter().map(|meta| meta.name.as_str()).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}
