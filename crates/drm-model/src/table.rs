//! Manifest tables and the typed row view the core works with.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::coerce::{coerce_count, parse_weight, row_has_meaningful_data};
use crate::ids::SalesOrder;

/// Fixed column positions of a runsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub run: usize,
    pub drop: usize,
    pub zone: usize,
    pub date: usize,
    pub sales_order: usize,
    pub name: usize,
    pub address: usize,
    pub suburb: usize,
    pub postcode: usize,
    pub fp: usize,
    pub ch: usize,
    pub fl: usize,
    pub weight: usize,
    pub kind: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            run: 0,
            drop: 1,
            zone: 2,
            date: 3,
            sales_order: 4,
            name: 5,
            address: 6,
            suburb: 7,
            postcode: 8,
            fp: 10,
            ch: 11,
            fl: 12,
            weight: 13,
            kind: 14,
        }
    }
}

/// Header labels in display order, matching [`ColumnLayout::display_positions`].
pub const DISPLAY_HEADERS: [&str; 14] = [
    "Run",
    "Drop",
    "Zone",
    "FP",
    "Type",
    "Sales Order",
    "Name",
    "Address",
    "Suburb",
    "Postcode",
    "CH",
    "FL",
    "Weight",
    "Date",
];

impl ColumnLayout {
    /// Source column for each entry of [`DISPLAY_HEADERS`].
    pub fn display_positions(&self) -> [usize; 14] {
        [
            self.run,
            self.drop,
            self.zone,
            self.fp,
            self.kind,
            self.sales_order,
            self.name,
            self.address,
            self.suburb,
            self.postcode,
            self.ch,
            self.fl,
            self.weight,
            self.date,
        ]
    }
}

/// A sheet: one header row plus data rows.
///
/// Rows without any meaningful cell are dropped on construction, so data-row
/// indices always refer to real rows. Serialized as a single 2-D array with
/// the header first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct ManifestTable {
    header: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
}

impl ManifestTable {
    pub fn new(header: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        let rows = rows
            .into_iter()
            .filter(|row| row_has_meaningful_data(row))
            .collect();
        Self { header, rows }
    }

    pub fn header(&self) -> &[Cell] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there is neither a header nor any data row.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }

    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn has_header(&self) -> bool {
        row_has_meaningful_data(&self.header)
    }

    /// Position of the header cell whose trimmed label matches `label`, ignoring case.
    pub fn header_position(&self, label: &str) -> Option<usize> {
        let wanted = label.trim().to_lowercase();
        self.header
            .iter()
            .position(|cell| cell.to_string().trim().to_lowercase() == wanted)
    }

    /// Typed view over the data rows.
    pub fn records<'a>(
        &'a self,
        layout: &'a ColumnLayout,
    ) -> impl Iterator<Item = ManifestRow<'a>> + 'a {
        self.rows
            .iter()
            .enumerate()
            .map(move |(index, cells)| ManifestRow::from_cells(layout, index, cells))
    }

    pub fn record<'a>(&'a self, layout: &ColumnLayout, index: usize) -> Option<ManifestRow<'a>> {
        self.rows
            .get(index)
            .map(|cells| ManifestRow::from_cells(layout, index, cells))
    }

    pub fn into_parts(self) -> (Vec<Cell>, Vec<Vec<Cell>>) {
        (self.header, self.rows)
    }
}

impl From<Vec<Vec<Cell>>> for ManifestTable {
    fn from(mut value: Vec<Vec<Cell>>) -> Self {
        if value.is_empty() {
            return Self::default();
        }
        let rows = value.split_off(1);
        let header = value.pop().unwrap_or_default();
        Self::new(header, rows)
    }
}

impl From<ManifestTable> for Vec<Vec<Cell>> {
    fn from(value: ManifestTable) -> Self {
        if value.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(value.rows.len() + 1);
        out.push(value.header);
        out.extend(value.rows);
        out
    }
}

/// One data row read through a [`ColumnLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestRow<'a> {
    /// Zero-based data-row index (header excluded).
    pub index: usize,
    pub run: Option<String>,
    pub drop: Option<String>,
    pub sales_order: Option<SalesOrder>,
    pub fp: u32,
    pub ch: u32,
    pub fl: u32,
    pub weight: Option<f64>,
    pub cells: &'a [Cell],
}

impl<'a> ManifestRow<'a> {
    pub fn from_cells(layout: &ColumnLayout, index: usize, cells: &'a [Cell]) -> Self {
        let cell = |position: usize| cells.get(position).unwrap_or(&Cell::Empty);
        Self {
            index,
            run: cell(layout.run).as_text(),
            drop: cell(layout.drop).as_text(),
            sales_order: SalesOrder::from_cell(cell(layout.sales_order)),
            fp: coerce_count(cell(layout.fp)),
            ch: coerce_count(cell(layout.ch)),
            fl: coerce_count(cell(layout.fl)),
            weight: parse_weight(cell(layout.weight)),
            cells,
        }
    }

    /// Physical items on this row: FP + CH + FL.
    pub fn pieces(&self) -> u32 {
        self.fp.saturating_add(self.ch).saturating_add(self.fl)
    }

    pub fn cell(&self, position: usize) -> &Cell {
        self.cells.get(position).unwrap_or(&Cell::Empty)
    }
}

/// Routing fields of a sales order, `-` when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub run: String,
    pub drop: String,
}

impl Default for RouteInfo {
    fn default() -> Self {
        Self {
            run: "-".to_string(),
            drop: "-".to_string(),
        }
    }
}

impl RouteInfo {
    pub fn from_row(row: &ManifestRow<'_>) -> Self {
        Self {
            run: row.run.clone().unwrap_or_else(|| "-".to_string()),
            drop: row.drop.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}
