//! Spreadsheet cell values as produced by the workbook parser.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a manifest sheet.
///
/// Serialized untagged so a remote payload (`null`, strings, numbers and
/// booleans inside a 2-D array) round-trips without a wrapper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from raw text, mapping blank input to [`Cell::Empty`].
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches('\u{feff}');
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// True when the cell carries nothing a person would read as data.
    ///
    /// Numbers count as data unless they are NaN.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Bool(_) => false,
            Cell::Number(value) => value.is_nan(),
            Cell::Text(text) => text.trim().is_empty(),
        }
    }

    /// Text form of the cell, `None` for [`Cell::Empty`].
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            other => Some(other.to_string()),
        }
    }

    /// Display form used by status and report output: blank cells render as `-`.
    pub fn display_or_dash(&self) -> String {
        if self.is_blank() {
            "-".to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::Number(value) => write!(f, "{value}"),
            Cell::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(252101.0).to_string(), "252101");
        assert_eq!(Cell::Number(1.5).to_string(), "1.5");
    }

    #[test]
    fn blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text("   ".into()).is_blank());
        assert!(Cell::Number(f64::NAN).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert!(!Cell::Bool(false).is_blank());
    }

    #[test]
    fn untagged_json_round_trip() {
        let cells: Vec<Cell> =
            serde_json::from_str(r#"[null, "SO100", 2, true]"#).expect("parse cells");
        assert_eq!(
            cells,
            vec![
                Cell::Empty,
                Cell::Text("SO100".into()),
                Cell::Number(2.0),
                Cell::Bool(true)
            ]
        );
    }
}
