//! Cell coercion helpers shared by every crate that reads manifest cells.

use crate::cell::Cell;

/// Normalize a sales-order cell: trimmed and upper-cased, `""` when empty.
pub fn normalize_so(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        other => other.to_string().trim().to_uppercase(),
    }
}

/// Normalize free text the same way sales orders and barcodes are compared.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Coerce a piece-count cell to a non-negative whole number.
///
/// Numeric parse is tried first, then a leading-integer parse (`"3 pcs"`).
/// Fractional counts are floored; anything unparsable is 0.
pub fn coerce_count(cell: &Cell) -> u32 {
    match cell {
        Cell::Empty => 0,
        Cell::Bool(value) => u32::from(*value),
        Cell::Number(value) => clamp_count(*value),
        Cell::Text(text) => coerce_count_text(text),
    }
}

fn coerce_count_text(text: &str) -> u32 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => clamp_count(value),
        _ => leading_integer(trimmed).map_or(0, |value| clamp_count(value as f64)),
    }
}

fn clamp_count(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    // `as` saturates at u32::MAX
    value.floor() as u32
}

/// Parse an optional sign followed by digits at the start of `text`.
fn leading_integer(text: &str) -> Option<i64> {
    let mut chars = text.char_indices().peekable();
    let mut end = 0;
    if let Some((_, sign)) = chars.peek().copied()
        && (sign == '-' || sign == '+')
    {
        chars.next();
        end = sign.len_utf8();
    }
    let digits_start = end;
    for (idx, ch) in chars {
        if !ch.is_ascii_digit() {
            break;
        }
        end = idx + ch.len_utf8();
    }
    if end == digits_start {
        return None;
    }
    text[..end].parse::<i64>().ok()
}

/// True iff any cell in the row is non-blank after trimming.
pub fn row_has_meaningful_data(row: &[Cell]) -> bool {
    row.iter().any(|cell| !cell.is_blank())
}

/// Parse the numeric part of a weight cell (`"12.5 kg"` → 12.5).
pub fn parse_weight(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(value) if value.is_finite() => Some(*value),
        Cell::Text(text) => {
            let numeric: String = text
                .chars()
                .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
                .collect();
            numeric.parse::<f64>().ok().filter(|value| value.is_finite())
        }
        _ => None,
    }
}
