//! Bounding the size of textual sample cells.

use crate::session::CellValue;

/// Truncates a textual cell to at most `max_length` characters.
///
/// Only text is touched: numbers, booleans, bytes and nulls are returned
/// unchanged. The kept prefix ends on a character boundary and no marker is
/// appended. A string of exactly `max_length` characters is unchanged.
pub fn truncate_cell(value: CellValue, max_length: usize) -> CellValue {
    match value {
        CellValue::Text(text) => CellValue::Text(truncate_str(text, max_length)),
        other => other,
    }
}

/// Truncates every cell of a row independently.
pub fn truncate_row(row: Vec<CellValue>, max_length: usize) -> Vec<CellValue> {
    row.into_iter()
        .map(|cell| truncate_cell(cell, max_length))
        .collect()
}

pub fn truncate_rows(rows: Vec<Vec<CellValue>>, max_length: usize) -> Vec<Vec<CellValue>> {
    rows.into_iter()
        .map(|row| truncate_row(row, max_length))
        .collect()
}

fn truncate_str(mut text: String, max_length: usize) -> String {
    // `nth` is `None` when the string has at most `max_length` characters
    if let Some((byte_index, _)) = text.char_indices().nth(max_length) {
        text.truncate(byte_index);
    }
    text
}
