//! Utility functions for reading source cells.

/// Trims whitespace and stray byte-order marks from a cell.
pub fn normalize_cell(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}').trim()
}

/// Cell at `index`, or the empty string for short rows.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", |value| normalize_cell(value))
}

/// Collapses internal whitespace in a header cell.
pub fn normalize_header(raw: &str) -> String {
    normalize_cell(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
