//! Reading herd book exports into raw rows.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use herd_map::normalize_header;

/// Raw cells of a delimited file.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Widest row (or header) in the file.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Header label for a column, or its 1-based position.
    pub fn column_label(&self, index: usize) -> String {
        self.headers
            .get(index)
            .filter(|header| !header.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }
}

/// Pick the delimiter that occurs most often in the first line.
///
/// Spreadsheet exports in locales with a decimal comma use `;`.
pub fn sniff_delimiter(sample: &str) -> u8 {
    let first_line = sample.lines().next().unwrap_or_default();
    let mut best = (b',', 0usize);
    for delimiter in [b',', b';', b'\t'] {
        let count = first_line.bytes().filter(|byte| *byte == delimiter).count();
        if count > best.1 {
            best = (delimiter, count);
        }
    }
    best.0
}

/// Read a delimited file; rows may have differing widths.
pub fn read_table(path: &Path, has_header: bool, delimiter: Option<u8>) -> Result<SourceTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_table(&text, has_header, delimiter)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_table(text: &str, has_header: bool, delimiter: Option<u8>) -> Result<SourceTable> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(text));
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut table = SourceTable::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed record {}", index + 1))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if has_header && index == 0 {
            table.headers = cells.iter().map(|cell| normalize_header(cell)).collect();
        } else {
            table.rows.push(cells);
        }
    }
    tracing::debug!(
        rows = table.rows.len(),
        columns = table.column_count(),
        delimiter = %char::from(delimiter),
        "source table read"
    );
    Ok(table)
}
