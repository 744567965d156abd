//! Column mapping resolution.
//!
//! Turns raw rows plus a [`ColumnMapping`] into one [`RowObject`] per usable
//! row. Every mapped cell is normalized according to its field kind. Columns
//! mapped to `inseminationDate` and `bull` are paired positionally so that
//! wide herd books (one row per animal, repeated "date N / bull N" column
//! groups) need no reshaping by the caller.

use std::collections::BTreeMap;

use herd_model::{CattleId, ColumnMapping, FieldKey, FieldKind, InseminationPair, RowObject};
use herd_normalization::{
    is_garbage_cattle_id, normalize_cattle_id, normalize_date, normalize_integer,
    normalize_pregnancy_result, normalize_status,
};
use tracing::{debug, info};

use crate::error::{MappingError, RowSkipped, SkipReason};
use crate::utils::{cell, normalize_cell};

/// Output of [`resolve_rows`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedRows {
    pub rows: Vec<RowObject>,
    pub skipped: Vec<RowSkipped>,
}

impl ResolvedRows {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Normalize one cell for the given field kind.
pub fn normalize_field(kind: FieldKind, raw: &str) -> String {
    let trimmed = normalize_cell(raw);
    if trimmed.is_empty() {
        return String::new();
    }
    match kind {
        FieldKind::Text => trimmed.to_string(),
        FieldKind::Date => normalize_date(trimmed),
        FieldKind::Integer => normalize_integer(trimmed),
        FieldKind::Status => normalize_status(trimmed),
        FieldKind::PregnancyResult => normalize_pregnancy_result(trimmed),
    }
}

/// Check a mapping against the width of the source table.
///
/// Returns every problem found; an empty vector means the mapping is usable.
pub fn validate_mapping(mapping: &ColumnMapping, column_count: usize) -> Vec<MappingError> {
    let mut errors = Vec::new();
    let id_column = mapping.cattle_id_column_index;
    if id_column >= column_count {
        errors.push(MappingError::CattleIdColumnOutOfRange {
            column: id_column,
            column_count,
        });
    }
    if let Some(field) = mapping.columns.get(&id_column) {
        errors.push(MappingError::CattleIdColumnRemapped {
            column: id_column,
            field: *field,
        });
    }

    let mut by_field: BTreeMap<FieldKey, Vec<usize>> = BTreeMap::new();
    for (column, field) in mapping.field_columns() {
        if column >= column_count {
            errors.push(MappingError::ColumnOutOfRange {
                column,
                field,
                column_count,
            });
        }
        by_field.entry(field).or_default().push(column);
    }
    for (field, columns) in by_field {
        let repeatable = matches!(field, FieldKey::InseminationDate | FieldKey::Bull);
        if !repeatable && columns.len() > 1 {
            errors.push(MappingError::DuplicateField { field, columns });
        }
    }
    errors
}

/// Resolve raw rows into row objects keyed by canonical field names.
///
/// Rows without a usable cattle id are skipped and reported, never fatal.
pub fn resolve_rows(rows: &[Vec<String>], mapping: &ColumnMapping) -> ResolvedRows {
    let date_columns = mapping.columns_for(FieldKey::InseminationDate);
    let bull_columns = mapping.columns_for(FieldKey::Bull);
    if !date_columns.is_empty()
        && !bull_columns.is_empty()
        && date_columns.len() != bull_columns.len()
    {
        debug!(
            date_columns = date_columns.len(),
            bull_columns = bull_columns.len(),
            "unbalanced insemination column groups"
        );
    }

    let mut resolved = ResolvedRows::default();
    for (row_index, row) in rows.iter().enumerate() {
        match resolve_row(row_index, row, mapping, &date_columns, &bull_columns) {
            Ok(object) => resolved.rows.push(object),
            Err(skipped) => {
                debug!(row_index, reason = %skipped, "row skipped");
                resolved.skipped.push(skipped);
            }
        }
    }
    info!(
        rows = rows.len(),
        resolved = resolved.rows.len(),
        skipped = resolved.skipped.len(),
        "rows resolved"
    );
    resolved
}

fn resolve_row(
    row_index: usize,
    row: &[String],
    mapping: &ColumnMapping,
    date_columns: &[usize],
    bull_columns: &[usize],
) -> Result<RowObject, RowSkipped> {
    let raw_id = cell(row, mapping.cattle_id_column_index);
    let skip = |reason| RowSkipped { row_index, reason };
    if raw_id.is_empty() {
        return Err(skip(SkipReason::MissingCattleId));
    }
    if is_garbage_cattle_id(raw_id) {
        return Err(skip(SkipReason::GarbageCattleId(raw_id.to_string())));
    }
    let cattle_id = CattleId::new(normalize_cattle_id(raw_id))
        .map_err(|_| skip(SkipReason::MissingCattleId))?;

    let mut object = RowObject::new(row_index, cattle_id);
    for (column, field) in mapping.field_columns() {
        if matches!(field, FieldKey::InseminationDate | FieldKey::Bull) {
            continue;
        }
        let value = normalize_field(field.kind(), cell(row, column));
        if !value.is_empty() {
            object.fields.entry(field).or_insert(value);
        }
    }

    let pair_count = date_columns.len().max(bull_columns.len());
    for position in 0..pair_count {
        let date = date_columns
            .get(position)
            .map(|column| normalize_field(FieldKind::Date, cell(row, *column)))
            .unwrap_or_default();
        let bull = bull_columns
            .get(position)
            .map(|column| normalize_field(FieldKind::Text, cell(row, *column)))
            .unwrap_or_default();
        let pair = InseminationPair {
            date,
            bull,
            attempt_number: position as u32 + 1,
        };
        if !pair.is_empty() {
            object.insemination_pairs.push(pair);
        }
    }

    if let [column] = date_columns {
        let date = normalize_field(FieldKind::Date, cell(row, *column));
        if !date.is_empty() {
            object.fields.insert(FieldKey::InseminationDate, date);
        }
    }
    if let [column] = bull_columns {
        let bull = normalize_field(FieldKind::Text, cell(row, *column));
        if !bull.is_empty() {
            object.fields.insert(FieldKey::Bull, bull);
        }
    }

    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn empty_id_row_is_skipped() {
        let mapping = ColumnMapping::new(0).with_column(1, FieldKey::Group);
        let rows = vec![row(&["", "A"]), row(&["  ", "B"]), row(&["17", "C"])];
        let resolved = resolve_rows(&rows, &mapping);
        assert_eq!(resolved.rows.len(), 1);
        assert_eq!(resolved.skipped_count(), 2);
        assert_eq!(resolved.skipped[0].reason, SkipReason::MissingCattleId);
        assert_eq!(resolved.rows[0].row_index, 2);
    }

    #[test]
    fn garbage_id_row_is_skipped() {
        let mapping = ColumnMapping::new(0);
        let resolved = resolve_rows(&[row(&["Итого:"])], &mapping);
        assert!(resolved.rows.is_empty());
        assert_eq!(
            resolved.skipped[0].reason,
            SkipReason::GarbageCattleId("Итого:".to_string())
        );
    }

    #[test]
    fn fields_are_normalized_by_kind() {
        let mapping = ColumnMapping::new(0)
            .with_column(1, FieldKey::CalvingDate)
            .with_column(2, FieldKey::Lactation)
            .with_column(3, FieldKey::Status)
            .with_column(4, FieldKey::PregnancyCheckResult)
            .with_column(5, FieldKey::Nickname);
        let resolved = resolve_rows(
            &[row(&["1042.0", "10.01.24", "2.0", "осем", "не стел", " Зорька "])],
            &mapping,
        );
        let object = &resolved.rows[0];
        assert_eq!(object.cattle_id.as_str(), "1042");
        assert_eq!(object.field(FieldKey::CalvingDate), Some("2024-01-10"));
        assert_eq!(object.field(FieldKey::Lactation), Some("2"));
        assert_eq!(object.field(FieldKey::Status), Some("Inseminated"));
        assert_eq!(object.field(FieldKey::PregnancyCheckResult), Some("NotPregnant"));
        assert_eq!(object.field(FieldKey::Nickname), Some("Зорька"));
    }

    #[test]
    fn non_numeric_integer_cell_is_dropped() {
        let mapping = ColumnMapping::new(0).with_column(1, FieldKey::Lactation);
        let resolved = resolve_rows(&[row(&["5", "heifer"])], &mapping);
        assert_eq!(resolved.rows[0].field(FieldKey::Lactation), None);
    }

    #[test]
    fn wide_format_pairs_dates_and_bulls() {
        let mapping = ColumnMapping::new(0)
            .with_column(1, FieldKey::InseminationDate)
            .with_column(2, FieldKey::Bull)
            .with_column(3, FieldKey::InseminationDate)
            .with_column(4, FieldKey::Bull)
            .with_column(5, FieldKey::InseminationDate)
            .with_column(6, FieldKey::Bull);
        let resolved = resolve_rows(
            &[row(&["A1", "01.02.2024", "B1", "", "", "25.02.2024", ""])],
            &mapping,
        );
        let pairs = &resolved.rows[0].insemination_pairs;
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].date, "2024-02-01");
        assert_eq!(pairs[0].bull, "B1");
        assert_eq!(pairs[0].attempt_number, 1);
        assert_eq!(pairs[1].date, "2024-02-25");
        assert_eq!(pairs[1].bull, "");
        assert_eq!(pairs[1].attempt_number, 3);
        assert_eq!(resolved.rows[0].field(FieldKey::InseminationDate), None);
    }

    #[test]
    fn bull_without_date_keeps_pair() {
        let mapping = ColumnMapping::new(0)
            .with_column(1, FieldKey::InseminationDate)
            .with_column(2, FieldKey::Bull);
        let resolved = resolve_rows(&[row(&["A1", "", "B7"])], &mapping);
        let pairs = &resolved.rows[0].insemination_pairs;
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].bull, "B7");
    }

    #[test]
    fn single_date_column_sets_scalar_field() {
        let mapping = ColumnMapping::new(0)
            .with_column(1, FieldKey::InseminationDate)
            .with_column(2, FieldKey::Bull);
        let resolved = resolve_rows(&[row(&["A1", "2024-02-01", "B1"])], &mapping);
        let object = &resolved.rows[0];
        assert_eq!(object.field(FieldKey::InseminationDate), Some("2024-02-01"));
        assert_eq!(object.field(FieldKey::Bull), Some("B1"));
    }

    #[test]
    fn validate_reports_mapping_problems() {
        let mapping = ColumnMapping::new(0)
            .with_column(0, FieldKey::Nickname)
            .with_column(2, FieldKey::Group)
            .with_column(3, FieldKey::Group)
            .with_column(9, FieldKey::Bull);
        let errors = validate_mapping(&mapping, 4);
        assert!(errors.contains(&MappingError::CattleIdColumnRemapped {
            column: 0,
            field: FieldKey::Nickname,
        }));
        assert!(errors.contains(&MappingError::ColumnOutOfRange {
            column: 9,
            field: FieldKey::Bull,
            column_count: 4,
        }));
        assert!(errors.contains(&MappingError::DuplicateField {
            field: FieldKey::Group,
            columns: vec![2, 3],
        }));
    }

    #[test]
    fn validate_accepts_repeated_pair_columns() {
        let mapping = ColumnMapping::new(0)
            .with_column(1, FieldKey::InseminationDate)
            .with_column(2, FieldKey::Bull)
            .with_column(3, FieldKey::InseminationDate)
            .with_column(4, FieldKey::Bull);
        assert!(validate_mapping(&mapping, 5).is_empty());
    }
}
