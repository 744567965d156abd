//! Import reconciliation.
//!
//! Groups resolved rows by cattle id and merges each group into the store:
//! profile fields last-row-wins, insemination events unioned into the
//! existing timeline, pregnancy checks dated against the merged timeline.
//! A failure on one animal is recorded and the remaining animals proceed.

use std::collections::HashMap;

use chrono::NaiveDate;
use herd_map::ResolvedRows;
use herd_model::{
    AnimalRecord, BreedingEvent, CattleId, FieldKey, ImportOutcome, PregnancyCheck,
    PregnancyResult, RowObject,
};
use herd_normalization::{add_days, format_date, parse_count, parse_date};
use tracing::{debug, info, info_span, warn};

use crate::error::ReconcileError;
use crate::options::ReconcileOptions;
use crate::store::AnimalStore;
use crate::timeline::{merge_check, merge_events, rebuild_timeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeKind {
    Created,
    Updated,
}

/// Merges imported rows into an [`AnimalStore`].
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconcile the output of the column mapping resolver.
    ///
    /// Rows the resolver skipped are counted in `skipped_rows`.
    pub fn import<S>(&self, resolved: &ResolvedRows, store: &mut S) -> ImportOutcome
    where
        S: AnimalStore + ?Sized,
    {
        let mut outcome = self.reconcile(&resolved.rows, store);
        outcome.skipped_rows = resolved.skipped.len();
        outcome
    }

    /// Reconcile row objects, one animal at a time.
    pub fn reconcile<S>(&self, rows: &[RowObject], store: &mut S) -> ImportOutcome
    where
        S: AnimalStore + ?Sized,
    {
        let groups = group_by_cattle_id(rows);
        let span = info_span!("reconcile", rows = rows.len(), animals = groups.len());
        let _guard = span.enter();

        let mut outcome = ImportOutcome::default();
        for (cattle_id, group) in groups {
            match self.reconcile_animal(cattle_id, &group, store) {
                Ok(MergeKind::Created) => outcome.new_count += 1,
                Ok(MergeKind::Updated) => outcome.update_count += 1,
                Err(error) => {
                    warn!(cattle_id = %cattle_id, %error, "animal merge failed");
                    outcome.errors.push(format!("{cattle_id}: {error}"));
                }
            }
        }

        info!(
            new = outcome.new_count,
            updated = outcome.update_count,
            failed = outcome.errors.len(),
            "reconciliation complete"
        );
        outcome
    }

    fn reconcile_animal<S>(
        &self,
        cattle_id: &CattleId,
        group: &[&RowObject],
        store: &mut S,
    ) -> Result<MergeKind, ReconcileError>
    where
        S: AnimalStore + ?Sized,
    {
        let existing = store.get(cattle_id)?;
        if let Some(found) = &existing
            && found.cattle_id != *cattle_id
        {
            return Err(ReconcileError::IdMismatch {
                expected: cattle_id.clone(),
                found: found.cattle_id.clone(),
            });
        }
        let kind = if existing.is_some() {
            MergeKind::Updated
        } else {
            MergeKind::Created
        };
        let mut record = existing.unwrap_or_else(|| AnimalRecord::new(cattle_id.clone()));

        merge_profile(&mut record, group);

        let events: Vec<BreedingEvent> = group.iter().flat_map(|row| row_events(row)).collect();
        let added = merge_events(&mut record.insemination_history, events);
        rebuild_timeline(&mut record);

        for row in group {
            let Some(candidate) = CheckCandidate::from_row(row) else {
                continue;
            };
            match candidate.resolve_date(
                &record.insemination_history,
                self.options.expected_check_offset_days,
            ) {
                Some(date) => {
                    let mut check = PregnancyCheck::new(date, candidate.result);
                    check.specialist = candidate.specialist;
                    merge_check(&mut record.uzi_history, check);
                }
                None => debug!(
                    cattle_id = %cattle_id,
                    row_index = row.row_index,
                    "pregnancy check has no derivable date"
                ),
            }
        }
        rebuild_timeline(&mut record);

        if kind == MergeKind::Created {
            record.date_added = Some(self.options.now);
            record.user_id.clone_from(&self.options.user_id);
        }
        if self.options.user_id.is_some() {
            record.last_modified_by.clone_from(&self.options.user_id);
        }
        record.synced = false;

        debug!(
            cattle_id = %cattle_id,
            rows = group.len(),
            events_added = added,
            history = record.insemination_history.len(),
            checks = record.uzi_history.len(),
            "animal merged"
        );
        store.upsert(record)?;
        Ok(kind)
    }
}

/// Rows grouped by cattle id, in order of first appearance.
fn group_by_cattle_id(rows: &[RowObject]) -> Vec<(&CattleId, Vec<&RowObject>)> {
    let mut index: HashMap<&CattleId, usize> = HashMap::new();
    let mut groups: Vec<(&CattleId, Vec<&RowObject>)> = Vec::new();
    for row in rows {
        match index.get(&row.cattle_id) {
            Some(position) => groups[*position].1.push(row),
            None => {
                index.insert(&row.cattle_id, groups.len());
                groups.push((&row.cattle_id, vec![row]));
            }
        }
    }
    groups
}

/// Last non-empty value of a field across the group.
fn last_value<'a>(group: &[&'a RowObject], key: FieldKey) -> Option<&'a str> {
    group.iter().rev().find_map(|row| row.field(key))
}

fn merge_profile(record: &mut AnimalRecord, group: &[&RowObject]) {
    for key in FieldKey::PROFILE {
        if key == FieldKey::Lactation {
            if let Some(lactation) = group
                .iter()
                .rev()
                .find_map(|row| row.field(key).and_then(parse_count))
            {
                record.lactation = Some(lactation);
            }
            continue;
        }
        let Some(value) = last_value(group, key) else {
            continue;
        };
        let target = match key {
            FieldKey::Nickname => &mut record.nickname,
            FieldKey::Group => &mut record.group,
            FieldKey::BirthDate => &mut record.birth_date,
            FieldKey::CalvingDate => &mut record.calving_date,
            FieldKey::Status => &mut record.status,
            FieldKey::ExitDate => &mut record.exit_date,
            FieldKey::DryStartDate => &mut record.dry_start_date,
            FieldKey::Note => &mut record.note,
            FieldKey::ProtocolName => &mut record.protocol.name,
            FieldKey::ProtocolStartDate => &mut record.protocol.start_date,
            _ => continue,
        };
        *target = value.to_string();
    }
}

/// Breeding events carried by one row.
///
/// Pairs win over the scalar `inseminationDate`. A row with exactly one pair
/// is a long-format row, so its attempt, inseminator and code belong to it.
fn row_events(row: &RowObject) -> Vec<BreedingEvent> {
    if !row.insemination_pairs.is_empty() {
        let single = row.insemination_pairs.len() == 1;
        return row
            .insemination_pairs
            .iter()
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let event = BreedingEvent::new(pair.date.trim())
                    .with_bull(pair.bull.trim())
                    .with_attempt_number(pair.attempt_number);
                if single {
                    complete_from_row(event, row)
                } else {
                    event
                }
            })
            .collect();
    }
    match row.field(FieldKey::InseminationDate) {
        Some(date) => {
            let event =
                BreedingEvent::new(date).with_bull(row.field(FieldKey::Bull).unwrap_or_default());
            vec![complete_from_row(event, row)]
        }
        None => Vec::new(),
    }
}

fn complete_from_row(mut event: BreedingEvent, row: &RowObject) -> BreedingEvent {
    if let Some(attempt) = row.field(FieldKey::AttemptNumber).and_then(parse_count) {
        event.attempt_number = Some(attempt);
    }
    if let Some(inseminator) = row.field(FieldKey::Inseminator) {
        event.inseminator = inseminator.to_string();
    }
    if let Some(code) = row.field(FieldKey::Code) {
        event.code = code.to_string();
    }
    event
}

/// A row's pregnancy check before its date is resolved.
#[derive(Debug)]
struct CheckCandidate {
    result: PregnancyResult,
    explicit_date: Option<NaiveDate>,
    /// Latest insemination date carried by the same row.
    row_insemination: Option<NaiveDate>,
    specialist: String,
}

impl CheckCandidate {
    /// `None` unless the row carries a canonical pregnancy result.
    fn from_row(row: &RowObject) -> Option<Self> {
        let result = row
            .field(FieldKey::PregnancyCheckResult)
            .and_then(PregnancyResult::from_normalized)?;
        let pair_dates = row
            .insemination_pairs
            .iter()
            .filter_map(|pair| parse_date(&pair.date));
        let scalar_date = row
            .field(FieldKey::InseminationDate)
            .and_then(parse_date);
        Some(Self {
            result,
            explicit_date: row.field(FieldKey::PregnancyCheckDate).and_then(parse_date),
            row_insemination: pair_dates.chain(scalar_date).max(),
            specialist: row
                .field(FieldKey::PregnancyCheckSpecialist)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Explicit date; else the first timeline insemination after the row's
    /// own; else the latest timeline insemination plus `offset_days`.
    fn resolve_date(&self, history: &[BreedingEvent], offset_days: i64) -> Option<String> {
        if let Some(date) = self.explicit_date {
            return Some(format_date(date));
        }
        let timeline = || history.iter().filter_map(|event| parse_date(&event.date));
        if let Some(own) = self.row_insemination
            && let Some(next) = timeline().filter(|date| *date > own).min()
        {
            return Some(format_date(next));
        }
        let latest = timeline().max()?;
        add_days(&format_date(latest), offset_days)
    }
}
