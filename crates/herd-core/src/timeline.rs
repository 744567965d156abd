//! Per-animal breeding timeline maintenance.
//!
//! Everything here operates on a single [`AnimalRecord`]. The insemination
//! history is kept sorted by date (undated events last, stable), and the
//! derived event fields are recomputed from scratch after every change:
//!
//! - `lactation`: the record's explicit lactation for every event, else a
//!   two-lactation split around `calvingDate` (before calving is 1, on or
//!   after is 2). The split is a heuristic and cannot tell a third lactation
//!   from a second.
//! - `attemptNumber`: when the source gave none, the event's ordinal within
//!   its lactation. Such attempts are marked `attempt_inferred` and follow the
//!   event as earlier inseminations arrive.
//! - `daysFromPrevious`: whole days since the previous event, only when both
//!   events share a lactation and both dates parse.

use chrono::NaiveDate;
use herd_model::{AnimalRecord, BreedingEvent, PregnancyCheck};
use herd_normalization::{days_between, parse_date};

fn date_sort_key(raw: &str) -> (bool, Option<NaiveDate>) {
    let parsed = parse_date(raw);
    (parsed.is_none(), parsed)
}

/// Stable sort by date with unparsable dates last.
pub fn sort_history(events: &mut [BreedingEvent]) {
    events.sort_by_key(|event| date_sort_key(&event.date));
}

/// Stable sort of pregnancy checks by date with unparsable dates last.
pub fn sort_checks(checks: &mut [PregnancyCheck]) {
    checks.sort_by_key(|check| date_sort_key(&check.date));
}

/// Lactation an event belongs to.
pub fn infer_lactation(
    explicit: Option<u32>,
    calving_date: Option<NaiveDate>,
    event_date: Option<NaiveDate>,
) -> Option<u32> {
    if explicit.is_some() {
        return explicit;
    }
    match (calving_date, event_date) {
        (Some(calving), Some(date)) if date < calving => Some(1),
        (Some(_), Some(_)) => Some(2),
        _ => None,
    }
}

/// Recompute lactation, attempt numbers and intervals over a sorted history.
pub fn derive_event_fields(
    events: &mut [BreedingEvent],
    explicit_lactation: Option<u32>,
    calving_date: &str,
) {
    let calving = parse_date(calving_date);
    for event in events.iter_mut() {
        event.lactation = infer_lactation(explicit_lactation, calving, parse_date(&event.date));
    }

    let mut ordinal = 0u32;
    for index in 0..events.len() {
        let same_lactation = index > 0 && events[index - 1].lactation == events[index].lactation;
        ordinal = if same_lactation { ordinal + 1 } else { 1 };
        let event = &mut events[index];
        if event.attempt_number.is_none() || event.attempt_inferred {
            event.attempt_number = Some(ordinal);
            event.attempt_inferred = true;
        }
        events[index].days_from_previous = if same_lactation {
            days_between(&events[index - 1].date, &events[index].date)
        } else {
            None
        };
    }
}

/// Days from the nearest insemination strictly before `check_date`.
pub fn days_from_insemination(events: &[BreedingEvent], check_date: &str) -> Option<i64> {
    let check = parse_date(check_date)?;
    let previous = events
        .iter()
        .filter_map(|event| parse_date(&event.date))
        .filter(|date| *date < check)
        .max()?;
    Some((check - previous).num_days())
}

/// Merge `incoming` into `history`, deduplicating on `(date, bull)`.
///
/// A duplicate does not add an event; its non-empty fields replace those of
/// the event already present. Returns the number of events added.
pub fn merge_events(
    history: &mut Vec<BreedingEvent>,
    incoming: impl IntoIterator<Item = BreedingEvent>,
) -> usize {
    let mut added = 0;
    for event in incoming {
        let existing = history
            .iter_mut()
            .find(|present| present.dedup_key() == event.dedup_key());
        match existing {
            Some(present) => merge_event_fields(present, event),
            None => {
                history.push(event);
                added += 1;
            }
        }
    }
    added
}

fn merge_event_fields(present: &mut BreedingEvent, incoming: BreedingEvent) {
    if incoming.attempt_number.is_some() && !incoming.attempt_inferred {
        present.attempt_number = incoming.attempt_number;
        present.attempt_inferred = false;
    }
    if !incoming.inseminator.trim().is_empty() {
        present.inseminator = incoming.inseminator;
    }
    if !incoming.code.trim().is_empty() {
        present.code = incoming.code;
    }
}

/// Append a check unless one with the same `(date, result)` exists.
pub fn merge_check(checks: &mut Vec<PregnancyCheck>, check: PregnancyCheck) -> bool {
    if checks
        .iter()
        .any(|present| present.dedup_key() == check.dedup_key())
    {
        return false;
    }
    checks.push(check);
    true
}

/// Latest check by date; among equal dates the one recorded last wins.
pub fn latest_check(checks: &[PregnancyCheck]) -> Option<&PregnancyCheck> {
    checks
        .iter()
        .filter_map(|check| parse_date(&check.date).map(|date| (date, check)))
        .max_by_key(|(date, _)| *date)
        .map(|(_, check)| check)
}

/// Re-derive every computed field of a record.
///
/// Sorts both histories, recomputes event and check fields, mirrors the last
/// insemination and lets the latest pregnancy check decide the status.
pub fn rebuild_timeline(record: &mut AnimalRecord) {
    sort_history(&mut record.insemination_history);
    derive_event_fields(
        &mut record.insemination_history,
        record.lactation,
        &record.calving_date,
    );

    sort_checks(&mut record.uzi_history);
    for check in &mut record.uzi_history {
        check.days_from_insemination =
            days_from_insemination(&record.insemination_history, &check.date);
    }

    record.mirror_last_insemination();
    if let Some(check) = latest_check(&record.uzi_history) {
        record.status = check.result.implied_status().to_string();
    }
}

/// Direct entry of one insemination. Returns `false` for a duplicate.
pub fn add_insemination(record: &mut AnimalRecord, event: BreedingEvent) -> bool {
    let added = merge_events(&mut record.insemination_history, [event]) > 0;
    rebuild_timeline(record);
    added
}

/// Direct entry of one pregnancy check. Returns `false` for a duplicate.
pub fn add_pregnancy_check(record: &mut AnimalRecord, check: PregnancyCheck) -> bool {
    let added = merge_check(&mut record.uzi_history, check);
    rebuild_timeline(record);
    added
}

#[cfg(test)]
mod tests {
    use herd_model::{CattleId, PregnancyResult, status};

    use super::*;

    fn record() -> AnimalRecord {
        AnimalRecord::new(CattleId::new("A1").unwrap())
    }

    fn dates(record: &AnimalRecord) -> Vec<&str> {
        record
            .insemination_history
            .iter()
            .map(|event| event.date.as_str())
            .collect()
    }

    #[test]
    fn undated_events_sort_last_in_input_order() {
        let mut events = vec![
            BreedingEvent::new("весной").with_bull("X"),
            BreedingEvent::new("2024-03-01"),
            BreedingEvent::new("").with_bull("Y"),
            BreedingEvent::new("2024-01-15"),
        ];
        sort_history(&mut events);
        let order: Vec<&str> = events.iter().map(|event| event.date.as_str()).collect();
        assert_eq!(order, vec!["2024-01-15", "2024-03-01", "весной", ""]);
    }

    #[test]
    fn lactation_split_around_calving() {
        let calving = NaiveDate::from_ymd_opt(2024, 1, 10);
        let before = NaiveDate::from_ymd_opt(2023, 4, 1);
        let same_day = calving;
        assert_eq!(infer_lactation(None, calving, before), Some(1));
        assert_eq!(infer_lactation(None, calving, same_day), Some(2));
        assert_eq!(infer_lactation(None, None, before), None);
        assert_eq!(infer_lactation(Some(3), calving, before), Some(3));
    }

    #[test]
    fn interval_is_blank_across_lactations() {
        let mut events = vec![
            BreedingEvent::new("2023-12-20"),
            BreedingEvent::new("2024-02-01"),
            BreedingEvent::new("2024-02-25"),
        ];
        derive_event_fields(&mut events, None, "2024-01-10");
        let intervals: Vec<Option<i64>> =
            events.iter().map(|event| event.days_from_previous).collect();
        assert_eq!(intervals, vec![None, None, Some(24)]);
        let attempts: Vec<Option<u32>> = events.iter().map(|event| event.attempt_number).collect();
        assert_eq!(attempts, vec![Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn interval_needs_both_dates() {
        let mut events = vec![BreedingEvent::new("2024-02-01"), BreedingEvent::new("позже")];
        derive_event_fields(&mut events, Some(2), "");
        assert_eq!(events[1].days_from_previous, None);
    }

    #[test]
    fn existing_attempt_numbers_are_kept() {
        let mut events = vec![BreedingEvent::new("2024-02-01").with_attempt_number(4)];
        derive_event_fields(&mut events, Some(2), "");
        assert_eq!(events[0].attempt_number, Some(4));
    }

    #[test]
    fn inferred_attempts_follow_earlier_arrivals() {
        let mut record = record();
        record.calving_date = "2024-01-10".to_string();
        add_insemination(&mut record, BreedingEvent::new("2024-02-25").with_bull("B2"));
        assert_eq!(record.attempt_number, Some(1));

        add_insemination(&mut record, BreedingEvent::new("2024-02-01").with_bull("B1"));
        let attempts: Vec<Option<u32>> = record
            .insemination_history
            .iter()
            .map(|event| event.attempt_number)
            .collect();
        assert_eq!(attempts, vec![Some(1), Some(2)]);
        assert_eq!(record.attempt_number, Some(2));
    }

    #[test]
    fn source_attempt_replaces_inferred_one() {
        let mut record = record();
        add_insemination(&mut record, BreedingEvent::new("2024-02-25").with_bull("B2"));
        assert!(record.insemination_history[0].attempt_inferred);

        add_insemination(
            &mut record,
            BreedingEvent::new("2024-02-25")
                .with_bull("B2")
                .with_attempt_number(3),
        );
        add_insemination(&mut record, BreedingEvent::new("2024-02-01").with_bull("B1"));
        assert_eq!(record.insemination_history[1].attempt_number, Some(3));
        assert!(!record.insemination_history[1].attempt_inferred);
    }

    #[test]
    fn duplicate_event_enriches_existing() {
        let mut history = vec![BreedingEvent::new("2024-02-01").with_bull("B1")];
        let added = merge_events(
            &mut history,
            [
                BreedingEvent::new("2024-02-01")
                    .with_bull(" B1 ")
                    .with_inseminator("Petrova"),
                BreedingEvent::new("2024-02-01").with_bull("B2"),
            ],
        );
        assert_eq!(added, 1);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].inseminator, "Petrova");
    }

    #[test]
    fn days_from_insemination_uses_nearest_earlier_event() {
        let events = vec![
            BreedingEvent::new("2024-02-01"),
            BreedingEvent::new("2024-02-25"),
            BreedingEvent::new("2024-04-01"),
        ];
        assert_eq!(days_from_insemination(&events, "2024-03-28"), Some(32));
        assert_eq!(days_from_insemination(&events, "2024-02-25"), Some(24));
        assert_eq!(days_from_insemination(&events, "2024-01-01"), None);
    }

    #[test]
    fn direct_entry_keeps_history_sorted_and_mirrored() {
        let mut record = record();
        record.calving_date = "2024-01-10".to_string();
        assert!(add_insemination(
            &mut record,
            BreedingEvent::new("2024-02-25").with_bull("B2")
        ));
        assert!(add_insemination(
            &mut record,
            BreedingEvent::new("2024-02-01").with_bull("B1")
        ));
        assert!(!add_insemination(
            &mut record,
            BreedingEvent::new("2024-02-01").with_bull("B1")
        ));
        assert_eq!(dates(&record), vec!["2024-02-01", "2024-02-25"]);
        assert_eq!(record.insemination_date, "2024-02-25");
        assert_eq!(record.bull, "B2");
        assert_eq!(record.insemination_history[1].days_from_previous, Some(24));
    }

    #[test]
    fn latest_check_sets_status() {
        let mut record = record();
        record.status = status::INSEMINATED.to_string();
        add_insemination(&mut record, BreedingEvent::new("2024-02-01"));
        add_pregnancy_check(
            &mut record,
            PregnancyCheck::new("2024-03-20", PregnancyResult::Pregnant),
        );
        add_pregnancy_check(
            &mut record,
            PregnancyCheck::new("2024-03-04", PregnancyResult::NotPregnant),
        );
        assert_eq!(record.status, status::PREGNANT);
        assert_eq!(record.uzi_history[0].date, "2024-03-04");
        assert_eq!(record.uzi_history[0].days_from_insemination, Some(32));
        assert!(!add_pregnancy_check(
            &mut record,
            PregnancyCheck::new("2024-03-20", PregnancyResult::Pregnant),
        ));
    }
}
