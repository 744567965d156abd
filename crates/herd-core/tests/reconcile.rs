//! Reconciliation of imported rows into animal records.

use chrono::{TimeZone, Utc};
use herd_core::{AnimalStore, MemoryStore, ReconcileOptions, Reconciler, StoreError};
use herd_map::resolve_rows;
use herd_model::{
    AnimalRecord, BreedingEvent, CattleId, ColumnMapping, FieldKey, PregnancyResult, RowObject,
    status,
};
use proptest::prelude::*;

fn id(value: &str) -> CattleId {
    CattleId::new(value).unwrap()
}

fn row(index: usize, cattle_id: &str) -> RowObject {
    RowObject::new(index, id(cattle_id))
}

fn reconciler() -> Reconciler {
    Reconciler::new(
        ReconcileOptions::default()
            .with_user_id("zootech")
            .with_now(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()),
    )
}

fn a1_rows() -> Vec<RowObject> {
    vec![
        row(0, "A1")
            .with_field(FieldKey::CalvingDate, "2024-01-10")
            .with_pair("2024-02-01", "B1"),
        row(1, "A1").with_pair("2024-02-25", "B2"),
    ]
}

#[test]
fn a1_example() {
    let mut store = MemoryStore::new();
    let outcome = reconciler().reconcile(&a1_rows(), &mut store);
    assert_eq!(outcome.new_count, 1);
    assert_eq!(outcome.update_count, 0);
    assert!(outcome.errors.is_empty());

    let record = store.get(&id("A1")).unwrap().unwrap();
    let history = &record.insemination_history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].days_from_previous, None);
    assert_eq!(history[1].days_from_previous, Some(24));
    assert!(history.iter().all(|event| event.lactation == Some(2)));
    assert_eq!(record.insemination_date, "2024-02-25");
    assert_eq!(record.bull, "B2");
    assert_eq!(record.user_id.as_deref(), Some("zootech"));
    assert_eq!(record.last_modified_by.as_deref(), Some("zootech"));
    assert!(record.date_added.is_some());
    assert!(!record.synced);
}

#[test]
fn explicit_lactation_applies_to_every_event() {
    let rows = vec![
        row(0, "A7")
            .with_field(FieldKey::Lactation, "2")
            .with_field(FieldKey::CalvingDate, "2024-01-10")
            .with_pair("2023-11-01", "B1")
            .with_pair("2024-02-25", "B2"),
    ];
    let mut store = MemoryStore::new();
    reconciler().reconcile(&rows, &mut store);
    let record = store.get(&id("A7")).unwrap().unwrap();
    assert!(
        record
            .insemination_history
            .iter()
            .all(|event| event.lactation == Some(2))
    );
    assert_eq!(record.insemination_history[1].days_from_previous, Some(116));
}

#[test]
fn explicit_check_date_preferred_over_offset() {
    let rows = vec![
        row(0, "C1")
            .with_pair("2024-02-01", "B1")
            .with_field(FieldKey::PregnancyCheckResult, "Pregnant")
            .with_field(FieldKey::PregnancyCheckDate, "2024-03-10"),
        row(1, "C2")
            .with_pair("2024-02-01", "B1")
            .with_field(FieldKey::PregnancyCheckResult, "Pregnant"),
    ];
    let mut store = MemoryStore::new();
    reconciler().reconcile(&rows, &mut store);

    let explicit = store.get(&id("C1")).unwrap().unwrap();
    assert_eq!(explicit.uzi_history.len(), 1);
    assert_eq!(explicit.uzi_history[0].date, "2024-03-10");
    assert_eq!(explicit.uzi_history[0].days_from_insemination, Some(38));
    assert_eq!(explicit.status, status::PREGNANT);

    let fallback = store.get(&id("C2")).unwrap().unwrap();
    assert_eq!(fallback.uzi_history[0].date, "2024-03-04");
    assert_eq!(fallback.uzi_history[0].result, PregnancyResult::Pregnant);
}

#[test]
fn negative_check_overrides_profile_status() {
    let rows = vec![
        row(0, "D1")
            .with_field(FieldKey::Status, status::PREGNANT)
            .with_pair("2024-02-01", "B1")
            .with_field(FieldKey::PregnancyCheckResult, "NotPregnant")
            .with_field(FieldKey::PregnancyCheckDate, "2024-03-05"),
    ];
    let mut store = MemoryStore::new();
    reconciler().reconcile(&rows, &mut store);
    assert_eq!(store.get(&id("D1")).unwrap().unwrap().status, status::OPEN);
}

#[test]
fn merge_with_existing_record() {
    let mut existing = AnimalRecord::new(id("A1"));
    existing.nickname = "Зорька".to_string();
    existing.calving_date = "2024-01-10".to_string();
    existing.insemination_history = vec![BreedingEvent::new("2024-02-01").with_bull("B1")];
    let mut store = MemoryStore::from_records([existing]);

    let rows = vec![
        row(0, "A1").with_pair("2024-02-25", "B2"),
        row(1, "A1").with_pair("2024-02-01", "B1"),
    ];
    let outcome = reconciler().reconcile(&rows, &mut store);
    assert_eq!(outcome.new_count, 0);
    assert_eq!(outcome.update_count, 1);

    let record = store.get(&id("A1")).unwrap().unwrap();
    assert_eq!(record.nickname, "Зорька");
    assert_eq!(record.calving_date, "2024-01-10");
    assert_eq!(record.insemination_history.len(), 2);
    assert_eq!(record.insemination_history[1].days_from_previous, Some(24));
    assert_eq!(record.user_id, None);
    assert_eq!(record.last_modified_by.as_deref(), Some("zootech"));
}

#[test]
fn undated_events_are_kept_last() {
    let rows = vec![
        row(0, "E1")
            .with_pair("", "B9")
            .with_pair("2024-03-01", "B2")
            .with_pair("2024-01-20", "B1"),
    ];
    let mut store = MemoryStore::new();
    reconciler().reconcile(&rows, &mut store);
    let record = store.get(&id("E1")).unwrap().unwrap();
    let bulls: Vec<&str> = record
        .insemination_history
        .iter()
        .map(|event| event.bull.as_str())
        .collect();
    assert_eq!(bulls, vec!["B1", "B2", "B9"]);
    assert_eq!(record.bull, "B9");
}

#[test]
fn later_import_of_earlier_insemination_renumbers_attempts() {
    let mut store = MemoryStore::new();
    let first = vec![
        row(0, "S1")
            .with_field(FieldKey::CalvingDate, "2024-01-10")
            .with_field(FieldKey::InseminationDate, "2024-02-25")
            .with_field(FieldKey::Bull, "B2"),
    ];
    let second = vec![
        row(0, "S1")
            .with_field(FieldKey::InseminationDate, "2024-02-01")
            .with_field(FieldKey::Bull, "B1"),
    ];
    reconciler().reconcile(&first, &mut store);
    reconciler().reconcile(&second, &mut store);

    let record = store.get(&id("S1")).unwrap().unwrap();
    let attempts: Vec<Option<u32>> = record
        .insemination_history
        .iter()
        .map(|event| event.attempt_number)
        .collect();
    assert_eq!(attempts, vec![Some(1), Some(2)]);
    assert_eq!(record.attempt_number, Some(2));
    assert_eq!(record.bull, "B2");
}

#[test]
fn skipped_rows_are_counted_not_failed() {
    let mapping = ColumnMapping::new(0)
        .with_column(1, FieldKey::InseminationDate)
        .with_column(2, FieldKey::Bull);
    let raw: Vec<Vec<String>> = vec![
        vec!["".into(), "01.02.2024".into(), "B1".into()],
        vec!["A1".into(), "01.02.2024".into(), "B1".into()],
    ];
    let resolved = resolve_rows(&raw, &mapping);
    let mut store = MemoryStore::new();
    let outcome = reconciler().import(&resolved, &mut store);
    assert_eq!(outcome.skipped_rows, 1);
    assert_eq!(outcome.new_count, 1);
    assert!(outcome.errors.is_empty());
}

#[test]
fn empty_import_reports_aggregate_message() {
    let mut store = MemoryStore::new();
    let outcome = reconciler().reconcile(&[], &mut store);
    assert_eq!(
        outcome.summary_message().as_deref(),
        Some("no records were created or updated")
    );
}

/// Store that refuses to write one id.
struct FlakyStore {
    inner: MemoryStore,
    reject: CattleId,
}

impl AnimalStore for FlakyStore {
    fn get(&self, id: &CattleId) -> Result<Option<AnimalRecord>, StoreError> {
        self.inner.get(id)
    }

    fn upsert(&mut self, record: AnimalRecord) -> Result<(), StoreError> {
        if record.cattle_id == self.reject {
            return Err(StoreError::Io {
                operation: "write",
                path: "herd.json".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        self.inner.upsert(record)
    }

    fn delete(&mut self, id: &CattleId) -> Result<bool, StoreError> {
        self.inner.delete(id)
    }

    fn list(&self) -> Result<Vec<AnimalRecord>, StoreError> {
        self.inner.list()
    }
}

#[test]
fn one_failing_animal_does_not_abort_import() {
    let rows = vec![
        row(0, "OK1").with_pair("2024-02-01", "B1"),
        row(1, "BAD").with_pair("2024-02-01", "B1"),
        row(2, "OK2").with_pair("2024-02-01", "B1"),
    ];
    let mut store = FlakyStore {
        inner: MemoryStore::new(),
        reject: id("BAD"),
    };
    let outcome = reconciler().reconcile(&rows, &mut store);
    assert_eq!(outcome.new_count, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("BAD: "));
    assert!(store.inner.get(&id("OK2")).unwrap().is_some());
}

fn arb_rows() -> impl Strategy<Value = Vec<RowObject>> {
    let pair = (1u32..=28, 1u32..=6, 0usize..3);
    let one_row = (
        prop::collection::vec(pair, 0..4),
        prop::option::of(prop::bool::ANY),
        prop::option::of(1u32..=28),
    );
    prop::collection::vec(one_row, 1..6).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (pairs, result, check_day))| {
                let mut object = row(index, "P1").with_field(FieldKey::CalvingDate, "2024-01-10");
                for (day, month, bull) in pairs {
                    object = object.with_pair(format!("2024-{month:02}-{day:02}"), format!("B{bull}"));
                }
                if let Some(pregnant) = result {
                    let value = if pregnant { "Pregnant" } else { "NotPregnant" };
                    object = object.with_field(FieldKey::PregnancyCheckResult, value);
                }
                if let Some(day) = check_day {
                    object = object.with_field(FieldKey::PregnancyCheckDate, format!("2024-07-{day:02}"));
                }
                object
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn merging_twice_changes_nothing(rows in arb_rows()) {
        let reconciler = reconciler();
        let mut store = MemoryStore::new();
        reconciler.reconcile(&rows, &mut store);
        let once = store.get(&id("P1")).unwrap().unwrap();
        reconciler.reconcile(&rows, &mut store);
        let twice = store.get(&id("P1")).unwrap().unwrap();
        prop_assert_eq!(&once.insemination_history, &twice.insemination_history);
        prop_assert_eq!(&once.uzi_history, &twice.uzi_history);
        prop_assert_eq!(&once.status, &twice.status);
    }

    #[test]
    fn history_is_sorted_with_intervals_inside_lactations(rows in arb_rows()) {
        let mut store = MemoryStore::new();
        reconciler().reconcile(&rows, &mut store);
        let record = store.get(&id("P1")).unwrap().unwrap();
        let history = &record.insemination_history;
        for window in history.windows(2) {
            prop_assert!(window[0].date <= window[1].date);
            if window[0].lactation != window[1].lactation {
                prop_assert_eq!(window[1].days_from_previous, None);
            }
        }
        if let Some(first) = history.first() {
            prop_assert_eq!(first.days_from_previous, None);
        }
    }
}
