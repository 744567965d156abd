//! Tests for herd-model types.

use herd_model::{
    AnimalRecord, BreedingEvent, CattleId, ColumnMapping, FieldKey, PregnancyCheck,
    PregnancyResult,
};

#[test]
fn cattle_id_is_trimmed_and_required() {
    assert_eq!(CattleId::new("  1042 ").unwrap().as_str(), "1042");
    assert!(CattleId::new("   ").is_err());
}

#[test]
fn column_mapping_reads_json_document() {
    let json = r#"{
        "cattleIdColumnIndex": 0,
        "columns": {
            "1": "nickname",
            "2": "calvingDate",
            "3": "inseminationDate",
            "4": "bull",
            "5": "inseminationDate",
            "6": "bull"
        }
    }"#;
    let mapping: ColumnMapping = serde_json::from_str(json).expect("parse mapping");
    assert_eq!(mapping.cattle_id_column_index, 0);
    assert_eq!(mapping.columns.get(&2), Some(&FieldKey::CalvingDate));
    assert_eq!(mapping.columns_for(FieldKey::InseminationDate), vec![3, 5]);
    assert_eq!(mapping.columns_for(FieldKey::Bull), vec![4, 6]);
}

#[test]
fn record_round_trips_through_json() {
    let mut record = AnimalRecord::new(CattleId::new("A1").unwrap());
    record.calving_date = "2024-01-10".to_string();
    record.lactation = Some(2);
    record.insemination_history = vec![BreedingEvent::new("2024-02-01").with_bull("B1")];
    record.uzi_history = vec![PregnancyCheck::new("2024-03-04", PregnancyResult::Pregnant)];

    let json = serde_json::to_string(&record).expect("serialize record");
    let round: AnimalRecord = serde_json::from_str(&json).expect("deserialize record");
    assert_eq!(round, record);
}

#[test]
fn record_tolerates_missing_optional_fields() {
    let record: AnimalRecord =
        serde_json::from_str(r#"{"cattleId": "77"}"#).expect("deserialize minimal record");
    assert_eq!(record.cattle_id.as_str(), "77");
    assert!(record.insemination_history.is_empty());
    assert!(!record.synced);
}
