pub mod animal;
pub mod error;
pub mod ids;
pub mod mapping;
pub mod report;
pub mod row;

pub use animal::{
    AnimalRecord, BreedingEvent, NO_DATA, PregnancyCheck, PregnancyResult, Protocol, status,
};
pub use error::{ModelError, Result};
pub use ids::CattleId;
pub use mapping::{ColumnMapping, FieldKey, FieldKind};
pub use report::{ImportOutcome, KpiReport, TimeWindow};
pub use row::{InseminationPair, RowObject};
