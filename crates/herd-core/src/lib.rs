#![deny(unsafe_code)]

//! Breeding timeline reconciliation.
//!
//! - [`reconciler`]: merges imported row objects into per-animal records
//! - [`timeline`]: ordering and derived fields of one animal's history
//! - [`store`]: the keyed record store the reconciler reads and writes

pub mod error;
pub mod options;
pub mod reconciler;
pub mod store;
pub mod timeline;

pub use error::{ReconcileError, StoreError};
pub use options::{DEFAULT_EXPECTED_CHECK_OFFSET_DAYS, ReconcileOptions};
pub use reconciler::Reconciler;
pub use store::{AnimalStore, JsonFileStore, MemoryStore};
pub use timeline::{
    add_insemination, add_pregnancy_check, days_from_insemination, derive_event_fields,
    infer_lactation, latest_check, merge_check, merge_events, rebuild_timeline, sort_checks,
    sort_history,
};
