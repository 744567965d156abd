#![deny(unsafe_code)]

//! Column mapping for herd book imports.
//!
//! - [`resolver`]: raw rows plus a [`herd_model::ColumnMapping`] into row objects
//! - [`repository`]: named mappings saved as JSON for reuse
//! - [`utils`]: cell cleanup shared by the resolver and the CLI reader

pub mod error;
pub mod repository;
pub mod resolver;
pub mod utils;

pub use error::{MappingError, RowSkipped, SkipReason};
pub use repository::{MappingMetadata, MappingRepository, StoredMapping, read_mapping_file};
pub use resolver::{ResolvedRows, normalize_field, resolve_rows, validate_mapping};
pub use utils::{cell, normalize_cell, normalize_header};
