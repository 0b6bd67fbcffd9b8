//! Kindness position registry: location codec, privacy masking, bulk import
//! validation and the service/routes that expose them.

pub mod codec;
pub mod domain;
pub mod import;
pub mod loader;
pub mod masking;
pub mod memory;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod tests;

pub use codec::{MissingMarker, ParseError, PositionCodec, PositionCoordinates};
pub use domain::{ImportRow, NewPosition, Position, PositionFilter, PositionId};
pub use import::{ImportOutcome, ImportValidator, RowViolation, ValidationReport};
pub use loader::{read_rows, read_rows_from_path, RowLoadError};
pub use masking::{ApplicantMasker, MaskError, PrivacyMasker};
pub use memory::InMemoryPositionStore;
pub use router::registry_router;
pub use service::{RegistryError, RegistryService, RegistrySettings};
pub use sqlite::SqlitePositionStore;
pub use store::{Change, PositionStore, StoreError, UnitOfWork};
