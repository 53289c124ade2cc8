//! Store layer: CRUD routing over the cars table.
//!
//! # Responsibility
//! - Resolve resource paths to collection/item operations.
//! - Enforce write invariants and run SQL inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate required fields before any SQL mutation.
//! - Item paths always force the `_id = ?` filter, overriding callers.
//! - Effective mutations announce the changed resource exactly once.

mod car_store;
pub mod resource;
pub mod values;

pub use car_store::{CarQuery, GarageStore, StoreError, StoreResult};
pub use resource::{Resource, ResourceRouter};
pub use values::{FieldMap, RowSet, Value};
