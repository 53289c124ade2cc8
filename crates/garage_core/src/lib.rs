//! Core persistence and query routing for the garage car tracker.
//! This crate is the single source of truth for the cars data contract.

pub mod contract;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod store;

pub use contract::CarColor;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::Car;
pub use notify::{ChangeNotifier, ChangeSubscription};
pub use store::{
    CarQuery, FieldMap, GarageStore, Resource, RowSet, StoreError, StoreResult, Value,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
