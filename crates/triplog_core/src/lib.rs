//! Core logic for triplog: trip records, their SQLite store and the entry form.
//! This crate is the single source of truth for trip invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::trip::{Trip, TripDraft, TripId, TripValidationError, UNASSIGNED_TRIP_ID};
pub use repo::trips_repository::{OfflineTripsRepository, TripsRepository};
pub use service::trip_entry::{parse_cost_input, TripDraftPatch, TripEntryForm, TripFormState};
pub use store::{LiveQuery, LiveTrip, StoreError, StoreResult, TripStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
