//! Trip domain model.
//!
//! # Responsibility
//! - Define the persisted trip record and the in-progress form draft.
//! - Keep field validation rules in one place for form and CLI callers.
//!
//! # Invariants
//! - Every persisted trip is identified by a unique `TripId`.
//! - A draft has no identity in the store until it is saved.

pub mod trip;
