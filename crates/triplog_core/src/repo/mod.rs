//! Repository facade over the trip store.
//!
//! # Responsibility
//! - Give callers a narrow capability set instead of a concrete storage type.
//!
//! # Invariants
//! - Implementations forward calls unchanged: no validation, caching or retry.

pub mod trips_repository;
