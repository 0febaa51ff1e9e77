//! Core use-case services.
//!
//! # Responsibility
//! - Hold form-level state between UI callbacks.
//! - Keep UI layers decoupled from repository and storage details.

pub mod trip_entry;
