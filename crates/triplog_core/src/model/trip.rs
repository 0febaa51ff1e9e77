//! Trip record and draft model.
//!
//! # Responsibility
//! - Define the canonical `Trip` row shape stored in `trips`.
//! - Define `TripDraft`, the mutable candidate record held by entry forms.
//! - Provide validation and display helpers shared by form and list callers.
//!
//! # Invariants
//! - `cost` is never negative; the type enforces it.
//! - A draft is valid only when origin, destination and class are non-blank.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Primary key of a persisted trip.
///
/// `0` on insert asks the store to assign the next id.
pub type TripId = i64;

/// Id value meaning "not yet assigned by the store".
pub const UNASSIGNED_TRIP_ID: TripId = 0;

/// One persisted trip entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub origin: String,
    pub destination: String,
    /// Fare class label. Serialized as `class` to match the column name.
    #[serde(rename = "class")]
    pub fare_class: String,
    pub cost: u32,
}

/// Validation failure for trip text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripValidationError {
    BlankOrigin,
    BlankDestination,
    BlankClass,
}

impl Display for TripValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankOrigin => write!(f, "origin must not be blank"),
            Self::BlankDestination => write!(f, "destination must not be blank"),
            Self::BlankClass => write!(f, "class must not be blank"),
        }
    }
}

impl Error for TripValidationError {}

impl Trip {
    /// Creates a trip with a caller-provided id.
    pub fn new(
        id: TripId,
        origin: impl Into<String>,
        destination: impl Into<String>,
        fare_class: impl Into<String>,
        cost: u32,
    ) -> Self {
        Self {
            id,
            origin: origin.into(),
            destination: destination.into(),
            fare_class: fare_class.into(),
            cost,
        }
    }

    /// Creates a trip whose id will be assigned on insert.
    pub fn unassigned(
        origin: impl Into<String>,
        destination: impl Into<String>,
        fare_class: impl Into<String>,
        cost: u32,
    ) -> Self {
        Self::new(UNASSIGNED_TRIP_ID, origin, destination, fare_class, cost)
    }

    /// Checks text fields in declaration order and reports the first blank.
    pub fn validate(&self) -> Result<(), TripValidationError> {
        validate_fields(&self.origin, &self.destination, &self.fare_class)
    }

    /// Renders `cost` as a dollar amount with thousands separators.
    ///
    /// `1250` -> `$1,250.00`
    pub fn formatted_cost(&self) -> String {
        format!("${}.00", group_thousands(self.cost))
    }
}

/// In-progress, unpersisted trip held by an entry form.
///
/// All fields default to empty/zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDraft {
    pub id: TripId,
    pub origin: String,
    pub destination: String,
    #[serde(rename = "class")]
    pub fare_class: String,
    pub cost: u32,
}

impl TripDraft {
    pub fn validate(&self) -> Result<(), TripValidationError> {
        validate_fields(&self.origin, &self.destination, &self.fare_class)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Converts the draft into the persisted record shape.
    pub fn to_trip(&self) -> Trip {
        Trip {
            id: self.id,
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            fare_class: self.fare_class.clone(),
            cost: self.cost,
        }
    }
}

impl From<Trip> for TripDraft {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            origin: trip.origin,
            destination: trip.destination,
            fare_class: trip.fare_class,
            cost: trip.cost,
        }
    }
}

impl From<&Trip> for TripDraft {
    fn from(trip: &Trip) -> Self {
        Self::from(trip.clone())
    }
}

fn validate_fields(
    origin: &str,
    destination: &str,
    fare_class: &str,
) -> Result<(), TripValidationError> {
    if origin.trim().is_empty() {
        return Err(TripValidationError::BlankOrigin);
    }
    if destination.trim().is_empty() {
        return Err(TripValidationError::BlankDestination);
    }
    if fare_class.trim().is_empty() {
        return Err(TripValidationError::BlankClass);
    }
    Ok(())
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
