//! Synchronous SQL access to the `trips` table.
//!
//! # Responsibility
//! - Keep every SQL statement touching `trips` in one place.
//! - Map rows to `Trip` and reject rows that violate model invariants.
//!
//! # Invariants
//! - List reads are ordered by primary key, which follows insertion order.
//! - Mutations report changed row counts; zero is not an error.

use super::{StoreError, StoreResult};
use crate::model::trip::{Trip, TripId, UNASSIGNED_TRIP_ID};
use rusqlite::{params, Connection, OptionalExtension, Row};

const TRIP_SELECT_SQL: &str = "SELECT
    id,
    origin,
    destination,
    class,
    cost
FROM trips";

/// Borrowing SQL accessor over an open, migrated connection.
pub struct SqliteTripDao<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTripDao<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts one trip and returns its id.
    ///
    /// `UNASSIGNED_TRIP_ID` lets SQLite choose the next rowid. A duplicate id
    /// fails with a constraint violation.
    pub fn insert(&self, trip: &Trip) -> StoreResult<TripId> {
        let id = (trip.id != UNASSIGNED_TRIP_ID).then_some(trip.id);
        self.conn.execute(
            "INSERT INTO trips (id, origin, destination, class, cost)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                id,
                trip.origin.as_str(),
                trip.destination.as_str(),
                trip.fare_class.as_str(),
                trip.cost,
            ],
        )?;

        Ok(id.unwrap_or_else(|| self.conn.last_insert_rowid()))
    }

    /// Replaces all fields of the row with `trip.id`.
    pub fn update(&self, trip: &Trip) -> StoreResult<usize> {
        let changed = self.conn.execute(
            "UPDATE trips
             SET
                origin = ?1,
                destination = ?2,
                class = ?3,
                cost = ?4
             WHERE id = ?5;",
            params![
                trip.origin.as_str(),
                trip.destination.as_str(),
                trip.fare_class.as_str(),
                trip.cost,
                trip.id,
            ],
        )?;
        Ok(changed)
    }

    pub fn delete_by_id(&self, id: TripId) -> StoreResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM trips WHERE id = ?1;", [id])?;
        Ok(changed)
    }

    pub fn get(&self, id: TripId) -> StoreResult<Option<Trip>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TRIP_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt
            .query_row([id], |row| Ok(read_trip_row(row)))
            .optional()?;
        row.transpose()
    }

    pub fn list(&self) -> StoreResult<Vec<Trip>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{TRIP_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut trips = Vec::new();

        while let Some(row) = rows.next()? {
            trips.push(read_trip_row(row)?);
        }

        Ok(trips)
    }
}

fn read_trip_row(row: &Row<'_>) -> StoreResult<Trip> {
    let id: TripId = row.get("id")?;
    let raw_cost: i64 = row.get("cost")?;
    let cost = u32::try_from(raw_cost).map_err(|_| {
        StoreError::InvalidData(format!("cost `{raw_cost}` out of range in trips.cost for id {id}"))
    })?;

    Ok(Trip {
        id,
        origin: row.get("origin")?,
        destination: row.get("destination")?,
        fare_class: row.get("class")?,
        cost,
    })
}
