//! Trip record store: durable CRUD plus live queries.
//!
//! # Responsibility
//! - Own the single SQLite connection holding the `trips` table.
//! - Run writes off the async caller's thread and notify live queries.
//! - Map storage faults into one error type that callers can match on.
//!
//! # Invariants
//! - The store never holds two trips with the same id.
//! - Update/delete of an absent id changes zero rows and is not an error.
//! - Live query snapshots are monotonic per subscriber.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod live_query;
mod trip_dao;
mod trip_store;

pub use live_query::{LiveQuery, LiveTrip};
pub use trip_dao::SqliteTripDao;
pub use trip_store::TripStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage fault raised by a single store operation.
///
/// The store remains usable after any variant except `Closed`.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A persisted row cannot be mapped back into a `Trip`.
    InvalidData(String),
    /// The store was closed; no further operations are accepted.
    Closed,
    LockPoisoned,
    /// The blocking task running the operation panicked or was cancelled.
    Task(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted trip data: {message}"),
            Self::Closed => write!(f, "trip store is closed"),
            Self::LockPoisoned => write!(f, "trip store connection lock is poisoned"),
            Self::Task(message) => write!(f, "trip store task failed: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl StoreError {
    /// Short machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                "constraint_violation"
            }
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
            Self::Closed => "store_closed",
            Self::LockPoisoned => "lock_poisoned",
            Self::Task(_) => "task_failed",
        }
    }
}
