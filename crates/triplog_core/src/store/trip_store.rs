//! Async trip store handle over one SQLite connection.
//!
//! # Responsibility
//! - Serialize access to the connection and run SQL on tokio's blocking pool.
//! - Publish a change generation after every write that touched a row.
//! - Release the connection exactly once on `close`.
//!
//! # Invariants
//! - Writes suspend the caller, never a waiting live query.
//! - Generations only grow; a closed generation is terminal.

use super::live_query::{LiveQuery, LiveTrip};
use super::trip_dao::SqliteTripDao;
use super::{StoreError, StoreResult};
use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory};
use crate::model::trip::{Trip, TripId};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::watch;

/// Change counter shared with live queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Generation {
    pub(super) version: u64,
    pub(super) closed: bool,
}

pub(super) struct StoreInner {
    conn: Mutex<Option<Connection>>,
    changes: watch::Sender<Generation>,
}

impl StoreInner {
    pub(super) fn subscribe(&self) -> watch::Receiver<Generation> {
        self.changes.subscribe()
    }

    pub(super) fn read<T>(
        &self,
        op: impl FnOnce(&SqliteTripDao<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let guard = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        op(&SqliteTripDao::new(conn))
    }

    /// Runs `op` and bumps the generation when it changed at least one row.
    ///
    /// The bump happens while the lock is held so a reader woken by it always
    /// sees the write.
    fn write<T>(
        &self,
        op: impl FnOnce(&SqliteTripDao<'_>) -> StoreResult<(T, usize)>,
    ) -> StoreResult<T> {
        let guard = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let conn = guard.as_ref().ok_or(StoreError::Closed)?;
        let (value, changed) = op(&SqliteTripDao::new(conn))?;
        if changed > 0 {
            self.changes
                .send_modify(|generation| generation.version += 1);
        }
        Ok(value)
    }

    fn close(&self) -> StoreResult<bool> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let Some(conn) = guard.take() else {
            return Ok(false);
        };
        self.changes.send_modify(|generation| generation.closed = true);
        conn.close().map_err(|(_, err)| StoreError::from(err))?;
        Ok(true)
    }
}

/// Runs a store operation on the blocking pool and flattens join failures.
pub(super) async fn run_blocking<T, F>(inner: Arc<StoreInner>, op: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&StoreInner) -> StoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&inner))
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
}

/// Cloneable handle to the trip table.
///
/// Clones share one connection; closing through any clone closes all of them.
/// Dropping the last clone releases the connection and ends live queries.
#[derive(Clone)]
pub struct TripStore {
    inner: Arc<StoreInner>,
}

impl TripStore {
    /// Wraps an already opened and migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        let (changes, _) = watch::channel(Generation::default());
        Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(Some(conn)),
                changes,
            }),
        }
    }

    pub fn open_path(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Opens the database named by `config`, or an in-memory one when unset.
    pub fn open(config: &CoreConfig) -> StoreResult<Self> {
        match config.db_path.as_deref() {
            Some(path) => Self::open_path(path),
            None => Self::open_in_memory(),
        }
    }

    /// Inserts `trip` and returns its id.
    ///
    /// # Errors
    /// - `StoreError::Db` on a duplicate id or any SQLite failure.
    pub async fn insert(&self, trip: &Trip) -> StoreResult<TripId> {
        let trip = trip.clone();
        let result = self
            .timed("trip_insert", move |inner| {
                inner.write(|dao| dao.insert(&trip).map(|id| (id, 1)))
            })
            .await;
        if let Ok(id) = &result {
            info!("event=trip_insert module=store status=ok trip_id={id}");
        }
        result
    }

    /// Replaces all fields of the stored trip with the same id.
    ///
    /// Returns the number of rows changed; `0` means no such id.
    pub async fn update(&self, trip: &Trip) -> StoreResult<usize> {
        let trip = trip.clone();
        self.timed("trip_update", move |inner| {
            inner.write(|dao| dao.update(&trip).map(|changed| (changed, changed)))
        })
        .await
    }

    pub async fn delete(&self, trip: &Trip) -> StoreResult<usize> {
        self.delete_by_id(trip.id).await
    }

    /// Deletes the trip with `id`. Returns `0` when it does not exist.
    pub async fn delete_by_id(&self, id: TripId) -> StoreResult<usize> {
        self.timed("trip_delete", move |inner| {
            inner.write(|dao| dao.delete_by_id(id).map(|changed| (changed, changed)))
        })
        .await
    }

    /// One-shot read of every trip in insertion order.
    pub async fn list(&self) -> StoreResult<Vec<Trip>> {
        self.timed("trip_list", |inner| inner.read(|dao| dao.list()))
            .await
    }

    /// One-shot read of a single trip.
    pub async fn find(&self, id: TripId) -> StoreResult<Option<Trip>> {
        self.timed("trip_find", move |inner| inner.read(|dao| dao.get(id)))
            .await
    }

    /// Live view of all trips in insertion order.
    pub fn get_all(&self) -> LiveQuery<Vec<Trip>> {
        LiveQuery::new(&self.inner, |dao| dao.list())
    }

    /// Live view of one trip; see [`LiveTrip`] for emission rules.
    pub fn get_by_id(&self, id: TripId) -> LiveTrip {
        LiveTrip::new(LiveQuery::new(&self.inner, move |dao| {
            dao.get(id)
        }))
    }

    /// Closes the connection and ends every live query.
    ///
    /// Idempotent. Later operations fail with `StoreError::Closed`.
    pub async fn close(&self) -> StoreResult<()> {
        let closed = run_blocking(Arc::clone(&self.inner), |inner| inner.close()).await?;
        if closed {
            info!("event=store_close module=store status=ok");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.changes.borrow().closed
    }

    async fn timed<T, F>(&self, event: &'static str, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&StoreInner) -> StoreResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        let result = run_blocking(Arc::clone(&self.inner), op).await;
        match &result {
            Ok(_) => debug!(
                "event={event} module=store status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event={event} module=store status=error duration_ms={} error_code={} error={err}",
                started_at.elapsed().as_millis(),
                err.code()
            ),
        }
        result
    }
}
