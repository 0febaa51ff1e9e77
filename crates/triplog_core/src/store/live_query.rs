//! Push-style live queries over the trip table.
//!
//! # Responsibility
//! - Re-run a read whenever the store publishes a new generation.
//! - End cleanly when the store closes, every store handle is dropped, or the
//!   subscriber drops its handle.
//!
//! # Invariants
//! - The first `next()` returns the current snapshot without waiting.
//! - A subscriber never observes a generation older than one it already saw.
//! - Slow subscribers skip intermediate generations and read the latest.

use super::trip_dao::SqliteTripDao;
use super::trip_store::{run_blocking, Generation, StoreInner};
use super::{StoreError, StoreResult};
use crate::model::trip::Trip;
use std::sync::{Arc, Weak};
use tokio::sync::watch;

type Query<T> = dyn Fn(&SqliteTripDao<'_>) -> StoreResult<T> + Send + Sync;

/// Subscription that yields a fresh snapshot after each store change.
///
/// Dropping the handle unsubscribes. Holds the store weakly so subscribers
/// never keep the connection open.
pub struct LiveQuery<T> {
    inner: Weak<StoreInner>,
    changes: watch::Receiver<Generation>,
    query: Arc<Query<T>>,
    /// Set until a snapshot for the latest seen generation was returned.
    stale: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(super) fn new(
        inner: &Arc<StoreInner>,
        query: impl Fn(&SqliteTripDao<'_>) -> StoreResult<T> + Send + Sync + 'static,
    ) -> Self {
        let changes = inner.subscribe();
        Self {
            inner: Arc::downgrade(inner),
            changes,
            query: Arc::new(query),
            stale: true,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the store is closed or its last handle is dropped.
    /// A failed read yields
    /// `Some(Err(_))` and the subscription stays active.
    pub async fn next(&mut self) -> Option<StoreResult<T>> {
        if !self.stale {
            if self.changes.changed().await.is_err() {
                return None;
            }
            self.stale = true;
        }

        if self.changes.borrow_and_update().closed {
            return None;
        }

        let inner = self.inner.upgrade()?;
        let query = Arc::clone(&self.query);
        let result = run_blocking(inner, move |inner| inner.read(|dao| query(dao))).await;
        self.stale = false;
        match result {
            Err(StoreError::Closed) => None,
            other => Some(other),
        }
    }

    /// Stops listening. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

/// Live view of a single trip by id.
///
/// The first emission is `Some(trip)` or `None` when the id is absent at
/// subscription time. Later emissions happen only when the stored value
/// changes. A deletion emits nothing; re-inserting the id emits again.
pub struct LiveTrip {
    query: LiveQuery<Option<Trip>>,
    emitted: bool,
    last: Option<Trip>,
}

impl LiveTrip {
    pub(super) fn new(query: LiveQuery<Option<Trip>>) -> Self {
        Self {
            query,
            emitted: false,
            last: None,
        }
    }

    /// Waits for the next distinct value of the trip.
    pub async fn next(&mut self) -> Option<StoreResult<Option<Trip>>> {
        loop {
            let snapshot = match self.query.next().await? {
                Ok(snapshot) => snapshot,
                Err(err) => return Some(Err(err)),
            };

            if !self.emitted {
                self.emitted = true;
                self.last = snapshot.clone();
                return Some(Ok(snapshot));
            }

            if snapshot.is_none() {
                self.last = None;
                continue;
            }
            if snapshot == self.last {
                continue;
            }

            self.last = snapshot.clone();
            return Some(Ok(snapshot));
        }
    }

    pub fn cancel(self) {}
}
