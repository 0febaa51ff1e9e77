//! Trip repository contract and its store-backed implementation.

use crate::model::trip::{Trip, TripId};
use crate::store::{LiveQuery, LiveTrip, StoreResult, TripStore};
use async_trait::async_trait;

/// Capability set for persisting and observing trips.
#[async_trait]
pub trait TripsRepository: Send + Sync {
    /// Inserts a trip and returns its id.
    async fn insert_trip(&self, trip: &Trip) -> StoreResult<TripId>;
    /// Replaces the trip with the same id. Returns rows changed.
    async fn update_trip(&self, trip: &Trip) -> StoreResult<usize>;
    /// Deletes the trip with the same id. Returns rows changed.
    async fn delete_trip(&self, trip: &Trip) -> StoreResult<usize>;
    /// Deletes the trip with `id`. Returns rows changed.
    async fn delete_trip_by_id(&self, id: TripId) -> StoreResult<usize>;
    fn get_all_trips_stream(&self) -> LiveQuery<Vec<Trip>>;
    fn get_trip_stream(&self, id: TripId) -> LiveTrip;
}

/// Repository backed by the local SQLite store.
#[derive(Clone)]
pub struct OfflineTripsRepository {
    store: TripStore,
}

impl OfflineTripsRepository {
    pub fn new(store: TripStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TripStore {
        &self.store
    }
}

#[async_trait]
impl TripsRepository for OfflineTripsRepository {
    async fn insert_trip(&self, trip: &Trip) -> StoreResult<TripId> {
        self.store.insert(trip).await
    }

    async fn update_trip(&self, trip: &Trip) -> StoreResult<usize> {
        self.store.update(trip).await
    }

    async fn delete_trip(&self, trip: &Trip) -> StoreResult<usize> {
        self.store.delete(trip).await
    }

    async fn delete_trip_by_id(&self, id: TripId) -> StoreResult<usize> {
        self.store.delete_by_id(id).await
    }

    fn get_all_trips_stream(&self) -> LiveQuery<Vec<Trip>> {
        self.store.get_all()
    }

    fn get_trip_stream(&self, id: TripId) -> LiveTrip {
        self.store.get_by_id(id)
    }
}

#[async_trait]
impl<R: TripsRepository + ?Sized> TripsRepository for std::sync::Arc<R> {
    async fn insert_trip(&self, trip: &Trip) -> StoreResult<TripId> {
        (**self).insert_trip(trip).await
    }

    async fn update_trip(&self, trip: &Trip) -> StoreResult<usize> {
        (**self).update_trip(trip).await
    }

    async fn delete_trip(&self, trip: &Trip) -> StoreResult<usize> {
        (**self).delete_trip(trip).await
    }

    async fn delete_trip_by_id(&self, id: TripId) -> StoreResult<usize> {
        (**self).delete_trip_by_id(id).await
    }

    fn get_all_trips_stream(&self) -> LiveQuery<Vec<Trip>> {
        (**self).get_all_trips_stream()
    }

    fn get_trip_stream(&self, id: TripId) -> LiveTrip {
        (**self).get_trip_stream(id)
    }
}
