use std::sync::Arc;
use triplog_core::{OfflineTripsRepository, Trip, TripStore, TripsRepository};

fn repository() -> Arc<dyn TripsRepository> {
    Arc::new(OfflineTripsRepository::new(
        TripStore::open_in_memory().unwrap(),
    ))
}

#[tokio::test]
async fn repository_forwards_crud_through_trait_object() {
    let repo = repository();
    let r1 = Trip::new(1, "Guatemala", "Pimocha", "Premium", 500);
    let r2 = Trip::new(2, "Colombia", "Australia", "Economica", 250);
    let mut all = repo.get_all_trips_stream();

    assert!(all.next().await.unwrap().unwrap().is_empty());
    assert_eq!(repo.insert_trip(&r1).await.unwrap(), 1);
    assert_eq!(all.next().await.unwrap().unwrap(), vec![r1.clone()]);
    assert_eq!(repo.insert_trip(&r2).await.unwrap(), 2);
    assert_eq!(
        all.next().await.unwrap().unwrap(),
        vec![r1.clone(), r2.clone()]
    );

    repo.delete_trip(&r1).await.unwrap();
    assert_eq!(all.next().await.unwrap().unwrap(), vec![r2.clone()]);
    repo.delete_trip(&r2).await.unwrap();
    assert!(all.next().await.unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn repository_stream_by_id_follows_updates() {
    let repo = repository();
    let trip = Trip::new(1, "Guatemala", "Pimocha", "Premium", 500);
    repo.insert_trip(&trip).await.unwrap();
    let mut one = repo.get_trip_stream(1);

    assert_eq!(one.next().await.unwrap().unwrap(), Some(trip));

    let updated = Trip::new(1, "Guatemala", "Antigua", "Premium", 550);
    assert_eq!(repo.update_trip(&updated).await.unwrap(), 1);
    assert_eq!(one.next().await.unwrap().unwrap(), Some(updated));
}

#[tokio::test]
async fn repository_update_of_missing_trip_changes_nothing() {
    let repo = repository();
    let ghost = Trip::new(9, "a", "b", "c", 1);

    assert_eq!(repo.update_trip(&ghost).await.unwrap(), 0);
    assert_eq!(repo.delete_trip(&ghost).await.unwrap(), 0);
}

#[tokio::test]
async fn repository_deletes_by_id_without_full_record() {
    let repo = repository();
    let r1 = Trip::new(1, "Guatemala", "Pimocha", "Premium", 500);
    let r2 = Trip::new(2, "Colombia", "Australia", "Economica", 250);
    repo.insert_trip(&r1).await.unwrap();
    repo.insert_trip(&r2).await.unwrap();
    let mut all = repo.get_all_trips_stream();
    all.next().await.unwrap().unwrap();

    assert_eq!(repo.delete_trip_by_id(1).await.unwrap(), 1);
    assert_eq!(all.next().await.unwrap().unwrap(), vec![r2]);
    assert_eq!(repo.delete_trip_by_id(1).await.unwrap(), 0);
}
