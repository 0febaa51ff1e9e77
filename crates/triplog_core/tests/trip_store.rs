use std::time::Duration;
use tokio::time::timeout;
use triplog_core::{StoreError, Trip, TripStore, UNASSIGNED_TRIP_ID};

const QUIET: Duration = Duration::from_millis(100);

fn guatemala() -> Trip {
    Trip::new(1, "Guatemala", "Pimocha", "Premium", 500)
}

fn colombia() -> Trip {
    Trip::new(2, "Colombia", "Australia", "Economica", 250)
}

async fn store_with_two_trips() -> TripStore {
    let store = TripStore::open_in_memory().unwrap();
    store.insert(&guatemala()).await.unwrap();
    store.insert(&colombia()).await.unwrap();
    store
}

#[tokio::test]
async fn insert_then_first_snapshot_contains_trip() {
    let store = TripStore::open_in_memory().unwrap();
    store.insert(&guatemala()).await.unwrap();

    let all = store.get_all().next().await.unwrap().unwrap();
    assert_eq!(all, vec![guatemala()]);
}

#[tokio::test]
async fn get_all_keeps_insertion_order() {
    let store = store_with_two_trips().await;

    let all = store.list().await.unwrap();
    assert_eq!(all, vec![guatemala(), colombia()]);
}

#[tokio::test]
async fn insert_assigns_increasing_ids_when_unassigned() {
    let store = TripStore::open_in_memory().unwrap();

    let first = store
        .insert(&Trip::unassigned("Quito", "Lima", "Turista", 90))
        .await
        .unwrap();
    let second = store
        .insert(&Trip::unassigned("Lima", "Cusco", "Turista", 40))
        .await
        .unwrap();

    assert_ne!(first, UNASSIGNED_TRIP_ID);
    assert!(second > first);
    let stored = store.find(second).await.unwrap().unwrap();
    assert_eq!(stored.origin, "Lima");
    assert_eq!(stored.id, second);
}

#[tokio::test]
async fn duplicate_id_is_a_storage_fault_and_store_stays_usable() {
    let store = TripStore::open_in_memory().unwrap();
    store.insert(&guatemala()).await.unwrap();

    let err = store.insert(&guatemala()).await.unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
    assert_eq!(err.code(), "constraint_violation");

    store.insert(&colombia()).await.unwrap();
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn update_replaces_all_fields_and_is_idempotent() {
    let store = store_with_two_trips().await;
    let changed = Trip::new(1, "Honduras", "Roatan", "Business", 900);

    assert_eq!(store.update(&changed).await.unwrap(), 1);
    let after_first = store.list().await.unwrap();
    assert_eq!(store.update(&changed).await.unwrap(), 1);
    let after_second = store.list().await.unwrap();

    assert_eq!(after_first, vec![changed.clone(), colombia()]);
    assert_eq!(after_first, after_second);
}

#[tokio::test]
async fn update_and_delete_of_missing_id_are_no_ops() {
    let store = store_with_two_trips().await;
    let missing = Trip::new(42, "Nowhere", "Never", "None", 1);

    assert_eq!(store.update(&missing).await.unwrap(), 0);
    assert_eq!(store.delete(&missing).await.unwrap(), 0);
    assert_eq!(store.list().await.unwrap(), vec![guatemala(), colombia()]);
}

#[tokio::test]
async fn delete_removes_exactly_one() {
    let store = store_with_two_trips().await;

    assert_eq!(store.delete_by_id(1).await.unwrap(), 1);

    assert_eq!(store.list().await.unwrap(), vec![colombia()]);
    assert!(store.find(1).await.unwrap().is_none());
}

#[tokio::test]
async fn get_all_emits_snapshot_per_change() {
    let store = TripStore::open_in_memory().unwrap();
    let mut all = store.get_all();

    assert_eq!(all.next().await.unwrap().unwrap(), Vec::<Trip>::new());

    store.insert(&guatemala()).await.unwrap();
    assert_eq!(all.next().await.unwrap().unwrap(), vec![guatemala()]);

    store.insert(&colombia()).await.unwrap();
    assert_eq!(
        all.next().await.unwrap().unwrap(),
        vec![guatemala(), colombia()]
    );

    store.delete(&guatemala()).await.unwrap();
    assert_eq!(all.next().await.unwrap().unwrap(), vec![colombia()]);
    store.delete(&colombia()).await.unwrap();
    assert_eq!(all.next().await.unwrap().unwrap(), Vec::<Trip>::new());
}

#[tokio::test]
async fn get_all_waits_while_nothing_changes() {
    let store = store_with_two_trips().await;
    let mut all = store.get_all();
    all.next().await.unwrap().unwrap();

    store.update(&Trip::new(99, "x", "y", "z", 1)).await.unwrap();
    assert!(timeout(QUIET, all.next()).await.is_err());
}

#[tokio::test]
async fn slow_subscriber_sees_latest_snapshot() {
    let store = TripStore::open_in_memory().unwrap();
    let mut all = store.get_all();
    all.next().await.unwrap().unwrap();

    store.insert(&guatemala()).await.unwrap();
    store.insert(&colombia()).await.unwrap();

    assert_eq!(
        all.next().await.unwrap().unwrap(),
        vec![guatemala(), colombia()]
    );
}

#[tokio::test]
async fn get_by_id_emits_current_value_then_changes() {
    let store = store_with_two_trips().await;
    let mut trip = store.get_by_id(1);

    assert_eq!(trip.next().await.unwrap().unwrap(), Some(guatemala()));

    let changed = Trip::new(1, "Guatemala", "Pimocha", "Economica", 300);
    store.update(&changed).await.unwrap();
    assert_eq!(trip.next().await.unwrap().unwrap(), Some(changed));
}

#[tokio::test]
async fn get_by_id_ignores_other_rows_and_stays_silent_after_delete() {
    let store = store_with_two_trips().await;
    let mut trip = store.get_by_id(1);
    trip.next().await.unwrap().unwrap();

    store.delete(&colombia()).await.unwrap();
    store.delete(&guatemala()).await.unwrap();

    assert!(timeout(QUIET, trip.next()).await.is_err());
}

#[tokio::test]
async fn get_by_id_for_missing_record_emits_none_then_reinsert() {
    let store = TripStore::open_in_memory().unwrap();
    let mut trip = store.get_by_id(1);

    assert_eq!(trip.next().await.unwrap().unwrap(), None);

    store.insert(&guatemala()).await.unwrap();
    assert_eq!(trip.next().await.unwrap().unwrap(), Some(guatemala()));
}

#[tokio::test]
async fn close_ends_live_queries_and_rejects_operations() {
    let store = store_with_two_trips().await;
    let mut all = store.get_all();
    all.next().await.unwrap().unwrap();
    let mut trip = store.get_by_id(1);
    trip.next().await.unwrap().unwrap();

    store.close().await.unwrap();
    store.close().await.unwrap();

    assert!(store.is_closed());
    assert!(all.next().await.is_none());
    assert!(trip.next().await.is_none());
    assert!(store.get_all().next().await.is_none());
    assert!(matches!(
        store.insert(&guatemala()).await,
        Err(StoreError::Closed)
    ));
    assert!(matches!(store.list().await, Err(StoreError::Closed)));
}

#[tokio::test]
async fn dropping_every_store_handle_ends_live_queries() {
    let store = store_with_two_trips().await;
    let clone = store.clone();
    let mut all = store.get_all();
    all.next().await.unwrap().unwrap();
    let mut trip = store.get_by_id(1);
    trip.next().await.unwrap().unwrap();

    drop(store);
    drop(clone);

    assert!(timeout(QUIET, all.next()).await.unwrap().is_none());
    assert!(timeout(QUIET, trip.next()).await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn snapshots_stay_monotonic_under_concurrent_writes() {
    const WRITES: usize = 200;
    const SUBSCRIBERS: usize = 4;
    let store = TripStore::open_in_memory().unwrap();

    let subscribers: Vec<_> = (0..SUBSCRIBERS)
        .map(|_| {
            let mut all = store.get_all();
            tokio::spawn(async move {
                let mut last_len = 0;
                while let Some(snapshot) = all.next().await {
                    let snapshot = snapshot.unwrap();
                    assert!(snapshot.len() >= last_len);
                    assert!(snapshot.windows(2).all(|pair| pair[0].id < pair[1].id));
                    last_len = snapshot.len();
                    if last_len == WRITES {
                        break;
                    }
                }
                last_len
            })
        })
        .collect();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for index in 0..WRITES {
                let cost = u32::try_from(index).unwrap();
                store
                    .insert(&Trip::unassigned(format!("origin-{index}"), "Lima", "Turista", cost))
                    .await
                    .unwrap();
            }
        })
    };
    writer.await.unwrap();

    for subscriber in subscribers {
        let seen = timeout(Duration::from_secs(10), subscriber)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen, WRITES);
    }
}

#[tokio::test]
async fn cancelled_subscriber_does_not_affect_others() {
    let store = TripStore::open_in_memory().unwrap();
    let mut kept = store.get_all();
    let dropped = store.get_all();
    kept.next().await.unwrap().unwrap();

    dropped.cancel();
    store.insert(&guatemala()).await.unwrap();

    assert_eq!(kept.next().await.unwrap().unwrap(), vec![guatemala()]);
}

#[tokio::test]
async fn file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trips.db");

    let store = TripStore::open_path(&path).unwrap();
    store.insert(&guatemala()).await.unwrap();
    store.close().await.unwrap();

    let reopened = TripStore::open_path(&path).unwrap();
    assert_eq!(reopened.list().await.unwrap(), vec![guatemala()]);
}

#[tokio::test]
async fn invalid_persisted_cost_surfaces_as_invalid_data() {
    let conn = triplog_core::db::open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO trips (id, origin, destination, class, cost) VALUES (5, 'a', 'b', 'c', -3);",
    )
    .unwrap();
    let store = TripStore::from_connection(conn);

    let err = store.list().await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}
