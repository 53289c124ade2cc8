use garage_core::contract::{self, CarColor};
use garage_core::{Car, CarQuery, FieldMap, GarageStore, Resource, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn store() -> GarageStore {
    GarageStore::open_in_memory().unwrap()
}

#[test]
fn every_operation_rejects_malformed_paths() {
    let store = store();
    let draft = Car::draft("Ford", "F150", "2015", CarColor::Red, "ABC123");

    for path in ["trucks", "cars/abc", "garage://cars/1/2", "garage://"] {
        assert!(matches!(
            store.resolve(path),
            Err(StoreError::InvalidResource(_))
        ));
        assert!(matches!(
            store.list(path, &CarQuery::default()),
            Err(StoreError::InvalidResource(_))
        ));
        assert!(matches!(
            store.insert(path, &draft),
            Err(StoreError::InvalidResource(_))
        ));
        assert!(matches!(
            store.update(path, &draft, None, &[]),
            Err(StoreError::InvalidResource(_))
        ));
        assert!(matches!(
            store.delete(path, None, &[]),
            Err(StoreError::InvalidResource(_))
        ));
    }
}

#[test]
fn resolve_accepts_bare_and_full_forms() {
    let store = store();
    assert_eq!(store.resolve("cars").unwrap(), Resource::Collection);
    assert_eq!(
        store.resolve("garage://cars/12").unwrap(),
        Resource::Item(12)
    );
}

#[test]
fn insert_notifies_collection_observers() {
    let store = store();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let _sub = store.watch(Resource::Collection, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store
        .insert(
            &contract::collection_uri(),
            &Car::draft("Ford", "F150", "2015", CarColor::Red, "ABC123"),
        )
        .unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn item_update_notifies_item_and_collection_observers() {
    let store = store();
    let id = store
        .insert(
            &contract::collection_uri(),
            &Car::draft("Ford", "F150", "2015", CarColor::Red, "ABC123"),
        )
        .unwrap();

    let item_hits = Arc::new(AtomicUsize::new(0));
    let collection_hits = Arc::new(AtomicUsize::new(0));

    let item_counter = Arc::clone(&item_hits);
    let _item_sub = store.watch(Resource::Item(id), move |_| {
        item_counter.fetch_add(1, Ordering::SeqCst);
    });
    let collection_counter = Arc::clone(&collection_hits);
    let _collection_sub = store.watch(Resource::Collection, move |_| {
        collection_counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut values = FieldMap::new();
    values.set_text(contract::COL_PLATE, "XYZ999");
    store
        .update(&contract::item_uri(id), &values, None, &[])
        .unwrap();

    assert_eq!(item_hits.load(Ordering::SeqCst), 1);
    // Insert happened before the watch; only the update is seen.
    assert_eq!(collection_hits.load(Ordering::SeqCst), 1);
}

#[test]
fn zero_effect_mutations_do_not_notify() {
    let store = store();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let _sub = store.watch(Resource::Collection, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut values = FieldMap::new();
    values.set_text(contract::COL_PLATE, "GHOST1");
    assert_eq!(
        store
            .update(&contract::item_uri(404), &values, None, &[])
            .unwrap(),
        0
    );
    assert_eq!(store.delete(&contract::item_uri(404), None, &[]).unwrap(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn dropped_subscription_stops_receiving_changes() {
    let store = store();
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    let sub = store.watch(Resource::Collection, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store
        .insert(
            &contract::collection_uri(),
            &Car::draft("Ford", "F150", "2015", CarColor::Red, "AAA111"),
        )
        .unwrap();
    drop(sub);
    store
        .insert(
            &contract::collection_uri(),
            &Car::draft("Honda", "Civic", "2019", CarColor::Blue, "BBB222"),
        )
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(store.notifier().watcher_count(), 0);
}
