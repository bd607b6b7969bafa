use std::sync::Arc;
use todo_core::{
    InitOutcome, ItemStore, KeyValueStore, SqliteKeyValueStore, StoreConfig, WritePolicy,
};

#[test]
fn read_write_remove_roundtrip() {
    let storage = SqliteKeyValueStore::open_in_memory().unwrap();

    assert_eq!(storage.read("ToDos").unwrap(), None);

    storage.write("ToDos", b"{}").unwrap();
    assert_eq!(storage.read("ToDos").unwrap(), Some(b"{}".to_vec()));

    storage.write("ToDos", b"{\"a\":1}").unwrap();
    assert_eq!(storage.read("ToDos").unwrap(), Some(b"{\"a\":1}".to_vec()));

    storage.remove("ToDos").unwrap();
    assert_eq!(storage.read("ToDos").unwrap(), None);
}

#[test]
fn remove_absent_key_is_ok() {
    let storage = SqliteKeyValueStore::open_in_memory().unwrap();
    storage.remove("never-written").unwrap();
}

#[test]
fn keys_are_independent_slots() {
    let storage = SqliteKeyValueStore::open_in_memory().unwrap();
    storage.write("ToDos", b"items").unwrap();
    storage.write("Other", b"other").unwrap();
    storage.remove("Other").unwrap();

    assert_eq!(storage.read("ToDos").unwrap(), Some(b"items".to_vec()));
}

#[test]
fn items_survive_process_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("todo.sqlite3");

    let expected = {
        let storage = Arc::new(SqliteKeyValueStore::open(&db_path).unwrap());
        let mut store = ItemStore::new(storage, StoreConfig::default()).unwrap();
        store.initialize();
        let items = store.add("Buy milk");
        let id = items.iter().next().unwrap().id.clone();
        store.add("Call mom");
        store.complete(&id)
    };

    let storage = Arc::new(SqliteKeyValueStore::open(&db_path).unwrap());
    let mut store = ItemStore::new(
        storage,
        StoreConfig::default().with_write_policy(WritePolicy::Await),
    )
    .unwrap();

    assert_eq!(store.initialize(), expected);
    assert_eq!(store.init_outcome(), InitOutcome::Loaded(2));
}

#[test]
fn clear_on_disk_leaves_no_slot_row() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("todo.sqlite3");

    {
        let storage = Arc::new(SqliteKeyValueStore::open(&db_path).unwrap());
        let mut store = ItemStore::new(
            storage,
            StoreConfig::default().with_write_policy(WritePolicy::Await),
        )
        .unwrap();
        store.initialize();
        store.add("Buy milk");
        store.clear();
    }

    let conn = todo_core::db::open_db(&db_path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_slots;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}
