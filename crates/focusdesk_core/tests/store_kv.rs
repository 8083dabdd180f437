use focusdesk_core::store::latest_schema_version;
use focusdesk_core::{KeyValueStore, SqliteKeyValueStore};

#[test]
fn fresh_store_reports_latest_schema_version() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    assert_eq!(store.schema_version().unwrap(), latest_schema_version());
}

#[test]
fn values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusdesk.sqlite3");

    {
        let store = SqliteKeyValueStore::open(&path).unwrap();
        store.set("pomodoroTasksCompleted", "4").unwrap();
        store
            .set("pomodoroNotesList", r#"[{"id":1,"title":"t","body":"","updatedAt":1}]"#)
            .unwrap();
    }

    let store = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(
        store.get("pomodoroTasksCompleted").unwrap().as_deref(),
        Some("4")
    );
    assert_eq!(
        store.get("pomodoroNotesList").unwrap().as_deref(),
        Some(r#"[{"id":1,"title":"t","body":"","updatedAt":1}]"#)
    );
}

#[test]
fn overwrite_keeps_the_last_value() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    store.set("k", "first").unwrap();
    store.set("k", "second").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));
}

#[test]
fn removed_keys_read_as_missing() {
    let store = SqliteKeyValueStore::open_in_memory().unwrap();
    store.set("gone", "soon").unwrap();
    store.remove("gone").unwrap();
    assert_eq!(store.get("gone").unwrap(), None);
    store.remove("never-existed").unwrap();
}

#[test]
fn store_is_shareable_across_threads() {
    let store = std::sync::Arc::new(SqliteKeyValueStore::open_in_memory().unwrap());
    let mut handles = Vec::new();
    for worker in 0..4 {
        let store = store.clone();
        handles.push(std::thread::spawn(move || {
            for round in 0..25 {
                let key = format!("worker-{worker}");
                store.set(&key, &round.to_string()).unwrap();
                assert!(store.get(&key).unwrap().is_some());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.get("worker-3").unwrap().as_deref(), Some("24"));
}
