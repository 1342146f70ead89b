use std::collections::BTreeMap;
use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use watcher_core::{new_items, Item, SeenStore};
use watcher_engine::{
    ensure_store_dir, AtomicFileWriter, PersistError, SeenStoreFile, SeenStorePersistence,
};

fn cycle_store() -> SeenStore {
    let mut store = SeenStore::new();
    let listing: Vec<Item> = ["v3", "v1", "v2"].into_iter().map(Item::new).collect();
    new_items("alice", &listing, &mut store);
    new_items("bob", &[], &mut store);
    store
}

#[test]
fn missing_file_loads_empty_store() {
    let temp = TempDir::new().unwrap();
    let file = SeenStoreFile::new(temp.path().join("known_items.ron"));
    assert!(file.load().unwrap().is_empty());
}

#[test]
fn ron_round_trip_preserves_ids_and_order() {
    let temp = TempDir::new().unwrap();
    let file = SeenStoreFile::new(temp.path().join("known_items.ron"));
    let store = cycle_store();

    file.save(&store).unwrap();
    let loaded = file.load().unwrap();

    assert_eq!(loaded, store);
    assert_eq!(loaded.entry("alice").unwrap().ids(), ["v3", "v1", "v2"]);
    assert!(loaded.entry("bob").unwrap().is_empty());

    // save(load()) is the identity on disk as well.
    let first = fs::read_to_string(file.path()).unwrap();
    file.save(&loaded).unwrap();
    assert_eq!(fs::read_to_string(file.path()).unwrap(), first);
}

#[test]
fn json_extension_reads_plain_json_maps() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("known_videos.json");
    fs::write(&path, r#"{"alice": ["9", "8"], "carol": []}"#).unwrap();

    let file = SeenStoreFile::new(&path);
    let loaded = file.load().unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("alice".to_string(), vec!["9".to_string(), "8".to_string()]);
    expected.insert("carol".to_string(), Vec::new());
    assert_eq!(loaded.to_map(), expected);

    file.save(&loaded).unwrap();
    let reparsed: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reparsed, expected);
}

#[test]
fn json_store_with_numeric_ids_loads_as_strings() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("known_videos.json");
    fs::write(&path, r#"{"alice": [7300000000000000001, 7299999999999999999]}"#).unwrap();

    let file = SeenStoreFile::new(&path);
    let loaded = file.load().unwrap();
    assert_eq!(
        loaded.entry("alice").unwrap().ids(),
        ["7300000000000000001", "7299999999999999999"]
    );

    // Saved back as strings, and still readable.
    file.save(&loaded).unwrap();
    assert_eq!(file.load().unwrap(), loaded);
}

#[test]
fn json_store_rejects_non_scalar_ids() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("known_videos.json");
    fs::write(&path, r#"{"alice": [{"id": 1}]}"#).unwrap();

    let err = SeenStoreFile::new(&path).load().unwrap_err();
    assert!(matches!(err, PersistError::Parse { .. }));
}

#[test]
fn save_creates_missing_parent_directory() {
    let temp = TempDir::new().unwrap();
    let file = SeenStoreFile::new(temp.path().join("state").join("known_items.ron"));

    file.save(&cycle_store()).unwrap();
    assert!(file.path().is_file());
}

#[test]
fn corrupt_file_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("known_items.ron");
    fs::write(&path, "{ this is not ron").unwrap();

    let err = SeenStoreFile::new(&path).load().unwrap_err();
    assert!(matches!(err, PersistError::Parse { .. }));
}

#[test]
fn creates_missing_store_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_store_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("store.ron", "hello").unwrap();
    let second = writer.write("store.ron", "world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn no_partial_file_when_directory_is_a_file() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let file = SeenStoreFile::new(blocker.join("known_items.ron"));
    assert!(file.save(&cycle_store()).is_err());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
