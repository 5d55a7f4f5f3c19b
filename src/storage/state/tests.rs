use super::*;
use crate::batch::types::{ProcessedRecord, ProcessedStatus};

fn store_in(dir: &tempfile::TempDir) -> JsonStateStore {
    JsonStateStore::new(dir.path().join("processed_items.json"))
}

#[tokio::test]
async fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut records = ProcessedMap::new();
    records.insert(
        "item-1".to_string(),
        ProcessedRecord::success("standup.mp4", "Meeting Notes - standup", "doc-1"),
    );
    records.insert(
        "item-2".to_string(),
        ProcessedRecord::error("retro.mov", "Meeting Notes - retro", "download failed"),
    );
    store.save(&records).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded, records);
    assert_eq!(
        loaded.get("item-2").unwrap().status,
        ProcessedStatus::Error("download failed".to_string())
    );
}

#[tokio::test]
async fn corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "not json {{{").unwrap();

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn structurally_invalid_json_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    // valid JSON, wrong shape
    std::fs::write(store.path(), r#"{"item-1": 42}"#).unwrap();

    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn save_replaces_the_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let mut records = ProcessedMap::new();
    records.insert(
        "item-1".to_string(),
        ProcessedRecord::error("a.mp4", "Meeting Notes - a", "boom"),
    );
    store.save(&records).await.unwrap();

    records.insert(
        "item-1".to_string(),
        ProcessedRecord::success("a.mp4", "Meeting Notes - a", "doc-9"),
    );
    store.save(&records).await.unwrap();

    let loaded = store.load().await;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get("item-1").unwrap().status, ProcessedStatus::Success);
}

#[tokio::test]
async fn save_fails_when_directory_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("gone").join("state.json"));

    let records = ProcessedMap::new();
    assert!(store.save(&records).await.is_err());
}
