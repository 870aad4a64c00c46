//! Tests for RecordStore over the JSON file repository

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use yafu::application::RecordStore;
use yafu::domain::{Expiry, Record};
use yafu::infrastructure::repository::{JsonFileRepository, NullRepository};
use yafu::infrastructure::traits::RealFileSystem;

fn record(n: i64) -> Record {
    Record::new(
        format!("/home/me/pics/img{n}.png"),
        "http://x/y",
        (100 + n).to_string(),
        format!("tok{n}"),
        if n == 0 { Expiry::Max } else { Expiry::OneHour },
        None,
        true,
        Utc.timestamp_opt(1_500_000_000 + n, 0).unwrap(),
    )
}

fn repository(temp: &TempDir) -> Arc<JsonFileRepository> {
    Arc::new(JsonFileRepository::new(
        Arc::new(RealFileSystem),
        temp.path().join("config/yafu.db"),
    ))
}

#[test]
fn given_records_when_saved_and_reopened_then_sequence_is_identical() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let repo = repository(&temp);
    let mut store = RecordStore::open(repo.clone());
    let records: Vec<Record> = (0..3).map(record).collect();
    for r in &records {
        store.push(r.clone());
    }

    // Act
    store.save().unwrap();
    let reopened = RecordStore::open(repo);

    // Assert
    assert_eq!(reopened.records(), records.as_slice());
}

#[test]
fn given_corrupt_store_when_opening_then_starts_empty_and_keeps_a_copy() {
    let temp = TempDir::new().unwrap();
    let repo = repository(&temp);
    std::fs::create_dir_all(repo.path().parent().unwrap()).unwrap();
    std::fs::write(repo.path(), "{ this is not json").unwrap();

    let mut store = RecordStore::open(repo.clone());
    assert!(store.is_empty());

    store.push(record(1));
    store.save().unwrap();

    let preserved = std::fs::read_to_string(repo.quarantine_path()).unwrap();
    assert_eq!(preserved, "{ this is not json");
    assert_eq!(RecordStore::open(repo).len(), 1);
}

#[test]
fn given_binary_store_when_opening_and_saving_then_original_bytes_are_kept() {
    // Arrange: a pickled list as written by older clients
    let temp = TempDir::new().unwrap();
    let repo = repository(&temp);
    let pickle = [0x80, 0x03, b']', b'q', 0x00, b'.'];
    std::fs::create_dir_all(repo.path().parent().unwrap()).unwrap();
    std::fs::write(repo.path(), pickle).unwrap();

    // Act
    let store = RecordStore::open(repo.clone());
    store.save().unwrap();

    // Assert
    assert!(store.is_empty());
    assert_eq!(std::fs::read(repo.quarantine_path()).unwrap(), pickle);
}

#[test]
fn given_disabled_store_when_saving_then_nothing_is_written() {
    let repo = Arc::new(NullRepository);
    let mut store = RecordStore::open(repo.clone());
    store.push(record(1));

    store.save().unwrap();

    assert!(RecordStore::open(repo).is_empty());
}

#[test]
fn given_unwritable_location_when_saving_then_fails_loudly() {
    let temp = TempDir::new().unwrap();
    // a regular file where the parent directory should be
    let blocker = temp.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let repo = Arc::new(JsonFileRepository::new(
        Arc::new(RealFileSystem),
        blocker.join("yafu.db"),
    ));
    let store = RecordStore::open(repo);

    let result = store.save();

    assert!(result.is_err());
}
