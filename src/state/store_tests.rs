//! Tests for ResumeStore

use super::*;
use crate::error::Error;
use crate::fingerprint::Fingerprint;
use crate::request::RequestDescriptor;
use crate::types::Method;
use tempfile::tempdir;

fn fingerprint() -> Fingerprint {
    let request = RequestDescriptor::new(Method::GET, "https://api.example.com/1.1/items.json");
    Fingerprint::of(&request).unwrap()
}

// ============================================================================
// Open Tests
// ============================================================================

#[tokio::test]
async fn test_open_creates_directory_and_empty_record() {
    let dir = tempdir().unwrap();
    let store = ResumeStore::new(dir.path().join("nested").join(".cursor"));
    let fp = fingerprint();

    let handle = store.open(&fp).await.unwrap();

    assert!(handle.exists());
    assert_eq!(handle.path(), store.record_path(&fp));
    assert_eq!(std::fs::read_to_string(handle.path()).unwrap(), "");
}

#[tokio::test]
async fn test_open_keeps_existing_record() {
    let dir = tempdir().unwrap();
    let store = ResumeStore::new(dir.path());
    let fp = fingerprint();

    let handle = store.open(&fp).await.unwrap();
    handle.save(&Continuation::from_cursor("abc")).await.unwrap();

    let reopened = store.open(&fp).await.unwrap();
    assert_eq!(
        reopened.load().await.unwrap(),
        Continuation::from_cursor("abc")
    );
}

#[tokio::test]
async fn test_open_fails_when_directory_is_a_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let store = ResumeStore::new(&blocker);
    let err = store.open(&fingerprint()).await.unwrap_err();
    assert!(matches!(err, Error::Storage { .. }));
}

#[test]
fn test_default_store_dir() {
    let store = ResumeStore::default();
    assert_eq!(store.dir(), std::path::Path::new(DEFAULT_STATE_DIR));
}

// ============================================================================
// Load / Save Tests
// ============================================================================

#[tokio::test]
async fn test_load_empty_record() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    assert_eq!(handle.load().await.unwrap(), Continuation::new());
}

#[tokio::test]
async fn test_save_then_load_is_identical() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    let saved = Continuation::with(Some("abc".into()), None);
    handle.save(&saved).await.unwrap();

    let loaded = handle.load().await.unwrap();
    assert_eq!(loaded.cursor.as_deref(), Some("abc"));
    assert_eq!(loaded.max_id, None);
}

#[tokio::test]
async fn test_save_overwrites_previous_record() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    handle
        .save(&Continuation::with(Some("first-cursor-value".into()), Some("100".into())))
        .await
        .unwrap();
    handle.save(&Continuation::from_max_id("7")).await.unwrap();

    assert_eq!(handle.load().await.unwrap(), Continuation::from_max_id("7"));
    assert!(!handle.path().with_extension("tmp").exists());
}

#[tokio::test]
async fn test_load_malformed_record_is_empty() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    std::fs::write(handle.path(), "{not json").unwrap();
    assert!(handle.load().await.unwrap().is_empty());

    std::fs::write(handle.path(), "[1, 2, 3]").unwrap();
    assert!(handle.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_non_utf8_record_is_empty() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    std::fs::write(handle.path(), [0xff, 0xfe, b'{', 0x80]).unwrap();
    assert_eq!(handle.load().await.unwrap(), Continuation::new());
}

#[tokio::test]
async fn test_load_record_with_numeric_max_id() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    std::fs::write(handle.path(), r#"{"cursor": null, "max_id": 1234567890}"#).unwrap();
    assert_eq!(
        handle.load().await.unwrap(),
        Continuation::from_max_id("1234567890")
    );
}

// ============================================================================
// Clear Tests
// ============================================================================

#[tokio::test]
async fn test_clear_removes_record() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    handle.save(&Continuation::from_cursor("abc")).await.unwrap();
    handle.clear().await.unwrap();

    assert!(!handle.exists());
    assert!(handle.load().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_missing_record_is_ok() {
    let dir = tempdir().unwrap();
    let handle = ResumeStore::new(dir.path())
        .open(&fingerprint())
        .await
        .unwrap();

    handle.clear().await.unwrap();
    handle.clear().await.unwrap();
}
