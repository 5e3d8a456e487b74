use std::io::Write;
use std::sync::Arc;

use ld_core::AppStore;
use ld_data::{ingest_bytes, ingest_file, read_records, DataError, ValidationError};
use tempfile::NamedTempFile;

const SINGLE_RECORD: &str = r#"{"responses":[{"id":"r1","timestamp":"2024-01-01T00:00:05Z","model":"m","response_time_ms":120,"total_tokens":50,"status":"success", "cost_usd":0.001}]}"#;

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn valid_file_populates_store() {
    let store = Arc::new(AppStore::default());
    let file = json_file(SINGLE_RECORD);

    let count = ingest_file(&store, file.path()).await.unwrap();
    assert_eq!(count, 1);

    let state = store.snapshot();
    assert!(state.has_data);
    assert!(!state.is_loading);
    assert_eq!(state.error, None);

    let row = &state.table_data[0];
    assert_eq!(row.id, "r1");
    assert_eq!(row.response_time, 120.0);
    assert_eq!(row.total_tokens, 50);
    assert!(!row.formatted_time.is_empty());
}

#[tokio::test]
async fn invalid_file_keeps_previous_data() {
    let store = Arc::new(AppStore::default());
    let good = json_file(SINGLE_RECORD);
    ingest_file(&store, good.path()).await.unwrap();
    let loaded = store.snapshot();

    let bad = json_file(r#"{"foo": 1}"#);
    let err = ingest_file(&store, bad.path()).await.unwrap_err();
    assert!(matches!(err, DataError::Validation(ValidationError::MalformedContainer)));

    let state = store.snapshot();
    assert_eq!(state.records, loaded.records);
    assert_eq!(state.version, loaded.version);
    assert!(state.has_data);
    assert!(!state.is_loading);
    assert_eq!(
        state.error.as_deref(),
        Some("Invalid data format: Expected \"responses\" array")
    );
}

#[tokio::test]
async fn next_upload_clears_previous_error() {
    let store = Arc::new(AppStore::default());

    let broken = json_file("{ not json");
    let err = ingest_file(&store, broken.path()).await.unwrap_err();
    assert!(matches!(err, DataError::Syntax(_)));
    assert!(store.snapshot().error.unwrap().starts_with("Invalid JSON format"));
    assert!(!store.snapshot().has_data);

    let good = json_file(SINGLE_RECORD);
    ingest_file(&store, good.path()).await.unwrap();
    assert_eq!(store.snapshot().error, None);
}

#[tokio::test]
async fn record_errors_reference_the_record_id() {
    let store = Arc::new(AppStore::default());
    let file = json_file(
        r#"[{"id":"r9","timestamp":"2024-01-01T00:00:05Z","model":"m","response_time_ms":120,"total_tokens":50}]"#,
    );

    let err = ingest_file(&store, file.path()).await.unwrap_err();
    match err {
        DataError::Validation(ValidationError::InvalidRecord { id, field, .. }) => {
            assert_eq!(id.as_deref(), Some("r9"));
            assert_eq!(field, "status");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.snapshot().error.unwrap().contains("r9"));
}

#[tokio::test]
async fn wrong_extension_is_rejected_without_reading() {
    let store = Arc::new(AppStore::default());
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(SINGLE_RECORD.as_bytes()).unwrap();

    let err = ingest_file(&store, file.path()).await.unwrap_err();
    assert!(matches!(err, DataError::UnsupportedFileType(_)));
    assert!(store.snapshot().error.unwrap().starts_with("Please upload a JSON file"));
    assert!(!store.snapshot().is_loading);
}

#[tokio::test]
async fn missing_file_is_a_processing_failure() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_records(dir.path().join("absent.json")).await;
    assert!(matches!(result, Err(DataError::Processing(_))));
}

#[tokio::test]
async fn dropped_bytes_are_ingested() {
    let store = Arc::new(AppStore::default());

    let count = ingest_bytes(&store, "dropped.json", SINGLE_RECORD.as_bytes().to_vec())
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(store.snapshot().chart_data[0].id, "r1");
}

#[tokio::test]
async fn caller_held_loading_flag_outlives_the_ingest() {
    let store = Arc::new(AppStore::default());
    let file = json_file(SINGLE_RECORD);

    let held = store.begin_loading();
    ingest_file(&store, file.path()).await.unwrap();
    assert!(store.snapshot().is_loading);
    assert!(store.snapshot().has_data);

    drop(held);
    assert!(!store.snapshot().is_loading);
}
