//! File ingestion front-end
//!
//! Reads a file (or the bytes of a dropped file), parses it off the async
//! runtime's worker threads and feeds the result into the store. The store's
//! loading flag is held for the whole attempt and released on every path.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use ld_core::{AppStore, ResponseRecord};

use crate::validate::parse_records;
use crate::DataError;

/// Only `.json` files are accepted
pub fn is_supported_file(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Read and validate a response file from disk
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<ResponseRecord>, DataError> {
    let path = path.as_ref();
    let name = path.display().to_string();

    if !is_supported_file(path) {
        return Err(DataError::UnsupportedFileType(name));
    }

    let bytes = tokio::fs::read(path).await?;
    records_from_bytes(&name, bytes).await
}

/// Validate the contents of an already-read file
pub async fn records_from_bytes(name: &str, bytes: Vec<u8>) -> Result<Vec<ResponseRecord>, DataError> {
    if !is_supported_file(name) {
        return Err(DataError::UnsupportedFileType(name.to_string()));
    }

    // A panic inside the parser surfaces as a JoinError, mapped to Processing
    tokio::task::spawn_blocking(move || {
        let text = String::from_utf8(bytes).map_err(|e| DataError::Processing(e.to_string()))?;
        parse_records(&text)
    })
    .await?
}

/// Load a file into the store
///
/// On success the records replace the current dataset. On failure the error
/// message is recorded in the store and any previously loaded data is kept.
pub async fn ingest_file(store: &Arc<AppStore>, path: impl AsRef<Path>) -> Result<usize, DataError> {
    let path = path.as_ref();
    let _loading = store.begin_loading();
    store.set_error(None);

    info!("Reading responses from {}", path.display());
    apply(store, read_records(path).await)
}

/// Load dropped file contents into the store
pub async fn ingest_bytes(store: &Arc<AppStore>, name: &str, bytes: Vec<u8>) -> Result<usize, DataError> {
    let _loading = store.begin_loading();
    store.set_error(None);

    info!("Reading {} bytes of responses from {}", bytes.len(), name);
    apply(store, records_from_bytes(name, bytes).await)
}

fn apply(store: &AppStore, result: Result<Vec<ResponseRecord>, DataError>) -> Result<usize, DataError> {
    match result {
        Ok(records) => {
            let count = records.len();
            store.upload_data(records);
            Ok(count)
        }
        Err(error) => {
            warn!("Rejected upload: {}", error);
            store.set_error(Some(error.to_string()));
            Err(error)
        }
    }
}
