//! The application state store
//!
//! Every operation takes the state write lock exactly once, so a reader sees
//! either the state before a transition or the state after it, never a mix
//! of old records with new projections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::events::events::{DataReset, DataUploaded, ErrorChanged, LoadingChanged, SelectionChanged};
use crate::events::EventBus;
use crate::projection::{Projections, TimeFormatter};
use crate::record::ResponseRecord;
use crate::selection::{SelectionSet, SelectionSource};
use crate::state::{AppAction, AppState, DatasetVersion};

pub struct AppStore {
    state: RwLock<AppState>,
    formatter: TimeFormatter,
    last_version: AtomicU64,
    /// Outstanding [`LoadingGuard`]s
    loading_holds: Mutex<usize>,
    event_bus: Arc<EventBus>,
}

impl AppStore {
    pub fn new(formatter: TimeFormatter) -> Self {
        Self::with_event_bus(formatter, Arc::new(EventBus::new()))
    }

    pub fn with_event_bus(formatter: TimeFormatter, event_bus: Arc<EventBus>) -> Self {
        Self {
            state: RwLock::new(AppState::default()),
            formatter,
            last_version: AtomicU64::new(DatasetVersion::EMPTY.0),
            loading_holds: Mutex::new(0),
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn formatter(&self) -> &TimeFormatter {
        &self.formatter
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> AppState {
        self.state.read().clone()
    }

    /// Run `f` against the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.read())
    }

    fn apply(&self, action: AppAction) {
        let mut state = self.state.write();
        let next = state.reduce(action);
        *state = next;
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.apply(AppAction::SetLoading(is_loading));
        self.event_bus.publish(LoadingChanged { is_loading });
    }

    pub fn set_error(&self, message: Option<String>) {
        self.apply(AppAction::SetError(message.clone()));
        self.event_bus.publish(ErrorChanged { message });
    }

    /// Replace the canonical records, derive both projections, clear selection and error
    pub fn upload_data(&self, records: Vec<ResponseRecord>) {
        let version = DatasetVersion(self.last_version.fetch_add(1, Ordering::SeqCst) + 1);
        let record_count = records.len();

        // Derive before taking the state lock; the swap below is the only visible step
        debug!("Deriving projections for {} records at {:?}", record_count, version);
        let projections = Arc::new(Projections::derive(&records, &self.formatter));

        self.apply(AppAction::UploadData {
            records: records.into(),
            projections,
            version,
        });

        info!("Loaded {} responses ({:?})", record_count, version);
        self.event_bus.publish(DataUploaded { version, record_count });
    }

    /// Replace the selection. Any view may call this; the last call wins.
    pub fn select_items<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_from(SelectionSource::Programmatic, ids);
    }

    pub(crate) fn select_from<I, S>(&self, source: SelectionSource, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let selection: SelectionSet = ids.into_iter().collect();
        let selected_count = selection.len();

        self.apply(AppAction::SelectItems(selection));

        debug!("Selection replaced from {}: {} ids", source, selected_count);
        self.event_bus.publish(SelectionChanged {
            source,
            selected_count,
        });
    }

    /// Restore the initial state
    pub fn reset_data(&self) {
        self.apply(AppAction::ResetData);

        info!("Dashboard state reset");
        self.event_bus.publish(DataReset);
    }

    /// Mark the store as loading until every returned guard is dropped
    pub fn begin_loading(self: &Arc<Self>) -> LoadingGuard {
        let mut holds = self.loading_holds.lock();
        *holds += 1;
        if *holds == 1 {
            self.set_loading(true);
        }
        LoadingGuard { store: self.clone() }
    }

    fn end_loading(&self) {
        let mut holds = self.loading_holds.lock();
        *holds = holds.saturating_sub(1);
        if *holds == 0 {
            self.set_loading(false);
        }
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(TimeFormatter::default())
    }
}

/// Clears the loading flag when dropped, including on early returns and panics
#[must_use = "the loading flag is cleared as soon as the guard is dropped"]
pub struct LoadingGuard {
    store: Arc<AppStore>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.store.end_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ResponseStatus;
    use chrono::DateTime;
    use parking_lot::Mutex;

    fn record(id: &str, ts: &str) -> ResponseRecord {
        let timestamp = DateTime::parse_from_rfc3339(ts).unwrap();
        ResponseRecord::new(id, timestamp, "claude", 100.0, ResponseStatus::Success).with_tokens(Some(10))
    }

    fn sample() -> Vec<ResponseRecord> {
        vec![
            record("r2", "2024-01-01T00:00:02Z"),
            record("r1", "2024-01-01T00:00:01Z"),
        ]
    }

    #[test]
    fn upload_replaces_records_and_derives_projections() {
        let store = AppStore::default();
        store.upload_data(sample());

        let state = store.snapshot();
        assert!(state.has_data);
        assert_eq!(state.record_count(), 2);
        assert_eq!(state.chart_data.len(), 2);
        assert_eq!(state.table_data.len(), 2);
        assert_eq!(state.chart_data[0].id, "r1");
        assert_eq!(state.table_data[0].id, "r1");
        // Canonical order is left as uploaded
        assert_eq!(state.records[0].id, "r2");
        assert_ne!(state.version, DatasetVersion::EMPTY);
    }

    #[test]
    fn upload_clears_selection_and_error() {
        let store = AppStore::default();
        store.upload_data(sample());
        store.select_items(["r1"]);
        store.set_error(Some("bad file".to_string()));

        store.upload_data(vec![record("r9", "2024-01-02T00:00:00Z")]);

        let state = store.snapshot();
        assert!(state.selection.is_empty());
        assert_eq!(state.error, None);
        assert_eq!(state.records[0].id, "r9");
    }

    #[test]
    fn snapshots_of_one_version_share_projections() {
        let store = AppStore::default();
        store.upload_data(sample());

        let first = store.snapshot();
        store.select_items(["r1"]);
        store.set_loading(true);
        let second = store.snapshot();
        assert!(Arc::ptr_eq(&first.chart_data, &second.chart_data));
        assert!(Arc::ptr_eq(&first.table_data, &second.table_data));

        store.upload_data(sample());
        let third = store.snapshot();
        assert!(!Arc::ptr_eq(&first.chart_data, &third.chart_data));
        assert_eq!(first.chart_data, third.chart_data);
    }

    #[test]
    fn empty_upload_has_no_data() {
        let store = AppStore::default();
        store.upload_data(Vec::new());

        let state = store.snapshot();
        assert!(!state.has_data);
        assert!(state.chart_data.is_empty());
    }

    #[test]
    fn versions_never_repeat_across_resets() {
        let store = AppStore::default();
        store.upload_data(sample());
        let first = store.snapshot().version;

        store.reset_data();
        store.upload_data(sample());
        assert!(store.snapshot().version > first);
    }

    #[test]
    fn reset_restores_initial_state() {
        let store = AppStore::default();
        store.upload_data(sample());
        store.select_items(["r1", "r2"]);
        store.set_error(Some("oops".to_string()));
        store.set_loading(true);

        store.reset_data();

        assert_eq!(store.snapshot(), AppState::default());
        let state = store.snapshot();
        assert!(state.records.is_empty());
        assert!(state.selection.is_empty());
        assert!(!state.has_data);
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn loading_and_error_leave_records_alone() {
        let store = AppStore::default();
        store.upload_data(sample());
        let before = store.snapshot();

        store.set_loading(true);
        store.set_error(Some("Invalid JSON format".to_string()));

        let after = store.snapshot();
        assert_eq!(after.records, before.records);
        assert_eq!(after.chart_data, before.chart_data);
        assert!(after.is_loading);
        assert_eq!(after.error.as_deref(), Some("Invalid JSON format"));

        store.set_error(None);
        assert_eq!(store.snapshot().error, None);
        assert!(store.snapshot().is_loading);
    }

    #[test]
    fn select_items_does_not_touch_records() {
        let store = AppStore::default();
        store.upload_data(sample());
        let before = store.snapshot();

        store.select_items(["r2"]);

        let after = store.snapshot();
        assert_eq!(after.records, before.records);
        assert_eq!(after.version, before.version);
        assert!(after.selection.contains("r2"));
    }

    #[test]
    fn loading_guard_clears_flag_on_drop() {
        let store = Arc::new(AppStore::default());

        {
            let _guard = store.begin_loading();
            assert!(store.snapshot().is_loading);
        }
        assert!(!store.snapshot().is_loading);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.begin_loading();
            panic!("read failed");
        }));
        assert!(result.is_err());
        assert!(!store.snapshot().is_loading);
    }

    #[test]
    fn overlapping_guards_hold_the_flag_until_the_last_drops() {
        let store = Arc::new(AppStore::default());

        let first = store.begin_loading();
        let second = store.begin_loading();
        drop(first);
        assert!(store.snapshot().is_loading);

        drop(second);
        assert!(!store.snapshot().is_loading);

        let _third = store.begin_loading();
        assert!(store.snapshot().is_loading);
    }

    #[test]
    fn store_publishes_events() {
        let store = AppStore::default();
        let uploads = Arc::new(Mutex::new(Vec::new()));
        let resets = Arc::new(Mutex::new(0));

        let sink = uploads.clone();
        store.event_bus().subscribe::<DataUploaded, _>(move |event| {
            sink.lock().push(event.record_count);
        });
        let counter = resets.clone();
        store.event_bus().subscribe::<DataReset, _>(move |_| {
            *counter.lock() += 1;
        });

        store.upload_data(sample());
        store.reset_data();

        assert_eq!(*uploads.lock(), vec![2]);
        assert_eq!(*resets.lock(), 1);
    }
}
