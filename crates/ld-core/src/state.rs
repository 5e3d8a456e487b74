//! Application state and its transitions

use std::sync::Arc;

use crate::projection::{ChartPoint, Projections, TableRow};
use crate::record::ResponseRecord;
use crate::selection::SelectionSet;

/// Identifies one uploaded record array. `EMPTY` is the version of the initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetVersion(pub u64);

impl DatasetVersion {
    pub const EMPTY: DatasetVersion = DatasetVersion(0);
}

/// Snapshot of everything the views render from
///
/// Cloning is cheap: the record array and both projections are shared slices.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub records: Arc<[ResponseRecord]>,
    pub chart_data: Arc<[ChartPoint]>,
    pub table_data: Arc<[TableRow]>,
    pub selection: SelectionSet,
    pub is_loading: bool,
    pub error: Option<String>,
    pub has_data: bool,
    pub version: DatasetVersion,
}

impl Default for AppState {
    fn default() -> Self {
        let projections = Projections::default();
        Self {
            records: Arc::from(Vec::new()),
            chart_data: projections.chart,
            table_data: projections.table,
            selection: SelectionSet::default(),
            is_loading: false,
            error: None,
            has_data: false,
            version: DatasetVersion::EMPTY,
        }
    }
}

/// Named state transitions
#[derive(Debug, Clone)]
pub enum AppAction {
    SetLoading(bool),
    SetError(Option<String>),
    UploadData {
        records: Arc<[ResponseRecord]>,
        projections: Arc<Projections>,
        version: DatasetVersion,
    },
    SelectItems(SelectionSet),
    ResetData,
}

impl AppState {
    /// Compute the next state. Total over every state and action.
    pub fn reduce(&self, action: AppAction) -> AppState {
        match action {
            AppAction::SetLoading(is_loading) => AppState {
                is_loading,
                ..self.clone()
            },
            AppAction::SetError(error) => AppState {
                error,
                ..self.clone()
            },
            AppAction::UploadData {
                records,
                projections,
                version,
            } => AppState {
                has_data: !records.is_empty(),
                records,
                chart_data: projections.chart.clone(),
                table_data: projections.table.clone(),
                selection: SelectionSet::default(),
                error: None,
                version,
                is_loading: self.is_loading,
            },
            AppAction::SelectItems(selection) => AppState {
                selection,
                ..self.clone()
            },
            AppAction::ResetData => AppState::default(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, id: &str) -> Option<&ResponseRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}
