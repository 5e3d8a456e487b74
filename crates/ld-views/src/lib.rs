//! Dockable views over the loaded responses

mod response_chart;
mod space_view;
mod stats_view;
mod table;
mod viewport;

pub use response_chart::{average_label, average_response_time, nearest_index, tooltip_lines, ResponseChartView};
pub use space_view::{SpaceView, SpaceViewId};
pub use stats_view::SummaryStatsView;
pub use table::{format_cost, format_count_header, page_bounds, sort_rows, truncate_id, PageBounds, ResponseTableView, SortColumn, SortDirection};
pub use viewport::Viewport;

use std::sync::Arc;

use egui::Color32;
use ld_core::{AppSettings, AppStore, ResponseStatus, SelectionCoordinator};
use parking_lot::RwLock;

/// Context passed to views during rendering
#[derive(Clone)]
pub struct ViewerContext {
    /// Shared application state
    pub store: Arc<AppStore>,

    /// Cross-view selection entry point
    pub selection: SelectionCoordinator,

    pub settings: Arc<RwLock<AppSettings>>,
}

impl ViewerContext {
    pub fn new(store: Arc<AppStore>, settings: Arc<RwLock<AppSettings>>) -> Self {
        Self {
            selection: SelectionCoordinator::new(store.clone()),
            store,
            settings,
        }
    }
}

/// Series and highlight colors shared by the views
pub mod colors {
    use egui::Color32;

    pub const PRIMARY: Color32 = Color32::from_rgb(37, 99, 235);
    pub const SELECTED: Color32 = Color32::from_rgb(239, 68, 68);
    pub const AVERAGE: Color32 = Color32::from_rgb(156, 163, 175);
    pub const ANOMALY: Color32 = Color32::from_rgb(245, 158, 11);
    pub const SUCCESS: Color32 = Color32::from_rgb(22, 163, 74);
    pub const FAILURE: Color32 = Color32::from_rgb(220, 38, 38);
    pub const TIMEOUT: Color32 = Color32::from_rgb(217, 119, 6);
}

pub fn status_color(status: ResponseStatus) -> Color32 {
    match status {
        ResponseStatus::Success => colors::SUCCESS,
        ResponseStatus::Error => colors::FAILURE,
        ResponseStatus::Timeout => colors::TIMEOUT,
    }
}
