//! Space view abstraction - base trait for all dockable views

use egui::Ui;
use uuid::Uuid;

use crate::ViewerContext;

/// Unique identifier for a space view
pub type SpaceViewId = Uuid;

/// Base trait for the dashboard's views (chart, table, stats)
pub trait SpaceView: Send + Sync {
    fn id(&self) -> SpaceViewId;

    /// Tab title
    fn display_name(&self) -> &str;

    fn view_type(&self) -> &str;

    /// Draw the UI
    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui);

    /// Drop anything derived from a previous dataset
    fn reset(&mut self) {}
}
