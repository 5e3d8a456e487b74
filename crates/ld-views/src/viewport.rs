//! Viewport - manages dockable space views

use std::collections::HashMap;

use egui::Ui;
use egui_dock::{DockArea, DockState, NodeIndex, TabViewer};

use crate::{ResponseChartView, ResponseTableView, SpaceView, SpaceViewId, SummaryStatsView, ViewerContext};

/// Fraction of the height given to the chart in the default layout
const CHART_FRACTION: f32 = 0.45;

/// The dashboard viewport: chart above, table and stats tabbed below
pub struct Viewport {
    dock_state: DockState<SpaceViewId>,
    space_views: HashMap<SpaceViewId, Box<dyn SpaceView>>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::with_views(
            Box::new(ResponseChartView::new("Response Time")),
            vec![
                Box::new(ResponseTableView::new("Response Data")),
                Box::new(SummaryStatsView::new("Summary")),
            ],
        )
    }

    /// One view on top, the rest as tabs in a panel below it
    pub fn with_views(top: Box<dyn SpaceView>, bottom: Vec<Box<dyn SpaceView>>) -> Self {
        let mut dock_state = DockState::new(vec![top.id()]);
        let bottom_ids: Vec<SpaceViewId> = bottom.iter().map(|view| view.id()).collect();
        if !bottom_ids.is_empty() {
            dock_state
                .main_surface_mut()
                .split_below(NodeIndex::root(), CHART_FRACTION, bottom_ids);
        }

        let space_views = std::iter::once(top)
            .chain(bottom)
            .map(|view| (view.id(), view))
            .collect();

        Self {
            dock_state,
            space_views,
        }
    }

    pub fn view_count(&self) -> usize {
        self.space_views.len()
    }

    /// Forget anything the views derived from the previous dataset
    pub fn reset_views(&mut self) {
        for view in self.space_views.values_mut() {
            view.reset();
        }
    }

    /// Draw the viewport
    pub fn ui(&mut self, ui: &mut Ui, viewer_context: &ViewerContext) {
        DockArea::new(&mut self.dock_state)
            .show_close_buttons(false)
            .draggable_tabs(true)
            .show_inside(
                ui,
                &mut ViewportTabViewer {
                    space_views: &mut self.space_views,
                    viewer_context,
                },
            );
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Tab viewer for egui_dock
struct ViewportTabViewer<'a> {
    space_views: &'a mut HashMap<SpaceViewId, Box<dyn SpaceView>>,
    viewer_context: &'a ViewerContext,
}

impl<'a> TabViewer for ViewportTabViewer<'a> {
    type Tab = SpaceViewId;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        match self.space_views.get(tab) {
            Some(view) => view.display_name().into(),
            None => "Unknown".into(),
        }
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut Self::Tab) {
        if let Some(view) = self.space_views.get_mut(tab) {
            view.ui(self.viewer_context, ui);
        }
    }
}
