//! Response time chart
//!
//! Plots response time over the timestamp-sorted records. The x axis is the
//! position in that order, labelled with each record's clock time.

use std::sync::Arc;

use egui::{Align2, Color32, RichText, TextStyle, Ui};
use egui_plot::{HLine, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, PlotPoints, Points, Text};
use ld_core::{detect_anomalies, AppState, ChartPoint, DatasetVersion};
use tracing::debug;
use uuid::Uuid;

use crate::{colors, SpaceView, SpaceViewId, ViewerContext};

/// Geometry for one dataset version
struct ChartLayout {
    version: DatasetVersion,
    points: Arc<[ChartPoint]>,
    labels: Arc<[String]>,
    coords: Vec<[f64; 2]>,
    average: Option<f64>,
    anomalous: Vec<bool>,
}

impl ChartLayout {
    fn build(state: &AppState) -> Self {
        let anomalies = detect_anomalies(&state.records);
        let points = state.chart_data.clone();

        Self {
            version: state.version,
            coords: points
                .iter()
                .enumerate()
                .map(|(index, point)| [index as f64, point.response_time])
                .collect(),
            labels: points.iter().map(|p| p.axis_label.clone()).collect(),
            average: average_response_time(&points),
            anomalous: points.iter().map(|p| anomalies.contains(&p.id)).collect(),
            points,
        }
    }
}

/// Arithmetic mean of the plotted response times
pub fn average_response_time(points: &[ChartPoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().map(|p| p.response_time).sum::<f64>() / points.len() as f64)
}

pub fn average_label(average: f64) -> String {
    format!("Avg: {}ms", average.round() as i64)
}

/// Index of the point nearest to plot coordinate `x`, if `x` falls on the chart
pub fn nearest_index(len: usize, x: f64) -> Option<usize> {
    if len == 0 || !x.is_finite() || x < -0.5 || x > len as f64 - 0.5 {
        return None;
    }
    Some((x.round().max(0.0) as usize).min(len - 1))
}

/// Tooltip contents for one point
pub fn tooltip_lines(point: &ChartPoint) -> Vec<String> {
    vec![
        point.formatted_time.clone(),
        format!("Response Time: {}ms", point.response_time),
        format!("Model: {}", point.model),
        format!("Tokens: {}", point.total_tokens),
        format!("Status: {}", point.status),
    ]
}

fn axis_label_at(labels: &[String], value: f64) -> String {
    if (value - value.round()).abs() > 1e-6 || value < 0.0 {
        return String::new();
    }
    labels.get(value.round() as usize).cloned().unwrap_or_default()
}

/// Response time line chart view
pub struct ResponseChartView {
    id: SpaceViewId,
    title: String,
    layout: Option<ChartLayout>,
}

impl ResponseChartView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            layout: None,
        }
    }

    /// Rebuild the layout if the store holds a different dataset
    fn refresh(&mut self, ctx: &ViewerContext) {
        let cached = self.layout.as_ref().map(|l| l.version);
        if let Some(layout) = ctx.store.read(|state| {
            (cached != Some(state.version)).then(|| ChartLayout::build(state))
        }) {
            debug!("Chart layout rebuilt for dataset {:?}", layout.version);
            self.layout = Some(layout);
        }
    }
}

impl SpaceView for ResponseChartView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "ResponseChartView"
    }

    fn reset(&mut self) {
        self.layout = None;
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);

        let Some(layout) = self.layout.as_ref().filter(|l| !l.points.is_empty()) else {
            ui.centered_and_justified(|ui| {
                ui.label("No data to display");
            });
            return;
        };

        let selection = ctx.selection.selected();
        let (show_average, highlight_anomalies) = {
            let settings = ctx.settings.read();
            (settings.views.show_average_line, settings.views.highlight_anomalies)
        };

        ui.horizontal(|ui| {
            ui.strong("Response Time Over Time");
            ui.separator();
            ui.label(
                RichText::new(format!("{} responses • Click on data points for details", layout.points.len())).weak(),
            );
        });
        ui.separator();

        let labels = layout.labels.clone();
        let plot = Plot::new(format!("response_chart_{}", self.id))
            .legend(Legend::default())
            .x_axis_label("Time")
            .y_axis_label("Response Time (ms)")
            .x_axis_formatter(move |value, _max_chars, _range| axis_label_at(&labels, value))
            .include_y(0.0)
            .allow_boxed_zoom(true);

        let clicked = plot
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::new(layout.coords.clone()))
                        .color(colors::PRIMARY)
                        .width(2.0)
                        .name("Response Time"),
                );
                plot_ui.points(
                    Points::new(layout.coords.clone())
                        .color(colors::PRIMARY)
                        .radius(3.0)
                        .shape(MarkerShape::Circle)
                        .name("Response Time"),
                );

                if show_average {
                    if let Some(average) = layout.average {
                        let label = average_label(average);
                        plot_ui.hline(
                            HLine::new(average)
                                .color(colors::AVERAGE)
                                .style(LineStyle::Dashed { length: 5.0 })
                                .name(&label),
                        );
                        plot_ui.text(
                            Text::new(PlotPoint::new(0.0, average), label)
                                .color(colors::AVERAGE)
                                .anchor(Align2::LEFT_BOTTOM),
                        );
                    }
                }

                if highlight_anomalies {
                    let outliers: Vec<[f64; 2]> = layout
                        .coords
                        .iter()
                        .zip(&layout.anomalous)
                        .filter(|(_, anomalous)| **anomalous)
                        .map(|(coord, _)| *coord)
                        .collect();
                    if !outliers.is_empty() {
                        plot_ui.points(
                            Points::new(outliers)
                                .color(colors::ANOMALY)
                                .radius(5.0)
                                .shape(MarkerShape::Diamond)
                                .name("Anomalies"),
                        );
                    }
                }

                if !selection.is_empty() {
                    let selected: Vec<[f64; 2]> = layout
                        .points
                        .iter()
                        .zip(&layout.coords)
                        .filter(|(point, _)| selection.contains(&point.id))
                        .map(|(_, coord)| *coord)
                        .collect();
                    plot_ui.points(
                        Points::new(selected)
                            .color(colors::SELECTED)
                            .radius(6.0)
                            .shape(MarkerShape::Circle)
                            .name("Selected"),
                    );
                }

                let response = plot_ui.response();
                let (hovered, clicked) = (response.hovered(), response.clicked() && !response.dragged());
                let target = plot_ui
                    .pointer_coordinate()
                    .and_then(|pointer| nearest_index(layout.coords.len(), pointer.x));

                if let Some(index) = target.filter(|_| hovered) {
                    let [x, y] = layout.coords[index];
                    plot_ui.points(
                        Points::new(vec![[x, y]])
                            .color(colors::PRIMARY.gamma_multiply(1.5))
                            .radius(6.0)
                            .shape(MarkerShape::Circle),
                    );
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(x, y),
                            RichText::new(tooltip_lines(&layout.points[index]).join("\n"))
                                .color(Color32::WHITE)
                                .background_color(Color32::from_rgba_premultiplied(0, 0, 0, 200))
                                .text_style(TextStyle::Small),
                        )
                        .anchor(Align2::LEFT_BOTTOM),
                    );
                }

                target.filter(|_| clicked)
            })
            .inner;

        if let Some(index) = clicked {
            let id = layout.points[index].id.clone();
            debug!("Chart point clicked: {}", id);
            ctx.selection.set_from_chart([id]);
        }
    }
}
