//! Summary statistics view

use egui::{RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use ld_core::{detect_anomalies, AppState, DatasetStats, DatasetVersion, TimeFormatter};
use uuid::Uuid;

use crate::{colors, status_color, SpaceView, SpaceViewId, ViewerContext};

struct CachedStats {
    version: DatasetVersion,
    stats: DatasetStats,
    anomalies: Vec<String>,
}

impl CachedStats {
    fn compute(state: &AppState) -> Self {
        Self {
            version: state.version,
            stats: DatasetStats::compute(&state.records),
            anomalies: detect_anomalies(&state.records),
        }
    }
}

/// Key/value rows shown in the overview grid
fn overview_rows(stats: &DatasetStats, formatter: &TimeFormatter) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Responses", stats.total_responses.to_string()),
        ("Models", stats.models.join(", ")),
        ("Total tokens", stats.total_tokens.to_string()),
        ("Total cost", format!("${:.4}", stats.total_cost_usd)),
    ];
    if let Some(rate) = stats.success_rate {
        rows.push(("Success rate", format!("{:.1}%", rate * 100.0)));
    }
    if let Some((first, last)) = &stats.date_range {
        rows.push(("First response", formatter.display(first)));
        rows.push(("Last response", formatter.display(last)));
    }
    rows
}

/// Dataset summary and slow-response outliers
pub struct SummaryStatsView {
    id: SpaceViewId,
    title: String,
    cached: Option<CachedStats>,
}

impl SummaryStatsView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            cached: None,
        }
    }

    fn refresh(&mut self, ctx: &ViewerContext) {
        let cached = self.cached.as_ref().map(|c| c.version);
        if let Some(stats) = ctx
            .store
            .read(|state| (cached != Some(state.version)).then(|| CachedStats::compute(state)))
        {
            self.cached = Some(stats);
        }
    }
}

impl SpaceView for SummaryStatsView {
    fn id(&self) -> SpaceViewId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn view_type(&self) -> &str {
        "SummaryStatsView"
    }

    fn reset(&mut self) {
        self.cached = None;
    }

    fn ui(&mut self, ctx: &ViewerContext, ui: &mut Ui) {
        self.refresh(ctx);

        let Some(cached) = self.cached.as_ref().filter(|c| c.stats.total_responses > 0) else {
            ui.centered_and_justified(|ui| {
                ui.label("No data to display");
            });
            return;
        };
        let stats = &cached.stats;

        ScrollArea::vertical()
            .id_source(format!("stats_{}", self.id))
            .show(ui, |ui| {
                egui::Grid::new(format!("stats_overview_{}", self.id))
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for (label, value) in overview_rows(stats, ctx.store.formatter()) {
                            ui.strong(label);
                            ui.label(value);
                            ui.end_row();
                        }
                        ui.strong("Statuses");
                        ui.horizontal(|ui| {
                            for status in &stats.statuses {
                                ui.label(RichText::new(status.as_str()).color(status_color(*status)));
                            }
                        });
                        ui.end_row();
                    });

                if let Some(times) = &stats.response_time {
                    ui.add_space(8.0);
                    ui.heading("Response time (ms)");
                    TableBuilder::new(ui)
                        .striped(true)
                        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                        .columns(Column::initial(90.0).at_least(60.0), 5)
                        .header(20.0, |mut header| {
                            for name in ["Min", "Max", "Mean", "Std Dev", "Anomaly above"] {
                                header.col(|ui| {
                                    ui.strong(name);
                                });
                            }
                        })
                        .body(|mut body| {
                            body.row(18.0, |mut row| {
                                for value in [times.min, times.max, times.mean, times.std_dev, times.anomaly_threshold()] {
                                    row.col(|ui| {
                                        ui.label(format!("{:.2}", value));
                                    });
                                }
                            });
                        });
                }

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.heading("Anomalies");
                    ui.label(RichText::new(format!("({})", cached.anomalies.len())).weak());
                    if !cached.anomalies.is_empty() && ui.button("Select all").clicked() {
                        ctx.store.select_items(cached.anomalies.iter().cloned());
                    }
                });
                if cached.anomalies.is_empty() {
                    ui.label(RichText::new("No unusually slow responses").weak());
                }
                for id in &cached.anomalies {
                    let selected = ctx.selection.is_selected(id);
                    if ui
                        .selectable_label(selected, RichText::new(id).monospace().color(colors::ANOMALY))
                        .clicked()
                    {
                        ctx.store.select_items([id.clone()]);
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use ld_core::{AppSettings, AppStore, ResponseRecord, ResponseStatus};
    use parking_lot::RwLock;
    use std::sync::Arc;

    #[test]
    fn overview_lists_totals_and_range() {
        let ts = |s: &str| DateTime::parse_from_rfc3339(s).unwrap();
        let records = vec![
            ResponseRecord::new("a", ts("2024-01-01T10:00:00Z"), "gpt-4", 100.0, ResponseStatus::Success)
                .with_tokens(Some(10))
                .with_cost(0.5),
            ResponseRecord::new("b", ts("2024-01-01T09:00:00Z"), "claude-3", 300.0, ResponseStatus::Error)
                .with_tokens(Some(5))
                .with_cost(0.25),
        ];
        let stats = DatasetStats::compute(&records);
        let rows = overview_rows(&stats, &TimeFormatter::default());

        let value = |key: &str| rows.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone()).unwrap();
        assert_eq!(value("Responses"), "2");
        assert_eq!(value("Models"), "gpt-4, claude-3");
        assert_eq!(value("Total tokens"), "15");
        assert_eq!(value("Total cost"), "$0.7500");
        assert_eq!(value("Success rate"), "50.0%");
        assert_eq!(value("First response"), TimeFormatter::default().display(&ts("2024-01-01T09:00:00Z")));
    }

    #[test]
    fn stats_follow_dataset_version() {
        let store = Arc::new(AppStore::default());
        let ctx = ViewerContext::new(store.clone(), Arc::new(RwLock::new(AppSettings::default())));
        let mut view = SummaryStatsView::new("Stats");

        view.refresh(&ctx);
        assert_eq!(view.cached.as_ref().unwrap().stats.total_responses, 0);

        let ts = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        store.upload_data(vec![ResponseRecord::new("a", ts, "m", 1.0, ResponseStatus::Success)]);
        view.refresh(&ctx);
        assert_eq!(view.cached.as_ref().unwrap().stats.total_responses, 1);
        assert!(view.cached.as_ref().unwrap().anomalies.is_empty());
    }
}
