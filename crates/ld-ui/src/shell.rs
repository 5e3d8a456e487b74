//! Dashboard chrome: header bar and failure notice

use egui::{Align, Layout, RichText, Ui};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    Reset,
    ToggleAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    ResetData,
    Reload,
}

pub fn analyzing_label(record_count: usize) -> String {
    format!("Analyzing {} LLM responses", record_count)
}

/// Title, record count and the reset button
pub fn header(ui: &mut Ui, record_count: usize, is_loading: bool, analysis_open: bool) -> Option<HeaderAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading(RichText::new("Response Time Analysis").strong());
            ui.label(RichText::new(analyzing_label(record_count)).weak());
        });

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui
                .add_enabled(!is_loading, egui::Button::new("⟲ Reset"))
                .on_hover_text("Clear the loaded data")
                .clicked()
            {
                action = Some(HeaderAction::Reset);
            }
            if ui.selectable_label(analysis_open, "AI Analysis").clicked() {
                action = Some(HeaderAction::ToggleAnalysis);
            }
        });
    });

    action
}

/// Shown in place of the dashboard after a rendering failure
pub fn failure_notice(ui: &mut Ui, message: &str) -> Option<FailureAction> {
    let mut action = None;

    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        theme::notice_frame(theme::error_color()).show(ui, |ui| {
            ui.set_max_width(420.0);
            ui.heading(RichText::new("⚠ Something went wrong").color(theme::error_color()));
            ui.label("An unexpected error occurred while rendering the dashboard.");
            ui.add_space(8.0);
            ui.collapsing("Error Details", |ui| {
                ui.label(RichText::new(message).monospace());
            });
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Reset data").clicked() {
                    action = Some(FailureAction::ResetData);
                }
                if ui.button("Reload").clicked() {
                    action = Some(FailureAction::Reload);
                }
            });
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_subtitle_counts_responses() {
        assert_eq!(analyzing_label(0), "Analyzing 0 LLM responses");
        assert_eq!(analyzing_label(250), "Analyzing 250 LLM responses");
    }
}
