//! File upload panel

use egui::{RichText, Ui};

use crate::theme;

/// What the user asked the upload panel to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadAction {
    PickFile,
    LoadSample,
}

pub fn drop_zone_message(is_loading: bool, hovering_files: bool) -> &'static str {
    if is_loading {
        "Processing file..."
    } else if hovering_files {
        "Drop your JSON file here..."
    } else {
        "Drag & drop your JSON file here"
    }
}

/// Upload controls with the current error shown beneath them
///
/// Controls are disabled while a file is loading so only one upload runs at
/// a time.
pub fn upload_panel(ui: &mut Ui, is_loading: bool, error: Option<&str>) -> Option<UploadAction> {
    let hovering_files = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
    let mut action = None;

    ui.vertical_centered(|ui| {
        ui.add_space(16.0);
        ui.heading("Upload Response Data");
        ui.add_space(12.0);

        let border = if hovering_files {
            theme::accent_color()
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        egui::Frame::none()
            .stroke(egui::Stroke::new(1.5, border))
            .rounding(8.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    if is_loading {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(drop_zone_message(true, hovering_files));
                        });
                    } else {
                        ui.label(RichText::new(drop_zone_message(false, hovering_files)).strong());
                        ui.label(RichText::new("or").weak());
                    }

                    ui.add_space(8.0);
                    if ui.add_enabled(!is_loading, egui::Button::new("📁 Choose file…")).clicked() {
                        action = Some(UploadAction::PickFile);
                    }
                    if ui.add_enabled(!is_loading, egui::Button::new("Load sample data")).clicked() {
                        action = Some(UploadAction::LoadSample);
                    }

                    ui.add_space(8.0);
                    ui.label(RichText::new("Supported format: JSON files with LLM response data").small().weak());
                });
            });

        if let Some(message) = error {
            ui.add_space(12.0);
            theme::notice_frame(theme::error_color()).show(ui, |ui| {
                ui.label(RichText::new(message).color(theme::error_color()));
            });
        }

        ui.add_space(16.0);
        ui.label(RichText::new("Expected format: Array of response objects with fields like").small().weak());
        ui.label(RichText::new("id, timestamp, response_time_ms, model, etc.").small().weak());
    });

    action
}
