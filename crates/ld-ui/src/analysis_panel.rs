//! Side panel for AI analysis of the loaded responses

use std::sync::Arc;

use egui::{RichText, Ui};
use ld_analysis::{AnalysisSession, AnalysisState};
use ld_core::ResponseRecord;
use tokio::runtime::Handle;
use tracing::debug;

use crate::theme;

pub struct AnalysisPanel {
    session: Arc<AnalysisSession>,
    runtime: Handle,
    custom_prompt: String,
}

impl AnalysisPanel {
    pub fn new(session: Arc<AnalysisSession>, runtime: Handle) -> Self {
        Self {
            session,
            runtime,
            custom_prompt: String::new(),
        }
    }

    pub fn session(&self) -> &Arc<AnalysisSession> {
        &self.session
    }

    fn spawn_analysis(&self, ctx: egui::Context, records: Arc<[ResponseRecord]>) {
        let session = self.session.clone();
        self.runtime.spawn(async move {
            session.analyze_data(&records).await;
            ctx.request_repaint();
        });
    }

    fn spawn_prompt(&self, ctx: egui::Context, prompt: String) {
        let session = self.session.clone();
        self.runtime.spawn(async move {
            session.send_prompt(&prompt).await;
            ctx.request_repaint();
        });
    }

    pub fn ui(&mut self, ui: &mut Ui, records: Arc<[ResponseRecord]>) {
        let AnalysisState {
            is_loading,
            response,
            error,
        } = self.session.snapshot();

        ui.heading("AI Analysis");
        ui.add_space(8.0);

        let analyze_label = if is_loading { "Analyzing..." } else { "Analyze Data" };
        if ui
            .add_enabled(!is_loading && !records.is_empty(), egui::Button::new(analyze_label))
            .clicked()
        {
            debug!("Analysis requested for {} records", records.len());
            self.spawn_analysis(ui.ctx().clone(), records);
        }
        ui.label(
            RichText::new("Analyzes your LLM response data for insights and patterns")
                .small()
                .weak(),
        );

        ui.add_space(12.0);
        ui.label("Custom Prompt");
        ui.add(
            egui::TextEdit::multiline(&mut self.custom_prompt)
                .hint_text("Ask anything about your data...")
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        let send_label = if is_loading { "Sending..." } else { "Send" };
        if ui
            .add_enabled(!is_loading && !self.custom_prompt.trim().is_empty(), egui::Button::new(send_label))
            .clicked()
        {
            self.spawn_prompt(ui.ctx().clone(), self.custom_prompt.clone());
        }

        if is_loading {
            ui.add_space(8.0);
            ui.spinner();
        }

        if let Some(response) = response {
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.strong("Response");
                if ui.small_button("Clear").clicked() {
                    self.session.clear_response();
                }
            });
            if response.success {
                theme::notice_frame(theme::success_color()).show(ui, |ui| {
                    egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                        ui.label(RichText::new(&response.content).monospace());
                    });
                });
            } else {
                let message = response.error.as_deref().unwrap_or("Unknown error occurred");
                theme::notice_frame(theme::error_color()).show(ui, |ui| {
                    ui.label(RichText::new(format!("Error: {}", message)).color(theme::error_color()));
                });
            }
        } else if let Some(error) = error {
            ui.add_space(12.0);
            theme::notice_frame(theme::error_color()).show(ui, |ui| {
                ui.label(RichText::new(error).color(theme::error_color()));
            });
        }

        if !self.session.is_available() {
            ui.add_space(12.0);
            theme::notice_frame(theme::warning_color()).show(ui, |ui| {
                ui.label(
                    RichText::new("Set ANTHROPIC_API_KEY in the environment or a .env file to use AI analysis.")
                        .small(),
                );
            });
        }
    }
}
