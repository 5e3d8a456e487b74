//! User interface components for the LLM response dashboard
//!
//! Panels and chrome around the dockable views: theme, upload controls,
//! header, failure notice and the AI analysis side panel.

pub mod analysis_panel;
pub mod shell;
pub mod theme;
pub mod upload_panel;

pub use analysis_panel::AnalysisPanel;
pub use shell::{analyzing_label, failure_notice, header, FailureAction, HeaderAction};
pub use theme::apply_theme;
pub use upload_panel::{upload_panel, UploadAction};
