//! The dashboard application

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use eframe::egui::{self, Context};
use ld_analysis::{AnalysisSession, AnthropicClient};
use ld_core::events::events::{DataReset, DataUploaded, ErrorChanged, LoadingChanged};
use ld_core::{AppSettings, AppStore, EventBus};
use ld_data::{ingest_bytes, ingest_file, SampleGenerator};
use ld_ui::{AnalysisPanel, FailureAction, HeaderAction, UploadAction};
use ld_views::{ViewerContext, Viewport};
use parking_lot::RwLock;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use crate::cli::DEFAULT_SAMPLE_COUNT;

/// Main application state
pub struct DashboardApp {
    /// Runs file reads and analysis requests
    runtime: Runtime,

    store: Arc<AppStore>,
    viewer_context: ViewerContext,
    viewport: Viewport,
    analysis_panel: AnalysisPanel,
    show_analysis: bool,

    /// Set when rendering panicked; replaces the dashboard with a notice
    failure: Option<String>,

    sample_seed: u64,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: Runtime, startup_file: Option<PathBuf>) -> Self {
        let settings = AppSettings::default().with_local_offset();
        ld_ui::apply_theme(&cc.egui_ctx, &settings.theme);

        let event_bus = Arc::new(EventBus::new());
        subscribe_repaints(&event_bus, &cc.egui_ctx);
        let store = Arc::new(AppStore::with_event_bus(settings.time_formatter(), event_bus));

        let session = match AnthropicClient::from_env() {
            Ok(client) => {
                info!("AI analysis enabled with model {}", client.config().model);
                AnalysisSession::new(Arc::new(client))
            }
            Err(e) => {
                warn!("AI analysis disabled: {}", e);
                AnalysisSession::unavailable(e.to_string())
            }
        };
        let analysis_panel = AnalysisPanel::new(Arc::new(session), runtime.handle().clone());

        let mut app = Self {
            viewer_context: ViewerContext::new(store.clone(), Arc::new(RwLock::new(settings))),
            store,
            viewport: Viewport::new(),
            analysis_panel,
            show_analysis: false,
            failure: None,
            sample_seed: 42,
            runtime,
        };

        if let Some(path) = startup_file {
            app.open_path(cc.egui_ctx.clone(), path);
        }
        app
    }

    fn pick_file(&mut self, ctx: &Context) {
        if self.store.read(|state| state.is_loading) {
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        {
            self.open_path(ctx.clone(), path);
        }
    }

    /// Read and ingest a file on the runtime
    ///
    /// The loading flag is raised here, before the task is spawned, so a
    /// second pick or drop in the same frame is refused.
    fn open_path(&mut self, ctx: Context, path: PathBuf) {
        info!("Opening {}", path.display());
        let store = self.store.clone();
        let loading = store.begin_loading();

        self.runtime.spawn(async move {
            let _loading = loading;
            if let Err(e) = ingest_file(&store, &path).await {
                error!("Failed to load {}: {}", path.display(), e);
            }
            ctx.request_repaint();
        });
    }

    fn open_bytes(&mut self, ctx: Context, name: String, bytes: Vec<u8>) {
        let store = self.store.clone();
        let loading = store.begin_loading();

        self.runtime.spawn(async move {
            let _loading = loading;
            if let Err(e) = ingest_bytes(&store, &name, bytes).await {
                error!("Failed to load dropped file {}: {}", name, e);
            }
            ctx.request_repaint();
        });
    }

    fn load_sample(&mut self) {
        let records = SampleGenerator::new(self.sample_seed).generate(DEFAULT_SAMPLE_COUNT);
        self.sample_seed = self.sample_seed.wrapping_add(1);
        self.store.upload_data(records);
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        if self.store.read(|state| state.is_loading) {
            warn!("Ignoring dropped file while another upload is in progress");
            return;
        }

        if let Some(path) = file.path {
            self.open_path(ctx.clone(), path);
        } else if let Some(bytes) = file.bytes {
            self.open_bytes(ctx.clone(), file.name, bytes.to_vec());
        }
    }

    fn handle_upload_action(&mut self, ctx: &Context, action: Option<UploadAction>) {
        match action {
            Some(UploadAction::PickFile) => self.pick_file(ctx),
            Some(UploadAction::LoadSample) => self.load_sample(),
            None => {}
        }
    }

    fn reset(&mut self) {
        self.store.reset_data();
        self.viewport.reset_views();
        self.analysis_panel.session().clear_response();
    }

    /// Draw the dashboard. Panics are caught by the caller.
    fn render(&mut self, ctx: &Context) {
        self.handle_dropped_files(ctx);

        let (has_data, is_loading, error, records) = self
            .store
            .read(|state| (state.has_data, state.is_loading, state.error.clone(), state.records.clone()));

        if !has_data {
            egui::CentralPanel::default().show(ctx, |ui| {
                let action = ld_ui::upload_panel(ui, is_loading, error.as_deref());
                self.handle_upload_action(ctx, action);
            });
            return;
        }

        egui::SidePanel::left("upload_panel")
            .resizable(false)
            .exact_width(280.0)
            .show(ctx, |ui| {
                let action = ld_ui::upload_panel(ui, is_loading, error.as_deref());
                self.handle_upload_action(ctx, action);
            });

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            match ld_ui::header(ui, records.len(), is_loading, self.show_analysis) {
                Some(HeaderAction::Reset) => self.reset(),
                Some(HeaderAction::ToggleAnalysis) => self.show_analysis = !self.show_analysis,
                None => {}
            }
            ui.add_space(4.0);
        });

        if self.show_analysis {
            egui::SidePanel::right("analysis_panel")
                .default_width(340.0)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.analysis_panel.ui(ui, records.clone());
                    });
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewport.ui(ui, &self.viewer_context);
        });
    }

    fn show_failure(&mut self, ctx: &Context, message: &str) {
        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            action = ld_ui::failure_notice(ui, message);
        });

        match action {
            Some(FailureAction::ResetData) => {
                self.reset();
                self.failure = None;
            }
            Some(FailureAction::Reload) => {
                self.viewport = Viewport::new();
                self.failure = None;
            }
            None => {}
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(message) = self.failure.clone() {
            self.show_failure(ctx, &message);
            return;
        }

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| self.render(ctx))) {
            let message = panic_message(payload.as_ref());
            error!("Dashboard rendering failed: {}", message);
            self.failure = Some(message);
            ctx.request_repaint();
        }
    }
}

/// Repaint whenever the store changes from a background task
fn subscribe_repaints(event_bus: &EventBus, ctx: &Context) {
    let repaint = ctx.clone();
    event_bus.subscribe::<DataUploaded, _>(move |event| {
        debug!("Dataset {:?} ready with {} responses", event.version, event.record_count);
        repaint.request_repaint();
    });

    let repaint = ctx.clone();
    event_bus.subscribe::<DataReset, _>(move |_| repaint.request_repaint());

    let repaint = ctx.clone();
    event_bus.subscribe::<ErrorChanged, _>(move |event| {
        if let Some(message) = &event.message {
            warn!("Upload error: {}", message);
        }
        repaint.request_repaint();
    });

    let repaint = ctx.clone();
    event_bus.subscribe::<LoadingChanged, _>(move |_| repaint.request_repaint());
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown error occurred".to_string()
    }
}
