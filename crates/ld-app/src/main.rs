//! Main application entry point

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui;
use ld_data::{sample_document, SampleGenerator};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;

use app::DashboardApp;
use cli::LaunchMode;

const SAMPLE_SEED: u64 = 42;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match cli::parse_args(std::env::args().skip(1))? {
        LaunchMode::Dashboard { file } => run_dashboard(file),
        LaunchMode::WriteSample { path, count } => write_sample(&path, count),
        LaunchMode::Help => {
            println!("{}", cli::USAGE);
            Ok(())
        }
    }
}

fn run_dashboard(startup_file: Option<PathBuf>) -> Result<()> {
    info!("Starting LLM response dashboard");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("LLM Response Dashboard")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([900.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        ..Default::default()
    };

    eframe::run_native(
        "LLM Response Dashboard",
        options,
        Box::new(move |cc| Box::new(DashboardApp::new(cc, runtime, startup_file))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}

/// Write a generated dataset in the upload format
fn write_sample(path: &Path, count: usize) -> Result<()> {
    let records = SampleGenerator::new(SAMPLE_SEED).generate(count);
    let document = sample_document(&records).context("Failed to serialize sample data")?;
    let text = serde_json::to_string_pretty(&document)?;

    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} sample responses to {}", count, path.display());
    Ok(())
}
