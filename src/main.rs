mod app;
mod color;
mod config;
mod data;
mod forecast;
mod state;
mod ui;

use anyhow::Context;
use app::RustySalesApp;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!("Starting with {config:?}");

    // The dataset is required; a bad model only disables the prediction page.
    let dataset = data::loader::load_file(&config.data_path)
        .with_context(|| format!("loading sales data from {}", config.data_path.display()))?;
    log::info!(
        "Loaded {} rows ({} regions, {} categories)",
        dataset.len(),
        dataset.regions.len(),
        dataset.categories.len()
    );
    let predictor = forecast::load_model(&config.model_path);

    let state = AppState::new(dataset, predictor);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Sales – Retail Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RustySalesApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
