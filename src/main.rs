mod app;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::RustyEstateApp;
use eframe::egui;
use rusty_estate::config::DashboardConfig;
use rusty_estate::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::discover(std::env::args_os().nth(1).map(PathBuf::from))
        .context("loading configuration")?;
    log::info!("Using data file {}", config.data_path.display());

    // A failed initial load is reported inside the window, not here.
    let mut state = AppState::new(config);
    let data_path = state.config.data_path.clone();
    state.open(&data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Estate – Housing Prices",
        options,
        Box::new(move |_cc| Ok(Box::new(RustyEstateApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
