mod analysis;
mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::TempHistoryApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!("Starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Temperature History – Same Day, Every Year",
        options,
        Box::new(|_cc| Ok(Box::new(TempHistoryApp::new(config)))),
    )
}
