//! MeteoForecaster Palembang - Climate Forecast Dashboard
//!
//! Displays historical monthly climate data for Palembang next to a 20-year
//! LSTM forecast, with accuracy metrics and residual analysis of the model.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use gui::MeteoForecasterApp;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Init logging
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    info!(data_dir = %config.data_dir.display(), "using data directory");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("MeteoForecaster Palembang - LSTM"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "MeteoForecaster Palembang",
        options,
        Box::new(|cc| Ok(Box::new(MeteoForecasterApp::new(cc, config)))),
    )
}
