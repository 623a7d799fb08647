//! MeteoForecaster Main Application
//! Main window with navigation panel and page viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{
    combine_series, compute_residuals, DatasetBundle, DatasetCache, LoadOutcome, LoaderError,
};
use crate::gui::{NavigationAction, NavigationPanel, PageAction, PageViewer};
use crate::stats::{StatsCalculator, HISTOGRAM_BINS};
use anyhow::{Context, Result};
use egui::{Color32, RichText, SidePanel};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

const EXPORT_WIDTH: u32 = 1600;
const EXPORT_HEIGHT: u32 = 800;

/// Main application window.
pub struct MeteoForecasterApp {
    config: DashboardConfig,
    cache: Arc<DatasetCache>,
    data: Option<LoadOutcome>,
    nav_panel: NavigationPanel,
    page_viewer: PageViewer,

    // Async loading
    load_rx: Option<Receiver<LoadOutcome>>,
    is_loading: bool,
}

impl MeteoForecasterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            config,
            cache: Arc::new(DatasetCache::new()),
            data: None,
            nav_panel: NavigationPanel::new(),
            page_viewer: PageViewer::new(),
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load the dataset bundle in a background thread
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.nav_panel.set_status("Loading CSV files...");

        let cache = Arc::clone(&self.cache);
        let paths = self.config.data_paths();

        thread::spawn(move || {
            let outcome = cache.get_or_load(&paths);
            let _ = tx.send(outcome);
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => {
                self.load_rx = Some(rx);
                return;
            }
            Err(TryRecvError::Disconnected) => {
                // Loader thread died without reporting
                error!("dataset loader exited without a result");
                Err(Arc::new(LoaderError::Interrupted))
            }
        };

        match &outcome {
            Ok(bundle) => self.nav_panel.set_status(&format!(
                "Loaded {} historical and {} forecast rows",
                bundle.historical.len(),
                bundle.forecast.len()
            )),
            Err(e) => self.nav_panel.set_status(&format!("Error: {}", e)),
        }
        self.data = Some(outcome);
        self.is_loading = false;
    }

    /// Render the requested chart and write it where the user chooses.
    /// Returns `None` when the dialog is cancelled.
    fn export_png(&self, bundle: &DatasetBundle, action: PageAction) -> Result<Option<PathBuf>> {
        let variable = self.nav_panel.settings.variable;

        let (file_name, bytes) = match action {
            PageAction::ExportTrend => {
                let points = combine_series(&bundle.historical, &bundle.forecast, variable.key())?;
                let title = format!("Historical Trend & 20-Year Projection: {}", variable.label());
                let bytes = StaticChartRenderer::render_trend_png(
                    &points,
                    &title,
                    variable.label(),
                    EXPORT_WIDTH,
                    EXPORT_HEIGHT,
                )?;
                (format!("trend_{}.png", variable.key()), bytes)
            }
            PageAction::ExportValidity => {
                let residuals =
                    compute_residuals(&bundle.actual_test, &bundle.predicted_test, variable.key())?;
                let values: Vec<f64> = residuals.iter().map(|p| p.residual).collect();
                let bins = StatsCalculator::histogram(&values, HISTOGRAM_BINS);
                let bytes = StaticChartRenderer::render_validity_png(
                    &residuals,
                    &bins,
                    EXPORT_WIDTH,
                    EXPORT_HEIGHT,
                )?;
                (format!("residual_{}.png", variable.key()), bytes)
            }
            PageAction::None => return Ok(None),
        };

        // Ask user for output location
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(&file_name)
            .save_file()
        else {
            return Ok(None);
        };

        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "exported chart");

        if self.nav_panel.settings.open_after_export {
            open::that(&path).with_context(|| format!("opening {}", path.display()))?;
        }

        Ok(Some(path))
    }

    fn handle_page_action(&mut self, bundle: &DatasetBundle, action: PageAction) {
        if action == PageAction::None {
            return;
        }

        match self.export_png(bundle, action) {
            Ok(Some(path)) => self
                .nav_panel
                .set_status(&format!("Exported {}", path.display())),
            Ok(None) => {}
            Err(e) => {
                error!("export failed: {:#}", e);
                self.nav_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }

    fn show_header(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("PALEMBANG CITY CLIMATE FORECAST DASHBOARD")
                    .size(30.0)
                    .strong()
                    .color(Color32::from_rgb(11, 60, 93)),
            );
            ui.label(
                RichText::new("Long-Term Temporal Analysis Based on LSTM - 2025")
                    .size(16.0)
                    .color(Color32::from_rgb(85, 85, 85)),
            );
            ui.add_space(15.0);
        });
    }
}

impl eframe::App for MeteoForecasterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Navigation
        SidePanel::left("nav_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.nav_panel.show(ui) {
                        NavigationAction::PageChanged(page) => debug!(?page, "page selected"),
                        NavigationAction::VariableChanged(var) => {
                            debug!(variable = var.key(), "variable selected")
                        }
                        NavigationAction::None => {}
                    }
                });
            });

        // Central panel - Pages
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    Self::show_header(ui);

                    match &self.data {
                        None => {
                            ui.centered_and_justified(|ui| {
                                ui.spinner();
                            });
                        }
                        Some(Err(e)) => {
                            // Any load failure stops the session here
                            ui.label(
                                RichText::new(
                                    "⚠ CSV files not found. Make sure all 6 data files are in the same folder.",
                                )
                                .size(16.0)
                                .color(Color32::from_rgb(220, 53, 69)),
                            );
                            ui.label(RichText::new(e.to_string()).size(11.0).color(Color32::GRAY));
                        }
                        Some(Ok(bundle)) => {
                            let bundle = Arc::clone(bundle);
                            let action =
                                self.page_viewer
                                    .show(ui, &bundle, &self.nav_panel.settings);
                            self.handle_page_action(&bundle, action);
                        }
                    }
                });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::write_fixture;

    fn idle_app(rx: Receiver<LoadOutcome>) -> MeteoForecasterApp {
        MeteoForecasterApp {
            config: DashboardConfig::default(),
            cache: Arc::new(DatasetCache::new()),
            data: None,
            nav_panel: NavigationPanel::new(),
            page_viewer: PageViewer::new(),
            load_rx: Some(rx),
            is_loading: true,
        }
    }

    #[test]
    fn test_dead_loader_becomes_load_failure() {
        let (tx, rx) = channel::<LoadOutcome>();
        drop(tx);
        let mut app = idle_app(rx);

        app.check_load_results();

        assert!(matches!(
            app.data.as_ref(),
            Some(Err(e)) if matches!(**e, LoaderError::Interrupted)
        ));
        assert!(!app.is_loading);
        assert!(app.load_rx.is_none());
    }

    #[test]
    fn test_pending_load_keeps_waiting() {
        let (tx, rx) = channel::<LoadOutcome>();
        let mut app = idle_app(rx);

        app.check_load_results();
        assert!(app.data.is_none());
        assert!(app.is_loading);

        let (_dir, paths) = write_fixture();
        tx.send(app.cache.get_or_load(&paths)).unwrap();
        app.check_load_results();

        assert!(matches!(app.data, Some(Ok(_))));
        assert!(!app.is_loading);
    }
}
