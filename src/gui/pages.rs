//! Page Viewer Widget
//! Central panel content for the three dashboard pages.

use crate::charts::ChartPlotter;
use crate::data::{
    clamp_to_forecast_range, combine_series, compute_residuals, lookup_forecast, period_label,
    ClimateVariable, DatasetBundle, ModelMetadata, FORECAST_END, FORECAST_START,
};
use crate::gui::nav_panel::{Page, UserSettings};
use crate::stats::{StatsCalculator, HISTOGRAM_BINS};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, ComboBox, RichText};
use tracing::debug;

const CARD_FILL: Color32 = Color32::from_rgb(227, 242, 253);
const ACCENT: Color32 = Color32::from_rgb(11, 60, 93);
const WARNING: Color32 = Color32::from_rgb(204, 122, 0);
const ERROR: Color32 = Color32::from_rgb(220, 53, 69);

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const RESEARCHER_NAME: &str = "Amanda Rahmannisa";
const RESEARCHER_ID: &str = "06111282227058";
const SUPERVISOR: &str = "Dr. Melly Ariska, S.Pd., M.Sc.";
const ACADEMIC_INFO: [(&str, &str); 4] = [
    ("Study Program", "Physics Education"),
    ("Faculty", "Teacher Training and Education"),
    ("University", "Universitas Sriwijaya"),
    ("Year", "2025"),
];

/// Year/month/day picked in the date selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSelection {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Default for DateSelection {
    fn default() -> Self {
        Self::from(FORECAST_START)
    }
}

impl From<NaiveDate> for DateSelection {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Number of days in a month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

impl DateSelection {
    /// A valid date inside the forecast range, clamping each field.
    pub fn to_date(self) -> NaiveDate {
        let year = self.year.clamp(FORECAST_START.year(), FORECAST_END.year());
        let month = self.month.clamp(1, 12);
        let day = self.day.clamp(1, days_in_month(year, month));
        NaiveDate::from_ymd_opt(year, month, day)
            .map(clamp_to_forecast_range)
            .unwrap_or(FORECAST_START)
    }
}

/// Actions triggered from a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    None,
    ExportTrend,
    ExportValidity,
}

/// Draws the selected page.
#[derive(Default)]
pub struct PageViewer {
    pub date: DateSelection,
}

impl PageViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        bundle: &DatasetBundle,
        settings: &UserSettings,
    ) -> PageAction {
        match settings.page {
            Page::Prediction => self.show_prediction(ui, bundle, settings.variable),
            Page::Validity => Self::show_validity(ui, bundle, settings.variable),
            Page::Profile => {
                Self::show_profile(ui, &bundle.metadata);
                PageAction::None
            }
        }
    }

    fn show_prediction(
        &mut self,
        ui: &mut egui::Ui,
        bundle: &DatasetBundle,
        variable: ClimateVariable,
    ) -> PageAction {
        let mut action = PageAction::None;

        // ===== Accuracy Metrics =====
        ui.heading(format!("📊 Model Accuracy Metrics: {}", variable.label()));
        ui.add_space(8.0);

        // No metrics row: tiles are left out
        if let Some(metrics) = bundle.metrics.get(variable.key()) {
            ui.columns(3, |cols| {
                for (col, (caption, value)) in cols.iter_mut().zip(metrics.tiles()) {
                    col.label(RichText::new(caption).size(13.0).color(Color32::GRAY));
                    col.label(RichText::new(value).size(26.0).strong());
                }
            });
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Lookup =====
        ui.heading("📅 Find a Prediction by Date");
        ui.add_space(8.0);
        self.show_date_selector(ui);
        ui.add_space(8.0);

        let selected = self.date.to_date();
        match lookup_forecast(&bundle.forecast, selected, variable.key()) {
            Ok(found) => {
                egui::Frame::none()
                    .fill(CARD_FILL)
                    .stroke(egui::Stroke::new(2.0, ACCENT))
                    .rounding(10.0)
                    .inner_margin(20.0)
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        for line in [
                            format!("Prediction of {}", variable.label()),
                            format!("Period: {}", found.period_label()),
                            format!("Value: {:.2}", found.value),
                        ] {
                            ui.label(RichText::new(line).size(20.0).strong().color(ACCENT));
                        }
                    });
            }
            Err(miss) => {
                debug!("lookup miss: {}", miss);
                ui.label(
                    RichText::new(format!(
                        "⚠ Data for {} was not found. Check the year range in your CSV file.",
                        period_label(selected)
                    ))
                    .size(14.0)
                    .color(WARNING),
                );
            }
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Trend Chart =====
        ui.horizontal(|ui| {
            ui.heading("📈 Historical Trend & 20-Year Projection");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("💾 Export PNG").clicked() {
                    action = PageAction::ExportTrend;
                }
            });
        });
        ui.add_space(8.0);

        match combine_series(&bundle.historical, &bundle.forecast, variable.key()) {
            Ok(points) => ChartPlotter::draw_trend_chart(ui, &points, variable.label()),
            Err(e) => {
                ui.label(RichText::new(e.to_string()).color(ERROR));
            }
        }

        action
    }

    fn show_date_selector(&mut self, ui: &mut egui::Ui) {
        let mut date = self.date;

        ui.horizontal(|ui| {
            ui.label("Choose Date:");
            ui.add(
                egui::DragValue::new(&mut date.year)
                    .range(FORECAST_START.year()..=FORECAST_END.year())
                    .prefix("Year "),
            );

            let month_name = MONTH_NAMES
                .get(date.month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or_default();
            ComboBox::from_id_salt("lookup_month")
                .width(110.0)
                .selected_text(month_name)
                .show_ui(ui, |ui| {
                    for (i, name) in MONTH_NAMES.iter().enumerate() {
                        ui.selectable_value(&mut date.month, i as u32 + 1, *name);
                    }
                });

            ui.add(
                egui::DragValue::new(&mut date.day)
                    .range(1..=days_in_month(date.year, date.month))
                    .prefix("Day "),
            );
        });

        self.date = DateSelection::from(date.to_date());
    }

    fn show_validity(
        ui: &mut egui::Ui,
        bundle: &DatasetBundle,
        variable: ClimateVariable,
    ) -> PageAction {
        let mut action = PageAction::None;

        ui.horizontal(|ui| {
            ui.heading(format!("🎯 Residual Analysis: {}", variable.label()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("💾 Export PNG").clicked() {
                    action = PageAction::ExportValidity;
                }
            });
        });
        ui.add_space(8.0);

        let residuals =
            match compute_residuals(&bundle.actual_test, &bundle.predicted_test, variable.key()) {
                Ok(residuals) => residuals,
                Err(e) => {
                    ui.label(RichText::new(format!("⚠ {}", e)).size(14.0).color(ERROR));
                    return PageAction::None;
                }
            };

        let values: Vec<f64> = residuals.iter().map(|p| p.residual).collect();
        let bins = StatsCalculator::histogram(&values, HISTOGRAM_BINS);
        let stats = StatsCalculator::compute_descriptive_stats(&values);
        let bias = StatsCalculator::bias_test(&values);

        ui.columns(2, |cols| {
            cols[0].label(RichText::new("Residual Plot (Scatter)").size(14.0).strong());
            ChartPlotter::draw_residual_scatter(&mut cols[0], &residuals);
            cols[1].label(RichText::new("Error Distribution").size(14.0).strong());
            ChartPlotter::draw_residual_histogram(&mut cols[1], &bins);
        });

        ui.add_space(10.0);
        ChartPlotter::draw_stats_table(ui, &stats, bias.as_ref());

        action
    }

    fn show_profile(ui: &mut egui::Ui, metadata: &ModelMetadata) {
        ui.heading("👤 Researcher & Academic Profile");
        ui.add_space(10.0);

        Self::info_box(
            ui,
            Color32::from_rgb(227, 242, 253),
            &[
                format!("Researcher: {}", RESEARCHER_NAME),
                format!("Student ID: {}", RESEARCHER_ID),
            ],
        );
        Self::info_box(
            ui,
            Color32::from_rgb(255, 248, 225),
            &[format!("Supervisor: {}", SUPERVISOR)],
        );
        let academic: Vec<String> = std::iter::once("Academic Information".to_string())
            .chain(ACADEMIC_INFO.iter().map(|(k, v)| format!("• {}: {}", k, v)))
            .collect();
        Self::info_box(ui, Color32::from_rgb(232, 245, 233), &academic);

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        ui.heading("🛠 Model Configuration Metadata");
        ui.add_space(8.0);

        egui::Grid::new("model_metadata")
            .striped(true)
            .min_col_width(160.0)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                for (key, value) in &metadata.entries {
                    ui.label(RichText::new(key).strong());
                    ui.label(value);
                    ui.end_row();
                }
            });
    }

    fn info_box(ui: &mut egui::Ui, fill: Color32, lines: &[String]) {
        egui::Frame::none()
            .fill(fill)
            .rounding(6.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                for line in lines {
                    ui.label(RichText::new(line).size(14.0).color(Color32::from_rgb(40, 40, 40)));
                }
            });
        ui.add_space(8.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2028, 2), 29);
        assert_eq!(days_in_month(2030, 2), 28);
        assert_eq!(days_in_month(2030, 12), 31);
        assert_eq!(days_in_month(2030, 4), 30);
    }

    #[test]
    fn test_selection_is_clamped_to_valid_date() {
        let sel = DateSelection {
            year: 2030,
            month: 2,
            day: 31,
        };
        assert_eq!(sel.to_date(), ymd(2030, 2, 28));

        let early = DateSelection {
            year: 2010,
            month: 5,
            day: 1,
        };
        assert_eq!(early.to_date(), ymd(2025, 5, 1));

        let late = DateSelection {
            year: 2050,
            month: 13,
            day: 40,
        };
        assert_eq!(late.to_date(), FORECAST_END);
    }

    #[test]
    fn test_default_selection_is_range_start() {
        assert_eq!(DateSelection::default().to_date(), FORECAST_START);
    }
}
