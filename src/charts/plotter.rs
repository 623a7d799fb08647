//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::charts::{date_to_x, x_to_date, HISTORICAL_RGB, PREDICTED_RGB};
use crate::data::{points_in_category, CombinedPoint, ResidualPoint, SeriesCategory};
use crate::stats::{BiasTest, HistogramBin, ResidualStats, SIGNIFICANCE_THRESHOLD};
use chrono::Datelike;
use egui::{Color32, RichText};
use egui_plot::{
    Bar, BarChart, GridInput, GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points,
};

pub const HISTORICAL_COLOR: Color32 =
    Color32::from_rgb(HISTORICAL_RGB.0, HISTORICAL_RGB.1, HISTORICAL_RGB.2);
pub const PREDICTED_COLOR: Color32 =
    Color32::from_rgb(PREDICTED_RGB.0, PREDICTED_RGB.1, PREDICTED_RGB.2);

const CHART_HEIGHT: f32 = 380.0;
const RESIDUAL_CHART_HEIGHT: f32 = 320.0;

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color of a combined-series category.
    pub fn category_color(category: SeriesCategory) -> Color32 {
        match category {
            SeriesCategory::Historical => HISTORICAL_COLOR,
            SeriesCategory::Predicted => PREDICTED_COLOR,
        }
    }

    /// Grid marks on January 1st, spaced 1, 2, 5 or 10 years apart.
    fn year_marks(input: GridInput) -> Vec<GridMark> {
        let (min, max) = input.bounds;
        let (Some(start), Some(end)) = (x_to_date(min), x_to_date(max)) else {
            return Vec::new();
        };

        let span = (end.year() - start.year()).max(1);
        let step = match span {
            0..=8 => 1,
            9..=20 => 2,
            21..=50 => 5,
            _ => 10,
        };

        let first = start.year() + (step - start.year().rem_euclid(step)) % step;
        (first..=end.year() + 1)
            .step_by(step as usize)
            .filter_map(|year| chrono::NaiveDate::from_ymd_opt(year, 1, 1))
            .map(|date| GridMark {
                value: date_to_x(date),
                step_size: step as f64 * 365.25,
            })
            .collect()
    }

    /// Historical and predicted series on one timeline.
    /// X-axis: date, Y-axis: variable value
    pub fn draw_trend_chart(ui: &mut egui::Ui, points: &[CombinedPoint], y_label: &str) {
        Plot::new(format!("trend_{}", y_label))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Time (Year)")
            .y_axis_label(y_label)
            .x_grid_spacer(Self::year_marks)
            .x_axis_formatter(|mark, _range| {
                x_to_date(mark.value)
                    .map(|d| d.format("%Y").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(|name, value| {
                let date = x_to_date(value.x)
                    .map(|d| d.format("%d %B %Y").to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    format!("Date: {}\nValue: {:.2}", date, value.y)
                } else {
                    format!("{}\nDate: {}\nValue: {:.2}", name, date, value.y)
                }
            })
            .show(ui, |plot_ui| {
                for category in [SeriesCategory::Historical, SeriesCategory::Predicted] {
                    let series: PlotPoints = points_in_category(points, category)
                        .filter(|p| p.value.is_finite())
                        .map(|p| [date_to_x(p.date), p.value])
                        .collect();

                    plot_ui.line(
                        Line::new(series)
                            .color(Self::category_color(category))
                            .width(2.0)
                            .name(category.label()),
                    );
                }
            });
    }

    /// Residual against predicted value, with a dashed zero line.
    pub fn draw_residual_scatter(ui: &mut egui::Ui, residuals: &[ResidualPoint]) {
        Plot::new("residual_scatter")
            .height(RESIDUAL_CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Predicted Value")
            .y_axis_label("Error (Residual)")
            .show(ui, |plot_ui| {
                let points: PlotPoints = residuals
                    .iter()
                    .filter(|p| p.residual.is_finite())
                    .map(|p| [p.predicted, p.residual])
                    .collect();

                plot_ui.points(
                    Points::new(points)
                        .radius(3.5)
                        .color(HISTORICAL_COLOR)
                        .name("Residual"),
                );
                plot_ui.hline(
                    HLine::new(0.0)
                        .color(PREDICTED_COLOR)
                        .width(2.0)
                        .style(LineStyle::dashed_loose()),
                );
            });
    }

    /// Histogram of residuals.
    pub fn draw_residual_histogram(ui: &mut egui::Ui, bins: &[HistogramBin]) {
        Plot::new("residual_histogram")
            .height(RESIDUAL_CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Residual")
            .y_axis_label("Count")
            .show(ui, |plot_ui| {
                let bars: Vec<Bar> = bins
                    .iter()
                    .map(|b| {
                        Bar::new(b.center(), b.count as f64)
                            .width(b.width())
                            .name(format!("{:.3} .. {:.3}", b.lower, b.upper))
                    })
                    .collect();

                plot_ui.bar_chart(BarChart::new(bars).color(PREDICTED_COLOR).name("Error"));
            });
    }

    /// Draw residual statistics table
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &ResidualStats, bias: Option<&BiasTest>) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("residual_stats_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["N", "Mean", "Median", "Std", "P05", "P95"] {
                            ui.label(RichText::new(header).strong().size(12.0));
                        }
                        ui.end_row();

                        ui.label(RichText::new(stats.count.to_string()).size(12.0));
                        for v in [stats.mean, stats.median, stats.std, stats.p05, stats.p95] {
                            ui.label(RichText::new(format!("{:.4}", v)).size(12.0));
                        }
                        ui.end_row();
                    });

                ui.add_space(6.0);

                match bias {
                    Some(test) => {
                        let (text, color) = if test.is_significant {
                            (
                                format!(
                                    "Mean residual differs from zero (t = {:.3}, p = {:.4} ≤ {})",
                                    test.t, test.p_value, SIGNIFICANCE_THRESHOLD
                                ),
                                Color32::from_rgb(220, 53, 69),
                            )
                        } else {
                            (
                                format!(
                                    "No systematic bias (t = {:.3}, p = {:.4})",
                                    test.t, test.p_value
                                ),
                                Color32::from_rgb(40, 167, 69),
                            )
                        };
                        ui.label(RichText::new(text).size(12.0).color(color));
                    }
                    None => {
                        ui.label(
                            RichText::new("Not enough residuals for a bias test")
                                .size(12.0)
                                .color(Color32::GRAY),
                        );
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_year_marks_fall_on_new_year() {
        let start = NaiveDate::from_ymd_opt(2001, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2044, 12, 1).unwrap();
        let marks = ChartPlotter::year_marks(GridInput {
            bounds: (date_to_x(start), date_to_x(end)),
            base_step_size: 1.0,
        });

        let years: Vec<i32> = marks
            .iter()
            .filter_map(|m| x_to_date(m.value))
            .map(|d| {
                assert_eq!((d.month(), d.day()), (1, 1));
                d.year()
            })
            .collect();
        assert_eq!(years.first(), Some(&2005));
        assert!(years.windows(2).all(|w| w[1] - w[0] == 5));
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(
            ChartPlotter::category_color(SeriesCategory::Historical),
            Color32::from_rgb(0x0B, 0x3C, 0x5D)
        );
        assert_eq!(
            ChartPlotter::category_color(SeriesCategory::Predicted),
            Color32::from_rgb(0xF2, 0xC9, 0x4C)
        );
    }
}
