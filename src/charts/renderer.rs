//! Static Chart Renderer
//! Renders the dashboard charts to PNG for export.
//!
//! Layout:
//! 1. Trend export: one chart, historical and predicted lines, legend
//! 2. Validity export: residual scatter (left) and residual histogram (right)

use crate::charts::{date_to_x, x_to_date, HISTORICAL_RGB, PREDICTED_RGB};
use crate::data::{points_in_category, CombinedPoint, ResidualPoint, SeriesCategory};
use crate::stats::HistogramBin;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::io::Cursor;
use thiserror::Error;

const HISTORICAL: RGBColor = RGBColor(HISTORICAL_RGB.0, HISTORICAL_RGB.1, HISTORICAL_RGB.2);
const PREDICTED: RGBColor = RGBColor(PREDICTED_RGB.0, PREDICTED_RGB.1, PREDICTED_RGB.2);
const ZERO_LINE_DASHES: usize = 40;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
    #[error("Nothing to draw")]
    NoData,
    #[error("Pixel buffer does not match image size")]
    Buffer,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(e.to_string())
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the combined historical/predicted chart to PNG bytes.
    pub fn render_trend_png(
        points: &[CombinedPoint],
        title: &str,
        y_label: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            Self::draw_trend(&root, points, title, y_label)?;
            root.present().map_err(draw_err)?;
        }
        Self::encode_png(buffer, width, height)
    }

    /// Render residual scatter and histogram side by side to PNG bytes.
    pub fn render_validity_png(
        residuals: &[ResidualPoint],
        bins: &[HistogramBin],
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            let (left, right) = root.split_horizontally((width / 2) as i32);
            Self::draw_scatter(&left, residuals)?;
            Self::draw_histogram(&right, bins)?;
            root.present().map_err(draw_err)?;
        }
        Self::encode_png(buffer, width, height)
    }

    fn draw_trend(
        area: &Area<'_>,
        points: &[CombinedPoint],
        title: &str,
        y_label: &str,
    ) -> Result<(), RenderError> {
        let finite: Vec<&CombinedPoint> = points.iter().filter(|p| p.value.is_finite()).collect();
        let (x_min, x_max) =
            Self::padded_range(finite.iter().map(|p| date_to_x(p.date)), 0.0).ok_or(RenderError::NoData)?;
        let (y_min, y_max) =
            Self::padded_range(finite.iter().map(|p| p.value), 0.1).ok_or(RenderError::NoData)?;

        let mut chart = ChartBuilder::on(area)
            .caption(title, ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Time (Year)")
            .y_desc(y_label)
            .x_labels(12)
            .x_label_formatter(&|x| {
                x_to_date(*x)
                    .map(|d| d.format("%Y").to_string())
                    .unwrap_or_default()
            })
            .draw()
            .map_err(draw_err)?;

        for category in [SeriesCategory::Historical, SeriesCategory::Predicted] {
            let color = match category {
                SeriesCategory::Historical => HISTORICAL,
                SeriesCategory::Predicted => PREDICTED,
            };
            chart
                .draw_series(LineSeries::new(
                    points_in_category(points, category)
                        .filter(|p| p.value.is_finite())
                        .map(|p| (date_to_x(p.date), p.value)),
                    color.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label(category.label())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_scatter(area: &Area<'_>, residuals: &[ResidualPoint]) -> Result<(), RenderError> {
        let finite: Vec<&ResidualPoint> = residuals
            .iter()
            .filter(|p| p.residual.is_finite() && p.predicted.is_finite())
            .collect();
        let (x_min, x_max) =
            Self::padded_range(finite.iter().map(|p| p.predicted), 0.05).ok_or(RenderError::NoData)?;
        // Keep the zero line in view
        let (y_min, y_max) = Self::padded_range(
            finite.iter().map(|p| p.residual).chain(std::iter::once(0.0)),
            0.1,
        )
        .ok_or(RenderError::NoData)?;

        let mut chart = ChartBuilder::on(area)
            .caption("Residual Plot (Scatter)", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Predicted Value")
            .y_desc("Error (Residual)")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(
                finite
                    .iter()
                    .map(|p| Circle::new((p.predicted, p.residual), 3, HISTORICAL.filled())),
            )
            .map_err(draw_err)?;
        chart
            .draw_series(
                Self::dash_segments(x_min, x_max, ZERO_LINE_DASHES)
                    .into_iter()
                    .map(|(a, b)| {
                        PathElement::new(vec![(a, 0.0), (b, 0.0)], PREDICTED.stroke_width(2))
                    }),
            )
            .map_err(draw_err)?;

        Ok(())
    }

    fn draw_histogram(area: &Area<'_>, bins: &[HistogramBin]) -> Result<(), RenderError> {
        let first = bins.first().ok_or(RenderError::NoData)?;
        let last = bins.last().ok_or(RenderError::NoData)?;
        let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64;

        let mut chart = ChartBuilder::on(area)
            .caption("Error Distribution", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(45)
            .build_cartesian_2d(first.lower..last.upper, 0.0..max_count * 1.1)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Residual")
            .y_desc("Count")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(bins.iter().map(|b| {
                Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], PREDICTED.filled())
            }))
            .map_err(draw_err)?;
        chart
            .draw_series(bins.iter().map(|b| {
                Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], WHITE.stroke_width(1))
            }))
            .map_err(draw_err)?;

        Ok(())
    }

    /// Split `[start, end]` into `dashes` visible segments with equal gaps between.
    fn dash_segments(start: f64, end: f64, dashes: usize) -> Vec<(f64, f64)> {
        if dashes == 0 || end <= start {
            return Vec::new();
        }
        // dash, gap, dash, ..., dash
        let step = (end - start) / (2 * dashes - 1) as f64;
        (0..dashes)
            .map(|i| {
                let a = start + (2 * i) as f64 * step;
                (a, a + step)
            })
            .collect()
    }

    /// Min/max of finite values, widened by `pad` of the span.
    /// A zero span is widened by one unit each side.
    fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> Option<(f64, f64)> {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let span = max - min;
        if span <= 0.0 {
            return Some((min - 1.0, max + 1.0));
        }
        Some((min - span * pad, max + span * pad))
    }

    fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let img = image::RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_line_is_dashed() {
        let dashes = StaticChartRenderer::dash_segments(0.0, 9.0, 5);
        assert_eq!(dashes.len(), 5);
        assert_eq!(dashes.first(), Some(&(0.0, 1.0)));
        assert_eq!(dashes.last(), Some(&(8.0, 9.0)));
        // Every dash is followed by a gap
        for pair in dashes.windows(2) {
            assert!(pair[1].0 > pair[0].1);
        }
        assert!(StaticChartRenderer::dash_segments(1.0, 1.0, 5).is_empty());
    }

    #[test]
    fn test_padded_range() {
        let range = StaticChartRenderer::padded_range([1.0, 3.0, f64::NAN].into_iter(), 0.5);
        assert_eq!(range, Some((0.0, 4.0)));

        let flat = StaticChartRenderer::padded_range([2.0, 2.0].into_iter(), 0.1);
        assert_eq!(flat, Some((1.0, 3.0)));

        assert_eq!(StaticChartRenderer::padded_range(std::iter::empty(), 0.1), None);
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(matches!(
            StaticChartRenderer::render_trend_png(&[], "TX", "TX", 200, 100),
            Err(RenderError::NoData)
        ));
        assert!(matches!(
            StaticChartRenderer::render_validity_png(&[], &[], 200, 100),
            Err(RenderError::NoData)
        ));
    }

    #[test]
    fn test_encode_png_signature() {
        let bytes = StaticChartRenderer::encode_png(vec![255u8; 4 * 3 * 3], 4, 3).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        assert!(matches!(
            StaticChartRenderer::encode_png(vec![0u8; 5], 4, 3),
            Err(RenderError::Buffer)
        ));
    }
}
