//! Charts module - Chart rendering

mod plotter;
mod renderer;

use chrono::NaiveDate;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;

/// Historical series color (#0B3C5D).
pub const HISTORICAL_RGB: (u8, u8, u8) = (0x0B, 0x3C, 0x5D);
/// Predicted series color (#F2C94C).
pub const PREDICTED_RGB: (u8, u8, u8) = (0xF2, 0xC9, 0x4C);

/// Plot x coordinate of a date: days since 0001-01-01.
pub fn date_to_x(date: NaiveDate) -> f64 {
    use chrono::Datelike;
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_axis_mapping() {
        let date = NaiveDate::from_ymd_opt(2030, 6, 15).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(x_to_date(date_to_x(date) + 0.4), Some(date));
        assert_eq!(x_to_date(f64::NAN), None);
    }
}
