//! Series Combiner
//! Joins the historical and forecast series of one variable into a single
//! timeline for charting.

use crate::data::table::DatedTable;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombineError {
    #[error("Variable `{variable}` is missing from the {table} table")]
    UnknownVariable {
        variable: String,
        table: &'static str,
    },
}

/// Origin of a combined row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesCategory {
    Historical,
    Predicted,
}

impl SeriesCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Historical => "Historical",
            Self::Predicted => "Predicted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinedPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub category: SeriesCategory,
}

fn tagged<'a>(
    table: &'a DatedTable,
    variable: &str,
    category: SeriesCategory,
    table_name: &'static str,
) -> Result<impl Iterator<Item = CombinedPoint> + 'a, CombineError> {
    let values = table
        .column(variable)
        .ok_or_else(|| CombineError::UnknownVariable {
            variable: variable.to_string(),
            table: table_name,
        })?;

    Ok(table
        .dates()
        .iter()
        .zip(values)
        .map(move |(&date, &value)| CombinedPoint {
            date,
            value,
            category,
        }))
}

/// Historical rows followed by forecast rows, stably sorted by date.
///
/// Rows are never merged: overlapping dates keep both points.
pub fn combine_series(
    historical: &DatedTable,
    forecast: &DatedTable,
    variable: &str,
) -> Result<Vec<CombinedPoint>, CombineError> {
    let mut combined: Vec<CombinedPoint> =
        tagged(historical, variable, SeriesCategory::Historical, "historical")?
            .chain(tagged(forecast, variable, SeriesCategory::Predicted, "forecast")?)
            .collect();

    combined.sort_by_key(|p| p.date);
    Ok(combined)
}

/// Points of one category, in order.
pub fn points_in_category(
    points: &[CombinedPoint],
    category: SeriesCategory,
) -> impl Iterator<Item = &CombinedPoint> {
    points.iter().filter(move |p| p.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(rows: &[(NaiveDate, f64)]) -> DatedTable {
        let mut columns = BTreeMap::new();
        columns.insert("RR".to_string(), rows.iter().map(|r| r.1).collect());
        DatedTable::from_unsorted(rows.iter().map(|r| r.0).collect(), columns)
    }

    #[test]
    fn test_combined_length_and_order() {
        let hist = table(&[
            (ymd(2024, 11, 1), 2.0),
            (ymd(2024, 10, 1), 1.0),
            (ymd(2024, 12, 1), 3.0),
        ]);
        let fore = table(&[(ymd(2025, 2, 1), 5.0), (ymd(2025, 1, 1), 4.0)]);

        let combined = combine_series(&hist, &fore, "RR").unwrap();

        assert_eq!(combined.len(), hist.len() + fore.len());
        assert!(combined.windows(2).all(|w| w[0].date <= w[1].date));
        let values: Vec<f64> = combined.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(combined[2].category, SeriesCategory::Historical);
        assert_eq!(combined[3].category, SeriesCategory::Predicted);
    }

    #[test]
    fn test_overlapping_dates_are_kept() {
        let hist = table(&[(ymd(2025, 1, 1), 1.0)]);
        let fore = table(&[(ymd(2025, 1, 1), 9.0)]);

        let combined = combine_series(&hist, &fore, "RR").unwrap();

        assert_eq!(combined.len(), 2);
        // Stable sort keeps the historical row first
        assert_eq!(combined[0].category, SeriesCategory::Historical);
        assert_eq!(combined[1].category, SeriesCategory::Predicted);
        assert_eq!(points_in_category(&combined, SeriesCategory::Predicted).count(), 1);
    }

    #[test]
    fn test_unknown_variable() {
        let hist = table(&[(ymd(2024, 1, 1), 1.0)]);
        let err = combine_series(&hist, &hist, "SS").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variable `SS` is missing from the historical table"
        );
    }
}
