//! Forecast lookup by calendar date.
//!
//! The forecast is monthly, so every date is truncated to the first day of
//! its month and then matched exactly against the forecast index. There is
//! no nearest-row or interpolated fallback.

use crate::data::table::DatedTable;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::debug;

/// First selectable forecast date.
pub const FORECAST_START: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 1) {
    Some(d) => d,
    None => NaiveDate::MIN,
};

/// Last selectable forecast date.
pub const FORECAST_END: NaiveDate = match NaiveDate::from_ymd_opt(2044, 12, 31) {
    Some(d) => d,
    None => NaiveDate::MAX,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupMiss {
    #[error("Variable `{0}` is not in the forecast table")]
    UnknownVariable(String),
    #[error("No forecast row for {}", period_label(*.0))]
    DateNotFound(NaiveDate),
}

/// A forecast value found for a month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastLookup {
    pub period: NaiveDate,
    pub value: f64,
}

impl ForecastLookup {
    pub fn period_label(&self) -> String {
        period_label(self.period)
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// "June 2030" style label.
pub fn period_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Clamp a date into the selectable forecast range.
pub fn clamp_to_forecast_range(date: NaiveDate) -> NaiveDate {
    date.clamp(FORECAST_START, FORECAST_END)
}

/// Look up the forecast value of `variable` for the month containing `date`.
pub fn lookup_forecast(
    forecast: &DatedTable,
    date: NaiveDate,
    variable: &str,
) -> Result<ForecastLookup, LookupMiss> {
    let period = month_start(date);

    let values = forecast
        .column(variable)
        .ok_or_else(|| LookupMiss::UnknownVariable(variable.to_string()))?;
    let row = forecast.position(period).ok_or_else(|| {
        debug!(%period, variable, "no forecast row");
        LookupMiss::DateNotFound(period)
    })?;

    Ok(ForecastLookup {
        period,
        value: values[row],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn forecast() -> DatedTable {
        let dates = vec![ymd(2030, 7, 1), ymd(2030, 6, 1), ymd(2044, 12, 1)];
        let mut columns = BTreeMap::new();
        columns.insert("TX".to_string(), vec![31.9, 31.25, 32.4]);
        columns.insert("TN".to_string(), vec![23.8, 23.6, 24.1]);
        DatedTable::from_unsorted(dates, columns)
    }

    #[test]
    fn test_mid_month_date_resolves_to_month_start() {
        let found = lookup_forecast(&forecast(), ymd(2030, 6, 15), "TX").unwrap();
        assert_eq!(found.value, 31.25);
        assert_eq!(found.period, ymd(2030, 6, 1));
        assert_eq!(found.period_label(), "June 2030");
    }

    #[test]
    fn test_same_month_same_result() {
        let table = forecast();
        let first = lookup_forecast(&table, ymd(2030, 7, 1), "TN");
        for day in 2..=31 {
            assert_eq!(lookup_forecast(&table, ymd(2030, 7, day), "TN"), first);
        }
    }

    #[test]
    fn test_out_of_range_is_not_found() {
        let miss = lookup_forecast(&forecast(), ymd(2045, 3, 9), "TX").unwrap_err();
        assert_eq!(miss, LookupMiss::DateNotFound(ymd(2045, 3, 1)));
        assert_eq!(miss.to_string(), "No forecast row for March 2045");

        // Inside the selectable range but absent from the table
        assert!(lookup_forecast(&forecast(), ymd(2031, 1, 1), "TX").is_err());
    }

    #[test]
    fn test_unknown_variable_is_a_miss() {
        let miss = lookup_forecast(&forecast(), ymd(2030, 6, 1), "tx").unwrap_err();
        assert_eq!(miss, LookupMiss::UnknownVariable("tx".to_string()));
    }

    #[test]
    fn test_duplicate_month_uses_first_file_row() {
        let dates = vec![ymd(2030, 6, 1), ymd(2030, 5, 1), ymd(2030, 6, 1)];
        let mut columns = BTreeMap::new();
        columns.insert("TX".to_string(), vec![31.25, 30.0, 99.0]);
        let table = DatedTable::from_unsorted(dates, columns);

        let found = lookup_forecast(&table, ymd(2030, 6, 20), "TX").unwrap();
        assert_eq!(found.value, 31.25);
    }

    #[test]
    fn test_clamp_to_forecast_range() {
        assert_eq!(clamp_to_forecast_range(ymd(2020, 5, 5)), FORECAST_START);
        assert_eq!(clamp_to_forecast_range(ymd(2050, 5, 5)), FORECAST_END);
        assert_eq!(clamp_to_forecast_range(ymd(2030, 5, 5)), ymd(2030, 5, 5));
    }
}
