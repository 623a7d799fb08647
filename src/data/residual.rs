//! Residuals of the held-out test window.

use crate::data::table::DatedTable;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResidualError {
    #[error("Variable `{variable}` is missing from the {table} test table")]
    MissingVariable {
        variable: String,
        table: &'static str,
    },
    #[error("Test tables differ in length: {actual} actual rows, {predicted} predicted rows")]
    LengthMismatch { actual: usize, predicted: usize },
    #[error("Test tables disagree at row {row}: actual {actual}, predicted {predicted}")]
    DateMismatch {
        row: usize,
        actual: NaiveDate,
        predicted: NaiveDate,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
    pub residual: f64,
}

/// `actual - predicted` per date.
///
/// Both tables must share the same date index; a mismatch is reported
/// instead of silently aligning or dropping rows.
pub fn compute_residuals(
    actual: &DatedTable,
    predicted: &DatedTable,
    variable: &str,
) -> Result<Vec<ResidualPoint>, ResidualError> {
    let missing = |table: &'static str| ResidualError::MissingVariable {
        variable: variable.to_string(),
        table,
    };
    let actual_values = actual.column(variable).ok_or_else(|| missing("actual"))?;
    let predicted_values = predicted
        .column(variable)
        .ok_or_else(|| missing("predicted"))?;

    if actual.len() != predicted.len() {
        warn!(
            actual = actual.len(),
            predicted = predicted.len(),
            "test tables differ in length"
        );
        return Err(ResidualError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }

    if let Some((row, (&a, &p))) = actual
        .dates()
        .iter()
        .zip(predicted.dates())
        .enumerate()
        .find(|(_, (a, p))| a != p)
    {
        warn!(row, %a, %p, "test tables disagree on dates");
        return Err(ResidualError::DateMismatch {
            row,
            actual: a,
            predicted: p,
        });
    }

    Ok(actual
        .dates()
        .iter()
        .zip(actual_values.iter().zip(predicted_values))
        .map(|(&date, (&actual, &predicted))| ResidualPoint {
            date,
            actual,
            predicted,
            residual: actual - predicted,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_bundle, tests::write_fixture};
    use std::collections::BTreeMap;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(dates: &[NaiveDate], values: &[f64]) -> DatedTable {
        let mut columns = BTreeMap::new();
        columns.insert("TX".to_string(), values.to_vec());
        DatedTable::from_unsorted(dates.to_vec(), columns)
    }

    #[test]
    fn test_residual_is_actual_minus_predicted() {
        let (_dir, paths) = write_fixture();
        let bundle = load_bundle(&paths).unwrap();

        let residuals =
            compute_residuals(&bundle.actual_test, &bundle.predicted_test, "TX").unwrap();

        let actual = bundle.actual_test.column("TX").unwrap();
        let predicted = bundle.predicted_test.column("TX").unwrap();
        assert_eq!(residuals.len(), 3);
        for (i, point) in residuals.iter().enumerate() {
            assert_eq!(point.date, bundle.actual_test.dates()[i]);
            assert_eq!(point.residual, actual[i] - predicted[i]);
        }
        // Files arrive unsorted; rows are matched by date after sorting
        assert_eq!(residuals[0].date, ymd(2023, 1, 1));
        assert_eq!(residuals[0].residual, 31.0 - 31.5);
        assert_eq!(residuals[1].residual, 32.0 - 32.25);
    }

    #[test]
    fn test_mismatched_dates_fail_loudly() {
        let actual = table(&[ymd(2023, 1, 1), ymd(2023, 2, 1)], &[1.0, 2.0]);
        let predicted = table(&[ymd(2023, 1, 1), ymd(2023, 3, 1)], &[1.0, 2.0]);

        let err = compute_residuals(&actual, &predicted, "TX").unwrap_err();
        assert_eq!(
            err,
            ResidualError::DateMismatch {
                row: 1,
                actual: ymd(2023, 2, 1),
                predicted: ymd(2023, 3, 1),
            }
        );
    }

    #[test]
    fn test_length_mismatch() {
        let actual = table(&[ymd(2023, 1, 1), ymd(2023, 2, 1)], &[1.0, 2.0]);
        let predicted = table(&[ymd(2023, 1, 1)], &[1.0]);

        assert_eq!(
            compute_residuals(&actual, &predicted, "TX").unwrap_err(),
            ResidualError::LengthMismatch {
                actual: 2,
                predicted: 1
            }
        );
    }

    #[test]
    fn test_missing_variable() {
        let actual = table(&[ymd(2023, 1, 1)], &[1.0]);
        let err = compute_residuals(&actual, &actual, "RR").unwrap_err();
        assert!(matches!(
            err,
            ResidualError::MissingVariable { table: "actual", .. }
        ));
    }
}
