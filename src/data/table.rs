//! In-memory tables built from the input CSV files.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Date-indexed numeric table, one value vector per variable.
///
/// Dates are sorted ascending. Every column has one value per date;
/// missing cells hold `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DatedTable {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl DatedTable {
    /// Build a table from unsorted rows. Rows are sorted by date with a
    /// stable sort, so rows sharing a date keep their file order.
    pub fn from_unsorted(dates: Vec<NaiveDate>, columns: BTreeMap<String, Vec<f64>>) -> Self {
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let sorted_dates = order.iter().map(|&i| dates[i]).collect();
        let sorted_columns = columns
            .into_iter()
            .map(|(name, values)| {
                let sorted = order
                    .iter()
                    .map(|&i| values.get(i).copied().unwrap_or(f64::NAN))
                    .collect();
                (name, sorted)
            })
            .collect();

        Self {
            dates: sorted_dates,
            columns: sorted_columns,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, variable: &str) -> Option<&[f64]> {
        self.columns.get(variable).map(Vec::as_slice)
    }

    /// Index of the first row dated exactly `date`.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.dates.partition_point(|d| *d < date);
        (self.dates.get(idx) == Some(&date)).then_some(idx)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Accuracy metrics of the model for one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl ModelMetrics {
    /// Display tiles: (caption, value with four decimals).
    pub fn tiles(&self) -> [(&'static str, String); 3] {
        [
            ("RMSE", format!("{:.4}", self.rmse)),
            ("MAE", format!("{:.4}", self.mae)),
            ("R-Squared (R²)", format!("{:.4}", self.r2)),
        ]
    }
}

/// Metrics keyed by variable name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    rows: BTreeMap<String, ModelMetrics>,
}

impl MetricsTable {
    pub fn insert(&mut self, variable: impl Into<String>, metrics: ModelMetrics) {
        self.rows.insert(variable.into(), metrics);
    }

    pub fn get(&self, variable: &str) -> Option<&ModelMetrics> {
        self.rows.get(variable)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Key/value model configuration, in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelMetadata {
    pub entries: Vec<(String, String)>,
}

/// All six input tables, loaded together.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBundle {
    pub historical: DatedTable,
    pub forecast: DatedTable,
    pub metrics: MetricsTable,
    pub metadata: ModelMetadata,
    pub actual_test: DatedTable,
    pub predicted_test: DatedTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_unsorted_keeps_rows_together() {
        let dates = vec![ymd(2021, 3, 1), ymd(2021, 1, 1), ymd(2021, 2, 1)];
        let mut columns = BTreeMap::new();
        columns.insert("TX".to_string(), vec![3.0, 1.0, 2.0]);
        columns.insert("TN".to_string(), vec![30.0, 10.0, 20.0]);

        let table = DatedTable::from_unsorted(dates, columns);

        assert_eq!(
            table.dates(),
            &[ymd(2021, 1, 1), ymd(2021, 2, 1), ymd(2021, 3, 1)]
        );
        assert_eq!(table.column("TX"), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(table.column("TN"), Some(&[10.0, 20.0, 30.0][..]));
        assert_eq!(table.column("RR"), None);
    }

    #[test]
    fn test_position_requires_exact_date() {
        let dates = vec![ymd(2030, 5, 1), ymd(2030, 6, 1), ymd(2030, 6, 1)];
        let mut columns = BTreeMap::new();
        columns.insert("TX".to_string(), vec![1.0, 2.0, 3.0]);
        let table = DatedTable::from_unsorted(dates, columns);

        assert_eq!(table.position(ymd(2030, 6, 1)), Some(1));
        assert_eq!(table.position(ymd(2030, 6, 2)), None);
        assert_eq!(table.position(ymd(2045, 1, 1)), None);
    }

    #[test]
    fn test_metrics_tiles_format() {
        let metrics = ModelMetrics {
            rmse: 0.5,
            mae: 0.123456,
            r2: 0.9,
        };
        let tiles = metrics.tiles();
        assert_eq!(tiles[0], ("RMSE", "0.5000".to_string()));
        assert_eq!(tiles[1].1, "0.1235");
        assert_eq!(tiles[2].1, "0.9000");
    }

    #[test]
    fn test_metrics_lookup_by_variable() {
        let mut table = MetricsTable::default();
        table.insert(
            "TX",
            ModelMetrics {
                rmse: 0.6,
                mae: 0.5,
                r2: 0.7,
            },
        );

        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
        assert_eq!(table.get("TX").map(|m| m.r2), Some(0.7));
        // No row means the metric tiles are skipped
        assert!(table.get("SS").is_none());
    }
}
