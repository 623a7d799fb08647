//! CSV Data Loader Module
//! Loads the six dashboard tables using Polars and caches the result.

use crate::config::DataPaths;
use crate::data::table::{DatasetBundle, DatedTable, MetricsTable, ModelMetadata, ModelMetrics};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("File not found: {0}")]
    MissingFile(PathBuf),
    #[error("Table has no index column")]
    MissingIndex,
    #[error("Unparseable date {value:?} in row {row}")]
    InvalidDate { row: usize, value: String },
    #[error("Missing column `{0}`")]
    MissingColumn(String),
    #[error("Table has no rows")]
    EmptyTable,
    #[error("Loader stopped before reporting a result")]
    Interrupted,
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<LoaderError>,
    },
}

/// Outcome of the one-time load, shared by every render pass.
pub type LoadOutcome = Result<Arc<DatasetBundle>, Arc<LoaderError>>;

/// Date formats accepted in index columns. Time parts are dropped.
/// Slash dates are read month first, then day first when the month is invalid.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse one index cell into a date.
pub fn parse_index_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"');

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // Month-only index, e.g. "2025-01"
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()
}

/// Read a CSV file with Polars.
fn read_csv(path: &Path, has_header: bool) -> Result<DataFrame, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::MissingFile(path.to_path_buf()));
    }

    let df = LazyCsvReader::new(path)
        .with_has_header(has_header)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read csv"
    );
    Ok(df)
}

/// First column of a DataFrame as trimmed strings.
fn index_strings(df: &DataFrame) -> Result<Vec<Option<String>>, LoaderError> {
    let first = df.get_columns().first().ok_or(LoaderError::MissingIndex)?;
    let as_str = first.cast(&DataType::String)?;
    let ca = as_str.str()?;

    Ok(ca
        .into_iter()
        .map(|v| v.map(|s| s.trim().trim_matches('"').to_string()))
        .collect())
}

/// Cast a column to f64, mapping nulls to NaN.
fn column_values(column: &Column) -> Result<Vec<f64>, LoaderError> {
    let values = column.cast(&DataType::Float64)?;
    let ca = values.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Load a date-indexed table: first column is the date, the rest numeric.
pub fn load_dated_table(path: &Path) -> Result<DatedTable, LoaderError> {
    let df = read_csv(path, true)?;

    let dates = index_strings(&df)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            let value = value.unwrap_or_default();
            parse_index_date(&value).ok_or(LoaderError::InvalidDate { row, value })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut columns = BTreeMap::new();
    for column in df.get_columns().iter().skip(1) {
        columns.insert(column.name().to_string(), column_values(column)?);
    }

    let table = DatedTable::from_unsorted(dates, columns);
    if table.is_empty() {
        return Err(LoaderError::EmptyTable);
    }
    Ok(table)
}

/// Load the metrics table: variable index plus RMSE, MAE and R2 columns.
pub fn load_metrics(path: &Path) -> Result<MetricsTable, LoaderError> {
    let df = read_csv(path, true)?;
    let variables = index_strings(&df)?;

    let metric_column = |name: &str| -> Result<Vec<f64>, LoaderError> {
        let column = df
            .column(name)
            .map_err(|_| LoaderError::MissingColumn(name.to_string()))?;
        column_values(column)
    };
    let rmse = metric_column("RMSE")?;
    let mae = metric_column("MAE")?;
    let r2 = metric_column("R2")?;

    let mut table = MetricsTable::default();
    for (i, variable) in variables.into_iter().enumerate() {
        let Some(variable) = variable else {
            continue;
        };
        table.insert(
            variable,
            ModelMetrics {
                rmse: rmse[i],
                mae: mae[i],
                r2: r2[i],
            },
        );
    }

    if table.is_empty() {
        warn!(path = %path.display(), "metrics table has no rows");
    }
    Ok(table)
}

/// Load headerless key/value metadata. Extra columns are joined into the value.
pub fn load_metadata(path: &Path) -> Result<ModelMetadata, LoaderError> {
    let df = read_csv(path, false)?;
    let keys = index_strings(&df)?;

    let mut value_columns = Vec::new();
    for column in df.get_columns().iter().skip(1) {
        let as_str = column.cast(&DataType::String)?;
        let values: Vec<Option<String>> = as_str
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect();
        value_columns.push(values);
    }

    let entries = keys
        .into_iter()
        .enumerate()
        .filter_map(|(i, key)| {
            let key = key?;
            let value = value_columns
                .iter()
                .filter_map(|values| values.get(i).cloned().flatten())
                .collect::<Vec<_>>()
                .join(", ");
            Some((key, value))
        })
        .collect();

    Ok(ModelMetadata { entries })
}

/// Attach the offending file to an error.
fn in_file<T>(path: &Path, result: Result<T, LoaderError>) -> Result<T, LoaderError> {
    result.map_err(|source| LoaderError::InFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// Load all six tables. Any failing file fails the whole bundle.
pub fn load_bundle(paths: &DataPaths) -> Result<DatasetBundle, LoaderError> {
    info!("loading dataset bundle");

    // Date-indexed tables are parsed in parallel
    let ((historical, forecast), (actual_test, predicted_test)) = rayon::join(
        || {
            rayon::join(
                || in_file(&paths.historical, load_dated_table(&paths.historical)),
                || in_file(&paths.forecast, load_dated_table(&paths.forecast)),
            )
        },
        || {
            rayon::join(
                || in_file(&paths.actual_test, load_dated_table(&paths.actual_test)),
                || in_file(&paths.predicted_test, load_dated_table(&paths.predicted_test)),
            )
        },
    );

    let bundle = DatasetBundle {
        historical: historical?,
        forecast: forecast?,
        metrics: in_file(&paths.metrics, load_metrics(&paths.metrics))?,
        metadata: in_file(&paths.metadata, load_metadata(&paths.metadata))?,
        actual_test: actual_test?,
        predicted_test: predicted_test?,
    };

    info!(
        historical = bundle.historical.len(),
        forecast = bundle.forecast.len(),
        metrics = bundle.metrics.len(),
        metadata = bundle.metadata.entries.len(),
        test = bundle.actual_test.len(),
        "dataset bundle loaded"
    );
    Ok(bundle)
}

/// Process-lifetime memo of the bundle load.
///
/// The first call to [`DatasetCache::get_or_load`] parses the files; every
/// later call returns the same outcome without touching the disk.
#[derive(Debug, Default)]
pub struct DatasetCache {
    cell: OnceCell<LoadOutcome>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, paths: &DataPaths) -> LoadOutcome {
        self.cell
            .get_or_init(|| match load_bundle(paths) {
                Ok(bundle) => Ok(Arc::new(bundle)),
                Err(e) => {
                    error!("dataset load failed: {}", e);
                    Err(Arc::new(e))
                }
            })
            .clone()
    }

    /// Cached outcome, if a load has already happened.
    pub fn get(&self) -> Option<&LoadOutcome> {
        self.cell.get()
    }
}
