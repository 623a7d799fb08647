//! Data module - CSV loading and table transforms

mod combine;
mod loader;
mod lookup;
mod residual;
mod table;
mod variables;

pub use combine::{combine_series, points_in_category, CombinedPoint, SeriesCategory};
pub use loader::{DatasetCache, LoadOutcome, LoaderError};
pub use lookup::{
    clamp_to_forecast_range, lookup_forecast, period_label, FORECAST_END, FORECAST_START,
};
pub use residual::{compute_residuals, ResidualPoint};
pub use table::{DatasetBundle, ModelMetadata};
pub use variables::ClimateVariable;

#[cfg(test)]
pub(crate) use loader::tests::write_fixture;
