//! Stats module - Residual statistics

mod calculator;

pub use calculator::{
    BiasTest, HistogramBin, ResidualStats, StatsCalculator, HISTOGRAM_BINS,
    SIGNIFICANCE_THRESHOLD,
};
