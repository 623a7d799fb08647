//! Statistics Calculator Module
//! Descriptive statistics, histogram binning and a bias t-test for residuals.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Number of bins in the residual histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Descriptive statistics of a residual series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for ResidualStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
        }
    }
}

/// One histogram bar: `[lower, upper)`, the last bin also holds `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// One-sample t-test of mean residual against zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasTest {
    pub t: f64,
    pub p_value: f64,
    pub is_significant: bool,
}

/// Handles statistical calculations over residual series.
pub struct StatsCalculator;

impl StatsCalculator {
    fn finite(values: &[f64]) -> Vec<f64> {
        values.iter().copied().filter(|v| v.is_finite()).collect()
    }

    /// Mean and sample variance (n - 1). Variance is 0 for a single value.
    fn mean_and_variance(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = if values.len() > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        (mean, variance)
    }

    /// Compute descriptive statistics, skipping NaN values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ResidualStats {
        let values = Self::finite(values);
        let n = values.len();
        if n == 0 {
            return ResidualStats::default();
        }

        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let (mean, variance) = Self::mean_and_variance(&values);
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        ResidualStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Equal-width histogram over `[min, max]` of the finite values.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let values = Self::finite(values);
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Constant series: a single bar
        if max <= min {
            return vec![HistogramBin {
                lower: min - 0.5,
                upper: max + 0.5,
                count: values.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut result: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + i as f64 * width,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count: 0,
            })
            .collect();

        for v in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            result[idx].count += 1;
        }

        result
    }

    /// Two-sided one-sample t-test of `mean == 0`.
    pub fn bias_test(values: &[f64]) -> Option<BiasTest> {
        let values = Self::finite(values);
        let n = values.len() as f64;
        if n < 2.0 {
            return None;
        }

        let (mean, variance) = Self::mean_and_variance(&values);
        let se = (variance / n).sqrt();
        if se == 0.0 {
            // No spread: any non-zero mean is a systematic bias
            let biased = mean != 0.0;
            return Some(BiasTest {
                t: if biased { f64::INFINITY } else { 0.0 },
                p_value: if biased { 0.0 } else { 1.0 },
                is_significant: biased,
            });
        }

        let t = mean / se;
        let dist = StudentsT::new(0.0, 1.0, n - 1.0).ok()?;
        let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));

        Some(BiasTest {
            t,
            p_value,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        })
    }
}
