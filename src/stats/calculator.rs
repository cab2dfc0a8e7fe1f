//! Statistics Calculator Module
//! Descriptive statistics, dispersion, Pearson correlation and trend fitting.

use crate::error::{Diagnostic, Diagnostics};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for one numeric series.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (N - 1).
    pub std: f64,
    /// Population standard deviation (N).
    pub population_std: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for DescriptiveStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            population_std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Least-squares line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One equal-width histogram bin, `[start, end)` except the last, which is
/// closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> DescriptiveStats {
        let n = values.len();
        if n == 0 {
            return DescriptiveStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        DescriptiveStats {
            count: n,
            mean: values.iter().mean(),
            median: Self::percentile(&sorted, 50.0),
            std: values.iter().std_dev(),
            population_std: values.iter().population_std_dev(),
            min: sorted[0],
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
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

    /// Sample standard deviation (Bessel's correction) over present values.
    /// NaN when fewer than two values are present.
    pub fn sample_std(values: &[Option<f64>]) -> f64 {
        values.iter().flatten().std_dev()
    }

    /// Sample standard deviation per named column, recording a
    /// `DispersionUndefined` diagnostic for every NaN result.
    pub fn dispersion(
        columns: &[(&str, &[Option<f64>])],
        diagnostics: &mut Diagnostics,
    ) -> Vec<(String, f64)> {
        columns
            .iter()
            .map(|(name, values)| {
                let std = Self::sample_std(values);
                if std.is_nan() {
                    diagnostics.push(Diagnostic::DispersionUndefined {
                        column: name.to_string(),
                    });
                }
                (name.to_string(), std)
            })
            .collect()
    }

    /// Rows where both series have a value.
    fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
        x.iter()
            .zip(y)
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .unzip()
    }

    /// Pearson correlation over pairwise-complete rows. NaN if fewer than two
    /// pairs or either side has zero variance.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let (xs, ys) = Self::complete_pairs(x, y);
        if xs.len() < 2 {
            return f64::NAN;
        }
        let denom = xs.iter().std_dev() * ys.iter().std_dev();
        if denom == 0.0 {
            return f64::NAN;
        }
        xs.iter().covariance(ys.iter()) / denom
    }

    /// Symmetric Pearson matrix. The diagonal is exactly 1.0 for series with
    /// positive variance and NaN otherwise.
    pub fn correlation_matrix(series: &[&[Option<f64>]]) -> Vec<Vec<f64>> {
        let n = series.len();
        let mut matrix = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            let std = Self::sample_std(series[i]);
            matrix[i][i] = if std > 0.0 { 1.0 } else { f64::NAN };
            for j in (i + 1)..n {
                let r = Self::pearson(series[i], series[j]);
                matrix[i][j] = r;
                matrix[j][i] = r;
            }
        }
        matrix
    }

    /// Degree-1 least-squares fit over pairwise-complete rows.
    pub fn linear_fit(x: &[Option<f64>], y: &[Option<f64>]) -> Option<LinearFit> {
        let (xs, ys) = Self::complete_pairs(x, y);
        if xs.len() < 2 {
            return None;
        }
        let var_x = xs.iter().variance();
        if var_x == 0.0 || var_x.is_nan() {
            return None;
        }
        let slope = xs.iter().covariance(ys.iter()) / var_x;
        let intercept = ys.iter().mean() - slope * xs.iter().mean();
        Some(LinearFit { slope, intercept })
    }

    /// Equal-width histogram over `[min, max]`. A constant series is binned
    /// over `[v - 0.5, v + 0.5]`.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Vec::new();
        }
        let mut lo = Statistics::min(finite.iter());
        let mut hi = Statistics::max(finite.iter());
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;

        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                start: lo + width * i as f64,
                end: lo + width * (i + 1) as f64,
                count: 0,
            })
            .collect();
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            out[idx].count += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn descriptive_stats_basic() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 2.5).abs() < 1e-12);
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert!((stats.std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((stats.population_std - 1.25f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 4.0);
    }

    #[test]
    fn sample_std_uses_bessel() {
        let std = StatsCalculator::sample_std(&[Some(2.0), None, Some(4.0), Some(6.0)]);
        assert!((std - 2.0).abs() < 1e-12);
    }

    #[test]
    fn dispersion_undefined_is_nan_and_reported() {
        let mut diags = Diagnostics::new();
        let one = [Some(5.0), None];
        let out = StatsCalculator::dispersion(&[("IMDb Score", &one[..])], &mut diags);
        assert!(out[0].1.is_nan());
        assert!(diags.contains(&Diagnostic::DispersionUndefined { column: "IMDb Score".into() }));
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let a = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = some(&[2.0, 4.1, 5.9, 8.2, 9.9]);
        let c = some(&[5.0, 3.0, 4.0, 1.0, 2.0]);
        let m = StatsCalculator::correlation_matrix(&[&a[..], &b[..], &c[..]]);

        for i in 0..3 {
            assert_eq!(m[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
                assert!(m[i][j] <= 1.0 + 1e-12 && m[i][j] >= -1.0 - 1e-12);
            }
        }
        assert!(m[0][1] > 0.99);
        assert!(m[0][2] < 0.0);
    }

    #[test]
    fn perfect_correlation() {
        let a = some(&[1.0, 2.0, 3.0]);
        let b = some(&[10.0, 20.0, 30.0]);
        assert!((StatsCalculator::pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_variance_correlation_is_nan() {
        let a = some(&[3.0, 3.0, 3.0]);
        let b = some(&[1.0, 2.0, 3.0]);
        let m = StatsCalculator::correlation_matrix(&[&a[..], &b[..]]);
        assert!(m[0][0].is_nan());
        assert!(m[0][1].is_nan());
        assert_eq!(m[1][1], 1.0);
    }

    #[test]
    fn linear_fit_recovers_line() {
        let x = some(&[0.0, 1.0, 2.0, 3.0]);
        let y = some(&[1.0, 3.0, 5.0, 7.0]);
        let fit = StatsCalculator::linear_fit(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
        assert!(StatsCalculator::linear_fit(&some(&[1.0, 1.0]), &some(&[1.0, 2.0])).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [1.0, 2.0, 2.5, 3.0, 10.0];
        let bins = StatsCalculator::histogram(&values, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].start, 1.0);
        assert_eq!(bins[2].end, 10.0);
        assert_eq!(bins[2].count, 1);

        let flat = StatsCalculator::histogram(&[4.0, 4.0], 2);
        assert_eq!(flat[0].start, 3.5);
        assert_eq!(flat.iter().map(|b| b.count).sum::<usize>(), 2);
    }
}
