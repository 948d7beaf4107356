//! The decomposable trend + seasonality model.
//!
//! An additive model over evenly indexed observations:
//! `y(i) = intercept + slope * i + seasonal(i) + noise`. The trend is an
//! ordinary least-squares line, each seasonal component is the mean
//! residual per period position, and the residual standard deviation
//! drives the uncertainty bands.

use prevista_core::DataError;

/// Seasonal means for one period length, indexed by `i % period`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalComponent {
    pub period: usize,
    pub means: Vec<f64>,
}

impl SeasonalComponent {
    fn effect(&self, index: usize) -> f64 {
        self.means[index % self.period]
    }
}

/// Fitted model state. Indexes are observation positions, so prediction at
/// `index >= n` extrapolates beyond the history.
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposableModel {
    pub intercept: f64,
    pub slope: f64,
    pub seasonal: Vec<SeasonalComponent>,
    pub sigma: f64,
    pub observations: usize,
}

impl DecomposableModel {
    /// Fit trend, seasonal components, and residual sigma.
    ///
    /// Candidate periods that the data does not cover with at least two
    /// full cycles are skipped. Requires 2 observations minimum; with
    /// exactly 2 the line is exact and sigma collapses to its floor.
    pub fn fit(values: &[f64], candidate_periods: &[usize]) -> Result<Self, DataError> {
        let n = values.len();
        if n < 2 {
            return Err(DataError::InsufficientData { valid_rows: n });
        }

        let (intercept, slope) = least_squares_line(values);
        if !intercept.is_finite() || !slope.is_finite() {
            return Err(DataError::ForecastFailed(
                "trend fit produced a non-finite coefficient".to_string(),
            ));
        }

        let mut residuals: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(index, value)| value - (intercept + slope * index as f64))
            .collect();

        let mut seasonal = Vec::new();
        for &period in candidate_periods {
            if period < 2 || n < period * 2 {
                continue;
            }

            let means = seasonal_means(&residuals, period);
            for (index, residual) in residuals.iter_mut().enumerate() {
                *residual -= means[index % period];
            }
            seasonal.push(SeasonalComponent { period, means });
        }

        let sigma = residual_sigma(&residuals, values);
        if !sigma.is_finite() {
            return Err(DataError::ForecastFailed(
                "residual sigma is non-finite".to_string(),
            ));
        }

        Ok(Self {
            intercept,
            slope,
            seasonal,
            sigma,
            observations: n,
        })
    }

    /// Point estimate at an observation index.
    pub fn predict(&self, index: usize) -> f64 {
        let trend = self.intercept + self.slope * index as f64;
        let seasonal: f64 = self
            .seasonal
            .iter()
            .map(|component| component.effect(index))
            .sum();
        trend + seasonal
    }
}

fn least_squares_line(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (index, value) in values.iter().enumerate() {
        let dx = index as f64 - mean_x;
        covariance += dx * (value - mean_y);
        variance += dx * dx;
    }

    if variance == 0.0 {
        return (mean_y, 0.0);
    }

    let slope = covariance / variance;
    (mean_y - slope * mean_x, slope)
}

/// Mean residual per period position. Positions with no observations keep
/// a zero effect.
fn seasonal_means(residuals: &[f64], period: usize) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0_usize; period];

    for (index, residual) in residuals.iter().enumerate() {
        sums[index % period] += residual;
        counts[index % period] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| if count == 0 { 0.0 } else { sum / count as f64 })
        .collect()
}

/// Residual standard deviation, floored above zero so the bands always
/// strictly bracket the point estimate.
fn residual_sigma(residuals: &[f64], values: &[f64]) -> f64 {
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();

    let mean_abs = values.iter().map(|value| value.abs()).sum::<f64>() / values.len() as f64;
    sigma.max(mean_abs * 1e-6).max(1e-9)
}

/// z-quantile for a symmetric two-sided interval of the given width.
pub fn z_quantile(interval_width: f64) -> f64 {
    match interval_width {
        x if x >= 0.99 => 2.576,
        x if x >= 0.95 => 1.96,
        x if x >= 0.90 => 1.645,
        x if x >= 0.80 => 1.282,
        _ => 1.0,
    }
}
