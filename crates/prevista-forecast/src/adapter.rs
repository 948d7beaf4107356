//! Forecast engine adapter: domain series in, banded forecast frame out.
//!
//! This is the boundary between the provider/normalizer world and the
//! model. It owns the ordering guarantee (input may arrive out of order),
//! native step inference, candidate period selection, and the shape of the
//! output frame.

use serde::{Deserialize, Serialize};
use time::Duration;

use prevista_core::{DataError, TimeSeries, UtcDateTime};

use crate::config::ForecastConfig;
use crate::model::{z_quantile, DecomposableModel};

const DAY_SECONDS: i64 = 86_400;

/// Which part of the frame a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastSegment {
    /// Timestamp at or before the last historical observation.
    Fitted,
    /// Strictly future timestamp.
    Forecast,
}

/// One row of the output frame. Invariant: `lower_bound < point_estimate <
/// upper_bound`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub timestamp: UtcDateTime,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub segment: ForecastSegment,
}

/// Full forecast frame: one fitted row per historical observation followed
/// by exactly `horizon_days` future rows, timestamps ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub rows: Vec<ForecastRow>,
    pub horizon_days: u32,
    pub interval_width: f64,
    /// Inferred native spacing of the input, in seconds.
    pub step_seconds: i64,
}

impl ForecastResult {
    /// The strictly-future tail of the frame.
    pub fn forecast_rows(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows
            .iter()
            .filter(|row| row.segment == ForecastSegment::Forecast)
    }
}

/// Fit the decomposable model and extend it `horizon_days` steps past the
/// end of the history.
///
/// Out-of-order input is tolerated here and nowhere else; the series is
/// sorted before anything touches the model. Fewer than 2 points fails
/// with `InsufficientData` without constructing a model. Any non-finite
/// fitted or predicted value is `ForecastFailed` and aborts the request.
pub fn fit_and_predict(
    series: &TimeSeries,
    horizon_days: u32,
    config: &ForecastConfig,
) -> Result<ForecastResult, DataError> {
    if series.len() < 2 {
        return Err(DataError::InsufficientData {
            valid_rows: series.len(),
        });
    }

    let sorted = series.clone().into_sorted();
    let values = sorted.values();
    let step_seconds = infer_step_seconds(&sorted);
    let candidate_periods = candidate_periods(config, step_seconds);

    tracing::debug!(
        observations = values.len(),
        horizon_days,
        step_seconds,
        ?candidate_periods,
        "fitting decomposable model"
    );

    let model = DecomposableModel::fit(&values, &candidate_periods)?;
    let z = z_quantile(config.interval_width);
    let half_width = z * model.sigma;

    let n = sorted.len();
    let mut rows = Vec::with_capacity(n + horizon_days as usize);

    for (index, point) in sorted.points.iter().enumerate() {
        let estimate = model.predict(index);
        rows.push(banded_row(
            point.timestamp,
            estimate,
            half_width,
            ForecastSegment::Fitted,
        )?);
    }

    let last_timestamp = sorted
        .last_timestamp()
        .ok_or_else(|| DataError::ForecastFailed("sorted series lost its points".to_string()))?;

    for h in 0..horizon_days as i64 {
        let offset = Duration::seconds(step_seconds.saturating_mul(h + 1));
        let timestamp = last_timestamp.checked_add(offset).ok_or_else(|| {
            DataError::ForecastFailed(format!("future timestamp overflow at step {h}"))
        })?;

        let estimate = model.predict(n + h as usize);
        // Standard error grows with the extrapolation distance.
        let widened = half_width * ((h + 1) as f64).sqrt();
        rows.push(banded_row(
            timestamp,
            estimate,
            widened,
            ForecastSegment::Forecast,
        )?);
    }

    Ok(ForecastResult {
        rows,
        horizon_days,
        interval_width: config.interval_width,
        step_seconds,
    })
}

fn banded_row(
    timestamp: UtcDateTime,
    estimate: f64,
    half_width: f64,
    segment: ForecastSegment,
) -> Result<ForecastRow, DataError> {
    let lower = estimate - half_width;
    let upper = estimate + half_width;

    if !estimate.is_finite() || !lower.is_finite() || !upper.is_finite() {
        return Err(DataError::ForecastFailed(format!(
            "non-finite value at {timestamp}"
        )));
    }

    Ok(ForecastRow {
        timestamp,
        point_estimate: estimate,
        lower_bound: lower,
        upper_bound: upper,
        segment,
    })
}

/// Median spacing between consecutive points, defaulting to one day when
/// the spacing is degenerate.
fn infer_step_seconds(sorted: &TimeSeries) -> i64 {
    let mut gaps: Vec<i64> = sorted
        .points
        .windows(2)
        .map(|pair| pair[1].timestamp.unix_seconds() - pair[0].timestamp.unix_seconds())
        .filter(|gap| *gap > 0)
        .collect();

    if gaps.is_empty() {
        return DAY_SECONDS;
    }

    gaps.sort_unstable();
    gaps[gaps.len() / 2]
}

/// Enabled seasonal periods translated into step units. Daily seasonality
/// only means anything on sub-daily data; weekly and yearly need the period
/// to span at least two steps.
fn candidate_periods(config: &ForecastConfig, step_seconds: i64) -> Vec<usize> {
    let mut periods = Vec::new();

    let mut push = |span_seconds: i64| {
        let period = (span_seconds as f64 / step_seconds as f64).round() as i64;
        if period >= 2 {
            periods.push(period as usize);
        }
    };

    if config.daily_seasonality && step_seconds < DAY_SECONDS {
        push(DAY_SECONDS);
    }
    if config.weekly_seasonality {
        push(7 * DAY_SECONDS);
    }
    if config.yearly_seasonality {
        push(365 * DAY_SECONDS);
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;
    use prevista_core::TimeSeriesPoint;

    fn daily_series(values: &[f64]) -> TimeSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let timestamp =
                    UtcDateTime::from_unix_seconds(1_700_000_000 + index as i64 * DAY_SECONDS)
                        .expect("valid timestamp");
                TimeSeriesPoint::new(timestamp, *value).expect("valid point")
            })
            .collect();
        TimeSeries::new(points)
    }

    #[test]
    fn frame_has_fitted_head_and_forecast_tail() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let series = daily_series(&values);
        let config = ForecastConfig {
            daily_seasonality: false,
            weekly_seasonality: false,
            yearly_seasonality: false,
            interval_width: 0.80,
        };

        let result = fit_and_predict(&series, 14, &config).expect("must fit");

        assert_eq!(result.rows.len(), 60 + 14);
        assert_eq!(result.forecast_rows().count(), 14);
        assert!(result.rows[..60]
            .iter()
            .all(|row| row.segment == ForecastSegment::Fitted));
        assert!(result.rows[60..]
            .iter()
            .all(|row| row.segment == ForecastSegment::Forecast));

        // Timestamps ascend across the whole frame.
        assert!(result
            .rows
            .windows(2)
            .all(|pair| pair[0].timestamp.unix_seconds() < pair[1].timestamp.unix_seconds()));
    }

    #[test]
    fn bands_strictly_bracket_the_point_estimate() {
        let values: Vec<f64> = (0..100).map(|i| 50.0 + i as f64 * 0.25).collect();
        let series = daily_series(&values);

        let result =
            fit_and_predict(&series, 10, &ForecastConfig::default()).expect("must fit");

        for row in &result.rows {
            assert!(row.lower_bound < row.point_estimate, "row {row:?}");
            assert!(row.point_estimate < row.upper_bound, "row {row:?}");
        }
    }

    #[test]
    fn future_bands_widen_with_distance() {
        let values: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let series = daily_series(&values);

        let result =
            fit_and_predict(&series, 20, &ForecastConfig::default()).expect("must fit");
        let widths: Vec<f64> = result
            .forecast_rows()
            .map(|row| row.upper_bound - row.lower_bound)
            .collect();

        assert!(widths.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn out_of_order_input_is_sorted_before_fitting() {
        let values: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let ordered = daily_series(&values);

        let mut shuffled_points = ordered.points.clone();
        shuffled_points.reverse();
        shuffled_points.swap(3, 17);
        let shuffled = TimeSeries::new(shuffled_points);

        let config = ForecastConfig::default();
        let from_ordered = fit_and_predict(&ordered, 5, &config).expect("must fit");
        let from_shuffled = fit_and_predict(&shuffled, 5, &config).expect("must fit");

        assert_eq!(from_ordered, from_shuffled);
    }

    #[test]
    fn single_point_fails_without_touching_the_model() {
        let series = daily_series(&[42.0]);
        let err = fit_and_predict(&series, 5, &ForecastConfig::default()).expect_err("must fail");
        assert_eq!(err, DataError::InsufficientData { valid_rows: 1 });
    }

    #[test]
    fn daily_seasonality_is_a_no_op_on_daily_bars() {
        let config = ForecastConfig {
            daily_seasonality: true,
            weekly_seasonality: false,
            yearly_seasonality: false,
            interval_width: 0.80,
        };
        assert!(candidate_periods(&config, DAY_SECONDS).is_empty());

        // On hourly data it becomes a 24-step period.
        assert_eq!(candidate_periods(&config, 3_600), vec![24]);
    }
}
