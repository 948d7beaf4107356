use serde::{Deserialize, Serialize};

use crate::{ProviderId, Symbol, UtcDateTime, ValidationError};

/// One observation of the canonical two-column series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: UtcDateTime,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: UtcDateTime, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "value" });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field: "value" });
        }

        Ok(Self { timestamp, value })
    }
}

/// Canonical price series handed to the forecast engine.
///
/// The normalizer produces points in upstream order; sorting is the
/// forecast adapter's responsibility, not the normalizer's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub points: Vec<TimeSeriesPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self { points: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn last_timestamp(&self) -> Option<UtcDateTime> {
        self.points.last().map(|point| point.timestamp)
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.points
            .windows(2)
            .all(|pair| pair[0].timestamp < pair[1].timestamp)
    }

    /// Ascending copy by timestamp. Duplicate timestamps are kept as-is;
    /// providers already guarantee uniqueness within one response.
    pub fn into_sorted(mut self) -> Self {
        self.points.sort_by_key(|point| point.timestamp);
        self
    }
}

/// The user's asset choice, immutable for one render cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSelection {
    pub symbol: Symbol,
    pub provider: ProviderId,
}

impl AssetSelection {
    pub fn new(symbol: Symbol, provider: ProviderId) -> Self {
        Self { symbol, provider }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(ts: &str, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint::new(UtcDateTime::parse(ts).expect("timestamp"), value)
            .expect("valid point")
    }

    #[test]
    fn rejects_negative_value() {
        let ts = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp");
        let err = TimeSeriesPoint::new(ts, -1.0).expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { .. }));
    }

    #[test]
    fn rejects_non_finite_value() {
        let ts = UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp");
        let err = TimeSeriesPoint::new(ts, f64::NAN).expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { .. }));
    }

    #[test]
    fn sorts_points_ascending() {
        let series = TimeSeries::new(vec![
            point("2024-01-03T00:00:00Z", 3.0),
            point("2024-01-01T00:00:00Z", 1.0),
            point("2024-01-02T00:00:00Z", 2.0),
        ]);
        assert!(!series.is_strictly_increasing());

        let sorted = series.into_sorted();
        assert!(sorted.is_strictly_increasing());
        assert_eq!(sorted.values(), vec![1.0, 2.0, 3.0]);
    }
}
