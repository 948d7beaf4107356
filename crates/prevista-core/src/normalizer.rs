//! Series normalization: heterogeneous upstream rows into the canonical
//! two-column series.
//!
//! Providers parse their own response schemas only far enough to extract
//! raw (timestamp, value) rows; this module is the single gate through which
//! those rows become a [`TimeSeries`]. Cleaning drops incomplete rows,
//! coercion turns millisecond timestamps and string-typed prices into
//! typed values, and two hard gates reject series the model cannot use.

use serde::{Deserialize, Serialize};

use crate::{DataError, ProviderId, TimeSeries, TimeSeriesPoint, UtcDateTime};

/// Pre-coercion value cell. Binance serves prices as JSON strings,
/// CoinGecko and Yahoo as numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl RawValue {
    fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Coerce to floating point. `None` means the cell was present but
    /// unusable (unparsable text, non-finite or negative number).
    fn coerce(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Missing => return None,
        };

        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

/// One upstream row before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub timestamp_ms: Option<i64>,
    pub value: RawValue,
}

impl RawPoint {
    pub fn new(timestamp_ms: Option<i64>, value: RawValue) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// Raw rows extracted from one provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub provider: ProviderId,
    pub rows: Vec<RawPoint>,
}

impl RawSeries {
    pub fn new(provider: ProviderId, rows: Vec<RawPoint>) -> Self {
        Self { provider, rows }
    }

    /// Degrade-gracefully sentinel: upstream failed or had no data.
    pub fn empty(provider: ProviderId) -> Self {
        Self {
            provider,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Clean and coerce raw rows into the canonical series.
///
/// Rows with a missing timestamp or value are dropped. If at least one row
/// carried both fields but every such row failed coercion, the response
/// shape as a whole is wrong and the result is
/// [`DataError::MalformedSchema`]. Fewer than 2 valid rows after cleaning is
/// [`DataError::InsufficientData`], the one precondition the forecast
/// adapter relies on.
///
/// Values are not mutated beyond coercion, the order is the upstream order,
/// and no deduplication happens here.
pub fn normalize(raw: &RawSeries) -> Result<TimeSeries, DataError> {
    let mut points = Vec::with_capacity(raw.rows.len());
    let mut complete_rows = 0_usize;

    for row in &raw.rows {
        let (Some(timestamp_ms), false) = (row.timestamp_ms, row.value.is_missing()) else {
            continue;
        };
        complete_rows += 1;

        let Some(value) = row.value.coerce() else {
            continue;
        };
        let Ok(timestamp) = UtcDateTime::from_unix_millis(timestamp_ms) else {
            continue;
        };
        let Ok(point) = TimeSeriesPoint::new(timestamp, value) else {
            continue;
        };

        points.push(point);
    }

    if complete_rows > 0 && points.is_empty() {
        return Err(DataError::MalformedSchema(format!(
            "no row from {} coerced to (timestamp, value)",
            raw.provider
        )));
    }

    if points.len() < 2 {
        return Err(DataError::InsufficientData {
            valid_rows: points.len(),
        });
    }

    Ok(TimeSeries::new(points))
}
