use serde::{Deserialize, Serialize};

use prevista_core::ValidationError;

/// Tuning knobs for a forecast request.
///
/// Seasonality toggles enable candidate periods; a period only enters the
/// model when the history actually covers at least two full cycles of it.
/// `interval_width` is the nominal coverage of the uncertainty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub daily_seasonality: bool,
    pub weekly_seasonality: bool,
    pub yearly_seasonality: bool,
    pub interval_width: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            daily_seasonality: true,
            weekly_seasonality: true,
            yearly_seasonality: false,
            interval_width: 0.80,
        }
    }
}

impl ForecastConfig {
    pub fn with_interval_width(mut self, interval_width: f64) -> Self {
        self.interval_width = interval_width;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.interval_width.is_finite()
            || self.interval_width <= 0.0
            || self.interval_width >= 1.0
        {
            return Err(ValidationError::IntervalWidthOutOfRange {
                value: self.interval_width,
            });
        }
        Ok(())
    }
}
