//! End-to-end dashboard pipeline.
//!
//! One render cycle: current price (best effort) → raw history →
//! normalization → horizon resolution → model fit → snapshot. Executed
//! once per request, fully awaited, never overlapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

use prevista_core::{
    horizon, normalize, AssetSelection, DataError, HorizonChoice, MarketDataProvider,
    UtcDateTime, ValidationError,
};

use crate::adapter::{fit_and_predict, ForecastResult};
use crate::config::ForecastConfig;

pub const DEFAULT_LOOKBACK_DAYS: u32 = 365;

/// Everything one render needs, fixed for its duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub selection: AssetSelection,
    pub horizon: HorizonChoice,
    pub lookback_days: u32,
    pub config: ForecastConfig,
}

impl PipelineRequest {
    pub fn new(selection: AssetSelection, horizon: HorizonChoice) -> Self {
        Self {
            selection,
            horizon,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }
}

/// Terminal pipeline outcomes. Degradations that the contract absorbs
/// (missing price, clamped horizon) surface as warnings on the snapshot
/// instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// The assembled render payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub selection: AssetSelection,
    /// `None` when the price endpoint was unavailable; a warning says so.
    pub current_price: Option<f64>,
    pub horizon_days: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub forecast: ForecastResult,
}

/// Run one render cycle against "today".
pub async fn run_pipeline(
    provider: &dyn MarketDataProvider,
    request: &PipelineRequest,
) -> Result<DashboardSnapshot, PipelineError> {
    run_pipeline_at(provider, request, UtcDateTime::now().date()).await
}

/// Run one render cycle against an explicit reference date. End-date
/// horizons resolve relative to it.
pub async fn run_pipeline_at(
    provider: &dyn MarketDataProvider,
    request: &PipelineRequest,
    today: Date,
) -> Result<DashboardSnapshot, PipelineError> {
    request.config.validate()?;
    let resolved = horizon::resolve(request.horizon, today)?;

    let mut warnings = Vec::new();
    if resolved.clamped {
        warnings.push("end date is not in the future; horizon clamped to 1 day".to_string());
    }

    let symbol = &request.selection.symbol;

    let current_price = match provider.current_price(symbol).await {
        Ok(price) => Some(price),
        Err(error) => {
            tracing::warn!(%symbol, %error, "current price unavailable");
            warnings.push(format!("current price unavailable: {error}"));
            None
        }
    };

    let raw = provider
        .historical_series(symbol, request.lookback_days)
        .await;
    let series = normalize(&raw)?;

    tracing::info!(
        %symbol,
        provider = %provider.id(),
        points = series.len(),
        horizon_days = resolved.days,
        "running forecast"
    );

    let forecast = fit_and_predict(&series, resolved.days, &request.config)?;

    Ok(DashboardSnapshot {
        selection: request.selection.clone(),
        current_price,
        horizon_days: resolved.days,
        warnings,
        forecast,
    })
}
