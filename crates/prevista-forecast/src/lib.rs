//! Forecasting for prevista.
//!
//! This crate contains:
//! - Forecast configuration and validation
//! - The decomposable trend/seasonality model
//! - The engine adapter producing banded forecast frames
//! - The end-to-end dashboard pipeline

pub mod adapter;
pub mod config;
pub mod model;
pub mod pipeline;

pub use adapter::{fit_and_predict, ForecastResult, ForecastRow, ForecastSegment};
pub use config::ForecastConfig;
pub use model::{DecomposableModel, SeasonalComponent};
pub use pipeline::{
    run_pipeline, run_pipeline_at, DashboardSnapshot, PipelineError, PipelineRequest,
    DEFAULT_LOOKBACK_DAYS,
};
