//! Core contracts for prevista.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Provider identifiers, the market data contract, and adapters
//! - Series normalization and horizon resolution
//! - HTTP transport abstraction, TTL cache, response envelope, notifier

pub mod cache;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod horizon;
pub mod http_client;
pub mod normalizer;
pub mod notifier;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod source;

pub use cache::CacheStore;
pub use domain::{AssetSelection, Symbol, TimeSeries, TimeSeriesPoint, UtcDateTime};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{DataError, ValidationError};
pub use horizon::{resolve, HorizonChoice, ResolvedHorizon, MAX_HORIZON_DAYS, MIN_HORIZON_DAYS};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use normalizer::{normalize, RawPoint, RawSeries, RawValue};
pub use notifier::{NoopNotifier, Notifier, TelegramNotifier};
pub use provider::MarketDataProvider;
pub use providers::{BinanceProvider, CoingeckoProvider, YahooProvider};
pub use registry::ProviderRegistry;
pub use source::ProviderId;
