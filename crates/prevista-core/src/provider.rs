use std::future::Future;
use std::pin::Pin;

use crate::{DataError, ProviderId, RawSeries, Symbol};

/// Market data provider contract.
///
/// Implementations wrap one upstream API behind a uniform async surface.
/// Methods return boxed futures so the trait stays object-safe and adapters
/// can be held as `Arc<dyn MarketDataProvider>`.
///
/// The degradation contract is part of the trait:
///
/// - [`list_symbols`](Self::list_symbols) never fails; on upstream trouble it
///   returns the provider's fixed fallback list, which is never empty.
/// - [`current_price`](Self::current_price) surfaces
///   [`DataError::DataUnavailable`] when the call fails or the price field is
///   absent or unparsable. It never panics.
/// - [`historical_series`](Self::historical_series) returns an empty
///   [`RawSeries`] on failure; the normalizer turns that into
///   [`DataError::InsufficientData`] downstream.
///
/// Every upstream call carries a fixed timeout of roughly 10 seconds and is
/// never retried.
pub trait MarketDataProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Symbols this provider can serve, for interactive selection.
    fn list_symbols<'a>(&'a self) -> Pin<Box<dyn Future<Output = Vec<Symbol>> + Send + 'a>>;

    /// Latest traded/quoted price in USD.
    fn current_price<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<f64, DataError>> + Send + 'a>>;

    /// Daily close history over the trailing `lookback_days`, as raw
    /// pre-normalization rows.
    fn historical_series<'a>(
        &'a self,
        symbol: &'a Symbol,
        lookback_days: u32,
    ) -> Pin<Box<dyn Future<Output = RawSeries> + Send + 'a>>;
}
