//! Concrete market data adapters.
//!
//! Each adapter wraps one upstream API behind [`MarketDataProvider`] and
//! differs from the others only in endpoint URLs and field extraction. The
//! shared pieces live here: a cache-through GET helper and the deterministic
//! fake-data generators used when the transport is a mock.

mod binance;
mod coingecko;
mod yahoo;

pub use binance::BinanceProvider;
pub use coingecko::CoingeckoProvider;
pub use yahoo::YahooProvider;

use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::http_client::{HttpClient, HttpRequest};
use crate::normalizer::{RawPoint, RawValue};
use crate::{DataError, Symbol, UtcDateTime};

/// Cache lifetimes, per endpoint class. Symbol lists and history change
/// slowly; prices go stale fast.
pub const SYMBOLS_TTL: Duration = Duration::from_secs(3600);
pub const PRICE_TTL: Duration = Duration::from_secs(300);
pub const HISTORY_TTL: Duration = Duration::from_secs(3600);

/// GET through the shared TTL cache, keyed by the full request URL.
///
/// Only successful bodies are cached. Transport failures and non-2xx
/// statuses surface as `DataUnavailable`; there is no retry.
pub(crate) async fn get_with_cache(
    http_client: &Arc<dyn HttpClient>,
    cache: &CacheStore,
    url: &str,
    ttl: Duration,
) -> Result<String, DataError> {
    if let Some(body) = cache.get(url).await {
        tracing::debug!(url, "cache hit");
        return Ok(body);
    }

    let response = http_client
        .execute(HttpRequest::get(url))
        .await
        .map_err(|error| {
            tracing::warn!(url, error = %error, "upstream transport error");
            DataError::DataUnavailable(format!("transport error: {error}"))
        })?;

    if !response.is_success() {
        tracing::warn!(url, status = response.status, "upstream returned error status");
        return Err(DataError::DataUnavailable(format!(
            "upstream returned status {}",
            response.status
        )));
    }

    cache
        .put(url.to_string(), response.body.clone(), Some(ttl))
        .await;

    Ok(response.body)
}

/// Stable per-symbol seed for deterministic fake data.
pub(crate) fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

/// Deterministic fake price: bounded, positive, stable per symbol.
pub(crate) fn fake_price(symbol: &Symbol) -> f64 {
    90.0 + (symbol_seed(symbol) % 350) as f64 / 10.0
}

/// Deterministic fake daily history ending today: a gentle upward drift with
/// a seeded offset, one row per day over `lookback_days`.
pub(crate) fn fake_history_rows(symbol: &Symbol, lookback_days: u32) -> Vec<RawPoint> {
    let seed = symbol_seed(symbol);
    let now_ms = UtcDateTime::now().unix_seconds() * 1_000;
    let day_ms = 86_400_000_i64;
    let count = lookback_days.max(2) as i64;

    (0..count)
        .map(|index| {
            let timestamp_ms = now_ms - (count - 1 - index) * day_ms;
            let base = 90.0 + ((seed + index as u64) % 350) as f64 / 10.0;
            let drift = index as f64 * 0.05;
            RawPoint::new(Some(timestamp_ms), RawValue::Number(base + drift))
        })
        .collect()
}
