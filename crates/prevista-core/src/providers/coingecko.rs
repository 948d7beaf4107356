use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::cache::CacheStore;
use crate::http_client::{HttpClient, NoopHttpClient};
use crate::normalizer::{RawPoint, RawSeries, RawValue};
use crate::provider::MarketDataProvider;
use crate::providers::{
    fake_history_rows, fake_price, get_with_cache, HISTORY_TTL, PRICE_TTL, SYMBOLS_TTL,
};
use crate::{DataError, ProviderId, Symbol};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

/// Market-data aggregator adapter. Works on CoinGecko coin ids rather than
/// exchange pairs; ids are lowercased at the URL boundary while the domain
/// `Symbol` stays uppercase.
pub struct CoingeckoProvider {
    http_client: Arc<dyn HttpClient>,
    cache: CacheStore,
    base_url: String,
    use_real_api: bool,
}

impl Default for CoingeckoProvider {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            cache: CacheStore::disabled(),
            base_url: DEFAULT_BASE_URL.to_string(),
            use_real_api: false,
        }
    }
}

impl CoingeckoProvider {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, cache: CacheStore) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            cache,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Never cached.
    fn fallback_symbols() -> Vec<Symbol> {
        ["BITCOIN", "ETHEREUM"]
            .into_iter()
            .filter_map(|raw| Symbol::parse(raw).ok())
            .collect()
    }

    async fn fetch_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let url = format!(
            "{}/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=100&page=1",
            self.base_url
        );
        let body = get_with_cache(&self.http_client, &self.cache, &url, SYMBOLS_TTL).await?;

        let parsed: Vec<CoinMarketEntry> = serde_json::from_str(&body)
            .map_err(|error| DataError::MalformedSchema(format!("coins/markets: {error}")))?;

        let symbols = parsed
            .into_iter()
            .filter_map(|entry| Symbol::parse(&entry.id).ok())
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Err(DataError::MalformedSchema(
                "coins/markets yielded no usable ids".to_string(),
            ));
        }

        Ok(symbols)
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<f64, DataError> {
        let id = symbol.to_lowercase();
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            urlencoding::encode(&id)
        );
        let body = get_with_cache(&self.http_client, &self.cache, &url, PRICE_TTL).await?;

        let parsed: HashMap<String, SimplePriceEntry> = serde_json::from_str(&body)
            .map_err(|error| {
                DataError::DataUnavailable(format!("simple/price for {symbol}: {error}"))
            })?;

        parsed
            .get(&id)
            .and_then(|entry| entry.usd)
            .ok_or_else(|| {
                DataError::DataUnavailable(format!("simple/price: no usd quote for {symbol}"))
            })
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        lookback_days: u32,
    ) -> Result<Vec<RawPoint>, DataError> {
        let id = symbol.to_lowercase();
        let url = format!(
            "{}/api/v3/coins/{}/market_chart?vs_currency=usd&days={}",
            self.base_url,
            urlencoding::encode(&id),
            lookback_days
        );
        let body = get_with_cache(&self.http_client, &self.cache, &url, HISTORY_TTL).await?;

        let parsed: MarketChartResponse = serde_json::from_str(&body).map_err(|error| {
            DataError::MalformedSchema(format!("market_chart for {symbol}: {error}"))
        })?;

        // Each prices row is [timestamp_ms, price]; both numbers.
        Ok(parsed
            .prices
            .into_iter()
            .map(|row| {
                let timestamp_ms = row.first().and_then(serde_json::Value::as_i64);
                let value = row
                    .get(1)
                    .and_then(serde_json::Value::as_f64)
                    .map_or(RawValue::Missing, RawValue::Number);
                RawPoint::new(timestamp_ms, value)
            })
            .collect())
    }
}

impl MarketDataProvider for CoingeckoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Coingecko
    }

    fn list_symbols<'a>(&'a self) -> Pin<Box<dyn Future<Output = Vec<Symbol>> + Send + 'a>> {
        Box::pin(async move {
            if !self.use_real_api {
                return Self::fallback_symbols();
            }

            match self.fetch_symbols().await {
                Ok(symbols) => symbols,
                Err(error) => {
                    tracing::warn!(provider = %self.id(), %error, "symbol listing failed, using fallback");
                    Self::fallback_symbols()
                }
            }
        })
    }

    fn current_price<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<f64, DataError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.use_real_api {
                return Ok(fake_price(symbol));
            }

            self.fetch_price(symbol).await
        })
    }

    fn historical_series<'a>(
        &'a self,
        symbol: &'a Symbol,
        lookback_days: u32,
    ) -> Pin<Box<dyn Future<Output = RawSeries> + Send + 'a>> {
        Box::pin(async move {
            if !self.use_real_api {
                return RawSeries::new(self.id(), fake_history_rows(symbol, lookback_days));
            }

            match self.fetch_history(symbol, lookback_days).await {
                Ok(rows) => RawSeries::new(self.id(), rows),
                Err(error) => {
                    tracing::warn!(provider = %self.id(), %symbol, %error, "history fetch failed");
                    RawSeries::empty(self.id())
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct CoinMarketEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transport_serves_fallback_listing() {
        let provider = CoingeckoProvider::default();

        let symbols = provider.list_symbols().await;
        let names = symbols.iter().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(names, vec!["BITCOIN", "ETHEREUM"]);
    }

    #[tokio::test]
    async fn mock_history_is_non_empty_and_ordered() {
        let provider = CoingeckoProvider::default();
        let symbol = Symbol::parse("BITCOIN").expect("valid symbol");

        let series = provider.historical_series(&symbol, 14).await;
        assert_eq!(series.provider, ProviderId::Coingecko);
        assert_eq!(series.rows.len(), 14);
    }
}
