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

const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Exchange trading API adapter. Lists USDT-quoted pairs and serves spot
/// prices and daily klines.
pub struct BinanceProvider {
    http_client: Arc<dyn HttpClient>,
    cache: CacheStore,
    base_url: String,
    use_real_api: bool,
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            cache: CacheStore::disabled(),
            base_url: DEFAULT_BASE_URL.to_string(),
            use_real_api: false,
        }
    }
}

impl BinanceProvider {
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

    /// Well-known pairs returned whenever the exchange listing cannot be
    /// fetched or parsed. Never cached.
    fn fallback_symbols() -> Vec<Symbol> {
        ["BTCUSDT", "ETHUSDT", "BNBUSDT"]
            .into_iter()
            .filter_map(|raw| Symbol::parse(raw).ok())
            .collect()
    }

    async fn fetch_symbols(&self) -> Result<Vec<Symbol>, DataError> {
        let url = format!("{}/api/v3/exchangeInfo", self.base_url);
        let body = get_with_cache(&self.http_client, &self.cache, &url, SYMBOLS_TTL).await?;

        let parsed: ExchangeInfoResponse = serde_json::from_str(&body)
            .map_err(|error| DataError::MalformedSchema(format!("exchangeInfo: {error}")))?;

        let symbols = parsed
            .symbols
            .into_iter()
            .filter(|entry| entry.quote_asset == "USDT")
            .filter_map(|entry| Symbol::parse(&entry.symbol).ok())
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Err(DataError::MalformedSchema(
                "exchangeInfo yielded no USDT pairs".to_string(),
            ));
        }

        Ok(symbols)
    }

    async fn fetch_price(&self, symbol: &Symbol) -> Result<f64, DataError> {
        let url = format!(
            "{}/api/v3/ticker/price?symbol={}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );
        let body = get_with_cache(&self.http_client, &self.cache, &url, PRICE_TTL).await?;

        let parsed: TickerPriceResponse = serde_json::from_str(&body).map_err(|error| {
            DataError::DataUnavailable(format!("ticker/price for {symbol}: {error}"))
        })?;

        parsed.price.trim().parse::<f64>().map_err(|_| {
            DataError::DataUnavailable(format!(
                "ticker/price for {symbol}: unparsable price '{}'",
                parsed.price
            ))
        })
    }

    async fn fetch_history(&self, symbol: &Symbol, lookback_days: u32) -> Result<Vec<RawPoint>, DataError> {
        // Klines caps limit at 1000 rows per call.
        let limit = lookback_days.min(1000);
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval=1d&limit={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            limit
        );
        let body = get_with_cache(&self.http_client, &self.cache, &url, HISTORY_TTL).await?;

        let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(&body)
            .map_err(|error| DataError::MalformedSchema(format!("klines for {symbol}: {error}")))?;

        // Kline rows are positional arrays: [openTime, open, high, low,
        // close, ...]; close arrives as a JSON string.
        Ok(rows
            .into_iter()
            .map(|row| {
                let timestamp_ms = row.first().and_then(serde_json::Value::as_i64);
                let value = match row.get(4) {
                    Some(serde_json::Value::String(text)) => RawValue::Text(text.clone()),
                    Some(serde_json::Value::Number(number)) => number
                        .as_f64()
                        .map_or(RawValue::Missing, RawValue::Number),
                    _ => RawValue::Missing,
                };
                RawPoint::new(timestamp_ms, value)
            })
            .collect())
    }
}

impl MarketDataProvider for BinanceProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Binance
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
struct ExchangeInfoResponse {
    symbols: Vec<ExchangeSymbolEntry>,
}

#[derive(Debug, Deserialize)]
struct ExchangeSymbolEntry {
    symbol: String,
    #[serde(rename = "quoteAsset")]
    quote_asset: String,
}

#[derive(Debug, Deserialize)]
struct TickerPriceResponse {
    price: String,
}
