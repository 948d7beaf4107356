use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::cache::CacheStore;
use crate::http_client::{HttpClient, NoopHttpClient};
use crate::normalizer::{RawPoint, RawSeries, RawValue};
use crate::provider::MarketDataProvider;
use crate::providers::{fake_history_rows, fake_price, get_with_cache, HISTORY_TTL, PRICE_TTL};
use crate::{DataError, ProviderId, Symbol};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Tickers offered for selection. Yahoo has no cheap listing endpoint, so
/// the catalog is fixed.
const CATALOG: [&str; 8] = [
    "BTC-USD", "ETH-USD", "SOL-USD", "DOGE-USD", "AAPL", "MSFT", "SPY", "VTI",
];

/// General financial-data adapter. One chart endpoint serves both the
/// latest close and the daily close history.
pub struct YahooProvider {
    http_client: Arc<dyn HttpClient>,
    cache: CacheStore,
    base_url: String,
    use_real_api: bool,
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            cache: CacheStore::disabled(),
            base_url: DEFAULT_BASE_URL.to_string(),
            use_real_api: false,
        }
    }
}

impl YahooProvider {
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

    fn catalog_symbols() -> Vec<Symbol> {
        CATALOG
            .into_iter()
            .filter_map(|raw| Symbol::parse(raw).ok())
            .collect()
    }

    /// Never cached.
    fn fallback_symbols() -> Vec<Symbol> {
        ["BTC-USD", "ETH-USD"]
            .into_iter()
            .filter_map(|raw| Symbol::parse(raw).ok())
            .collect()
    }

    fn chart_url(&self, symbol: &Symbol, range_days: u32) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}d&interval=1d",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            range_days
        )
    }

    async fn fetch_chart(
        &self,
        symbol: &Symbol,
        range_days: u32,
        ttl: std::time::Duration,
    ) -> Result<ChartResult, DataError> {
        let url = self.chart_url(symbol, range_days);
        let body = get_with_cache(&self.http_client, &self.cache, &url, ttl).await?;

        let parsed: ChartResponse = serde_json::from_str(&body)
            .map_err(|error| DataError::MalformedSchema(format!("chart for {symbol}: {error}")))?;

        parsed
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| {
                DataError::DataUnavailable(format!("chart: no result for {symbol}"))
            })
    }

    fn close_rows(result: ChartResult) -> Vec<RawPoint> {
        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|quote| quote.close)
            .unwrap_or_default();

        // Timestamps come in unix seconds; closes may be null on holidays.
        result
            .timestamp
            .into_iter()
            .zip(closes.into_iter().chain(std::iter::repeat(None)))
            .map(|(secs, close)| {
                RawPoint::new(
                    Some(secs * 1_000),
                    close.map_or(RawValue::Missing, RawValue::Number),
                )
            })
            .collect()
    }
}

impl MarketDataProvider for YahooProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn list_symbols<'a>(&'a self) -> Pin<Box<dyn Future<Output = Vec<Symbol>> + Send + 'a>> {
        Box::pin(async move {
            let catalog = Self::catalog_symbols();
            if catalog.is_empty() {
                Self::fallback_symbols()
            } else {
                catalog
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

            let result = self.fetch_chart(symbol, 5, PRICE_TTL).await?;
            let rows = Self::close_rows(result);

            rows.iter()
                .rev()
                .find_map(|row| match row.value {
                    RawValue::Number(value) => Some(value),
                    _ => None,
                })
                .ok_or_else(|| {
                    DataError::DataUnavailable(format!("chart: no recent close for {symbol}"))
                })
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

            match self.fetch_chart(symbol, lookback_days, HISTORY_TTL).await {
                Ok(result) => RawSeries::new(self.id(), Self::close_rows(result)),
                Err(error) => {
                    tracing::warn!(provider = %self.id(), %symbol, %error, "history fetch failed");
                    RawSeries::empty(self.id())
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
