//! Behavior-driven tests for the provider contract.
//!
//! These tests verify HOW adapters degrade when upstreams misbehave:
//! fallback symbol lists, explicit price errors, empty history sentinels,
//! and cache-through reads.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use prevista_core::{
    normalize, BinanceProvider, CacheStore, CoingeckoProvider, DataError, HttpClient, HttpError,
    HttpRequest, HttpResponse, MarketDataProvider, ProviderId, Symbol, YahooProvider,
};

/// Transport double that claims to be real (`is_mock` = false) so adapters
/// take their parsing paths, and replies per URL substring.
struct ScriptedHttpClient {
    script: Vec<(&'static str, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    fn new(script: Vec<(&'static str, Result<HttpResponse, HttpError>)>) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self::new(vec![("", Err(HttpError::new(message.to_string())))])
    }

    fn request_count(&self) -> usize {
        self.requests.lock().expect("lock poisoned").len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("lock poisoned")
                .push(request.url.clone());

            self.script
                .iter()
                .find(|(pattern, _)| request.url.contains(pattern))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Err(HttpError::new(format!("unscripted url {}", request.url))))
        })
    }
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

// =============================================================================
// Listing degradation
// =============================================================================

#[tokio::test]
async fn when_the_listing_call_fails_user_still_gets_the_fallback_symbols() {
    // Given: an upstream that times out on every call
    let client = Arc::new(ScriptedHttpClient::failing("request timeout"));
    let provider = BinanceProvider::with_http_client(client, CacheStore::disabled());

    // When: the user lists symbols
    let symbols = provider.list_symbols().await;

    // Then: the fixed fallback list comes back, in order
    let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
    assert_eq!(names, vec!["BTCUSDT", "ETHUSDT", "BNBUSDT"]);
}

#[tokio::test]
async fn when_the_listing_payload_misses_the_expected_field_fallback_applies() {
    // Given: valid JSON that carries none of the fields the adapter needs
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "coins/markets",
        Ok(HttpResponse::ok_json("{\"status\":\"maintenance\"}")),
    )]));
    let provider = CoingeckoProvider::with_http_client(client, CacheStore::disabled());

    // When / Then: the fallback ids come back
    let symbols = provider.list_symbols().await;
    let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
    assert_eq!(names, vec!["BITCOIN", "ETHEREUM"]);
}

#[tokio::test]
async fn usdt_filter_keeps_only_quote_usdt_pairs() {
    let body = r#"{"symbols":[
        {"symbol":"BTCUSDT","quoteAsset":"USDT"},
        {"symbol":"BTCEUR","quoteAsset":"EUR"},
        {"symbol":"ETHUSDT","quoteAsset":"USDT"}
    ]}"#;
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "exchangeInfo",
        Ok(HttpResponse::ok_json(body)),
    )]));
    let provider = BinanceProvider::with_http_client(client, CacheStore::disabled());

    let symbols = provider.list_symbols().await;
    let names: Vec<&str> = symbols.iter().map(Symbol::as_str).collect();
    assert_eq!(names, vec!["BTCUSDT", "ETHUSDT"]);
}

// =============================================================================
// Current price
// =============================================================================

#[tokio::test]
async fn when_the_price_field_is_absent_user_gets_data_unavailable() {
    // Given: a 200 response without the price field
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "ticker/price",
        Ok(HttpResponse::ok_json("{\"symbol\":\"BTCUSDT\"}")),
    )]));
    let provider = BinanceProvider::with_http_client(client, CacheStore::disabled());

    // When: the user asks for the current price
    let result = provider.current_price(&symbol("BTCUSDT")).await;

    // Then: an explicit DataUnavailable, never a panic
    assert!(matches!(result, Err(DataError::DataUnavailable(_))));
}

#[tokio::test]
async fn when_the_price_is_an_unparsable_string_user_gets_data_unavailable() {
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "ticker/price",
        Ok(HttpResponse::ok_json(
            "{\"symbol\":\"BTCUSDT\",\"price\":\"n/a\"}",
        )),
    )]));
    let provider = BinanceProvider::with_http_client(client, CacheStore::disabled());

    let result = provider.current_price(&symbol("BTCUSDT")).await;
    assert!(matches!(result, Err(DataError::DataUnavailable(_))));
}

#[tokio::test]
async fn coingecko_price_reads_the_usd_quote_for_the_lowercased_id() {
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "simple/price",
        Ok(HttpResponse::ok_json("{\"bitcoin\":{\"usd\":64250.5}}")),
    )]));
    let provider = CoingeckoProvider::with_http_client(
        Arc::clone(&client) as Arc<dyn HttpClient>,
        CacheStore::disabled(),
    );

    let price = provider
        .current_price(&symbol("BITCOIN"))
        .await
        .expect("price available");
    assert_eq!(price, 64_250.5);

    // The URL boundary lowercases the id; the domain symbol stays upper.
    let urls = client.requests.lock().expect("lock poisoned").clone();
    assert!(urls[0].contains("ids=bitcoin"));
}

// =============================================================================
// History parsing and degradation
// =============================================================================

#[tokio::test]
async fn binance_klines_rows_normalize_with_string_closes() {
    // Given: two kline rows with string-typed closes
    let body = r#"[
        [1704067200000,"42000.0","42500.0","41800.0","42250.50",1.0],
        [1704153600000,"42250.5","42900.0","42100.0","42780.25",1.0]
    ]"#;
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "klines",
        Ok(HttpResponse::ok_json(body)),
    )]));
    let provider = BinanceProvider::with_http_client(client, CacheStore::disabled());

    // When: fetching and normalizing
    let raw = provider.historical_series(&symbol("BTCUSDT"), 2).await;
    let series = normalize(&raw).expect("normalizes");

    // Then: close prices coerced from strings, timestamps from unix ms
    assert_eq!(series.values(), vec![42_250.50, 42_780.25]);
    assert!(series.is_strictly_increasing());
}

#[tokio::test]
async fn coingecko_market_chart_rows_normalize_from_numeric_pairs() {
    let body = r#"{"prices":[[1704067200000,42250.5],[1704153600000,42780.25]]}"#;
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "market_chart",
        Ok(HttpResponse::ok_json(body)),
    )]));
    let provider = CoingeckoProvider::with_http_client(client, CacheStore::disabled());

    let raw = provider.historical_series(&symbol("BITCOIN"), 2).await;
    assert_eq!(raw.provider, ProviderId::Coingecko);

    let series = normalize(&raw).expect("normalizes");
    assert_eq!(series.values(), vec![42_250.5, 42_780.25]);
}

#[tokio::test]
async fn yahoo_null_closes_are_dropped_during_normalization() {
    let body = r#"{"chart":{"result":[{
        "timestamp":[1704067200,1704153600,1704240000],
        "indicators":{"quote":[{"close":[42250.5,null,42780.25]}]}
    }]}}"#;
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "finance/chart",
        Ok(HttpResponse::ok_json(body)),
    )]));
    let provider = YahooProvider::with_http_client(client, CacheStore::disabled());

    let raw = provider.historical_series(&symbol("BTC-USD"), 3).await;
    assert_eq!(raw.rows.len(), 3);

    let series = normalize(&raw).expect("normalizes");
    assert_eq!(series.values(), vec![42_250.5, 42_780.25]);
}

#[tokio::test]
async fn when_the_history_call_fails_user_gets_an_empty_series() {
    // Given: a dead upstream
    let client = Arc::new(ScriptedHttpClient::failing("connection failed"));
    let provider = YahooProvider::with_http_client(client, CacheStore::disabled());

    // When: fetching history
    let raw = provider.historical_series(&symbol("BTC-USD"), 30).await;

    // Then: the empty sentinel, which normalization rejects downstream
    assert!(raw.is_empty());
    assert_eq!(
        normalize(&raw),
        Err(DataError::InsufficientData { valid_rows: 0 })
    );
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn repeated_price_requests_hit_the_cache_not_the_upstream() {
    // Given: a shared cache in front of the transport
    let client = Arc::new(ScriptedHttpClient::new(vec![(
        "ticker/price",
        Ok(HttpResponse::ok_json(
            "{\"symbol\":\"BTCUSDT\",\"price\":\"64000.0\"}",
        )),
    )]));
    let cache = CacheStore::with_default_ttl();
    let provider = BinanceProvider::with_http_client(
        Arc::clone(&client) as Arc<dyn HttpClient>,
        cache,
    );

    // When: the same price is requested twice
    let first = provider
        .current_price(&symbol("BTCUSDT"))
        .await
        .expect("price");
    let second = provider
        .current_price(&symbol("BTCUSDT"))
        .await
        .expect("price");

    // Then: one upstream call, identical answers
    assert_eq!(first, second);
    assert_eq!(client.request_count(), 1);
}
