use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::CacheStore;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::provider::MarketDataProvider;
use crate::providers::{BinanceProvider, CoingeckoProvider, YahooProvider};
use crate::ProviderId;

/// Adapter registry. One adapter per [`ProviderId`], shared as trait
/// objects.
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Arc<dyn MarketDataProvider>>,
}

impl Default for ProviderRegistry {
    /// Offline registry: every adapter on the no-op transport with caching
    /// disabled. Used by tests and dry runs.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(BinanceProvider::default()),
            Arc::new(CoingeckoProvider::default()),
            Arc::new(YahooProvider::default()),
        ])
    }
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.id(), provider))
            .collect();
        Self { providers }
    }

    /// Live registry: reqwest transport shared across adapters, one shared
    /// TTL cache in front of it.
    pub fn with_http() -> Self {
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        let cache = CacheStore::with_default_ttl();

        Self::new(vec![
            Arc::new(BinanceProvider::with_http_client(
                Arc::clone(&http_client),
                cache.clone(),
            )),
            Arc::new(CoingeckoProvider::with_http_client(
                Arc::clone(&http_client),
                cache.clone(),
            )),
            Arc::new(YahooProvider::with_http_client(http_client, cache)),
        ])
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn MarketDataProvider>> {
        self.providers.get(&id).map(Arc::clone)
    }

    /// Registered provider ids in canonical order.
    pub fn registered(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.providers.contains_key(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_covers_every_provider() {
        let registry = ProviderRegistry::default();

        assert_eq!(registry.registered(), ProviderId::ALL.to_vec());
        for id in ProviderId::ALL {
            assert!(registry.get(id).is_some());
        }
    }
}
