//! Engine composition root.
//!
//! Wires the transport, the four providers, the fallback chain, the batch
//! resolver and the quote cache behind one facade. All endpoints and knobs
//! live in [`EngineConfig`]; nothing reads global state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::batch::BatchResolver;
use crate::chain::{ResolutionChain, ResolutionError};
use crate::cache::QuoteCache;
use crate::models::{AssetClass, CanonicalQuote};
use crate::normalizer;
use crate::provider::brapi::BrapiProvider;
use crate::provider::coingecko::CoinGeckoProvider;
use crate::provider::treasury::{BcbProvider, TreasuryProvider};
use crate::provider::yahoo_chart::YahooChartProvider;
use crate::provider::{MultiQuoteProvider, QuoteProvider};
use crate::transport::HttpTransport;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub brapi_base_url: String,
    pub brapi_token: Option<String>,
    pub yahoo_base_url: String,
    pub coingecko_base_url: String,
    pub treasury_base_url: String,
    pub bcb_base_url: String,
    /// CORS relay prefixes tried in order for proxy-routed requests.
    /// Empty means every request goes direct.
    pub proxies: Vec<String>,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            brapi_base_url: "https://brapi.dev/api".to_string(),
            brapi_token: None,
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            treasury_base_url:
                "https://www.tesourodireto.com.br/json/br/com/b3/tesourodireto/service/api"
                    .to_string(),
            bcb_base_url: "https://api.bcb.gov.br".to_string(),
            proxies: Vec::new(),
            request_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

pub struct QuoteEngine {
    chain: Arc<ResolutionChain>,
    batch: BatchResolver,
    cache: QuoteCache,
}

impl QuoteEngine {
    pub fn new(config: EngineConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(
            config.request_timeout,
            config.proxies.clone(),
        ));

        let brapi = Arc::new(BrapiProvider::new(
            transport.clone(),
            config.brapi_base_url.clone(),
            config.brapi_token.clone(),
        ));

        let providers: Vec<Arc<dyn QuoteProvider>> = vec![
            brapi.clone(),
            Arc::new(YahooChartProvider::new(
                transport.clone(),
                config.yahoo_base_url.clone(),
            )),
            Arc::new(CoinGeckoProvider::new(
                transport.clone(),
                config.coingecko_base_url.clone(),
            )),
            Arc::new(TreasuryProvider::new(
                transport.clone(),
                config.treasury_base_url.clone(),
            )),
            Arc::new(BcbProvider::new(transport, config.bcb_base_url.clone())),
        ];

        info!("quote engine up with {} providers", providers.len());
        Self::assemble(providers, Some(brapi), config.cache_ttl)
    }

    /// Assembly seam shared by production wiring and tests.
    pub fn with_providers(
        providers: Vec<Arc<dyn QuoteProvider>>,
        multi: Option<Arc<dyn MultiQuoteProvider>>,
        cache_ttl: Duration,
    ) -> Self {
        Self::assemble(providers, multi, cache_ttl)
    }

    fn assemble(
        providers: Vec<Arc<dyn QuoteProvider>>,
        multi: Option<Arc<dyn MultiQuoteProvider>>,
        cache_ttl: Duration,
    ) -> Self {
        let chain = Arc::new(ResolutionChain::new(providers));
        Self {
            batch: BatchResolver::new(chain.clone(), multi),
            chain,
            cache: QuoteCache::new(cache_ttl),
        }
    }

    /// Resolve one identifier through its class-specific chain. When the
    /// caller does not pass a class it is inferred from the code's shape.
    pub async fn resolve_quote(
        &self,
        code: &str,
        class: Option<AssetClass>,
    ) -> Result<CanonicalQuote, ResolutionError> {
        let class = class.unwrap_or_else(|| normalizer::infer_asset_class(code));
        let identifier = normalizer::normalize(code, class);
        let key = Self::cache_key(&identifier);

        if let Some(cached) = self.cache.get(&key) {
            debug!("cache hit for {}", key);
            return Ok(cached);
        }

        let quote = self.chain.resolve(&identifier).await?;
        self.cache.insert(key, quote.clone());
        Ok(quote)
    }

    /// Cache key qualified by asset class: the same code requested under
    /// two classes (a crypto ticker later asked for as an equity) resolves
    /// through different chains and must not share a cache entry.
    fn cache_key(identifier: &crate::models::NormalizedIdentifier) -> String {
        format!("{}:{}", identifier.class.as_str(), identifier.code)
    }

    /// Cache key for batch input, whose class is always inferred. The
    /// inference is deterministic, so this matches whatever key the same
    /// code produces through `resolve_quote` without an explicit class.
    fn inferred_cache_key(code: &str) -> String {
        let class = normalizer::infer_asset_class(code);
        Self::cache_key(&normalizer::normalize(code, class))
    }

    /// Resolve many identifiers at once. Entries that could not be resolved
    /// are absent from the map.
    pub async fn resolve_quotes(&self, codes: &[String]) -> HashMap<String, CanonicalQuote> {
        let mut quotes = HashMap::new();
        let mut misses = Vec::new();

        for code in codes {
            let key = code.trim().to_uppercase();
            if key.is_empty() || quotes.contains_key(&key) {
                continue;
            }
            match self.cache.get(&Self::inferred_cache_key(&key)) {
                Some(cached) => {
                    quotes.insert(key, cached);
                }
                None => misses.push(key),
            }
        }

        for (key, quote) in self.batch.resolve_many(&misses).await {
            self.cache
                .insert(Self::inferred_cache_key(&key), quote.clone());
            quotes.insert(key, quote);
        }

        quotes
    }
}
