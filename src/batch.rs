//! Concurrent batch resolution.
//!
//! `resolve_many` takes raw codes, infers asset classes, batches the
//! B3-listed ones through the multi-symbol provider and sends everything
//! else through the fallback chain, all concurrently. Failed identifiers
//! are simply absent from the result map; the batch never fails wholesale.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use log::{debug, warn};

use crate::chain::ResolutionChain;
use crate::models::{CanonicalQuote, NormalizedIdentifier};
use crate::normalizer;
use crate::provider::MultiQuoteProvider;

pub struct BatchResolver {
    chain: Arc<ResolutionChain>,
    multi: Option<Arc<dyn MultiQuoteProvider>>,
}

impl BatchResolver {
    pub fn new(chain: Arc<ResolutionChain>, multi: Option<Arc<dyn MultiQuoteProvider>>) -> Self {
        Self { chain, multi }
    }

    pub async fn resolve_many(&self, codes: &[String]) -> HashMap<String, CanonicalQuote> {
        let identifiers = Self::dedupe(codes);
        if identifiers.is_empty() {
            return HashMap::new();
        }

        let (listed, single): (Vec<_>, Vec<_>) = identifiers
            .into_iter()
            .partition(|ident| ident.class.is_b3_listed());

        let mut quotes = HashMap::new();
        let mut leftover = single;

        // One multi-symbol call for the listed tickers; anything the batch
        // endpoint does not answer falls back to its own chain.
        if let (Some(multi), false) = (&self.multi, listed.is_empty()) {
            match multi.latest_quotes(&listed).await {
                Ok(batch) => {
                    for quote in batch {
                        quotes.insert(quote.symbol.to_uppercase(), quote);
                    }
                }
                Err(e) => warn!("batch quote call failed, falling back per symbol: {}", e),
            }
            leftover.extend(
                listed
                    .into_iter()
                    .filter(|ident| !quotes.contains_key(&ident.code)),
            );
        } else {
            leftover.extend(listed);
        }

        let resolutions = leftover.iter().map(|ident| self.chain.resolve(ident));
        for (ident, outcome) in leftover.iter().zip(join_all(resolutions).await) {
            match outcome {
                Ok(quote) => {
                    quotes.insert(ident.code.clone(), quote);
                }
                Err(e) => debug!("{} dropped from batch: {}", ident.code, e),
            }
        }

        quotes
    }

    /// Uppercase, de-duplicate and classify the raw input, preserving first
    /// occurrence order.
    fn dedupe(codes: &[String]) -> Vec<NormalizedIdentifier> {
        let mut seen = std::collections::HashSet::new();
        codes
            .iter()
            .map(|raw| raw.trim().to_uppercase())
            .filter(|code| !code.is_empty() && seen.insert(code.clone()))
            .map(|code| {
                let class = normalizer::infer_asset_class(&code);
                normalizer::normalize(&code, class)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ResolutionChain;
    use crate::errors::QuoteError;
    use crate::models::AssetClass;
    use crate::provider::QuoteProvider;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        id: &'static str,
        reject: &'static [&'static str],
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(id: &'static str, reject: &'static [&'static str]) -> Arc<Self> {
            Arc::new(Self {
                id,
                reject,
                calls: AtomicUsize::new(0),
            })
        }

        fn quote_for(&self, code: &str) -> Result<CanonicalQuote, QuoteError> {
            if self.reject.contains(&code) {
                return Err(QuoteError::NotFound(code.to_string()));
            }
            Ok(CanonicalQuote::new(
                code.to_string(),
                dec!(25.50),
                dec!(0),
                code.to_string(),
                "BRL".to_string(),
                self.id,
            ))
        }
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn supports(&self, _class: AssetClass) -> bool {
            true
        }

        async fn latest_quote(
            &self,
            identifier: &NormalizedIdentifier,
        ) -> Result<CanonicalQuote, QuoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.quote_for(&identifier.code)
        }
    }

    #[async_trait]
    impl MultiQuoteProvider for ScriptedProvider {
        async fn latest_quotes(
            &self,
            identifiers: &[NormalizedIdentifier],
        ) -> Result<Vec<CanonicalQuote>, QuoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(identifiers
                .iter()
                .filter_map(|ident| self.quote_for(&ident.code).ok())
                .collect())
        }
    }

    #[tokio::test]
    async fn test_batch_partial_failure_drops_missing_keys() {
        let provider = ScriptedProvider::new("BRAPI", &["BOGUS"]);
        let chain = Arc::new(ResolutionChain::new(vec![provider.clone()]));
        let resolver = BatchResolver::new(chain, None);

        let codes = vec!["petr4".to_string(), "BOGUS".to_string()];
        let quotes = resolver.resolve_many(&codes).await;

        assert_eq!(quotes.len(), 1);
        assert!(quotes.contains_key("PETR4"));
        assert!(!quotes.contains_key("BOGUS"));
    }

    #[tokio::test]
    async fn test_batch_uses_multi_symbol_call_for_listed() {
        let provider = ScriptedProvider::new("BRAPI", &[]);
        let chain = Arc::new(ResolutionChain::new(vec![provider.clone()]));
        let resolver = BatchResolver::new(chain, Some(provider.clone()));

        let codes = vec![
            "PETR4".to_string(),
            "VALE3".to_string(),
            "MXRF11".to_string(),
        ];
        let quotes = resolver.resolve_many(&codes).await;

        assert_eq!(quotes.len(), 3);
        // One batched call, no per-symbol fallbacks.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_falls_back_for_symbols_missing_from_batch() {
        let multi = ScriptedProvider::new("BRAPI", &["VALE3"]);
        let fallback = ScriptedProvider::new("YAHOO", &[]);
        let chain = Arc::new(ResolutionChain::new(vec![
            multi.clone() as Arc<dyn QuoteProvider>,
            fallback.clone(),
        ]));
        let resolver = BatchResolver::new(chain, Some(multi.clone()));

        let codes = vec!["PETR4".to_string(), "VALE3".to_string()];
        let quotes = resolver.resolve_many(&codes).await;

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["PETR4"].source, "BRAPI");
        assert_eq!(quotes["VALE3"].source, "YAHOO");
    }

    #[tokio::test]
    async fn test_batch_dedupes_case_insensitively() {
        let provider = ScriptedProvider::new("BRAPI", &[]);
        let chain = Arc::new(ResolutionChain::new(vec![provider.clone()]));
        let resolver = BatchResolver::new(chain, Some(provider.clone()));

        let codes = vec![
            "petr4".to_string(),
            "PETR4".to_string(),
            " petr4 ".to_string(),
        ];
        let quotes = resolver.resolve_many(&codes).await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_empty_result() {
        let provider = ScriptedProvider::new("BRAPI", &[]);
        let chain = Arc::new(ResolutionChain::new(vec![provider.clone()]));
        let resolver = BatchResolver::new(chain, None);

        let quotes = resolver.resolve_many(&[]).await;
        assert!(quotes.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_mixes_classes() {
        let gecko = ScriptedProvider::new("COINGECKO", &[]);
        let brapi = ScriptedProvider::new("BRAPI", &[]);
        let chain = Arc::new(ResolutionChain::new(vec![
            gecko.clone() as Arc<dyn QuoteProvider>,
            brapi.clone(),
        ]));
        let resolver = BatchResolver::new(chain, None);

        let codes = vec!["BTC".to_string(), "PETR4".to_string()];
        let quotes = resolver.resolve_many(&codes).await;

        assert_eq!(quotes["BTC"].source, "COINGECKO");
        assert_eq!(quotes["PETR4"].source, "BRAPI");
    }
}
