//! Sequential provider fallback.
//!
//! Each asset class maps to an ordered provider list. The chain walks the
//! list, returns the first successful quote and records every failed
//! attempt, so a caller looking at a final error can see which provider
//! failed with what.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use crate::errors::FailureReason;
use crate::models::{AssetClass, CanonicalQuote, NormalizedIdentifier};
use crate::provider::QuoteProvider;
use crate::provider::{brapi, coingecko, treasury, yahoo_chart};

/// One failed provider call, kept for diagnostics on the final error.
#[derive(Clone, Debug, Serialize)]
pub struct ProviderAttempt {
    pub provider: &'static str,
    pub reason: FailureReason,
    pub message: String,
}

/// Terminal failure of a resolution: every routed provider was tried.
/// `reason` carries the classification of the last attempt, which is the
/// most specific signal available (earlier providers may have failed for
/// unrelated reasons).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ResolutionError {
    pub reason: FailureReason,
    pub message: String,
    pub attempts: Vec<ProviderAttempt>,
}

/// Ordered provider ids for an asset class. Benchmark fixed-income
/// identifiers (the SELIC rate itself) pin the central bank first, since
/// it is authoritative for the target rate.
pub fn route(class: AssetClass, benchmark: bool) -> &'static [&'static str] {
    match class {
        AssetClass::Equity | AssetClass::Fii | AssetClass::Etf | AssetClass::Bdr => {
            &[brapi::PROVIDER_ID, yahoo_chart::PROVIDER_ID]
        }
        AssetClass::Crypto => &[coingecko::PROVIDER_ID, brapi::PROVIDER_ID],
        AssetClass::TreasuryBond => {
            if benchmark {
                &[treasury::BCB_PROVIDER_ID, treasury::TREASURY_PROVIDER_ID]
            } else {
                &[treasury::TREASURY_PROVIDER_ID, treasury::BCB_PROVIDER_ID]
            }
        }
        AssetClass::PrivateCredit => &[brapi::PROVIDER_ID],
    }
}

pub struct ResolutionChain {
    providers: Vec<Arc<dyn QuoteProvider>>,
}

impl ResolutionChain {
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        Self { providers }
    }

    fn provider(&self, id: &str) -> Option<&Arc<dyn QuoteProvider>> {
        self.providers.iter().find(|provider| provider.id() == id)
    }

    /// Try every routed provider in order; first success wins.
    pub async fn resolve(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, ResolutionError> {
        let order = route(identifier.class, identifier.is_benchmark());
        let mut attempts: Vec<ProviderAttempt> = Vec::new();

        for id in order {
            let Some(provider) = self.provider(id) else {
                continue;
            };
            if !provider.supports(identifier.class) {
                continue;
            }

            debug!("resolving {} via {}", identifier.code, id);
            match provider.latest_quote(identifier).await {
                Ok(quote) => {
                    debug!("{} resolved by {}", identifier.code, id);
                    return Ok(quote);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", id, identifier.code, e);
                    attempts.push(ProviderAttempt {
                        provider: provider.id(),
                        reason: e.reason(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(Self::exhausted(identifier, attempts))
    }

    fn exhausted(
        identifier: &NormalizedIdentifier,
        attempts: Vec<ProviderAttempt>,
    ) -> ResolutionError {
        match attempts.last() {
            Some(last) => ResolutionError {
                reason: last.reason,
                message: format!(
                    "no provider resolved {}: last error from {}: {}",
                    identifier.code, last.provider, last.message
                ),
                attempts,
            },
            None => ResolutionError {
                reason: FailureReason::NotFound,
                message: format!("no provider routed for {}", identifier.code),
                attempts,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QuoteError;
    use crate::normalizer;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        id: &'static str,
        calls: AtomicUsize,
        fail_with: Option<fn(&str) -> QuoteError>,
    }

    impl MockProvider {
        fn ok(id: &'static str) -> Self {
            Self {
                id,
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }

        fn failing(id: &'static str, fail_with: fn(&str) -> QuoteError) -> Self {
            Self {
                id,
                calls: AtomicUsize::new(0),
                fail_with: Some(fail_with),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
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
            match self.fail_with {
                Some(fail) => Err(fail(&identifier.code)),
                None => Ok(CanonicalQuote::new(
                    identifier.code.clone(),
                    dec!(10),
                    dec!(0.5),
                    identifier.code.clone(),
                    "BRL".to_string(),
                    self.id,
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_first_provider_success_short_circuits() {
        let primary = Arc::new(MockProvider::ok("BRAPI"));
        let fallback = Arc::new(MockProvider::ok("YAHOO"));
        let chain = ResolutionChain::new(vec![primary.clone(), fallback.clone()]);

        let ident = normalizer::normalize("PETR4", AssetClass::Equity);
        let quote = chain.resolve(&ident).await.unwrap();

        assert_eq!(quote.source, "BRAPI");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_after_failure_records_attempt() {
        let primary = Arc::new(MockProvider::failing("BRAPI", |_| QuoteError::Http {
            status: 502,
        }));
        let fallback = Arc::new(MockProvider::ok("YAHOO"));
        let chain = ResolutionChain::new(vec![primary.clone(), fallback.clone()]);

        let ident = normalizer::normalize("VALE3", AssetClass::Equity);
        let quote = chain.resolve(&ident).await.unwrap();

        assert_eq!(quote.source, "YAHOO");
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chain_reports_last_reason() {
        let primary = Arc::new(MockProvider::failing("BRAPI", |_| QuoteError::Http {
            status: 500,
        }));
        let fallback = Arc::new(MockProvider::failing("YAHOO", |symbol| {
            QuoteError::NotFound(symbol.to_string())
        }));
        let chain = ResolutionChain::new(vec![primary, fallback]);

        let ident = normalizer::normalize("XXXX3", AssetClass::Equity);
        let err = chain.resolve(&ident).await.unwrap_err();

        assert_eq!(err.reason, FailureReason::NotFound);
        assert_eq!(err.attempts.len(), 2);
        assert_eq!(err.attempts[0].provider, "BRAPI");
        assert_eq!(err.attempts[0].reason, FailureReason::Http(500));
        assert_eq!(err.attempts[1].provider, "YAHOO");
    }

    #[tokio::test]
    async fn test_crypto_routes_coingecko_first() {
        let gecko = Arc::new(MockProvider::ok("COINGECKO"));
        let brapi = Arc::new(MockProvider::ok("BRAPI"));
        let chain = ResolutionChain::new(vec![brapi.clone(), gecko.clone()]);

        let ident = normalizer::normalize("BTC", AssetClass::Crypto);
        let quote = chain.resolve(&ident).await.unwrap();

        assert_eq!(quote.source, "COINGECKO");
        assert_eq!(brapi.calls(), 0);
    }

    #[tokio::test]
    async fn test_benchmark_pins_central_bank_first() {
        let tesouro = Arc::new(MockProvider::ok("TESOURO"));
        let bcb = Arc::new(MockProvider::ok("BCB"));
        let chain = ResolutionChain::new(vec![tesouro.clone(), bcb.clone()]);

        let ident = normalizer::normalize("SELIC", AssetClass::TreasuryBond);
        assert!(ident.is_benchmark());
        let quote = chain.resolve(&ident).await.unwrap();

        assert_eq!(quote.source, "BCB");
        assert_eq!(tesouro.calls(), 0);

        let ident = normalizer::normalize("IPCA", AssetClass::TreasuryBond);
        let quote = chain.resolve(&ident).await.unwrap();
        assert_eq!(quote.source, "TESOURO");
    }

    #[tokio::test]
    async fn test_empty_chain_is_not_found() {
        let chain = ResolutionChain::new(vec![]);
        let ident = normalizer::normalize("PETR4", AssetClass::Equity);
        let err = chain.resolve(&ident).await.unwrap_err();
        assert_eq!(err.reason, FailureReason::NotFound);
        assert!(err.attempts.is_empty());
    }
}
