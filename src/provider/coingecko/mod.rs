//! CoinGecko quote provider.
//!
//! Primary source for cryptocurrencies. The simple/price endpoint keys its
//! response by CoinGecko coin id, so the normalizer must have resolved the
//! ticker alias before this provider runs. A second best-effort call fills
//! in the display name; its failure never fails the quote.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::QuoteError;
use crate::models::{AssetClass, CanonicalQuote, NormalizedIdentifier, QuoteExtras};
use crate::provider::{probe_decimal, require_positive_price, QuoteProvider};
use crate::transport::HttpTransport;

pub const PROVIDER_ID: &str = "COINGECKO";

pub struct CoinGeckoProvider {
    transport: Arc<HttpTransport>,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(transport: Arc<HttpTransport>, base_url: String) -> Self {
        Self { transport, base_url }
    }

    fn extract_quote(
        body: &Value,
        coin_id: &str,
        ticker: &str,
    ) -> Result<CanonicalQuote, QuoteError> {
        let record = body
            .get(coin_id)
            .filter(|record| record.is_object())
            .ok_or_else(|| QuoteError::NotFound(ticker.to_string()))?;

        let price = require_positive_price(ticker, probe_decimal(record, &["brl"]))?;

        Ok(CanonicalQuote {
            symbol: ticker.to_string(),
            price,
            change_percent: probe_decimal(record, &["brl_24h_change"]).unwrap_or(Decimal::ZERO),
            name: ticker.to_string(),
            currency: "BRL".to_string(),
            as_of: Utc::now(),
            source: PROVIDER_ID,
            extra: QuoteExtras {
                volume: probe_decimal(record, &["brl_24h_vol"]),
                ..QuoteExtras::default()
            },
        })
    }

    /// Best effort: trade one extra request for a human-readable name.
    async fn fetch_display_name(&self, coin_id: &str) -> Option<String> {
        let url = format!(
            "{}/coins/{}?localization=false&tickers=false&market_data=false",
            self.base_url,
            encode(coin_id)
        );

        match self.transport.fetch_json(&url, false).await {
            Ok(body) => body
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
            Err(e) => {
                debug!("CoinGecko name lookup for {} failed: {}", coin_id, e);
                None
            }
        }
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, class: AssetClass) -> bool {
        class == AssetClass::Crypto
    }

    async fn latest_quote(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        let coin_id = identifier
            .crypto_id
            .as_deref()
            .unwrap_or(identifier.code.as_str());

        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=brl&include_24hr_change=true&include_24hr_vol=true",
            self.base_url,
            encode(coin_id)
        );

        let body = self.transport.fetch_json(&url, false).await?;
        let mut quote = Self::extract_quote(&body, coin_id, &identifier.code)?;

        if let Some(name) = self.fetch_display_name(coin_id).await {
            quote.name = name;
        } else {
            warn!("no display name for {}, keeping ticker", coin_id);
        }

        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureReason;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_extract_quote() {
        let body = json!({
            "bitcoin": {
                "brl": 615432.55,
                "brl_24h_change": -1.82,
                "brl_24h_vol": 98123456.0
            }
        });

        let quote = CoinGeckoProvider::extract_quote(&body, "bitcoin", "BTC").unwrap();
        assert_eq!(quote.symbol, "BTC");
        assert_eq!(quote.price, dec!(615432.55));
        assert_eq!(quote.change_percent, dec!(-1.82));
        assert_eq!(quote.source, "COINGECKO");
        assert!(quote.extra.volume.is_some());
    }

    #[test]
    fn test_extract_quote_missing_coin() {
        let body = json!({});
        let err = CoinGeckoProvider::extract_quote(&body, "dogwifhat", "WIF").unwrap_err();
        assert_eq!(err.reason(), FailureReason::NotFound);
    }

    #[test]
    fn test_extract_quote_zero_price() {
        let body = json!({"bitcoin": {"brl": 0}});
        let err = CoinGeckoProvider::extract_quote(&body, "bitcoin", "BTC").unwrap_err();
        assert_eq!(err.reason(), FailureReason::InvalidPrice);
    }

    #[test]
    fn test_supports_crypto_only() {
        let transport = Arc::new(HttpTransport::new(
            std::time::Duration::from_secs(1),
            vec![],
        ));
        let provider =
            CoinGeckoProvider::new(transport, "https://api.example".to_string());
        assert!(provider.supports(AssetClass::Crypto));
        assert!(!provider.supports(AssetClass::Equity));
    }
}
