//! Brapi quote provider.
//!
//! Brapi (brapi.dev-style API) covers B3-listed symbols through a
//! multi-symbol `/quote` endpoint, cryptocurrencies through `/v2/crypto`,
//! and fixed-income offers through `/v2/fixed-income`. A token is optional:
//! without one, endpoints that require it answer 401 and the chain moves
//! to the next provider.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::QuoteError;
use crate::fixed_income::FixedIncomeInstrument;
use crate::models::{AssetClass, CanonicalQuote, NormalizedIdentifier, QuoteExtras};
use crate::provider::{
    probe_decimal, probe_str, require_positive_price, MultiQuoteProvider, QuoteProvider,
};
use crate::transport::HttpTransport;

pub const PROVIDER_ID: &str = "BRAPI";

/// Ordered field names per extracted value. Brapi renamed several fields
/// across API versions; the first present name wins.
const PRICE_FIELDS: &[&str] = &["regularMarketPrice", "price", "close"];
const NAME_FIELDS: &[&str] = &["longName", "shortName", "name"];
const CHANGE_FIELDS: &[&str] = &["regularMarketChangePercent", "changePercent", "change"];
const CRYPTO_NAME_FIELDS: &[&str] = &["coinName", "name", "coin"];
const FIXED_INCOME_PRICE_FIELDS: &[&str] = &["price", "unitPrice", "minimumInvestment"];
const FIXED_INCOME_RATE_FIELDS: &[&str] = &["rate", "annualRate", "investmentRate"];

pub struct BrapiProvider {
    transport: Arc<HttpTransport>,
    base_url: String,
    token: Option<String>,
}

impl BrapiProvider {
    pub fn new(transport: Arc<HttpTransport>, base_url: String, token: Option<String>) -> Self {
        Self {
            transport,
            base_url,
            token,
        }
    }

    fn token_query(&self) -> String {
        self.token
            .as_ref()
            .map(|token| format!("&token={}", encode(token)))
            .unwrap_or_default()
    }

    async fn fetch_listed(
        &self,
        identifiers: &[NormalizedIdentifier],
    ) -> Result<Vec<CanonicalQuote>, QuoteError> {
        let joined = identifiers
            .iter()
            .map(|ident| ident.code.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let url = format!(
            "{}/quote/{}?range=1d&interval=1d{}",
            self.base_url,
            joined,
            self.token_query()
        );

        let body = self.transport.fetch_json(&url, false).await?;
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| QuoteError::NotFound(joined.clone()))?;

        let mut quotes = Vec::with_capacity(results.len());
        for record in results {
            match Self::extract_listed_quote(record) {
                Ok(quote) => quotes.push(quote),
                Err(e) => warn!("Brapi record skipped: {}", e),
            }
        }

        if quotes.is_empty() {
            return Err(QuoteError::NotFound(joined));
        }

        debug!("Brapi answered {} of {} symbols", quotes.len(), identifiers.len());
        Ok(quotes)
    }

    /// Extract one quote from a `/quote` results record.
    fn extract_listed_quote(record: &Value) -> Result<CanonicalQuote, QuoteError> {
        let symbol = probe_str(record, &["symbol"]).unwrap_or_default().to_string();
        let price = require_positive_price(&symbol, probe_decimal(record, PRICE_FIELDS))?;
        let change_percent = probe_decimal(record, CHANGE_FIELDS).unwrap_or(Decimal::ZERO);
        let name = probe_str(record, NAME_FIELDS).unwrap_or(&symbol).to_string();
        let currency = probe_str(record, &["currency"]).unwrap_or("BRL").to_string();

        let as_of = record
            .get("regularMarketTime")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(CanonicalQuote {
            symbol,
            price,
            change_percent,
            name,
            currency,
            as_of,
            source: PROVIDER_ID,
            extra: QuoteExtras {
                volume: probe_decimal(record, &["regularMarketVolume", "volume"]),
                open: probe_decimal(record, &["regularMarketOpen", "open"]),
                high: probe_decimal(record, &["regularMarketDayHigh", "high"]),
                low: probe_decimal(record, &["regularMarketDayLow", "low"]),
                rate: None,
                maturity: None,
            },
        })
    }

    async fn fetch_crypto(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        let url = format!(
            "{}/v2/crypto?coin={}&currency=BRL{}",
            self.base_url,
            encode(&identifier.code),
            self.token_query()
        );

        let body = self.transport.fetch_json(&url, false).await?;
        Self::extract_crypto_quote(&body, &identifier.code)
    }

    fn extract_crypto_quote(body: &Value, code: &str) -> Result<CanonicalQuote, QuoteError> {
        let record = body
            .get("coins")
            .and_then(Value::as_array)
            .and_then(|coins| coins.first())
            .ok_or_else(|| QuoteError::NotFound(code.to_string()))?;

        let price = require_positive_price(code, probe_decimal(record, PRICE_FIELDS))?;

        Ok(CanonicalQuote {
            symbol: code.to_string(),
            price,
            change_percent: probe_decimal(record, CHANGE_FIELDS).unwrap_or(Decimal::ZERO),
            name: probe_str(record, CRYPTO_NAME_FIELDS)
                .unwrap_or(code)
                .to_string(),
            currency: probe_str(record, &["currency"]).unwrap_or("BRL").to_string(),
            as_of: Utc::now(),
            source: PROVIDER_ID,
            extra: QuoteExtras {
                volume: probe_decimal(record, &["regularMarketVolume", "volume"]),
                ..QuoteExtras::default()
            },
        })
    }

    async fn fetch_fixed_income(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        let instrument = identifier
            .fixed_income
            .as_ref()
            .ok_or_else(|| QuoteError::NotFound(identifier.code.clone()))?;

        let url = format!(
            "{}/v2/fixed-income?search={}{}",
            self.base_url,
            encode(&instrument.code),
            self.token_query()
        );

        let body = self.transport.fetch_json(&url, false).await?;
        Self::extract_fixed_income_quote(&body, &identifier.code, instrument)
    }

    fn extract_fixed_income_quote(
        body: &Value,
        code: &str,
        instrument: &FixedIncomeInstrument,
    ) -> Result<CanonicalQuote, QuoteError> {
        let results = body
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| QuoteError::NotFound(code.to_string()))?;

        // Only a record whose name matches the requested instrument may
        // answer; an unrelated offer's rate must never be labeled with the
        // caller's symbol.
        let record = results
            .iter()
            .find(|record| {
                probe_str(record, &["name", "code"])
                    .map(|name| {
                        let name = name.to_uppercase();
                        name.contains(&instrument.code) || name.contains(code)
                    })
                    .unwrap_or(false)
            })
            .ok_or_else(|| QuoteError::NotFound(code.to_string()))?;

        let rate = probe_decimal(record, FIXED_INCOME_RATE_FIELDS);
        // Rate-quoted instruments (CDB/LCI/LCA) carry no unit price; the
        // annual rate is the value the caller is after.
        let price = probe_decimal(record, FIXED_INCOME_PRICE_FIELDS).or(rate);
        let price = require_positive_price(code, price)?;

        Ok(CanonicalQuote {
            symbol: code.to_string(),
            price,
            change_percent: Decimal::ZERO,
            name: probe_str(record, &["name", "issuer"])
                .unwrap_or(instrument.name.as_str())
                .to_string(),
            currency: "BRL".to_string(),
            as_of: Utc::now(),
            source: PROVIDER_ID,
            extra: QuoteExtras {
                rate,
                maturity: probe_str(record, &["maturity", "maturityDate"]).map(str::to_string),
                ..QuoteExtras::default()
            },
        })
    }
}

#[async_trait]
impl QuoteProvider for BrapiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, class: AssetClass) -> bool {
        class.is_b3_listed() || matches!(class, AssetClass::Crypto | AssetClass::PrivateCredit)
    }

    async fn latest_quote(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        match identifier.class {
            AssetClass::Crypto => self.fetch_crypto(identifier).await,
            AssetClass::TreasuryBond | AssetClass::PrivateCredit => {
                self.fetch_fixed_income(identifier).await
            }
            _ => {
                let quotes = self
                    .fetch_listed(std::slice::from_ref(identifier))
                    .await?;
                quotes
                    .into_iter()
                    .find(|quote| quote.symbol.eq_ignore_ascii_case(&identifier.code))
                    .ok_or_else(|| QuoteError::NotFound(identifier.code.clone()))
            }
        }
    }
}

#[async_trait]
impl MultiQuoteProvider for BrapiProvider {
    async fn latest_quotes(
        &self,
        identifiers: &[NormalizedIdentifier],
    ) -> Result<Vec<CanonicalQuote>, QuoteError> {
        self.fetch_listed(identifiers).await
    }
}
