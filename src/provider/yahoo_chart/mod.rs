//! Yahoo Finance chart provider.
//!
//! Fallback source for B3-listed symbols. The chart endpoint is fetched
//! through the CORS relays because Yahoo blocks cross-origin callers, and
//! the raw chart payload is walked by hand: the close series often ends in
//! nulls for the still-open session, and the change percent comes back as
//! a fraction rather than a percentage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::errors::QuoteError;
use crate::models::{AssetClass, CanonicalQuote, NormalizedIdentifier, QuoteExtras};
use crate::provider::{probe_decimal, require_positive_price, value_to_decimal, QuoteProvider};
use crate::transport::HttpTransport;

pub const PROVIDER_ID: &str = "YAHOO";

pub struct YahooChartProvider {
    transport: Arc<HttpTransport>,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(transport: Arc<HttpTransport>, base_url: String) -> Self {
        Self { transport, base_url }
    }

    fn extract_quote(body: &Value, symbol: &str) -> Result<CanonicalQuote, QuoteError> {
        let result = body
            .get("chart")
            .and_then(|chart| chart.get("result"))
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .ok_or_else(|| QuoteError::NotFound(symbol.to_string()))?;

        let meta = result.get("meta").cloned().unwrap_or(Value::Null);

        let close_series = result
            .get("indicators")
            .and_then(|ind| ind.get("quote"))
            .and_then(Value::as_array)
            .and_then(|quotes| quotes.first())
            .and_then(|quote| quote.get("close"))
            .and_then(Value::as_array);

        // meta carries the live regular-market price; the close series is
        // only a fallback and may trail off into nulls.
        let price = probe_decimal(&meta, &["regularMarketPrice"])
            .or_else(|| close_series.and_then(|series| last_non_null(series)));
        let price = require_positive_price(symbol, price)?;

        let change_percent = match probe_decimal(&meta, &["regularMarketChangePercent"]) {
            // The chart meta reports the change as a fraction.
            Some(fraction) => fraction * Decimal::from(100),
            None => probe_decimal(&meta, &["chartPreviousClose", "previousClose"])
                .filter(|prev| *prev > Decimal::ZERO)
                .map(|prev| (price - prev) / prev * Decimal::from(100))
                .unwrap_or(Decimal::ZERO),
        };

        let as_of = meta
            .get("regularMarketTime")
            .and_then(Value::as_i64)
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        let name = meta
            .get("symbol")
            .and_then(Value::as_str)
            .map(|s| s.trim_end_matches(".SA").to_string())
            .unwrap_or_else(|| symbol.to_string());

        Ok(CanonicalQuote {
            symbol: symbol.to_string(),
            price,
            change_percent,
            name,
            currency: meta
                .get("currency")
                .and_then(Value::as_str)
                .unwrap_or("BRL")
                .to_string(),
            as_of,
            source: PROVIDER_ID,
            extra: QuoteExtras::default(),
        })
    }
}

/// Walk a close series backwards past the trailing nulls of the current
/// session and return the most recent settled value.
pub(crate) fn last_non_null(series: &[Value]) -> Option<Decimal> {
    series
        .iter()
        .rev()
        .find(|value| !value.is_null())
        .and_then(value_to_decimal)
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn supports(&self, class: AssetClass) -> bool {
        class.is_b3_listed()
    }

    async fn latest_quote(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        let yahoo_symbol = identifier.yahoo_symbol();
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=5d",
            self.base_url, yahoo_symbol
        );

        debug!("Yahoo chart lookup for {}", yahoo_symbol);
        let body = self.transport.fetch_json(&url, true).await?;
        Self::extract_quote(&body, &identifier.code)
    }
}
