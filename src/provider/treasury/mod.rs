//! Fixed-income providers.
//!
//! `TreasuryProvider` reads the Tesouro Direto trading list (unit prices and
//! annual rates per bond on offer). `BcbProvider` reads series 432 of the
//! central bank's SGS API, which is the SELIC target rate; it only answers
//! benchmark identifiers and the chain pins it first for those.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::errors::QuoteError;
use crate::fixed_income::FixedIncomeInstrument;
use crate::models::{AssetClass, CanonicalQuote, NormalizedIdentifier, QuoteExtras};
use crate::provider::{probe_decimal, probe_str, require_positive_price, QuoteProvider};
use crate::transport::HttpTransport;

pub const TREASURY_PROVIDER_ID: &str = "TESOURO";
pub const BCB_PROVIDER_ID: &str = "BCB";

pub struct TreasuryProvider {
    transport: Arc<HttpTransport>,
    base_url: String,
}

impl TreasuryProvider {
    pub fn new(transport: Arc<HttpTransport>, base_url: String) -> Self {
        Self { transport, base_url }
    }

    fn extract_quote(
        body: &Value,
        code: &str,
        instrument: &FixedIncomeInstrument,
    ) -> Result<CanonicalQuote, QuoteError> {
        let bonds = body
            .get("response")
            .and_then(|response| response.get("TrsrBdTradgList"))
            .and_then(Value::as_array)
            .ok_or_else(|| QuoteError::NotFound(code.to_string()))?;

        let bond = bonds
            .iter()
            .filter_map(|entry| entry.get("TrsrBd"))
            .find(|bond| Self::matches_bond(bond, code, instrument))
            .ok_or_else(|| QuoteError::NotFound(code.to_string()))?;

        let rate = probe_decimal(bond, &["anulInvstmtRate", "anulRedRate"]);
        let price = probe_decimal(bond, &["untrInvstmtVal", "minInvstmtAmt"]).or(rate);
        let price = require_positive_price(code, price)?;

        Ok(CanonicalQuote {
            symbol: code.to_string(),
            price,
            change_percent: Decimal::ZERO,
            name: probe_str(bond, &["nm"])
                .unwrap_or(instrument.name.as_str())
                .to_string(),
            currency: "BRL".to_string(),
            as_of: Utc::now(),
            source: TREASURY_PROVIDER_ID,
            extra: QuoteExtras {
                rate,
                maturity: probe_str(bond, &["mtrtyDt"]).map(str::to_string),
                ..QuoteExtras::default()
            },
        })
    }

    /// A bond matches when its display name contains the instrument name
    /// ("Tesouro Selic"), the instrument code ("LFT") or the raw code the
    /// caller asked for.
    fn matches_bond(bond: &Value, code: &str, instrument: &FixedIncomeInstrument) -> bool {
        let name = match probe_str(bond, &["nm"]) {
            Some(name) => name.to_uppercase(),
            None => return false,
        };

        name.contains(&instrument.name.to_uppercase())
            || name.contains(&instrument.code)
            || name.contains(&code.to_uppercase())
    }
}

#[async_trait]
impl QuoteProvider for TreasuryProvider {
    fn id(&self) -> &'static str {
        TREASURY_PROVIDER_ID
    }

    fn supports(&self, class: AssetClass) -> bool {
        class == AssetClass::TreasuryBond
    }

    async fn latest_quote(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        let instrument = identifier
            .fixed_income
            .as_ref()
            .ok_or_else(|| QuoteError::NotFound(identifier.code.clone()))?;

        let url = format!("{}/treasurybondsinfo.json", self.base_url);
        debug!("Tesouro Direto lookup for {}", identifier.code);

        // The trading list endpoint sits behind an anti-bot layer and often
        // answers an HTML challenge page; the relays get a clean copy.
        let body = self.transport.fetch_json(&url, true).await?;
        Self::extract_quote(&body, &identifier.code, instrument)
    }
}

pub struct BcbProvider {
    transport: Arc<HttpTransport>,
    base_url: String,
}

impl BcbProvider {
    pub fn new(transport: Arc<HttpTransport>, base_url: String) -> Self {
        Self { transport, base_url }
    }

    fn extract_quote(body: &Value, code: &str) -> Result<CanonicalQuote, QuoteError> {
        let entry = body
            .as_array()
            .and_then(|entries| entries.last())
            .ok_or_else(|| QuoteError::NotFound(code.to_string()))?;

        let rate = require_positive_price(code, probe_decimal(entry, &["valor"]))?;

        let as_of = probe_str(entry, &["data"])
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .and_then(|naive| Utc.from_local_datetime(&naive).single())
            .unwrap_or_else(Utc::now);

        Ok(CanonicalQuote {
            symbol: code.to_string(),
            price: rate,
            change_percent: Decimal::ZERO,
            name: "Taxa SELIC".to_string(),
            currency: "BRL".to_string(),
            as_of,
            source: BCB_PROVIDER_ID,
            extra: QuoteExtras {
                rate: Some(rate),
                ..QuoteExtras::default()
            },
        })
    }
}

#[async_trait]
impl QuoteProvider for BcbProvider {
    fn id(&self) -> &'static str {
        BCB_PROVIDER_ID
    }

    fn supports(&self, class: AssetClass) -> bool {
        class == AssetClass::TreasuryBond
    }

    async fn latest_quote(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError> {
        // SGS 432 is the SELIC target; it says nothing about other bonds.
        if !identifier.is_benchmark() {
            return Err(QuoteError::NotFound(identifier.code.clone()));
        }

        let url = format!(
            "{}/dados/serie/bcdata.sgs.432/dados/ultimos/1?formato=json",
            self.base_url
        );

        let body = self.transport.fetch_json(&url, false).await?;
        Self::extract_quote(&body, &identifier.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureReason;
    use crate::fixed_income;
    use crate::models::AssetClass;
    use crate::normalizer;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn trading_list() -> Value {
        json!({
            "response": {
                "TrsrBdTradgList": [
                    {"TrsrBd": {
                        "nm": "Tesouro Selic 2029",
                        "anulInvstmtRate": 0.1048,
                        "untrInvstmtVal": 15432.10,
                        "mtrtyDt": "2029-03-01T00:00:00"
                    }},
                    {"TrsrBd": {
                        "nm": "Tesouro IPCA+ 2035",
                        "anulInvstmtRate": 6.32,
                        "untrInvstmtVal": 3210.45,
                        "mtrtyDt": "2035-05-15T00:00:00"
                    }}
                ]
            }
        })
    }

    #[test]
    fn test_treasury_matches_selic_alias_to_lft() {
        let instrument = fixed_income::lookup("SELIC").unwrap();
        let quote =
            TreasuryProvider::extract_quote(&trading_list(), "SELIC", &instrument).unwrap();
        assert_eq!(quote.name, "Tesouro Selic 2029");
        assert_eq!(quote.price, dec!(15432.10));
        assert_eq!(quote.extra.maturity.as_deref(), Some("2029-03-01T00:00:00"));
        assert_eq!(quote.source, "TESOURO");
    }

    #[test]
    fn test_treasury_matches_ipca_bond() {
        let instrument = fixed_income::lookup("IPCA").unwrap();
        let quote =
            TreasuryProvider::extract_quote(&trading_list(), "IPCA", &instrument).unwrap();
        assert_eq!(quote.name, "Tesouro IPCA+ 2035");
        assert_eq!(quote.extra.rate, Some(dec!(6.32)));
    }

    #[test]
    fn test_treasury_unknown_bond() {
        let instrument = fixed_income::lookup("NTN-F").unwrap();
        let err = TreasuryProvider::extract_quote(&trading_list(), "NTNF", &instrument)
            .unwrap_err();
        assert_eq!(err.reason(), FailureReason::NotFound);
    }

    #[test]
    fn test_bcb_extract_parses_pt_br_payload() {
        let body = json!([{"data": "28/08/2026", "valor": "10.50"}]);
        let quote = BcbProvider::extract_quote(&body, "SELIC").unwrap();
        assert_eq!(quote.price, dec!(10.50));
        assert_eq!(quote.extra.rate, Some(dec!(10.50)));
        assert_eq!(quote.name, "Taxa SELIC");
        assert_eq!(quote.as_of.format("%Y-%m-%d").to_string(), "2026-08-28");
    }

    #[test]
    fn test_bcb_empty_series() {
        let body = json!([]);
        let err = BcbProvider::extract_quote(&body, "SELIC").unwrap_err();
        assert_eq!(err.reason(), FailureReason::NotFound);
    }

    #[tokio::test]
    async fn test_bcb_refuses_non_benchmark() {
        let transport = Arc::new(HttpTransport::new(
            std::time::Duration::from_secs(1),
            vec![],
        ));
        let provider = BcbProvider::new(transport, "https://api.example".to_string());

        let ident = normalizer::normalize("IPCA", AssetClass::TreasuryBond);
        let err = provider.latest_quote(&ident).await.unwrap_err();
        assert_eq!(err.reason(), FailureReason::NotFound);
    }
}
