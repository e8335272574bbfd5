use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The normalized result type all provider adapters converge to.
///
/// Invariant: `price` is strictly positive. An adapter that cannot produce
/// a positive price reports `QuoteError::InvalidPrice` instead of a quote.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalQuote {
    /// The normalized identifier this quote answers (uppercased user code)
    pub symbol: String,

    /// Current price, strictly positive
    pub price: Decimal,

    /// Day variation in percent (already multiplied out, 1.5 means +1.5%)
    pub change_percent: Decimal,

    /// Human display name from the provider
    pub name: String,

    /// Quote currency (ISO 4217)
    pub currency: String,

    /// Timestamp of the quote
    pub as_of: DateTime<Utc>,

    /// Provider id that produced this quote (BRAPI, YAHOO, ...)
    pub source: &'static str,

    /// Provider-specific extras, all optional
    #[serde(default, skip_serializing_if = "QuoteExtras::is_empty")]
    pub extra: QuoteExtras,
}

/// Optional fields a provider may attach to a quote.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QuoteExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Annual rate for fixed-income instruments, in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,

    /// Maturity date for fixed-income instruments, as reported upstream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity: Option<String>,
}

impl QuoteExtras {
    pub fn is_empty(&self) -> bool {
        self.volume.is_none()
            && self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.rate.is_none()
            && self.maturity.is_none()
    }
}

impl CanonicalQuote {
    /// Create a quote with the required fields only.
    pub fn new(
        symbol: String,
        price: Decimal,
        change_percent: Decimal,
        name: String,
        currency: String,
        source: &'static str,
    ) -> Self {
        Self {
            symbol,
            price,
            change_percent,
            name,
            currency,
            as_of: Utc::now(),
            source,
            extra: QuoteExtras::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = CanonicalQuote::new(
            "PETR4".to_string(),
            dec!(38.52),
            dec!(-0.41),
            "Petrobras PN".to_string(),
            "BRL".to_string(),
            "BRAPI",
        );
        assert_eq!(quote.price, dec!(38.52));
        assert_eq!(quote.source, "BRAPI");
        assert!(quote.extra.is_empty());
    }

    #[test]
    fn test_extras_empty_only_when_all_absent() {
        let mut extra = QuoteExtras::default();
        assert!(extra.is_empty());
        extra.rate = Some(dec!(13.65));
        assert!(!extra.is_empty());
    }
}
