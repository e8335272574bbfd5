//! Field probing helpers.
//!
//! Providers rename fields across versions, so every adapter extracts each
//! field through an explicit ordered list of names tried in sequence. The
//! order lives in `const` slices next to each adapter, auditable and
//! testable without network access.

use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::QuoteError;

/// Return the first field from the ordered list that holds a numeric value.
pub(crate) fn probe_decimal(record: &Value, fields: &[&str]) -> Option<Decimal> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(value_to_decimal))
}

/// Return the first field from the ordered list that holds a string.
pub(crate) fn probe_str<'a>(record: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|field| record.get(*field).and_then(Value::as_str))
}

/// Convert a JSON value to a decimal. Numeric strings are accepted because
/// Brazilian endpoints ship numbers as pt-BR formatted strings.
pub(crate) fn value_to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Decimal::from_f64),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Enforce the strictly-positive price invariant on an extracted price.
pub(crate) fn require_positive_price(
    symbol: &str,
    price: Option<Decimal>,
) -> Result<Decimal, QuoteError> {
    match price {
        Some(p) if p > Decimal::ZERO => Ok(p),
        Some(p) => Err(QuoteError::InvalidPrice {
            symbol: symbol.to_string(),
            detail: format!("non-positive price {}", p),
        }),
        None => Err(QuoteError::InvalidPrice {
            symbol: symbol.to_string(),
            detail: "missing or non-numeric price field".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureReason;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_probe_decimal_respects_field_order() {
        let record = json!({"price": 10.0, "regularMarketPrice": 12.5});
        let price = probe_decimal(&record, &["regularMarketPrice", "price"]);
        assert_eq!(price, Some(dec!(12.5)));

        let fallback = json!({"price": 10.0});
        let price = probe_decimal(&fallback, &["regularMarketPrice", "price"]);
        assert_eq!(price, Some(dec!(10.0)));
    }

    #[test]
    fn test_probe_str_skips_missing_fields() {
        let record = json!({"shortName": "Petrobras"});
        let name = probe_str(&record, &["longName", "shortName", "name"]);
        assert_eq!(name, Some("Petrobras"));
    }

    #[test]
    fn test_value_to_decimal_accepts_numeric_strings() {
        assert_eq!(value_to_decimal(&json!("13.65")), Some(dec!(13.65)));
        assert_eq!(value_to_decimal(&json!("13,65")), Some(dec!(13.65)));
        assert_eq!(value_to_decimal(&json!(38.52)), Some(dec!(38.52)));
        assert_eq!(value_to_decimal(&json!(null)), None);
        assert_eq!(value_to_decimal(&json!("n/a")), None);
    }

    #[test]
    fn test_require_positive_price_rejects_zero_and_negative() {
        assert!(require_positive_price("PETR4", Some(dec!(38.52))).is_ok());

        let err = require_positive_price("PETR4", Some(Decimal::ZERO)).unwrap_err();
        assert_eq!(err.reason(), FailureReason::InvalidPrice);

        let err = require_positive_price("PETR4", Some(dec!(-1))).unwrap_err();
        assert_eq!(err.reason(), FailureReason::InvalidPrice);

        let err = require_positive_price("PETR4", None).unwrap_err();
        assert_eq!(err.reason(), FailureReason::InvalidPrice);
    }
}
