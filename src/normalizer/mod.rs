//! Identifier normalization.
//!
//! Canonicalizes a raw user-supplied code into the provider-facing
//! [`NormalizedIdentifier`]. Pure and infallible: anything unrecognized
//! falls back to an identity transform, never an error.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::fixed_income;
use crate::models::{AssetClass, NormalizedIdentifier};

lazy_static! {
    /// User ticker -> CoinGecko coin id. Keys are uppercase.
    static ref CRYPTO_ALIASES: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("BTC", "bitcoin");
        map.insert("BITCOIN", "bitcoin");
        map.insert("ETH", "ethereum");
        map.insert("ETHEREUM", "ethereum");
        map.insert("SOL", "solana");
        map.insert("ADA", "cardano");
        map.insert("XRP", "ripple");
        map.insert("DOGE", "dogecoin");
        map.insert("BNB", "binancecoin");
        map.insert("USDT", "tether");
        map.insert("USDC", "usd-coin");
        map.insert("DOT", "polkadot");
        map.insert("LTC", "litecoin");
        map.insert("LINK", "chainlink");
        map
    };
}

/// Normalize a raw code for the given asset class.
///
/// - Trims and uppercases the input.
/// - Crypto codes go through the alias table; unknown codes pass through
///   lowercased as a best-effort CoinGecko id.
/// - Fixed-income codes go through the instrument table; unknown codes are
///   treated as private-credit instruments, so the returned identifier may
///   carry `PrivateCredit` even when the caller asked for `TreasuryBond`.
pub fn normalize(raw: &str, class: AssetClass) -> NormalizedIdentifier {
    let code = raw.trim().to_uppercase();

    match class {
        AssetClass::Crypto => {
            let crypto_id = CRYPTO_ALIASES
                .get(code.as_str())
                .map(|id| id.to_string())
                .unwrap_or_else(|| code.to_lowercase());
            NormalizedIdentifier {
                code,
                class,
                crypto_id: Some(crypto_id),
                fixed_income: None,
            }
        }
        AssetClass::TreasuryBond | AssetClass::PrivateCredit => {
            let instrument = fixed_income::lookup(&code)
                .unwrap_or_else(|| fixed_income::fallback_instrument(&code));
            let class = if instrument.class.is_treasury() {
                AssetClass::TreasuryBond
            } else {
                AssetClass::PrivateCredit
            };
            NormalizedIdentifier {
                code,
                class,
                crypto_id: None,
                fixed_income: Some(instrument),
            }
        }
        _ => NormalizedIdentifier {
            code,
            class,
            crypto_id: None,
            fixed_income: None,
        },
    }
}

/// Best-effort asset class inference for unclassified batch input.
///
/// Known fixed-income and crypto aliases win over ticker-shape heuristics.
/// B3 tickers are classified by their numeric suffix: `11` is the fund/ETF
/// suffix (both resolve through the same chain), `31`-`39` are BDRs, and a
/// single trailing digit is a common/preferred stock. Purely alphabetic
/// codes are assumed to be crypto tickers.
pub fn infer_asset_class(raw: &str) -> AssetClass {
    let code = raw.trim().to_uppercase();

    if let Some(instrument) = fixed_income::lookup(&code) {
        return if instrument.class.is_treasury() {
            AssetClass::TreasuryBond
        } else {
            AssetClass::PrivateCredit
        };
    }

    if CRYPTO_ALIASES.contains_key(code.as_str()) {
        return AssetClass::Crypto;
    }

    let trailing_digits: String = {
        let digits: Vec<char> = code
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.into_iter().rev().collect()
    };

    match trailing_digits.as_str() {
        "11" => AssetClass::Fii,
        two if two.len() == 2 => match two.parse::<u8>() {
            Ok(31..=39) => AssetClass::Bdr,
            _ => AssetClass::Equity,
        },
        one if one.len() == 1 => AssetClass::Equity,
        "" if !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            AssetClass::Crypto
        }
        _ => AssetClass::Equity,
    }
}
