use super::asset::AssetClass;
use crate::fixed_income::FixedIncomeInstrument;

/// A user-supplied code after normalization, carried through one resolution
/// request end-to-end. Adapters derive their provider-native identifiers
/// from this, never from the raw input.
#[derive(Clone, Debug)]
pub struct NormalizedIdentifier {
    /// Trimmed, uppercased user code (e.g. "PETR4", "BTC", "SELIC")
    pub code: String,

    /// Asset class driving chain selection
    pub class: AssetClass,

    /// CoinGecko-native coin id for crypto (e.g. "bitcoin"); lowercased
    /// pass-through for codes absent from the alias table
    pub crypto_id: Option<String>,

    /// Matched fixed-income table entry, when the class is fixed income
    pub fixed_income: Option<FixedIncomeInstrument>,
}

impl NormalizedIdentifier {
    /// Yahoo-style symbol: B3 tickers gain the `.SA` market suffix unless
    /// the input already carries an explicit exchange suffix.
    pub fn yahoo_symbol(&self) -> String {
        if self.code.contains('.') {
            self.code.clone()
        } else {
            format!("{}.SA", self.code)
        }
    }

    /// Whether this identifier is the treasury benchmark rate, which pins
    /// the chain to the official central-bank source first.
    pub fn is_benchmark(&self) -> bool {
        self.fixed_income
            .as_ref()
            .map(|instrument| instrument.benchmark)
            .unwrap_or(false)
    }
}
