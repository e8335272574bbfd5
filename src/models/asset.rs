use serde::{Deserialize, Serialize};

/// Asset classification.
///
/// Drives which resolution chain applies to an identifier. Constructed by
/// the caller or inferred by `normalizer::infer_asset_class` when a batch
/// request arrives unclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    /// B3-listed common/preferred stock (e.g. PETR4, VALE3)
    Equity,
    /// Real-estate investment fund, "fundo imobiliario" (e.g. MXRF11)
    Fii,
    /// Brazilian depositary receipt (e.g. AAPL34)
    Bdr,
    /// Exchange-traded fund (e.g. BOVA11)
    Etf,
    /// Cryptocurrency (e.g. BTC)
    Crypto,
    /// Tesouro Direto government bond (e.g. SELIC, IPCA+)
    TreasuryBond,
    /// Private credit instrument: CDB, LCI, LCA, debenture
    PrivateCredit,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equity => "EQUITY",
            Self::Fii => "FII",
            Self::Bdr => "BDR",
            Self::Etf => "ETF",
            Self::Crypto => "CRYPTO",
            Self::TreasuryBond => "TREASURY_BOND",
            Self::PrivateCredit => "PRIVATE_CREDIT",
        }
    }

    /// Whether this class trades on B3 under a plain ticker, which is what
    /// the Brapi multi-symbol endpoint and the Yahoo `.SA` suffix apply to.
    pub fn is_b3_listed(&self) -> bool {
        matches!(self, Self::Equity | Self::Fii | Self::Bdr | Self::Etf)
    }

    /// Whether this class resolves through the fixed-income chain.
    pub fn is_fixed_income(&self) -> bool {
        matches!(self, Self::TreasuryBond | Self::PrivateCredit)
    }
}
