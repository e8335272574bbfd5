//! Fixed-income instrument table and return arithmetic.
//!
//! The instrument table is the read-only mapping between the codes users
//! type (SELIC, IPCA+, CDB, ...) and the records Brazilian fixed-income
//! endpoints actually publish (LFT, NTN-B, ...). It is extended only by
//! editing this file, never at runtime.

use std::collections::HashMap;

use lazy_static::lazy_static;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

/// Fixed-income instrument class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixedIncomeClass {
    /// Tesouro Direto government bond
    Treasury,
    /// Certificado de Deposito Bancario
    Cdb,
    /// Letra de Credito Imobiliario
    Lci,
    /// Letra de Credito do Agronegocio
    Lca,
    /// Corporate debenture
    Debenture,
}

impl FixedIncomeClass {
    pub fn is_treasury(&self) -> bool {
        matches!(self, Self::Treasury)
    }
}

/// One entry of the fixed-income instrument table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedIncomeInstrument {
    /// Provider-native code (e.g. "LFT" for a SELIC request)
    pub code: String,
    /// Display name, also used for substring matching against upstream
    /// record names (e.g. "Tesouro Selic" matches "Tesouro Selic 2029")
    pub name: String,
    pub class: FixedIncomeClass,
    /// The treasury benchmark rate is pinned to the central-bank source
    /// first by the resolution chain
    pub benchmark: bool,
}

impl FixedIncomeInstrument {
    fn new(code: &str, name: &str, class: FixedIncomeClass, benchmark: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            class,
            benchmark,
        }
    }
}

lazy_static! {
    static ref INSTRUMENTS: Vec<FixedIncomeInstrument> = vec![
        FixedIncomeInstrument::new("LFT", "Tesouro Selic", FixedIncomeClass::Treasury, true),
        FixedIncomeInstrument::new("NTN-B", "Tesouro IPCA+", FixedIncomeClass::Treasury, false),
        FixedIncomeInstrument::new("LTN", "Tesouro Prefixado", FixedIncomeClass::Treasury, false),
        FixedIncomeInstrument::new(
            "NTN-F",
            "Tesouro Prefixado com Juros Semestrais",
            FixedIncomeClass::Treasury,
            false,
        ),
        FixedIncomeInstrument::new(
            "CDB",
            "Certificado de Deposito Bancario",
            FixedIncomeClass::Cdb,
            false,
        ),
        FixedIncomeInstrument::new(
            "LCI",
            "Letra de Credito Imobiliario",
            FixedIncomeClass::Lci,
            false,
        ),
        FixedIncomeInstrument::new(
            "LCA",
            "Letra de Credito do Agronegocio",
            FixedIncomeClass::Lca,
            false,
        ),
        FixedIncomeInstrument::new("DEB", "Debenture", FixedIncomeClass::Debenture, false),
    ];

    /// User alias -> index into `INSTRUMENTS`. Keys are uppercase.
    static ref ALIASES: HashMap<&'static str, usize> = {
        let mut map = HashMap::new();
        map.insert("SELIC", 0);
        map.insert("LFT", 0);
        map.insert("TESOURO SELIC", 0);
        map.insert("IPCA", 1);
        map.insert("IPCA+", 1);
        map.insert("NTNB", 1);
        map.insert("NTN-B", 1);
        map.insert("TESOURO IPCA", 1);
        map.insert("PREFIXADO", 2);
        map.insert("LTN", 2);
        map.insert("NTNF", 3);
        map.insert("NTN-F", 3);
        map.insert("CDB", 4);
        map.insert("LCI", 5);
        map.insert("LCA", 6);
        map.insert("DEB", 7);
        map.insert("DEBENTURE", 7);
        map
    };
}

/// Look up a known instrument by user alias. The code must already be
/// trimmed and uppercased.
pub fn lookup(code: &str) -> Option<FixedIncomeInstrument> {
    ALIASES.get(code).map(|&idx| INSTRUMENTS[idx].clone())
}

/// Build the entry for a code absent from the table. Unknown codes are
/// treated as private-credit instruments, never treasury.
pub fn fallback_instrument(code: &str) -> FixedIncomeInstrument {
    let class = if code.contains("LCI") {
        FixedIncomeClass::Lci
    } else if code.contains("LCA") {
        FixedIncomeClass::Lca
    } else if code.contains("DEB") {
        FixedIncomeClass::Debenture
    } else {
        FixedIncomeClass::Cdb
    };
    FixedIncomeInstrument::new(code, code, class, false)
}

/// Static dump of the known instrument table. No network call.
pub fn list_known_instruments() -> Vec<FixedIncomeInstrument> {
    INSTRUMENTS.clone()
}

/// Result of a fixed-income projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedIncomeReturn {
    pub final_value: Decimal,
    pub earnings: Decimal,
    pub return_percent: Decimal,
}

/// Compound-interest projection at a fixed annual rate:
/// `final_value = principal * (1 + annual_rate_percent / 1200) ^ months`.
pub fn compute_fixed_income_return(
    principal: Decimal,
    annual_rate_percent: Decimal,
    months: u32,
) -> FixedIncomeReturn {
    let monthly = annual_rate_percent / Decimal::from(1200);
    let factor = (Decimal::ONE + monthly).powi(i64::from(months));
    let final_value = principal * factor;
    FixedIncomeReturn {
        final_value,
        earnings: final_value - principal,
        return_percent: (factor - Decimal::ONE) * Decimal::ONE_HUNDRED,
    }
}
