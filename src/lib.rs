//! Multi-source quote resolution for Brazilian assets.
//!
//! `cotador` resolves B3 tickers (stocks, FIIs, BDRs, ETFs), crypto pairs
//! and fixed-income instruments (Tesouro Direto bonds, CDB/LCI/LCA) into a
//! single canonical quote shape. Each asset class routes through an ordered
//! provider chain; when the primary source fails or returns garbage, the
//! next one is tried, and the final error carries every attempt.
//!
//! ```no_run
//! use cotador::{EngineConfig, QuoteEngine};
//!
//! # async fn demo() {
//! let engine = QuoteEngine::new(EngineConfig::default());
//!
//! match engine.resolve_quote("PETR4", None).await {
//!     Ok(quote) => println!("{} = R$ {} ({})", quote.symbol, quote.price, quote.source),
//!     Err(e) => eprintln!("unresolved: {}", e),
//! }
//! # }
//! ```

pub mod batch;
pub mod cache;
pub mod chain;
pub mod errors;
pub mod fixed_income;
pub mod models;
pub mod normalizer;
pub mod provider;
pub mod transport;

mod engine;

pub use chain::{ProviderAttempt, ResolutionError};
pub use engine::{EngineConfig, QuoteEngine};
pub use errors::{FailureReason, QuoteError};
pub use fixed_income::{
    compute_fixed_income_return, list_known_instruments as list_known_fixed_income_instruments,
    FixedIncomeClass, FixedIncomeInstrument, FixedIncomeReturn,
};
pub use models::{AssetClass, CanonicalQuote, NormalizedIdentifier, QuoteExtras};
