//! Quote provider abstractions and adapter implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all adapters implement
//! - The `MultiQuoteProvider` trait for providers with native multi-symbol
//!   endpoints (used by the batch resolver)
//! - Field probing helpers shared by the adapters
//! - Concrete adapters: Brapi, Yahoo chart API, CoinGecko, Treasury/BCB
//!
//! Adapters receive an already-normalized identifier and are responsible
//! only for building provider-specific URLs, locating the relevant record
//! in the provider's response shape, and extracting fields under the
//! multiple names providers have used across versions. All network I/O
//! goes through the transport layer.

mod probe;
mod traits;

pub mod brapi;
pub mod coingecko;
pub mod treasury;
pub mod yahoo_chart;

pub(crate) use probe::{probe_decimal, probe_str, require_positive_price, value_to_decimal};
pub use traits::{MultiQuoteProvider, QuoteProvider};
