//! Provider trait definitions.

use async_trait::async_trait;

use crate::errors::QuoteError;
use crate::models::{AssetClass, CanonicalQuote, NormalizedIdentifier};

/// Trait for quote providers.
///
/// Implement this trait to add a new upstream data source. The resolution
/// chain uses `id()` for routing/diagnostics and `supports()` to filter
/// providers per asset class.
///
/// An implementation never panics and never lets an error escape as
/// anything other than [`QuoteError`]; the chain converts each failure
/// into a recorded attempt and moves on.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier, a constant like "BRAPI" or "YAHOO".
    fn id(&self) -> &'static str;

    /// Whether this provider can answer for the given asset class.
    fn supports(&self, class: AssetClass) -> bool;

    /// Fetch the current quote for one identifier.
    ///
    /// Returns a quote with a strictly positive price, or a `QuoteError`
    /// naming what went wrong.
    async fn latest_quote(
        &self,
        identifier: &NormalizedIdentifier,
    ) -> Result<CanonicalQuote, QuoteError>;
}

/// Trait for providers with a native multi-symbol endpoint.
///
/// The batch resolver uses this to fetch a whole set of B3 symbols in one
/// upstream call instead of one chain invocation per identifier. Symbols
/// missing from the returned set are not an error; the batch resolver
/// falls back to per-symbol resolution for them.
#[async_trait]
pub trait MultiQuoteProvider: Send + Sync {
    async fn latest_quotes(
        &self,
        identifiers: &[NormalizedIdentifier],
    ) -> Result<Vec<CanonicalQuote>, QuoteError>;
}
