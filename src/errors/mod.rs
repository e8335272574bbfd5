//! Error types and failure classification for quote resolution.
//!
//! This module provides:
//! - [`QuoteError`]: the error enum shared by the transport layer and all
//!   provider adapters
//! - [`FailureReason`]: the classification recorded per provider attempt

mod failure;

pub use failure::FailureReason;

use thiserror::Error;

/// Errors that can occur while fetching a quote from a single provider.
///
/// Every variant maps to a [`FailureReason`] via [`reason`](Self::reason).
/// Adapters never let one of these escape to the caller directly: the
/// resolution chain converts each failed attempt into a recorded
/// `ProviderAttempt` and only surfaces an error once the chain is exhausted.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// A network-level failure (DNS, connect, body read) from the HTTP client.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The upstream answered with a non-success status other than 401.
    #[error("HTTP error: status {status}")]
    Http {
        /// The HTTP status code returned by the upstream
        status: u16,
    },

    /// The upstream answered 401: it wants a credential this engine does not
    /// have. The chain treats this as "provider unusable, continue".
    #[error("Authentication required (HTTP 401)")]
    AuthRequired,

    /// The body was an HTML document or otherwise unparsable as JSON.
    /// CORS relays and down upstreams frequently return HTML error pages
    /// with a 200 status, so this is checked before any parse attempt.
    #[error("Response is not JSON: {detail}")]
    NotJson {
        /// What made the body unusable
        detail: String,
    },

    /// The identifier is absent from the provider's dataset.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider returned a zero, negative, or non-numeric price.
    /// A non-positive price is never surfaced as success.
    #[error("Invalid price for {symbol}: {detail}")]
    InvalidPrice {
        /// The identifier whose price was rejected
        symbol: String,
        /// What was wrong with the price field
        detail: String,
    },

    /// The per-attempt deadline elapsed before the upstream answered.
    #[error("Request timed out")]
    Timeout,
}

impl QuoteError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use cotador::errors::{FailureReason, QuoteError};
    ///
    /// let error = QuoteError::Http { status: 503 };
    /// assert_eq!(error.reason(), FailureReason::Http(503));
    ///
    /// let error = QuoteError::NotFound("BOGUS11".to_string());
    /// assert_eq!(error.reason(), FailureReason::NotFound);
    /// ```
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::Network(_) => FailureReason::Network,
            Self::Http { status } => FailureReason::Http(*status),
            Self::AuthRequired => FailureReason::AuthRequired,
            Self::NotJson { .. } => FailureReason::NotJson,
            Self::NotFound(_) => FailureReason::NotFound,
            Self::InvalidPrice { .. } => FailureReason::InvalidPrice,
            Self::Timeout => FailureReason::Timeout,
        }
    }
}
