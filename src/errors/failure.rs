use std::fmt;

use serde::Serialize;

/// Classification of a failed provider attempt.
///
/// Recorded by the resolution chain for every provider that failed before
/// the chain either succeeded or ran out of providers. All reasons lead to
/// the same chain behavior (try the next provider); the classification
/// exists so terminal diagnostics can name what actually went wrong.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    /// Fetch-level exception: DNS, connect, TLS, or body read failure.
    Network,

    /// Non-success HTTP status (other than 401) with the status code.
    Http(u16),

    /// HTTP 401: the provider needs a credential this engine does not have.
    AuthRequired,

    /// The body was HTML or otherwise unparsable as JSON.
    NotJson,

    /// The identifier is absent from the provider's dataset.
    NotFound,

    /// Zero, negative, or non-numeric price field.
    InvalidPrice,

    /// The per-attempt deadline elapsed.
    Timeout,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::Http(status) => write!(f, "HTTP {}", status),
            Self::AuthRequired => write!(f, "authentication required"),
            Self::NotJson => write!(f, "non-JSON response"),
            Self::NotFound => write!(f, "not found"),
            Self::InvalidPrice => write!(f, "invalid price"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}
