//! HTTP transport with response-shape sniffing and CORS-relay fallback.
//!
//! Public quote endpoints routinely lie about their bodies: relays and down
//! upstreams return HTML error pages with a 200 status, and some relays
//! wrap the upstream body in a JSON string. The transport therefore reads
//! every body as text first, sniffs it, and only then parses.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use urlencoding::encode;

use crate::errors::QuoteError;

/// HTTP fetch layer shared by all provider adapters.
///
/// Holds one `reqwest::Client` with the configured per-attempt timeout and
/// the ordered list of CORS-relay candidates. Proxy retry is transport-level
/// and bounded: one pass over `[direct, relay1(url), relay2(url), ...]`,
/// distinct from the chain's provider fallback.
pub struct HttpTransport {
    client: Client,
    proxies: Vec<String>,
}

impl HttpTransport {
    pub fn new(timeout: Duration, proxies: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, proxies }
    }

    /// Fetch a URL and parse its body as JSON.
    ///
    /// With `via_proxy` set, the direct URL is tried first and each
    /// configured relay afterwards, in order; the first candidate that
    /// yields a parsable body wins.
    pub async fn fetch_json(&self, url: &str, via_proxy: bool) -> Result<Value, QuoteError> {
        let candidates = self.candidates(url, via_proxy);
        let mut last_error: Option<QuoteError> = None;

        for candidate in &candidates {
            debug!("GET {}", candidate);
            match self.fetch_one(candidate).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Fetch failed for {}: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        // candidates is never empty, so last_error is always set
        Err(last_error.unwrap_or_else(|| QuoteError::NotFound(url.to_string())))
    }

    fn candidates(&self, url: &str, via_proxy: bool) -> Vec<String> {
        let mut urls = vec![url.to_string()];
        if via_proxy {
            urls.extend(
                self.proxies
                    .iter()
                    .map(|relay| format!("{}{}", relay, encode(url))),
            );
        }
        urls
    }

    async fn fetch_one(&self, url: &str) -> Result<Value, QuoteError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuoteError::Timeout
                } else {
                    QuoteError::Network(e)
                }
            })?;

        let status = response.status();

        // 401 signals a missing credential, not a transient fault
        if status == StatusCode::UNAUTHORIZED {
            return Err(QuoteError::AuthRequired);
        }

        if !status.is_success() {
            return Err(QuoteError::Http {
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                QuoteError::Timeout
            } else {
                QuoteError::Network(e)
            }
        })?;

        decode_body(&text)
    }
}

/// Decode a response body that claims to be JSON.
///
/// A body starting with an HTML document marker fails as `NotJson` before
/// any parse attempt. A parse that yields a JSON string is re-parsed once
/// (double-encoded relay artifact); a second failure is `NotJson`.
pub(crate) fn decode_body(text: &str) -> Result<Value, QuoteError> {
    let trimmed = text.trim_start();

    if looks_like_html(trimmed) {
        return Err(QuoteError::NotJson {
            detail: "body is an HTML document".to_string(),
        });
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| QuoteError::NotJson {
        detail: e.to_string(),
    })?;

    if let Value::String(inner) = value {
        return serde_json::from_str(&inner).map_err(|e| QuoteError::NotJson {
            detail: format!("double-encoded body: {}", e),
        });
    }

    Ok(value)
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.chars().take(15).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html") || head.starts_with("<head")
}
