//! Short-lived quote cache.
//!
//! Keyed by normalized identifier with a minutes-scale freshness window.
//! Writers only ever insert-or-overwrite their own key, so concurrent
//! resolutions never contend across identifiers.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::debug;

use crate::models::CanonicalQuote;

struct CachedQuote {
    quote: CanonicalQuote,
    stored_at: Instant,
}

pub struct QuoteCache {
    entries: DashMap<String, CachedQuote>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns a clone of the cached quote when it is still fresh.
    /// Stale entries are evicted on read.
    pub fn get(&self, key: &str) -> Option<CanonicalQuote> {
        let fresh = {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() < self.ttl {
                Some(entry.quote.clone())
            } else {
                None
            }
        };

        match fresh {
            Some(quote) => Some(quote),
            None => {
                // The read guard is dropped above; removing here cannot
                // deadlock against our own shard lock.
                debug!("evicting stale cache entry {}", key);
                self.entries.remove(key);
                None
            }
        }
    }

    pub fn insert(&self, key: String, quote: CanonicalQuote) {
        self.entries.insert(
            key,
            CachedQuote {
                quote,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
