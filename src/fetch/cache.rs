//! Time-expiring cache for fetched external values

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Absolute lifetime of a cache entry
pub const ABSOLUTE_TTL: Duration = Duration::from_secs(60 * 60);
/// Sliding lifetime, refreshed on every access
pub const SLIDING_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct CacheEntry {
    body: String,
    inserted: Instant,
    last_access: Instant,
}

impl CacheEntry {
    fn expired(&self, absolute_ttl: Duration, sliding_ttl: Duration) -> bool {
        self.inserted.elapsed() > absolute_ttl || self.last_access.elapsed() > sliding_ttl
    }
}

/// Concurrent URL -> body cache with absolute and sliding expiration.
///
/// Entries live for at most [`ABSOLUTE_TTL`] and are dropped earlier when not
/// accessed within [`SLIDING_TTL`]. Expired entries are removed lazily on
/// lookup; nothing persists across restarts.
#[derive(Debug)]
pub struct ExternalValueCache {
    entries: DashMap<String, CacheEntry>,
    absolute_ttl: Duration,
    sliding_ttl: Duration,
}

impl ExternalValueCache {
    pub fn new() -> Self {
        Self::with_ttls(ABSOLUTE_TTL, SLIDING_TTL)
    }

    /// Custom expirations, for tests
    pub fn with_ttls(absolute_ttl: Duration, sliding_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            absolute_ttl,
            sliding_ttl,
        }
    }

    /// Look up a URL, refreshing its sliding expiration on a hit
    pub fn get(&self, url: &str) -> Option<String> {
        let expired = match self.entries.get_mut(url) {
            Some(mut entry) => {
                if entry.expired(self.absolute_ttl, self.sliding_ttl) {
                    true
                } else {
                    entry.last_access = Instant::now();
                    return Some(entry.body.clone());
                }
            }
            None => return None,
        };

        if expired {
            self.entries.remove(url);
        }
        None
    }

    /// Store a fetched body, resetting both expirations
    pub fn insert(&self, url: &str, body: String) {
        let now = Instant::now();
        self.entries.insert(
            url.to_string(),
            CacheEntry {
                body,
                inserted: now,
                last_access: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ExternalValueCache {
    fn default() -> Self {
        Self::new()
    }
}
