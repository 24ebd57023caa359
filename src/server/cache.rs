//! TTL cache for successful endpoint responses.
//!
//! The dataset never changes after startup, so responses are memoized per
//! request path for a fixed window. Only successful bodies are stored;
//! error responses (including "dataset unavailable") are never cached and
//! thus never outlive a process restart. Lock handling is best-effort: a
//! poisoned lock disables the cache rather than failing a request.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry {
    body: String,
    stored_at: Instant,
}

/// In-memory response cache with a fixed time-to-live.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create a cache whose entries expire `ttl` after insertion.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A still-fresh cached body for `key`, if any. Expired entries are
    /// evicted on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a successful response body under `key`.
    pub fn put(&self, key: String, body: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                CacheEntry {
                    body,
                    stored_at: Instant::now(),
                },
            );
        }
    }
}
