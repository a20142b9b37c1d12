//! Bounded response cache for the parse service.
//!
//! An explicitly owned component injected into the HTTP handlers rather
//! than ambient shared state. Entries are exact matches keyed by a digest of
//! the input text; once capacity is exceeded the oldest entry is evicted
//! first.

use crate::model::Question;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Exact-match cache with oldest-first eviction.
pub struct ResponseCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Vec<Question>>,
    order: VecDeque<String>,
}

impl ResponseCache {
    /// Create a cache holding at most `capacity` entries. A capacity of
    /// zero disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Look up a cached response by key.
    pub fn get(&self, key: &str) -> Option<Vec<Question>> {
        let inner = self.inner.lock().expect("cache lock");
        inner.entries.get(key).cloned()
    }

    /// Store a response under its key, evicting the oldest entries when the
    /// capacity is exceeded.
    pub fn insert(&self, key: String, value: Vec<Question>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock().expect("cache lock");
        if inner.entries.insert(key.clone(), value).is_some() {
            return;
        }
        inner.order.push_back(key);
        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.entries.remove(&evicted);
                tracing::trace!(key = %evicted, "Evicted oldest cache entry");
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock").entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
