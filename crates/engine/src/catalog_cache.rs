//! Cache-aside accelerator for product search.
//!
//! The cache is never authoritative: redemptions always read the store, and
//! any failure here degrades to a cache miss. Writes that change searchable
//! product fields drop every `product:search:` entry before reporting success.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use thiserror::Error;

use crate::ProductSummary;

pub const SEARCH_KEY_PREFIX: &str = "product:search:";
pub const DEFAULT_SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Storage for cached search pages.
pub trait CatalogCache: Send + Sync + std::fmt::Debug {
    fn get(&self, key: &str) -> Result<Option<Vec<ProductSummary>>, CacheError>;

    fn put(&self, key: &str, value: Vec<ProductSummary>, ttl: Duration) -> Result<(), CacheError>;

    /// Drop every entry whose key starts with `prefix`. Returns how many
    /// entries were removed.
    fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}

/// Key for one page of a search query.
pub fn search_key(query: &str, page: u64, size: u64) -> String {
    format!("{SEARCH_KEY_PREFIX}{query}:{page}:{size}")
}

#[derive(Clone, Debug)]
struct CachedPage {
    value: Vec<ProductSummary>,
    expires_at: Instant,
}

impl CachedPage {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process cache. Expired entries are dropped when read and swept on every
/// write, so keys that are never read again do not pile up.
#[derive(Debug, Default)]
pub struct InMemoryCatalogCache {
    entries: DashMap<String, CachedPage>,
}

impl InMemoryCatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogCache for InMemoryCatalogCache {
    fn get(&self, key: &str) -> Result<Option<Vec<ProductSummary>>, CacheError> {
        let now = Instant::now();
        let hit = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if hit.is_none() {
            // The read guard is dropped above; removing while holding it would deadlock.
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(hit)
    }

    fn put(&self, key: &str, value: Vec<ProductSummary>, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.entries.insert(
            key.to_string(),
            CachedPage {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before.saturating_sub(self.entries.len()))
    }
}
