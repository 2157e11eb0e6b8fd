//! LRU storage for rendered listing responses.

use std::sync::{RwLock, RwLockWriteGuard};
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use tracing::warn;

use super::config::CacheConfig;
use super::keys::{ListingKey, ResponseKey};

/// A rendered response ready to be replayed.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

struct Entry {
    response: CachedResponse,
    stored_at: Instant,
}

pub struct ResponseStore {
    ttl: Duration,
    entries: RwLock<LruCache<ResponseKey, Entry>>,
}

impl ResponseStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            entries: RwLock::new(LruCache::new(config.response_limit_non_zero())),
        }
    }

    pub fn get(&self, key: &ResponseKey) -> Option<CachedResponse> {
        self.get_at(key, Instant::now())
    }

    /// TTL check against an explicit clock; expired entries are dropped on
    /// the spot rather than waiting for eviction.
    pub fn get_at(&self, key: &ResponseKey, now: Instant) -> Option<CachedResponse> {
        let mut entries = self.write_entries("get");
        let expired = match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.response.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    pub fn set(&self, key: ResponseKey, response: CachedResponse) {
        self.set_at(key, response, Instant::now());
    }

    pub fn set_at(&self, key: ResponseKey, response: CachedResponse, now: Instant) {
        self.write_entries("set").put(
            key,
            Entry {
                response,
                stored_at: now,
            },
        );
    }

    /// Drop every cached page of one listing.
    pub fn invalidate_listing(&self, listing: &ListingKey) {
        let mut entries = self.write_entries("invalidate_listing");
        let stale: Vec<ResponseKey> = entries
            .iter()
            .filter(|(key, _)| &key.listing == listing)
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            entries.pop(&key);
        }
    }

    /// Drop the listings a post write can change: the index always, plus the
    /// group listing when the post belongs (or belonged) to a group.
    pub fn invalidate_post_listings<'a>(&self, group_slugs: impl IntoIterator<Item = &'a str>) {
        self.invalidate_listing(&ListingKey::Index);
        for slug in group_slugs {
            self.invalidate_listing(&ListingKey::Group(slug.to_string()));
        }
    }

    pub fn clear(&self) {
        self.write_entries("clear").clear();
    }

    pub fn len(&self) -> usize {
        self.write_entries("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_entries(&self, op: &'static str) -> RwLockWriteGuard<'_, LruCache<ResponseKey, Entry>> {
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(
                    op,
                    lock_kind = "rwlock.write",
                    result = "poisoned_recovered",
                    "Recovered from poisoned cache lock"
                );
                poisoned.into_inner()
            }
        }
    }
}
