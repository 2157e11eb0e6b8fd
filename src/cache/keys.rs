//! Cache key definitions.
//!
//! Only the non-personalized listings are cacheable: the index and the
//! per-group pages. Every cacheable request maps to exactly one explicit
//! `ResponseKey`; everything else bypasses the cache.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Identity of a cacheable listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    /// The front page.
    Index,
    /// A group listing, by slug.
    Group(String),
}

impl ListingKey {
    /// Map a request path to the listing it renders, if that listing is
    /// cacheable. Profile and follow pages are personalized and never map.
    pub fn from_path(path: &str) -> Option<Self> {
        if path == "/" {
            return Some(Self::Index);
        }
        let slug = path.strip_prefix("/group/")?;
        let slug = slug.strip_suffix('/').unwrap_or(slug);
        if slug.is_empty() || slug.contains('/') {
            return None;
        }
        Some(Self::Group(slug.to_string()))
    }
}

/// Full key of a cached response. The query hash covers the page number and
/// any filter criteria, so distinct pages cache separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    pub listing: ListingKey,
    pub query_hash: u64,
}

impl ResponseKey {
    pub fn new(listing: ListingKey, query: &str) -> Self {
        Self {
            listing,
            query_hash: hash_query(query),
        }
    }
}

pub fn hash_query(query: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    query.hash(&mut hasher);
    hasher.finish()
}
