//! Response cache for the public post listings.
//!
//! Rendered pages for the index and the per-group listings are kept in an
//! in-process LRU, keyed explicitly by listing identity plus a hash of the
//! query string. Entries expire after a TTL and are dropped eagerly by the
//! write paths that change what the listing would show.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! response_limit = 128
//! ttl_ms = 20000
//! ```

mod config;
mod keys;
mod middleware;
mod store;

pub use config::CacheConfig;
pub use keys::{ListingKey, ResponseKey, hash_query};
pub use middleware::{CacheState, response_cache_layer};
pub use store::{CachedResponse, ResponseStore};
