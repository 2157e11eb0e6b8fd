//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_RESPONSE_LIMIT: usize = 128;
const DEFAULT_TTL_MS: u64 = 20_000;

/// Response cache configuration from `pluma.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the listing response cache.
    pub enabled: bool,
    /// Maximum cached responses before LRU eviction.
    pub response_limit: usize,
    /// Entry lifetime in milliseconds.
    pub ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            response_limit: DEFAULT_RESPONSE_LIMIT,
            ttl_ms: DEFAULT_TTL_MS,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Returns the response limit as NonZeroUsize, clamping to 1 if zero.
    pub fn response_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.response_limit).unwrap_or(NonZeroUsize::MIN)
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            response_limit: settings.response_limit,
            ttl_ms: settings.ttl_ms,
        }
    }
}
