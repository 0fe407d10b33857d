//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::DEFAULT_CAPACITY;
use crate::caching::{CachingPolicy, Privacy};

/// Default validator lifetime in milliseconds (one hour)
pub const DEFAULT_ETAG_MAX_LIFE_MS: u64 = 3_600_000;

/// Default cap on fetched image bodies (20 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of validators the cache store can hold
    pub max_entries: usize,
    /// Default validator lifetime in milliseconds, also the store's default TTL
    pub etag_max_life_ms: u64,
    /// Cache-Control privacy classification, None disables the header
    pub privacy: Option<Privacy>,
    /// Client max-age in seconds (0 = unset)
    pub expires_in: u64,
    /// Shared-cache s-maxage in seconds (0 = unset)
    pub server_expires_in: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Upstream image fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Largest upstream image body accepted, in bytes
    pub max_image_bytes: usize,
    /// Maximum number of requests handled concurrently
    pub max_in_flight: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Cache store capacity (default: 10000)
    /// - `ETAG_MAX_LIFE_MS` - Default validator lifetime (default: 3600000)
    /// - `CACHE_PRIVACY` - `public`, `private`, `no-cache` or `none` (default: public)
    /// - `CACHE_EXPIRES_IN` - Client max-age in seconds (default: 36000)
    /// - `CACHE_SERVER_EXPIRES_IN` - Shared-cache s-maxage in seconds (default: 36000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `FETCH_TIMEOUT_SECS` - Upstream fetch timeout (default: 30)
    /// - `MAX_IMAGE_BYTES` - Upstream body cap (default: 20 MiB)
    /// - `MAX_IN_FLIGHT` - Concurrent request limit (default: 512)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            etag_max_life_ms: parse_var("ETAG_MAX_LIFE_MS").unwrap_or(defaults.etag_max_life_ms),
            privacy: match env::var("CACHE_PRIVACY") {
                Ok(raw) if raw.eq_ignore_ascii_case("none") || raw.is_empty() => None,
                Ok(raw) => Privacy::from_str(&raw).ok().or(defaults.privacy),
                Err(_) => defaults.privacy,
            },
            expires_in: parse_var("CACHE_EXPIRES_IN").unwrap_or(defaults.expires_in),
            server_expires_in: parse_var("CACHE_SERVER_EXPIRES_IN")
                .unwrap_or(defaults.server_expires_in),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            fetch_timeout_secs: parse_var("FETCH_TIMEOUT_SECS")
                .unwrap_or(defaults.fetch_timeout_secs),
            max_image_bytes: parse_var::<usize>("MAX_IMAGE_BYTES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_image_bytes),
            max_in_flight: parse_var::<usize>("MAX_IN_FLIGHT")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_in_flight),
        }
    }

    /// Builds the Cache-Control policy described by this configuration.
    pub fn caching_policy(&self) -> CachingPolicy {
        CachingPolicy {
            privacy: self.privacy,
            expires_in: Some(self.expires_in).filter(|s| *s > 0),
            server_expires_in: Some(self.server_expires_in).filter(|s| *s > 0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CAPACITY,
            etag_max_life_ms: DEFAULT_ETAG_MAX_LIFE_MS,
            privacy: Some(Privacy::Public),
            expires_in: 36_000,
            server_expires_in: 36_000,
            server_port: 3000,
            cleanup_interval: 60,
            fetch_timeout_secs: 30,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_in_flight: 512,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
