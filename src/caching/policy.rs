//! Cache-Control Directive Builder
//!
//! Turns a privacy classification and expiry windows into one
//! `Cache-Control` value, computed once at startup.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use axum::http::{header::CACHE_CONTROL, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::caching::{Flow, Interceptor};

/// Who may reuse a response without revalidating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Privacy {
    /// Every reuse must be revalidated first
    NoCache,
    /// Shared intermediaries may store the response
    Public,
    /// Only the end client may store the response
    Private,
}

impl Privacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::NoCache => "no-cache",
            Privacy::Public => "public",
            Privacy::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privacy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "no-cache" => Ok(Privacy::NoCache),
            "public" => Ok(Privacy::Public),
            "private" => Ok(Privacy::Private),
            other => Err(format!("unknown privacy classification: {}", other)),
        }
    }
}

/// Caching configuration for every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachingPolicy {
    pub privacy: Option<Privacy>,
    /// Client freshness window in seconds (`max-age`)
    pub expires_in: Option<u64>,
    /// Shared-cache freshness window in seconds (`s-maxage`)
    pub server_expires_in: Option<u64>,
}

impl CachingPolicy {
    /// Builds the `Cache-Control` directive, or None when privacy is unset.
    ///
    /// `no-cache` ignores both windows; `s-maxage` is only emitted for
    /// `public`.
    pub fn directive(&self) -> Option<String> {
        let privacy = self.privacy?;
        let mut value = privacy.as_str().to_string();

        if privacy == Privacy::NoCache {
            return Some(value);
        }

        if let Some(max_age) = self.expires_in {
            value.push_str(&format!(", max-age={}", max_age));
        }
        if privacy == Privacy::Public {
            if let Some(s_maxage) = self.server_expires_in {
                value.push_str(&format!(", s-maxage={}", s_maxage));
            }
        }

        Some(value)
    }
}

// == Cache-Control Interceptor ==
/// Writes the precomputed directive on every response, including
/// short-circuited ones.
#[derive(Debug, Clone)]
pub struct CacheControl {
    value: HeaderValue,
}

impl CacheControl {
    /// Returns None when the policy emits no directive.
    pub fn from_policy(policy: &CachingPolicy) -> Option<Self> {
        let directive = policy.directive()?;
        // Directive is built from ASCII tokens and digits only
        HeaderValue::from_str(&directive)
            .ok()
            .map(|value| Self { value })
    }
}

#[async_trait]
impl Interceptor for CacheControl {
    async fn on_request(&self, _request: &HeaderMap, reply: &mut HeaderMap) -> Flow {
        reply.insert(CACHE_CONTROL, self.value.clone());
        Flow::Continue
    }
}
