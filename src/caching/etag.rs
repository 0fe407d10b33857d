//! ETag Negotiator
//!
//! Answers conditional requests from the validator store and remembers the
//! validators handed out with fresh responses.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    http::{header::IF_NONE_MATCH, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::cache::ValidatorStore;
use crate::caching::{Flow, Interceptor, ResponseContext};

/// Validator check on intake, validator persistence on send.
#[derive(Clone)]
pub struct ETagNegotiator {
    store: Arc<dyn ValidatorStore>,
    /// Lifetime for validators whose handler did not choose one
    max_life_ms: u64,
}

impl ETagNegotiator {
    pub fn new(store: Arc<dyn ValidatorStore>, max_life_ms: u64) -> Self {
        Self { store, max_life_ms }
    }

    /// True when `validator` is known and fresh.
    ///
    /// Store failures fail open: the request is treated as a miss.
    pub async fn is_fresh(&self, validator: &str) -> bool {
        match self.store.get(validator).await {
            Ok(Some(present)) => present,
            Ok(None) => false,
            Err(e) => {
                warn!("Validator lookup failed, treating as miss: {}", e);
                false
            }
        }
    }

    /// Persists the validator carried by `ctx`, if any.
    ///
    /// Returns whether a validator was written. Store failures are logged and
    /// swallowed.
    pub async fn remember(&self, ctx: &ResponseContext) -> bool {
        let Some(validator) = ctx.validator() else {
            return false;
        };
        let lifetime_ms = ctx.lifetime_ms().unwrap_or(self.max_life_ms);
        if lifetime_ms == 0 {
            return false;
        }

        match self.store.set(validator, true, lifetime_ms).await {
            Ok(()) => {
                debug!("Stored validator {} for {}ms", validator, lifetime_ms);
                true
            }
            Err(e) => {
                warn!("Failed to store validator {}: {}", validator, e);
                false
            }
        }
    }
}

#[async_trait]
impl Interceptor for ETagNegotiator {
    async fn on_request(&self, request: &HeaderMap, _reply: &mut HeaderMap) -> Flow {
        let Some(candidate) = request
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
        else {
            return Flow::Continue;
        };

        if self.is_fresh(candidate).await {
            debug!("Validator {} is fresh, answering 304", candidate);
            Flow::ShortCircuit(StatusCode::NOT_MODIFIED.into_response())
        } else {
            Flow::Continue
        }
    }

    async fn on_response(&self, response: &mut Response) {
        if let Some(ctx) = response.extensions().get::<ResponseContext>() {
            self.remember(ctx).await;
        }
    }
}
