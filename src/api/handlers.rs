//! API Handlers
//!
//! HTTP request handlers and the state they share.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use tokio::sync::Semaphore;
use tracing::info;

use crate::cache::{MemoryStore, ValidatorStore};
use crate::caching::{CacheControl, ETagNegotiator, InterceptorChain, ResponseContext};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::imaging::{parse_image_uri, DecodeError, HttpImageSource, ImageDecoder, ImageSource};
use crate::models::{HashQuery, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The validator store and the interceptor chain are built once from the
/// configuration and injected here; nothing else is process-wide.
#[derive(Clone)]
pub struct AppState {
    /// Validator store backing the ETag negotiator
    pub cache: Arc<MemoryStore>,
    /// Fetch-and-decode front end for image URIs
    pub decoder: ImageDecoder,
    /// Cache-Control and ETag hooks run around every route
    pub interceptors: Arc<InterceptorChain>,
    /// Permits for in-flight requests
    pub limiter: Arc<Semaphore>,
}

impl AppState {
    /// Creates state from configuration with an injected image source.
    pub fn new(config: &Config, source: Arc<dyn ImageSource>) -> Self {
        let cache = Arc::new(MemoryStore::new(config.max_entries, config.etag_max_life_ms));
        let store: Arc<dyn ValidatorStore> = cache.clone();

        let mut chain = InterceptorChain::new();
        // Registered first so 304 short-circuits still carry the directive
        if let Some(cache_control) = CacheControl::from_policy(&config.caching_policy()) {
            chain = chain.with(cache_control);
        }
        chain = chain.with(ETagNegotiator::new(store, config.etag_max_life_ms));

        Self {
            cache,
            decoder: ImageDecoder::new(source),
            interceptors: Arc::new(chain),
            limiter: Arc::new(Semaphore::new(config.max_in_flight)),
        }
    }

    /// Creates state that fetches images over HTTP(S).
    pub fn from_config(config: &Config) -> std::result::Result<Self, DecodeError> {
        let source = HttpImageSource::new(
            std::time::Duration::from_secs(config.fetch_timeout_secs),
            config.max_image_bytes,
        )?;
        Ok(Self::new(config, Arc::new(source)))
    }
}

/// Handler for GET /:img
///
/// Fetches the percent-encoded image URI, decodes it and answers with its
/// blurhash as plain text. The validator is derived from the decoded pixels
/// and the grid, so identical requests share it.
pub async fn blurhash_handler(
    State(state): State<AppState>,
    Path(img): Path<String>,
    query: std::result::Result<Query<HashQuery>, QueryRejection>,
) -> Result<(ResponseContext, String)> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    // Validate before any fetch or decode work
    let components = query.components().map_err(AppError::Validation)?;
    let uri = parse_image_uri(&img).map_err(AppError::Validation)?;

    let hashed = state.decoder.decode_and_hash(&uri, components).await?;

    Ok((ResponseContext::new().etag(Some(hashed.validator()), None), hashed.hash))
}

/// Handler for GET /
pub async fn index_handler() -> &'static str {
    "Hello, Route"
}

/// Handler for GET /stats
///
/// Returns validator store statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Logs the effective state at startup.
pub fn log_state(state: &AppState) {
    info!(
        "Interceptor chain ready with {} hooks, {} request permits",
        state.interceptors.len(),
        state.limiter.available_permits()
    );
}
