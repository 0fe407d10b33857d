//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{blurhash_handler, health_handler, index_handler, stats_handler, AppState};
use super::middleware::{backpressure, run_interceptors};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - Greeting
/// - `GET /health` - Health check
/// - `GET /stats` - Validator store statistics
/// - `GET /:img` - Blurhash of the percent-encoded image URI
///
/// # Middleware (outermost first)
/// - Tracing: Logs all requests
/// - CORS: Allows any origin
/// - Backpressure: Bounded in-flight requests, 503 when saturated
/// - Interceptors: Cache-Control directive and ETag negotiation
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/:img", get(blurhash_handler))
        .layer(from_fn_with_state(state.clone(), run_interceptors))
        .layer(from_fn_with_state(state.clone(), backpressure))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
