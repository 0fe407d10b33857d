//! API Middleware
//!
//! Adapters mounting the interceptor chain and the in-flight request limit
//! on the router.

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::handlers::AppState;

/// Seconds a rejected client is asked to wait
pub const RETRY_AFTER_SECS: &str = "50";

/// Runs the caching interceptors around the matched route.
pub async fn run_interceptors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.interceptors.run(request, next).await
}

/// Rejects requests immediately once every in-flight permit is taken.
pub async fn backpressure(State(state): State<AppState>, request: Request, next: Next) -> Response {
    match state.limiter.clone().try_acquire_owned() {
        Ok(permit) => {
            let response = next.run(request).await;
            drop(permit);
            response
        }
        Err(_) => {
            warn!("Rejecting {} {}: under pressure", request.method(), request.uri());
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(RETRY_AFTER, RETRY_AFTER_SECS)],
                "Under pressure!",
            )
                .into_response()
        }
    }
}
