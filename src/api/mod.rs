//! API Module
//!
//! HTTP handlers, middleware and routing for the blurhash server.
//!
//! # Endpoints
//! - `GET /` - Greeting
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Validator store statistics
//! - `GET /:img` - Blurhash of a remote image

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
