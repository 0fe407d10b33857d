//! Request and Response models for the blurhash server API
//!
//! DTOs used for deserializing query strings and serializing JSON bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::HashQuery;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse};
