//! Caching Module
//!
//! HTTP conditional caching: the interceptor chain, the ETag negotiator,
//! the request-scoped response context and the Cache-Control builder.

mod context;
mod etag;
mod interceptor;
mod policy;

pub use context::{generate_validator, http_date, ResponseContext, VALIDATOR_BYTES};
pub use etag::ETagNegotiator;
pub use interceptor::{Flow, Interceptor, InterceptorChain};
pub use policy::{CacheControl, CachingPolicy, Privacy};
