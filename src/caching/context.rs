//! Response Context
//!
//! Request-scoped caching metadata a handler attaches to its response: the
//! validator, its lifetime, and an optional `Expires` value.

use axum::{
    http::{
        header::{ETAG, EXPIRES},
        HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::error::AppError;

/// Random bytes in a generated validator
pub const VALIDATOR_BYTES: usize = 18;

/// Generates a random URL-safe validator from 18 bytes of OS randomness.
pub fn generate_validator() -> String {
    let mut bytes = [0u8; VALIDATOR_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Formats a timestamp as an HTTP date (RFC 7231 IMF-fixdate).
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Caching metadata for one response.
///
/// Returned from a handler alongside the body; it writes the `ETag` and
/// `Expires` headers and travels in the response extensions so the ETag
/// negotiator can persist the validator before the response is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseContext {
    validator: Option<String>,
    lifetime_ms: Option<u64>,
    expires: Option<String>,
}

impl ResponseContext {
    /// A context that opts out of validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a validator, generating a random one when `value` is None.
    ///
    /// `lifetime_ms` overrides the process-wide validator lifetime.
    pub fn etag(mut self, value: Option<String>, lifetime_ms: Option<u64>) -> Self {
        self.validator = Some(value.unwrap_or_else(generate_validator));
        self.lifetime_ms = lifetime_ms;
        self
    }

    /// Sets `Expires` to the given instant.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires = Some(http_date(at));
        self
    }

    /// Sets `Expires` to a literal header value.
    pub fn expires_literal(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.expires = Some(value);
        }
        self
    }

    pub fn validator(&self) -> Option<&str> {
        self.validator.as_deref()
    }

    pub fn lifetime_ms(&self) -> Option<u64> {
        self.lifetime_ms
    }

    pub fn expires(&self) -> Option<&str> {
        self.expires.as_deref()
    }
}

impl IntoResponseParts for ResponseContext {
    type Error = AppError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(validator) = &self.validator {
            let value = HeaderValue::from_str(validator)
                .map_err(|_| AppError::Internal(format!("invalid validator: {:?}", validator)))?;
            res.headers_mut().insert(ETAG, value);
        }
        if let Some(expires) = &self.expires {
            let value = HeaderValue::from_str(expires)
                .map_err(|_| AppError::Internal(format!("invalid Expires value: {:?}", expires)))?;
            res.headers_mut().insert(EXPIRES, value);
        }

        res.extensions_mut().insert(self);
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use chrono::TimeZone;

    #[test]
    fn test_generated_validator_shape() {
        let a = generate_validator();
        let b = generate_validator();

        // 18 bytes encode to exactly 24 base64 characters
        assert_eq!(a.len(), 24);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(a, b);
    }

    #[test]
    fn test_etag_keeps_supplied_value() {
        let ctx = ResponseContext::new().etag(Some("abc123".to_string()), Some(500));
        assert_eq!(ctx.validator(), Some("abc123"));
        assert_eq!(ctx.lifetime_ms(), Some(500));
    }

    #[test]
    fn test_etag_generates_when_missing() {
        let ctx = ResponseContext::new().etag(None, None);
        assert_eq!(ctx.validator().map(str::len), Some(24));
        assert_eq!(ctx.lifetime_ms(), None);
    }

    #[test]
    fn test_http_date_format() {
        let at = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(http_date(at), "Wed, 21 Oct 2015 07:28:00 GMT");
    }

    #[test]
    fn test_headers_and_extension_written() {
        let ctx = ResponseContext::new()
            .etag(Some("v1".to_string()), None)
            .expires_literal("0");

        let response = (ctx.clone(), "body").into_response();

        assert_eq!(response.headers().get(ETAG).unwrap(), "v1");
        assert_eq!(response.headers().get(EXPIRES).unwrap(), "0");
        assert_eq!(response.extensions().get::<ResponseContext>(), Some(&ctx));
    }

    #[test]
    fn test_expires_at_writes_http_date() {
        let at = Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap();
        let ctx = ResponseContext::new().expires_at(at);

        let response = (ctx, "body").into_response();

        assert_eq!(
            response.headers().get(EXPIRES).unwrap(),
            "Wed, 02 Jan 2030 03:04:05 GMT"
        );
        assert!(response.headers().get(ETAG).is_none());
    }

    #[test]
    fn test_opt_out_writes_nothing() {
        let response = (ResponseContext::new(), "body").into_response();
        assert!(response.headers().get(ETAG).is_none());
        assert!(response.headers().get(EXPIRES).is_none());
    }

    #[test]
    fn test_invalid_validator_becomes_error_response() {
        let ctx = ResponseContext::new().etag(Some("bad\nvalue".to_string()), None);
        let response = (ctx, "body").into_response();
        assert_eq!(
            response.status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
