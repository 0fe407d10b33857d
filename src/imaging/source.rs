//! Image sources
//!
//! Where encoded image bytes come from. The server fetches over HTTP(S);
//! tests plug in their own sources.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::imaging::DecodeError;

/// Fetches the raw, still-encoded bytes behind a URI.
#[async_trait]
pub trait ImageSource: Send + Sync + 'static {
    async fn fetch(&self, uri: &Url) -> Result<Vec<u8>, DecodeError>;
}

/// Fetches images with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    /// Largest body accepted from upstream
    max_bytes: usize,
}

impl HttpImageSource {
    /// Builds a source whose requests give up after `timeout` and whose
    /// bodies may not exceed `max_bytes`.
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, DecodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DecodeError::Unreachable(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, max_bytes })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, uri: &Url) -> Result<Vec<u8>, DecodeError> {
        let mut response = self
            .client
            .get(uri.clone())
            .send()
            .await
            .map_err(|e| from_reqwest(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DecodeError::UpstreamStatus(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(DecodeError::TooLarge(self.max_bytes));
        }

        // Content-Length is optional; enforce the cap per chunk too
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| from_reqwest(uri, e))? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(DecodeError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), uri);
        Ok(body)
    }
}

fn from_reqwest(uri: &Url, e: reqwest::Error) -> DecodeError {
    if e.is_timeout() {
        DecodeError::Timeout(uri.to_string())
    } else {
        DecodeError::Unreachable(format!("{}: {}", uri, e))
    }
}

/// Parses a request path parameter into a fetchable image URI.
///
/// Only absolute `http` and `https` URIs are accepted.
pub fn parse_image_uri(raw: &str) -> Result<Url, String> {
    let uri = Url::parse(raw).map_err(|e| format!("img must be an absolute URI: {}", e))?;
    match uri.scheme() {
        "http" | "https" => Ok(uri),
        other => Err(format!("unsupported URI scheme: {}", other)),
    }
}
