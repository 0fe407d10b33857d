//! Image Decoder
//!
//! Fetches an image through an [`ImageSource`], decodes it into an RGBA
//! pixel buffer and reduces it to a blurhash. Nothing is cached; every call
//! fetches and decodes again.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::imaging::{encode, Components, EncodeError, ImageSource};

/// Errors that can occur while fetching or decoding an image.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Resource could not be reached
    #[error("Image unreachable: {0}")]
    Unreachable(String),

    /// Upstream answered with a non-success status
    #[error("Image request failed with upstream status {0}")]
    UpstreamStatus(u16),

    /// Upstream did not answer in time
    #[error("Timed out fetching image: {0}")]
    Timeout(String),

    /// Upstream body exceeds the configured cap
    #[error("Image exceeds the {0} byte limit")]
    TooLarge(usize),

    /// Bytes are not a supported image format
    #[error("Unsupported or corrupt image: {0}")]
    Unsupported(String),

    /// Decoded image has no pixels
    #[error("Image has zero width or height")]
    EmptyImage,

    /// Decoded pixels rejected by the encoder
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Decode worker failed
    #[error("Decode worker failed: {0}")]
    Worker(String),
}

/// Decoded image in row-major RGBA order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes, checking they cover `width * height` pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (data.len() == expected).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Solid single-colour buffer.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            data: rgba.repeat(pixels),
        }
    }

    /// Hex SHA-256 digest of the dimensions and pixels, truncated to 16 bytes.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_be_bytes());
        hasher.update(self.height.to_be_bytes());
        hasher.update(&self.data);
        hex::encode(&hasher.finalize()[..16])
    }
}

/// Decodes in-memory image bytes (PNG, JPEG, GIF, BMP, TIFF, WebP).
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let img = image::load_from_memory(bytes).map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyImage);
    }

    Ok(PixelBuffer {
        width,
        height,
        data: rgba.into_raw(),
    })
}

/// Blurhash of one decoded image and the digest its validator derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedImage {
    pub width: u32,
    pub height: u32,
    pub components: Components,
    pub hash: String,
    /// See [`PixelBuffer::content_hash`]
    pub content_hash: String,
}

impl HashedImage {
    /// Validator shared by every request for these pixels at this grid.
    pub fn validator(&self) -> String {
        format!("{}-{}", self.content_hash, self.components)
    }
}

/// Decodes `bytes` and encodes the pixels at `components`.
pub fn hash_bytes(bytes: &[u8], components: Components) -> Result<HashedImage, DecodeError> {
    let pixels = decode_bytes(bytes)?;
    let hash = encode(&pixels, components)?;

    Ok(HashedImage {
        width: pixels.width,
        height: pixels.height,
        components,
        hash,
        content_hash: pixels.content_hash(),
    })
}

/// Fetch-and-hash front end over an [`ImageSource`].
#[derive(Clone)]
pub struct ImageDecoder {
    source: Arc<dyn ImageSource>,
}

impl ImageDecoder {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self { source }
    }

    /// Fetches `uri`, then decodes and encodes it on the blocking pool.
    ///
    /// Both steps are CPU-bound and stay off the async worker threads.
    pub async fn decode_and_hash(
        &self,
        uri: &Url,
        components: Components,
    ) -> Result<HashedImage, DecodeError> {
        let bytes = self.source.fetch(uri).await?;

        let hashed = tokio::task::spawn_blocking(move || hash_bytes(&bytes, components))
            .await
            .map_err(|e| DecodeError::Worker(e.to_string()))??;

        debug!(
            "Hashed {} ({}x{}) at {} as {}",
            uri, hashed.width, hashed.height, components, hashed.hash
        );
        Ok(hashed)
    }
}
