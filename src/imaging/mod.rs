//! Imaging Module
//!
//! Fetching and decoding images, and reducing them to blurhash signatures.

pub mod blurhash;
mod decoder;
mod source;

pub use blurhash::{encode, Components, EncodeError};
pub use decoder::{decode_bytes, hash_bytes, DecodeError, HashedImage, ImageDecoder, PixelBuffer};
pub use source::{parse_image_uri, HttpImageSource, ImageSource};
