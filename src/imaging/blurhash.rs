//! Perceptual Hash Encoder
//!
//! Blurhash encoding: the image is projected onto a small grid of 2D cosine
//! basis functions in linear light. The average colour (DC term) is stored
//! exactly and the remaining AC terms are quantised against their maximum
//! magnitude, all packed into base-83 digits.
//!
//! Layout of the output:
//!
//! | chars | content |
//! |-------|---------|
//! | 1 | size flag `(x - 1) + (y - 1) * 9` |
//! | 1 | quantised maximum AC magnitude |
//! | 4 | DC colour as packed sRGB |
//! | 2 each | AC terms, x index varying fastest |

use std::f64::consts::PI;
use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

use crate::imaging::PixelBuffer;

const BASE83_ALPHABET: &[u8; 83] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz#$%*+,-.:;=?@[]^_{|}~";

/// Smallest allowed grid dimension
pub const MIN_COMPONENTS: u8 = 1;
/// Largest allowed grid dimension
pub const MAX_COMPONENTS: u8 = 9;
/// Grid dimension used when the request does not choose one
pub const DEFAULT_COMPONENTS: u8 = 4;

/// Errors raised before or during encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("components must be between 1 and 9, got {x}x{y}")]
    ComponentsOutOfRange { x: u32, y: u32 },

    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("image has zero width or height")]
    EmptyImage,
}

/// Resolution of the cosine basis grid, each axis in `[1, 9]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Components {
    x: u8,
    y: u8,
}

impl Components {
    pub fn new(x: u32, y: u32) -> Result<Self, EncodeError> {
        let range = u32::from(MIN_COMPONENTS)..=u32::from(MAX_COMPONENTS);
        if !range.contains(&x) || !range.contains(&y) {
            return Err(EncodeError::ComponentsOutOfRange { x, y });
        }
        Ok(Self {
            x: x as u8,
            y: y as u8,
        })
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    /// Number of characters in a hash at this resolution.
    pub fn hash_len(&self) -> usize {
        4 + 2 * usize::from(self.x) * usize::from(self.y)
    }

    fn size_flag(&self) -> u32 {
        u32::from(self.x - 1) + u32::from(self.y - 1) * 9
    }
}

impl Default for Components {
    fn default() -> Self {
        Self {
            x: DEFAULT_COMPONENTS,
            y: DEFAULT_COMPONENTS,
        }
    }
}

impl fmt::Display for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Encodes `buffer` at the given grid resolution.
///
/// The output depends only on the pixels and the grid, so equal inputs
/// always yield equal strings.
pub fn encode(buffer: &PixelBuffer, components: Components) -> Result<String, EncodeError> {
    let (width, height) = (buffer.width as usize, buffer.height as usize);
    if width == 0 || height == 0 {
        return Err(EncodeError::EmptyImage);
    }
    let expected = width * height * 4;
    if buffer.data.len() != expected {
        return Err(EncodeError::BufferSizeMismatch {
            width: buffer.width,
            height: buffer.height,
            expected,
            actual: buffer.data.len(),
        });
    }

    let mut factors = Vec::with_capacity(usize::from(components.x) * usize::from(components.y));
    for j in 0..usize::from(components.y) {
        for i in 0..usize::from(components.x) {
            factors.push(basis_projection(buffer, i, j));
        }
    }

    let (dc, ac) = factors.split_at(1);
    let mut hash = String::with_capacity(components.hash_len());
    push_base83(&mut hash, components.size_flag(), 1);

    let maximum_value = if ac.is_empty() {
        push_base83(&mut hash, 0, 1);
        1.0
    } else {
        let actual_maximum = ac
            .iter()
            .flat_map(|rgb| rgb.iter())
            .fold(0.0_f64, |max, v| max.max(v.abs()));
        let quantised = (actual_maximum * 166.0 - 0.5).floor().clamp(0.0, 82.0) as u32;
        push_base83(&mut hash, quantised, 1);
        (quantised as f64 + 1.0) / 166.0
    };

    push_base83(&mut hash, encode_dc(dc[0]), 4);
    for factor in ac {
        push_base83(&mut hash, encode_ac(*factor, maximum_value), 2);
    }

    Ok(hash)
}

/// Linear-light average of the image weighted by basis function `(i, j)`.
fn basis_projection(buffer: &PixelBuffer, i: usize, j: usize) -> [f64; 3] {
    let (width, height) = (buffer.width as usize, buffer.height as usize);
    let normalisation = if i == 0 && j == 0 { 1.0 } else { 2.0 };
    let lut = srgb_to_linear_table();

    let cos_x: Vec<f64> = (0..width)
        .map(|x| (PI * i as f64 * x as f64 / width as f64).cos())
        .collect();
    let cos_y: Vec<f64> = (0..height)
        .map(|y| (PI * j as f64 * y as f64 / height as f64).cos())
        .collect();

    let bytes_per_row = width * 4;
    let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
    for (x, cx) in cos_x.iter().enumerate() {
        for (y, cy) in cos_y.iter().enumerate() {
            let basis = normalisation * cx * cy;
            let offset = 4 * x + y * bytes_per_row;
            r += basis * lut[usize::from(buffer.data[offset])];
            g += basis * lut[usize::from(buffer.data[offset + 1])];
            b += basis * lut[usize::from(buffer.data[offset + 2])];
        }
    }

    let scale = 1.0 / (width * height) as f64;
    [r * scale, g * scale, b * scale]
}

/// sRGB byte to linear light, indexed by channel value.
fn srgb_to_linear_table() -> &'static [f64; 256] {
    static TABLE: OnceLock<[f64; 256]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0.0; 256];
        for (value, slot) in table.iter_mut().enumerate() {
            *slot = srgb_to_linear(value as u8);
        }
        table
    })
}

fn srgb_to_linear(value: u8) -> f64 {
    let v = f64::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(value: f64) -> u32 {
    let v = value.clamp(0.0, 1.0);
    if v <= 0.0031308 {
        (v * 12.92 * 255.0 + 0.5).trunc() as u32
    } else {
        ((1.055 * v.powf(1.0 / 2.4) - 0.055) * 255.0 + 0.5).trunc() as u32
    }
}

fn sign_pow(value: f64, exp: f64) -> f64 {
    let magnitude = value.abs().powf(exp);
    if value < 0.0 {
        -magnitude
    } else if value > 0.0 {
        magnitude
    } else {
        0.0
    }
}

fn encode_dc([r, g, b]: [f64; 3]) -> u32 {
    (linear_to_srgb(r) << 16) + (linear_to_srgb(g) << 8) + linear_to_srgb(b)
}

fn encode_ac([r, g, b]: [f64; 3], maximum_value: f64) -> u32 {
    let quantise = |v: f64| -> u32 {
        (sign_pow(v / maximum_value, 0.5) * 9.0 + 9.5)
            .floor()
            .clamp(0.0, 18.0) as u32
    };
    quantise(r) * 19 * 19 + quantise(g) * 19 + quantise(b)
}

fn push_base83(out: &mut String, value: u32, length: u32) {
    for i in 1..=length {
        let digit = (value / 83u32.pow(length - i)) % 83;
        out.push(char::from(BASE83_ALPHABET[digit as usize]));
    }
}
