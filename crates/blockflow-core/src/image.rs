//! RGBA pixel buffers carried by image nodes.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Bytes per pixel in every buffer (R, G, B, A).
pub const CHANNELS: usize = 4;

/// A width x height image stored as a flat RGBA byte buffer.
///
/// The buffer length is always `width * height * 4`; construction and
/// deserialization both enforce it, so kernels can index without checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawImage")]
pub struct ImageData {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Unvalidated wire form of [`ImageData`].
#[derive(Deserialize)]
struct RawImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl TryFrom<RawImage> for ImageData {
    type Error = CoreError;

    fn try_from(raw: RawImage) -> Result<Self, Self::Error> {
        ImageData::new(raw.width, raw.height, raw.data)
    }
}

impl ImageData {
    /// Wraps an RGBA buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(CoreError::InvalidImage {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(ImageData {
            width,
            height,
            data,
        })
    }

    /// Creates an image where every pixel has the same RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(pixels * CHANNELS).collect();
        ImageData {
            width,
            height,
            data,
        }
    }

    /// Builds an image by computing every pixel from its coordinates,
    /// row by row.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(usize, usize) -> [u8; 4]) -> Self {
        let (w, h) = (width as usize, height as usize);
        let mut data = Vec::with_capacity(w * h * CHANNELS);
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&f(x, y));
            }
        }
        ImageData {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of pixel `(x, y)`.
    pub fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width as usize + x) * CHANNELS
    }

    /// Returns the RGBA value of pixel `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}
