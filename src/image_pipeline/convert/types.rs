//! Types produced by color conversion

use crate::image_pipeline::common::error::{ConversionError, Result};

/// 8-bit, 3-channel, row-major image with channels stored B, G, R.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        if data.len() != width * height * 3 {
            return Err(ConversionError::InvalidInput(format!(
                "BGR image {width}x{height} needs {} bytes, buffer holds {}",
                width * height * 3,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved B, G, R bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// `[b, g, r]` at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * self.width + x) * 3;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }

    /// Copy of the pixels in R, G, B order, as most encoders expect.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = self.data.clone();
        for px in rgb.chunks_exact_mut(3) {
            px.swap(0, 2);
        }
        rgb
    }
}
