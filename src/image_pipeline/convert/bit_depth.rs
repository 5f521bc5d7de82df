//! 10-bit to 8-bit sample compression for Bayer frames.

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Largest value a 10-bit sensor sample can hold.
pub const MAX_10BIT: u16 = 1023;

/// How 10-bit samples are brought down to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitDepthScaling {
    /// `floor(s * 255 / 1023 + 0.5)`: 0 maps to 0 and 1023 to 255.
    #[default]
    Linear,
    /// Legacy quarter scale, `s / 4` rounded to nearest. Saturates from 1022 up.
    Shift,
}

impl BitDepthScaling {
    #[inline]
    pub fn scale(self, sample: u16) -> u8 {
        match self {
            BitDepthScaling::Linear => scale_linear(sample),
            BitDepthScaling::Shift => scale_shift(sample),
        }
    }
}

#[inline]
fn scale_linear(sample: u16) -> u8 {
    // floor(s*255/1023 + 1/2) == (510*s + 1023) / 2046 in integers
    let s = sample as u32;
    ((510 * s + 1023) / 2046).min(255) as u8
}

#[inline]
fn scale_shift(sample: u16) -> u8 {
    ((sample as u32 + 2) / 4).min(255) as u8
}

/// Reads little-endian 16-bit containers and returns one 8-bit sample each.
pub fn compress_samples(data: &[u8], scaling: BitDepthScaling) -> Result<Vec<u8>> {
    if data.len() % 2 != 0 {
        return Err(ConversionError::InvalidInput(format!(
            "16-bit sample buffer has odd length {}",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| scaling.scale(u16::from_le_bytes([pair[0], pair[1]])))
        .collect())
}
