//! Color conversion module
//!
//! Pure transforms from a loaded raw frame to an 8-bit BGR image. Nothing here
//! touches the filesystem or shared state, so workers call these concurrently
//! on their own buffers. Input is validated in full before any pixel is
//! computed; on error no image is produced.

pub mod bit_depth;
pub mod types;
pub mod yuv;

pub use bit_depth::{BitDepthScaling, MAX_10BIT, compress_samples};
pub use types::RgbImage;
pub use yuv::{ChromaOrder, semi_planar_to_bgr, yuv_to_bgr};

use tracing::trace;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::{self, DemosaicMethod};
use crate::image_pipeline::raw::types::{CfaPattern, PixelFormat, RawBuffer};

/// Knobs that only matter for Bayer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub demosaic: DemosaicMethod,
    pub scaling: BitDepthScaling,
}

/// Converts one raw frame according to its declared format.
pub fn convert_raw(raw: &RawBuffer, options: ConvertOptions) -> Result<RgbImage> {
    trace!(format = %raw.format(), width = raw.width(), height = raw.height(), "Converting frame");
    match raw.format() {
        PixelFormat::Nv12 => semi_planar_to_bgr(raw.data(), raw.width(), raw.height(), ChromaOrder::Uv),
        PixelFormat::Nv21 => semi_planar_to_bgr(raw.data(), raw.width(), raw.height(), ChromaOrder::Vu),
        PixelFormat::Bayer(pattern) => bayer10_to_bgr(raw.data(), raw.width(), raw.height(), pattern, options),
    }
}

/// 10-bit Bayer in 16-bit little-endian containers to BGR.
pub fn bayer10_to_bgr(
    data: &[u8],
    width: usize,
    height: usize,
    pattern: CfaPattern,
    options: ConvertOptions,
) -> Result<RgbImage> {
    if data.is_empty() {
        return Err(ConversionError::InvalidInput("empty Bayer buffer".to_string()));
    }
    if width < 2 || height < 2 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }
    let expected = width * height * 2;
    if data.len() != expected {
        return Err(ConversionError::InvalidInput(format!(
            "Bayer frame {width}x{height} needs {expected} bytes, buffer holds {}",
            data.len()
        )));
    }

    let plane = compress_samples(data, options.scaling)?;
    debayer::demosaic(&plane, width, height, pattern, options.demosaic)
}
