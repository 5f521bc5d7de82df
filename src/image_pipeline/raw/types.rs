//! RAW frame data types

use std::fmt;

use crate::image_pipeline::common::error::{ConversionError, Result};

/// Placement of the 2x2 color filter tile, named by its top row then bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfaPattern {
    Bggr,
    Gbrg,
    Rggb,
    Grbg,
}

impl CfaPattern {
    pub const ALL: [CfaPattern; 4] = [CfaPattern::Bggr, CfaPattern::Gbrg, CfaPattern::Rggb, CfaPattern::Grbg];

    pub fn name(self) -> &'static str {
        match self {
            CfaPattern::Bggr => "bggr",
            CfaPattern::Gbrg => "gbrg",
            CfaPattern::Rggb => "rggb",
            CfaPattern::Grbg => "grbg",
        }
    }
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared pixel layout of a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit Y plane followed by interleaved U,V at quarter resolution.
    Nv12,
    /// Same as NV12 with the chroma pair stored V,U.
    Nv21,
    /// 10-bit samples in little-endian 16-bit containers, one per site.
    Bayer(CfaPattern),
}

impl PixelFormat {
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::Nv12 => "nv12",
            PixelFormat::Nv21 => "nv21",
            PixelFormat::Bayer(_) => "bayer",
        }
    }

    pub fn pattern(self) -> Option<CfaPattern> {
        match self {
            PixelFormat::Bayer(pattern) => Some(pattern),
            PixelFormat::Nv12 | PixelFormat::Nv21 => None,
        }
    }

    /// Byte count a frame of this geometry occupies on disk, or `None` if it
    /// does not fit in `usize`.
    pub fn checked_frame_size(self, width: usize, height: usize) -> Option<usize> {
        let pixels = width.checked_mul(height)?;
        match self {
            PixelFormat::Nv12 | PixelFormat::Nv21 => pixels.checked_mul(3).map(|n| n / 2),
            PixelFormat::Bayer(_) => pixels.checked_mul(2),
        }
    }

    /// Like `checked_frame_size`, saturating at `usize::MAX`.
    pub fn frame_size(self, width: usize, height: usize) -> usize {
        self.checked_frame_size(width, height).unwrap_or(usize::MAX)
    }

    /// Case-insensitive substring that a candidate file's suffix must contain.
    pub fn file_marker(self) -> &'static str {
        match self {
            PixelFormat::Nv12 | PixelFormat::Nv21 => "nv12",
            PixelFormat::Bayer(_) => "raw",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Bayer(pattern) => write!(f, "bayer/{pattern}"),
            other => f.write_str(other.name()),
        }
    }
}

/// One raw frame held in memory, sized exactly to its declared geometry.
#[derive(Debug, Clone)]
pub struct RawBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl RawBuffer {
    pub fn new(data: Vec<u8>, width: usize, height: usize, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        let expected = format.frame_size(width, height);
        if data.len() != expected {
            return Err(ConversionError::InvalidInput(format!(
                "{format} frame {width}x{height} needs {expected} bytes, buffer holds {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }
}
