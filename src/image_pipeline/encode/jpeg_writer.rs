use std::io::Write;

use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::convert::types::RgbImage;
use crate::image_pipeline::encode::types::{DEFAULT_JPEG_QUALITY, OutputFormat};
use crate::image_pipeline::encode::writer::ImageWriter;

pub struct JpegWriter {
    quality: u8,
}

impl JpegWriter {
    /// `quality` is clamped to 1..=100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegWriter {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageWriter for JpegWriter {
    fn extension(&self) -> &'static str {
        OutputFormat::Jpeg.extension()
    }

    fn write_image(&self, image: &RgbImage, output: &mut dyn Write) -> Result<()> {
        debug!(
            width = image.width(),
            height = image.height(),
            quality = self.quality,
            "Encoding JPEG image"
        );

        let width = u32::try_from(image.width())
            .map_err(|_| ConversionError::EncodeError(format!("width {} too large", image.width())))?;
        let height = u32::try_from(image.height())
            .map_err(|_| ConversionError::EncodeError(format!("height {} too large", image.height())))?;

        let rgb = image.to_rgb_bytes();
        let mut encoder = JpegEncoder::new_with_quality(output, self.quality);
        encoder
            .encode(&rgb, width, height, ExtendedColorType::Rgb8)
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        Ok(())
    }
}
