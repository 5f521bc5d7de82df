use std::io::Write;

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::convert::types::RgbImage;
use crate::image_pipeline::encode::types::{OutputFormat, TiffCompression};
use crate::image_pipeline::encode::writer::ImageWriter;

pub struct StandardTiffWriter {
    pub compression: TiffCompression,
    /// Horizontal differencing before compression. Slower, smaller files.
    pub predictor: bool,
}

impl StandardTiffWriter {
    pub fn new(compression: TiffCompression) -> Self {
        Self {
            compression,
            predictor: false,
        }
    }

    pub fn with_predictor(mut self, predictor: bool) -> Self {
        self.predictor = predictor;
        self
    }
}

impl ImageWriter for StandardTiffWriter {
    fn extension(&self) -> &'static str {
        OutputFormat::Tiff.extension()
    }

    fn write_image(&self, image: &RgbImage, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding TIFF image: {}x{}", image.width(), image.height());

        let width = u32::try_from(image.width())
            .map_err(|_| ConversionError::EncodeError(format!("width {} too large", image.width())))?;
        let height = u32::try_from(image.height())
            .map_err(|_| ConversionError::EncodeError(format!("height {} too large", image.height())))?;

        let compression = match self.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => {
                tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast)
            }
            TiffCompression::DeflateBalanced => {
                tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced)
            }
            TiffCompression::DeflateBest => {
                tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best)
            }
        };

        // The encoder needs Seek, so encode into memory first.
        let mut buffer = std::io::Cursor::new(Vec::new());
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(&mut buffer)
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?
                .with_compression(compression);

            if self.predictor {
                encoder = encoder.with_predictor(tiff::tags::Predictor::Horizontal);
            }

            let rgb = image.to_rgb_bytes();
            encoder
                .write_image::<tiff::encoder::colortype::RGB8>(width, height, &rgb)
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?;
        }

        output.write_all(buffer.get_ref())?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}
