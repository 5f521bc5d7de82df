//! Image encoding module
//!
//! Converted frames are written as JPEG (default) or TIFF.

mod writer;
mod jpeg_writer;
mod standard_tiff_writer;
pub mod types;

use std::io::Write;

pub use writer::ImageWriter;
pub use jpeg_writer::JpegWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{DEFAULT_JPEG_QUALITY, OutputFormat, TiffCompression};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::convert::types::RgbImage;

/// Writer picked at runtime from the output format.
pub enum StandardWriter {
    Jpeg(JpegWriter),
    Tiff(StandardTiffWriter),
}

impl StandardWriter {
    pub fn new(format: OutputFormat, jpeg_quality: u8, tiff_compression: TiffCompression, tiff_predictor: bool) -> Self {
        match format {
            OutputFormat::Jpeg => StandardWriter::Jpeg(JpegWriter::new(jpeg_quality)),
            OutputFormat::Tiff => {
                StandardWriter::Tiff(StandardTiffWriter::new(tiff_compression).with_predictor(tiff_predictor))
            }
        }
    }
}

impl ImageWriter for StandardWriter {
    fn extension(&self) -> &'static str {
        match self {
            StandardWriter::Jpeg(w) => w.extension(),
            StandardWriter::Tiff(w) => w.extension(),
        }
    }

    fn write_image(&self, image: &RgbImage, output: &mut dyn Write) -> Result<()> {
        match self {
            StandardWriter::Jpeg(w) => w.write_image(image, output),
            StandardWriter::Tiff(w) => w.write_image(image, output),
        }
    }
}
