use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::convert::types::RgbImage;

pub trait ImageWriter {
    /// File extension given to outputs, without the dot.
    fn extension(&self) -> &'static str;

    fn write_image(&self, image: &RgbImage, output: &mut dyn Write) -> Result<()>;
}
