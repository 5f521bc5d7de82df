use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::{PixelFormat, RawBuffer};

pub trait RawImageReader {
    /// Loads exactly `format.frame_size(width, height)` bytes from `path`.
    fn read_raw(&self, path: &Path, format: PixelFormat, width: usize, height: usize) -> Result<RawBuffer>;
}
