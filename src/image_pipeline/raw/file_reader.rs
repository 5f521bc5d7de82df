//! RAW frame reader for headerless capture files on disk.
//!
//! The files carry no metadata, so the caller supplies geometry and format.
//! Exactly the geometry-implied byte count is read: a shorter file is a
//! truncated read, a longer one has its trailing bytes ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::{PixelFormat, RawBuffer};

pub struct FileRawReader;

impl RawImageReader for FileRawReader {
    fn read_raw(&self, path: &Path, format: PixelFormat, width: usize, height: usize) -> Result<RawBuffer> {
        let expected = match format.checked_frame_size(width, height) {
            Some(0) | None => return Err(ConversionError::InvalidDimensions(width, height)),
            Some(n) => n,
        };

        let file = File::open(path)
            .map_err(|e| ConversionError::InputReadError(format!("{}: {}", path.display(), e)))?;
        let on_disk = file.metadata().map(|m| m.len()).unwrap_or(0);

        // Sized from the file, not the geometry: a short file must not cost a
        // full-frame allocation.
        let capacity = usize::try_from(on_disk).map_or(expected, |len| len.min(expected));
        let mut data = Vec::with_capacity(capacity);
        file.take(expected as u64)
            .read_to_end(&mut data)
            .map_err(|e| ConversionError::InputReadError(format!("{}: {}", path.display(), e)))?;

        if data.len() < expected {
            return Err(ConversionError::TruncatedInput {
                path: path.to_path_buf(),
                expected,
                actual: data.len(),
            });
        }

        if on_disk > expected as u64 {
            debug!(
                path = %path.display(),
                expected,
                on_disk,
                "Input longer than frame size, trailing bytes ignored"
            );
        }

        RawBuffer::new(data, width, height, format)
    }
}
