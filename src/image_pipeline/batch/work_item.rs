use std::path::{Path, PathBuf};

use crate::image_pipeline::raw::types::{CfaPattern, PixelFormat};

/// One file to convert and the geometry it was captured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    path: PathBuf,
    format: PixelFormat,
    width: usize,
    height: usize,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>, format: PixelFormat, width: usize, height: usize) -> Self {
        Self {
            path: path.into(),
            format,
            width,
            height,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pattern(&self) -> Option<CfaPattern> {
        self.format.pattern()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes the loader must read for this item.
    pub fn data_size(&self) -> usize {
        self.format.frame_size(self.width, self.height)
    }
}
