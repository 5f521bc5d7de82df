//! Conversion run configuration

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::image_pipeline::common::error::ConfigError;
use crate::image_pipeline::convert::{BitDepthScaling, ConvertOptions};
use crate::image_pipeline::debayer::DemosaicMethod;
use crate::image_pipeline::encode::{DEFAULT_JPEG_QUALITY, OutputFormat, TiffCompression};
use crate::image_pipeline::raw::types::PixelFormat;

/// Configuration for a batch of raw-to-image conversions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionConfig {
    /// Declared layout of every input file
    pub format: PixelFormat,
    /// Frame width in pixels
    pub width: usize,
    /// Frame height in pixels
    pub height: usize,
    /// Demosaic algorithm for Bayer input
    pub demosaic: DemosaicMethod,
    /// 10-bit to 8-bit mapping for Bayer input
    pub scaling: BitDepthScaling,
    /// Encoded output container
    pub output_format: OutputFormat,
    /// JPEG quality, 1..=100
    pub jpeg_quality: u8,
    /// Compression used when writing TIFF
    pub tiff_compression: TiffCompression,
    /// Horizontal differencing before TIFF compression
    pub tiff_predictor: bool,
    /// Directory for outputs; next to each input when unset
    pub output_dir: Option<PathBuf>,
    /// Worker threads; available parallelism when unset
    pub workers: Option<usize>,
    /// Bound on queued items; unbounded when unset
    pub queue_capacity: Option<usize>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: PixelFormat::Nv12,
            width: 0,
            height: 0,
            demosaic: DemosaicMethod::default(),
            scaling: BitDepthScaling::default(),
            output_format: OutputFormat::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            tiff_compression: TiffCompression::default(),
            tiff_predictor: false,
            output_dir: None,
            workers: None,
            queue_capacity: None,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    /// Rejects parameter combinations that would fail every file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroDimensions(width, height));
        }
        match self.format {
            PixelFormat::Nv12 | PixelFormat::Nv21 => {
                if width % 2 != 0 || height % 2 != 0 {
                    return Err(ConfigError::OddDimensions {
                        format: self.format.name(),
                        width,
                        height,
                    });
                }
            }
            PixelFormat::Bayer(_) => {
                let min = self.demosaic.min_frame_side();
                if width < min || height < min {
                    return Err(ConfigError::FrameTooSmall {
                        demosaic: self.demosaic.name(),
                        min,
                        width,
                        height,
                    });
                }
            }
        }
        if self.format.checked_frame_size(width, height).is_none() {
            return Err(ConfigError::FrameTooLarge(width, height));
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::InvalidQuality(self.jpeg_quality));
        }
        if let Some(dir) = &self.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::OutputDirUnavailable {
                    path: dir.clone(),
                    reason: "not a directory".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            demosaic: self.demosaic,
            scaling: self.scaling,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    format: Option<PixelFormat>,
    width: Option<usize>,
    height: Option<usize>,
    demosaic: Option<DemosaicMethod>,
    scaling: Option<BitDepthScaling>,
    output_format: Option<OutputFormat>,
    jpeg_quality: Option<u8>,
    tiff_compression: Option<TiffCompression>,
    tiff_predictor: Option<bool>,
    output_dir: Option<Option<PathBuf>>,
    workers: Option<Option<usize>>,
    queue_capacity: Option<Option<usize>>,
}

impl ConversionConfigBuilder {
    pub fn format(mut self, format: PixelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn dimensions(mut self, width: usize, height: usize) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn demosaic(mut self, method: DemosaicMethod) -> Self {
        self.demosaic = Some(method);
        self
    }

    pub fn scaling(mut self, scaling: BitDepthScaling) -> Self {
        self.scaling = Some(scaling);
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn tiff_predictor(mut self, predictor: bool) -> Self {
        self.tiff_predictor = Some(predictor);
        self
    }

    pub fn output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn workers(mut self, workers: Option<usize>) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            format: self.format.unwrap_or(default.format),
            width: self.width.unwrap_or(default.width),
            height: self.height.unwrap_or(default.height),
            demosaic: self.demosaic.unwrap_or(default.demosaic),
            scaling: self.scaling.unwrap_or(default.scaling),
            output_format: self.output_format.unwrap_or(default.output_format),
            jpeg_quality: self.jpeg_quality.unwrap_or(default.jpeg_quality),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
            tiff_predictor: self.tiff_predictor.unwrap_or(default.tiff_predictor),
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            workers: self.workers.unwrap_or(default.workers),
            queue_capacity: self.queue_capacity.unwrap_or(default.queue_capacity),
        }
    }
}
