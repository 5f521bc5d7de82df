//! Image processing pipeline module
//!
//! Raw sensor captures (NV12/NV21 YUV, 10-bit Bayer) are loaded, converted to
//! 8-bit BGR, and encoded as JPEG or TIFF, one file per worker at a time.

pub mod raw;
pub mod convert;
pub mod debayer;
pub mod encode;
pub mod conversions;
pub mod batch;
pub mod config;
pub mod common;

pub use common::{
    ConfigError,
    ConversionError,
    ErrorKind,
    PipelineError,
    Result,
};

pub use raw::{
    CfaPattern,
    FileRawReader,
    PixelFormat,
    RawBuffer,
    RawImageReader,
};

pub use convert::{
    BitDepthScaling,
    ConvertOptions,
    RgbImage,
    convert_raw,
};

pub use debayer::DemosaicMethod;

pub use encode::{
    ImageWriter,
    JpegWriter,
    OutputFormat,
    StandardTiffWriter,
    StandardWriter,
    TiffCompression,
};

pub use config::{ConversionConfig, ConversionConfigBuilder};

pub use conversions::{PipelineTimings, RawToImagePipeline};

pub use batch::{
    BatchReport,
    Coordinator,
    FileFailure,
    WorkHandler,
    WorkItem,
    WorkQueue,
    WorkerPool,
};
