use std::path::PathBuf;

use thiserror::Error;

/// Per-file failure raised while loading, converting, or encoding one frame.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Truncated input {path}: expected {expected} bytes, found {actual}")]
    TruncatedInput {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Demosaic failed: {0}")]
    DemosaicError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Worker panicked: {0}")]
    WorkerPanic(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification used in batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    InvalidInput,
    Encode,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Io => "IoError",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Encode => "EncodeError",
            ErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::InputReadError(_)
            | ConversionError::TruncatedInput { .. }
            | ConversionError::OutputWriteError(_)
            | ConversionError::IoError(_) => ErrorKind::Io,
            ConversionError::InvalidInput(_)
            | ConversionError::InvalidDimensions(_, _)
            | ConversionError::DemosaicError(_) => ErrorKind::InvalidInput,
            ConversionError::EncodeError(_) => ErrorKind::Encode,
            ConversionError::WorkerPanic(_) => ErrorKind::Internal,
        }
    }
}

/// Startup problems with the requested run. Fatal: no file is touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--pattern is required when format is bayer")]
    MissingPattern,

    #[error("Frame dimensions must be non-zero: width={0}, height={1}")]
    ZeroDimensions(usize, usize),

    #[error("{format} requires even frame dimensions: width={width}, height={height}")]
    OddDimensions {
        format: &'static str,
        width: usize,
        height: usize,
    },

    #[error("{demosaic} demosaic needs at least {min}x{min} frames: width={width}, height={height}")]
    FrameTooSmall {
        demosaic: &'static str,
        min: usize,
        width: usize,
        height: usize,
    },

    #[error("Frame size overflows: width={0}, height={1}")]
    FrameTooLarge(usize, usize),

    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    #[error("Queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("JPEG quality must be within 1..=100, got {0}")]
    InvalidQuality(u8),

    #[error("Input path does not exist: {0}")]
    InputNotFound(PathBuf),

    #[error("Output directory is not usable: {path}: {reason}")]
    OutputDirUnavailable { path: PathBuf, reason: String },
}

/// Errors that stop a batch before any file is processed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start worker threads: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_input_is_io_kind() {
        let err = ConversionError::TruncatedInput {
            path: PathBuf::from("frame.raw"),
            expected: 16,
            actual: 15,
        };
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("expected 16 bytes, found 15"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ConversionError::InvalidInput("x".into()).kind(), ErrorKind::InvalidInput);
        assert_eq!(ConversionError::InvalidDimensions(3, 2).kind(), ErrorKind::InvalidInput);
        assert_eq!(ConversionError::EncodeError("x".into()).kind(), ErrorKind::Encode);
        assert_eq!(ConversionError::WorkerPanic("boom".into()).kind(), ErrorKind::Internal);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(ConversionError::from(io).kind(), ErrorKind::Io);
    }
}
