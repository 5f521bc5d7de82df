//! RAW frame loading module
//!
//! Headerless sensor captures (NV12/NV21 YUV and 10-bit Bayer) are loaded into
//! owned, size-checked buffers here.

mod reader;
mod file_reader;
pub mod types;

pub use reader::RawImageReader;
pub use file_reader::FileRawReader;
pub use types::{CfaPattern, PixelFormat, RawBuffer};
