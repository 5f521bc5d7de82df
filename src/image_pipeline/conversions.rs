//! Pipeline conversions module
//!
//! Orchestration of a single file's load, convert, and encode stages.

mod raw_to_image;
mod timing;


pub use raw_to_image::{RawToImagePipeline, output_path_for};
pub use timing::{PipelineTimings, StepTiming, Timer};
