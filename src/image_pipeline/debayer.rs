//! Debayering module for converting Bayer pattern planes to BGR

pub mod bilinear;
pub mod cpu_debayer;
pub mod types;

pub use bilinear::demosaic_bilinear;
pub use cpu_debayer::CpuDebayer;
pub use types::{CfaChannel, DemosaicMethod, cfa_layout, channel_at};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::convert::types::RgbImage;
use crate::image_pipeline::raw::types::CfaPattern;

/// Demosaics an 8-bit, one-sample-per-site plane with the chosen method.
pub fn demosaic(
    plane: &[u8],
    width: usize,
    height: usize,
    pattern: CfaPattern,
    method: DemosaicMethod,
) -> Result<RgbImage> {
    match method {
        DemosaicMethod::Bilinear => demosaic_bilinear(plane, width, height, pattern),
        DemosaicMethod::NearestNeighbour => CpuDebayer::nearest_neighbour().process(plane, width, height, pattern),
        DemosaicMethod::Cubic => CpuDebayer::cubic().process(plane, width, height, pattern),
    }
}
