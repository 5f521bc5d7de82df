//! Types for debayering operations

use crate::image_pipeline::raw::types::CfaPattern;

/// Which color a Bayer site samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaChannel {
    Red,
    Green,
    Blue,
}

impl CfaChannel {
    /// Position of this channel inside a B, G, R pixel.
    #[inline]
    pub const fn bgr_index(self) -> usize {
        match self {
            CfaChannel::Blue => 0,
            CfaChannel::Green => 1,
            CfaChannel::Red => 2,
        }
    }
}

use CfaChannel::{Blue as B, Green as G, Red as R};

/// 2x2 tile of each pattern, indexed `[y % 2][x % 2]`.
pub const fn cfa_layout(pattern: CfaPattern) -> [[CfaChannel; 2]; 2] {
    match pattern {
        CfaPattern::Bggr => [[B, G], [G, R]],
        CfaPattern::Gbrg => [[G, B], [R, G]],
        CfaPattern::Rggb => [[R, G], [G, B]],
        CfaPattern::Grbg => [[G, R], [B, G]],
    }
}

#[inline]
pub fn channel_at(pattern: CfaPattern, x: usize, y: usize) -> CfaChannel {
    cfa_layout(pattern)[y % 2][x % 2]
}

/// Demosaic algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemosaicMethod {
    /// Built-in bilinear kernel with clamped borders.
    #[default]
    Bilinear,
    /// Replicates the nearest same-color sample (`bayer` crate).
    NearestNeighbour,
    /// Bicubic interpolation (`bayer` crate).
    Cubic,
}

impl DemosaicMethod {
    pub fn name(self) -> &'static str {
        match self {
            DemosaicMethod::Bilinear => "bilinear",
            DemosaicMethod::NearestNeighbour => "nearest",
            DemosaicMethod::Cubic => "cubic",
        }
    }

    /// Smallest width and height the algorithm accepts.
    pub fn min_frame_side(self) -> usize {
        match self {
            DemosaicMethod::Bilinear | DemosaicMethod::NearestNeighbour => 2,
            DemosaicMethod::Cubic => 4,
        }
    }
}
