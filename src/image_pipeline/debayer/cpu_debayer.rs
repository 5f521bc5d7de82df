use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::convert::types::RgbImage;
use crate::image_pipeline::debayer::types::DemosaicMethod;
use crate::image_pipeline::raw::types::CfaPattern;

/// Demosaics 8-bit planes through the `bayer` crate.
pub struct CpuDebayer {
    algorithm: Demosaic,
    min_side: usize,
}

impl CpuDebayer {
    pub fn nearest_neighbour() -> Self {
        Self {
            algorithm: Demosaic::NearestNeighbour,
            min_side: DemosaicMethod::NearestNeighbour.min_frame_side(),
        }
    }

    pub fn cubic() -> Self {
        Self {
            algorithm: Demosaic::Cubic,
            min_side: DemosaicMethod::Cubic.min_frame_side(),
        }
    }

    pub fn process(&self, plane: &[u8], width: usize, height: usize, pattern: CfaPattern) -> Result<RgbImage> {
        if width < self.min_side || height < self.min_side {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        if plane.len() != width * height {
            return Err(ConversionError::InvalidInput(format!(
                "Bayer plane {width}x{height} needs {} samples, buffer holds {}",
                width * height,
                plane.len()
            )));
        }

        debug!(width, height, %pattern, algorithm = ?self.algorithm, "Running bayer crate demosaic");

        let mut output_buf = vec![0u8; width * height * 3];
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth8, &mut output_buf);

        bayer::run_demosaic(
            &mut Cursor::new(plane),
            BayerDepth::Depth8,
            cfa_for(pattern),
            self.algorithm,
            &mut output_raster,
        )
        .map_err(|e| ConversionError::DemosaicError(format!("{e:?}")))?;

        // The crate writes R, G, B.
        for px in output_buf.chunks_exact_mut(3) {
            px.swap(0, 2);
        }

        RgbImage::new(width, height, output_buf)
    }
}

fn cfa_for(pattern: CfaPattern) -> CFA {
    match pattern {
        CfaPattern::Bggr => CFA::BGGR,
        CfaPattern::Gbrg => CFA::GBRG,
        CfaPattern::Rggb => CFA::RGGB,
        CfaPattern::Grbg => CFA::GRBG,
    }
}
