//! Bilinear CFA interpolation on 8-bit planes.
//!
//! Each missing channel is the rounded mean of the same-color sites in the
//! pixel's 3x3 neighborhood. That is the classic kernel: four orthogonal or
//! four diagonal neighbors at R/B sites, two neighbors for R/B at G sites.
//! At the border only in-bounds sites count, so nothing is mirrored.

use tracing::trace;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::convert::types::RgbImage;
use crate::image_pipeline::debayer::types::cfa_layout;
use crate::image_pipeline::raw::types::CfaPattern;

pub fn demosaic_bilinear(plane: &[u8], width: usize, height: usize, pattern: CfaPattern) -> Result<RgbImage> {
    // Every clamped 3x3 window must cover a whole 2x2 tile.
    if width < 2 || height < 2 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }
    if plane.len() != width * height {
        return Err(ConversionError::InvalidInput(format!(
            "Bayer plane {width}x{height} needs {} samples, buffer holds {}",
            width * height,
            plane.len()
        )));
    }

    trace!(width, height, %pattern, "Bilinear demosaic");

    let layout = cfa_layout(pattern);
    let mut out = vec![0u8; width * height * 3];

    for (y, out_row) in out.chunks_exact_mut(width * 3).enumerate() {
        let y0 = y.saturating_sub(1);
        let y1 = (y + 1).min(height - 1);
        let own_row = &plane[y * width..(y + 1) * width];

        for (x, px) in out_row.chunks_exact_mut(3).enumerate() {
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(width - 1);

            let mut sum = [0u32; 3];
            let mut count = [0u32; 3];
            for ny in y0..=y1 {
                let row = &plane[ny * width..(ny + 1) * width];
                let tile_row = &layout[ny % 2];
                for nx in x0..=x1 {
                    let c = tile_row[nx % 2].bgr_index();
                    sum[c] += row[nx] as u32;
                    count[c] += 1;
                }
            }

            let own = layout[y % 2][x % 2].bgr_index();
            for c in 0..3 {
                px[c] = if c == own {
                    own_row[x]
                } else {
                    ((sum[c] + count[c] / 2) / count[c]) as u8
                };
            }
        }
    }

    RgbImage::new(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::debayer::types::channel_at;

    #[test]
    fn test_uniform_plane_stays_uniform() {
        for pattern in CfaPattern::ALL {
            for value in [0u8, 37, 128, 255] {
                let plane = vec![value; 6 * 4];
                let image = demosaic_bilinear(&plane, 6, 4, pattern).unwrap();
                assert!(
                    image.data().iter().all(|&c| c == value),
                    "{pattern} value {value}"
                );
            }
        }
    }

    #[test]
    fn test_sampled_channel_passes_through() {
        let plane: Vec<u8> = (0..16).map(|i| (i * 13) as u8).collect();
        for pattern in CfaPattern::ALL {
            let image = demosaic_bilinear(&plane, 4, 4, pattern).unwrap();
            for y in 0..4 {
                for x in 0..4 {
                    let c = channel_at(pattern, x, y).bgr_index();
                    assert_eq!(image.pixel(x, y)[c], plane[y * 4 + x]);
                }
            }
        }
    }

    #[test]
    fn test_interior_uses_classic_kernel() {
        // RGGB 4x4, interior red site at (2, 2).
        #[rustfmt::skip]
        let plane: Vec<u8> = vec![
            10, 20, 30, 40,
            50, 60, 70, 80,
            90, 100, 110, 120,
            130, 140, 150, 160,
        ];
        let image = demosaic_bilinear(&plane, 4, 4, CfaPattern::Rggb).unwrap();
        let [b, g, r] = image.pixel(2, 2);
        assert_eq!(r, 110);
        // Orthogonal greens: 70, 100, 120, 150.
        assert_eq!(g, 110);
        // Diagonal blues: 60, 80, 140, 160.
        assert_eq!(b, 110);
    }

    #[test]
    fn test_corner_uses_only_in_bounds_neighbors() {
        // RGGB: (0,0) is red; its only blue neighbor is (1,1).
        #[rustfmt::skip]
        let plane: Vec<u8> = vec![
            200, 10, 0, 0,
            30, 90, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ];
        let image = demosaic_bilinear(&plane, 4, 4, CfaPattern::Rggb).unwrap();
        assert_eq!(image.pixel(0, 0), [90, 20, 200]);
    }

    #[test]
    fn test_rejects_degenerate_frames() {
        assert!(matches!(
            demosaic_bilinear(&[1], 1, 1, CfaPattern::Rggb),
            Err(ConversionError::InvalidDimensions(1, 1))
        ));
        assert!(matches!(
            demosaic_bilinear(&[0; 7], 4, 2, CfaPattern::Rggb),
            Err(ConversionError::InvalidInput(_))
        ));
    }
}
