//! NV12 / NV21 semi-planar YUV 4:2:0 to BGR.
//!
//! Layout: `width * height` luma bytes, then `width * height / 2` bytes of
//! interleaved chroma, one pair per 2x2 block. Full-range BT.601 coefficients.

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::convert::types::RgbImage;

/// Interleave order of the chroma plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaOrder {
    /// NV12
    Uv,
    /// NV21
    Vu,
}

const KR_V: f32 = 1.402;
const KG_U: f32 = 0.344136;
const KG_V: f32 = 0.714136;
const KB_U: f32 = 1.772;

#[inline]
fn to_byte(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// One YUV triple to `[b, g, r]`.
#[inline]
pub fn yuv_to_bgr(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = y + KR_V * v;
    let g = y - KG_U * u - KG_V * v;
    let b = y + KB_U * u;

    [to_byte(b), to_byte(g), to_byte(r)]
}

pub fn semi_planar_to_bgr(data: &[u8], width: usize, height: usize, order: ChromaOrder) -> Result<RgbImage> {
    if data.is_empty() {
        return Err(ConversionError::InvalidInput("empty YUV buffer".to_string()));
    }
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }
    let luma_len = width * height;
    let expected = luma_len * 3 / 2;
    if data.len() != expected {
        return Err(ConversionError::InvalidInput(format!(
            "YUV 4:2:0 frame {width}x{height} needs {expected} bytes, buffer holds {}",
            data.len()
        )));
    }

    let (luma, chroma) = data.split_at(luma_len);
    let mut out = vec![0u8; luma_len * 3];

    for (y, row) in out.chunks_exact_mut(width * 3).enumerate() {
        let luma_row = &luma[y * width..(y + 1) * width];
        let chroma_row = &chroma[(y / 2) * width..(y / 2 + 1) * width];

        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            let pair = (x / 2) * 2;
            let (u, v) = match order {
                ChromaOrder::Uv => (chroma_row[pair], chroma_row[pair + 1]),
                ChromaOrder::Vu => (chroma_row[pair + 1], chroma_row[pair]),
            };
            px.copy_from_slice(&yuv_to_bgr(luma_row[x], u, v));
        }
    }

    RgbImage::new(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(width: usize, height: usize, y: u8, first: u8, second: u8) -> Vec<u8> {
        let mut data = vec![y; width * height];
        for _ in 0..(width * height / 4) {
            data.push(first);
            data.push(second);
        }
        data
    }

    #[test]
    fn test_mid_gray_is_gray() {
        let data = uniform_frame(8, 4, 128, 128, 128);
        let image = semi_planar_to_bgr(&data, 8, 4, ChromaOrder::Uv).unwrap();
        for px in image.data().chunks_exact(3) {
            for &c in px {
                assert!((c as i32 - 128).abs() <= 1, "channel {c} not mid-gray");
            }
        }
    }

    #[test]
    fn test_extremes_are_clamped() {
        assert_eq!(yuv_to_bgr(255, 255, 255), [255, 121, 255]);
        assert_eq!(yuv_to_bgr(0, 0, 0), [0, 135, 0]);
    }

    #[test]
    fn test_chroma_order_swaps_red_and_blue() {
        // U high, V low: strongly blue for NV12, strongly red when read as NV21.
        let data = uniform_frame(2, 2, 100, 200, 60);
        let nv12 = semi_planar_to_bgr(&data, 2, 2, ChromaOrder::Uv).unwrap();
        let nv21 = semi_planar_to_bgr(&data, 2, 2, ChromaOrder::Vu).unwrap();

        let [b12, _, r12] = nv12.pixel(0, 0);
        let [b21, _, r21] = nv21.pixel(0, 0);
        assert!(b12 > r12);
        assert!(r21 > b21);
    }

    #[test]
    fn test_chroma_shared_by_2x2_block() {
        // 4x2 frame: two chroma blocks, left neutral, right saturated.
        let mut data = vec![128u8; 8];
        data.extend_from_slice(&[128, 128, 255, 128]);
        let image = semi_planar_to_bgr(&data, 4, 2, ChromaOrder::Uv).unwrap();

        assert_eq!(image.pixel(0, 0), image.pixel(1, 1));
        assert_eq!(image.pixel(2, 0), image.pixel(3, 1));
        assert_ne!(image.pixel(1, 0), image.pixel(2, 0));
    }

    #[test]
    fn test_rejects_bad_input_before_conversion() {
        assert!(matches!(
            semi_planar_to_bgr(&[], 4, 2, ChromaOrder::Uv),
            Err(ConversionError::InvalidInput(_))
        ));
        assert!(matches!(
            semi_planar_to_bgr(&[0u8; 9], 3, 2, ChromaOrder::Uv),
            Err(ConversionError::InvalidDimensions(3, 2))
        ));
        assert!(matches!(
            semi_planar_to_bgr(&[0u8; 11], 4, 2, ChromaOrder::Uv),
            Err(ConversionError::InvalidInput(_))
        ));
    }
}
