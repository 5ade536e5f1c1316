// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out, direct write into caller-provided dst buffer.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};

use crate::fit::Size;

#[derive(Debug)]
pub enum ScaleError {
    BufferTooSmall,
    EmptyImage,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
}

impl From<fir::ResizeError> for ScaleError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for ScaleError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::BufferTooSmall => write!(f, "Output buffer too small"),
            ScaleError::EmptyImage => write!(f, "Source or destination has a zero dimension"),
            ScaleError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            ScaleError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
        }
    }
}

impl std::error::Error for ScaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaleError::Fir(e) => Some(e),
            ScaleError::ImageBuf(e) => Some(e),
            _ => None,
        }
    }
}

/// Resample a tightly packed RGBA8 image of size `src` into `dst` of size `out`.
/// `dst` must hold at least `out.w * out.h * 4` bytes.
pub fn scale_rgba_cpu(
    resizer: &mut Resizer,
    src_rgba: &[u8],
    src: Size,
    out: Size,
    dst: &mut [u8],
) -> Result<(), ScaleError> {
    if src.is_empty() || out.is_empty() {
        return Err(ScaleError::EmptyImage);
    }
    let dst_len = (out.w as usize) * (out.h as usize) * 4;
    if dst.len() < dst_len {
        return Err(ScaleError::BufferTooSmall);
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(src.w, src.h, src_rgba)?;
    let mut dst_image = TypedImage::<U8x4>::from_buffer(out.w, out.h, &mut dst[..dst_len])?;

    // Blank (fully transparent) pixels from out-of-bounds crops must not bleed colour.
    let opts = ResizeOptions::new().use_alpha(true);
    resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: Size, px: [u8; 4]) -> Vec<u8> {
        px.iter().copied().cycle().take((size.w * size.h * 4) as usize).collect()
    }

    #[test]
    fn doubles_a_solid_region() {
        let src = Size::new(4, 3);
        let out = Size::new(8, 6);
        let data = solid(src, [10, 20, 30, 255]);
        let mut dst = vec![0u8; (out.w * out.h * 4) as usize];
        let mut resizer = Resizer::new();
        scale_rgba_cpu(&mut resizer, &data, src, out, &mut dst).unwrap();
        let close = |a: u8, b: u8| a.abs_diff(b) <= 1;
        assert!(dst
            .chunks_exact(4)
            .all(|p| close(p[0], 10) && close(p[1], 20) && close(p[2], 30) && close(p[3], 255)));
    }

    #[test]
    fn rejects_short_destination() {
        let src = Size::new(2, 2);
        let data = solid(src, [0, 0, 0, 255]);
        let mut dst = vec![0u8; 4];
        let mut resizer = Resizer::new();
        let err = scale_rgba_cpu(&mut resizer, &data, src, Size::new(4, 4), &mut dst);
        assert!(matches!(err, Err(ScaleError::BufferTooSmall)));
    }

    #[test]
    fn short_source_buffer_is_an_error() {
        let mut dst = vec![0u8; 16 * 4];
        let mut resizer = Resizer::new();
        let err = scale_rgba_cpu(&mut resizer, &[0u8; 8], Size::new(2, 2), Size::new(4, 4), &mut dst);
        assert!(matches!(err, Err(ScaleError::ImageBuf(_))));
    }

    #[test]
    fn empty_sizes_are_rejected() {
        let mut resizer = Resizer::new();
        let mut dst = vec![0u8; 16];
        let err = scale_rgba_cpu(&mut resizer, &[], Size::ZERO, Size::new(2, 2), &mut dst);
        assert!(matches!(err, Err(ScaleError::EmptyImage)));
    }
}
