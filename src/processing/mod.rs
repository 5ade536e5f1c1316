//! # Capture Processing
//!
//! Turns a native-resolution frame and a native-space crop rectangle into encoded
//! image bytes:
//! 1. **Extract**: copy exactly the rectangle's pixels, blank where it leaves the frame
//! 2. **Scale**: resample to `floor(w * scale) × floor(h * scale)` for high-density displays
//! 3. **Encode**: compress to a single raster format
//!
//! Every step is synchronous and runs to completion.

pub mod encode;
pub mod extract;

use fast_image_resize::Resizer;
use image::RgbaImage;
use log::{debug, warn};
use snap_geom::cpu::scale_rgba_cpu;
use snap_geom::crop::Rect;
use snap_geom::fit::Size;

use crate::capture::RgbaFrame;
use crate::error::SnapResult;

pub use encode::{OutputFormat, encode};
pub use extract::extract_region;

/// Largest region a capture allocates for, in pixels (8192 × 8192).
pub const MAX_REGION_PIXELS: u64 = 1 << 26;

/// Whole-pixel size for `w × h`, `None` when a side is under one pixel or the
/// area exceeds [`MAX_REGION_PIXELS`].
pub(crate) fn bounded_size(w: f64, h: f64) -> Option<Size> {
    if !(w >= 1.0 && h >= 1.0) || !(w <= u32::MAX as f64 && h <= u32::MAX as f64) {
        return None;
    }
    let (w, h) = (w as u32, h as u32);
    let area = (w as u64).checked_mul(h as u64)?;
    (area <= MAX_REGION_PIXELS).then_some(Size { w, h })
}

/// Output buffer size for `rect` at `scale` device pixels per unit.
///
/// Returns `None` when either side floors to zero or the buffer would exceed
/// [`MAX_REGION_PIXELS`].
pub fn output_size(rect: &Rect, scale: f64) -> Option<Size> {
    bounded_size((rect.w * scale).floor(), (rect.h * scale).floor())
}

/// Extract `rect` from `frame` and scale it into the device-pixel output buffer.
///
/// Returns `None` for a crop with no usable area.
pub fn crop_frame(frame: &RgbaFrame, rect: &Rect, scale: f64) -> SnapResult<Option<RgbaImage>> {
    let Some(out) = output_size(rect, scale) else {
        if rect.w * scale >= 1.0 && rect.h * scale >= 1.0 {
            warn!(
                "Crop {:.0}x{:.0} at scale {} exceeds {} pixels, skipping",
                rect.w, rect.h, scale, MAX_REGION_PIXELS
            );
        }
        return Ok(None);
    };
    let Some(region) = extract_region(frame, rect) else {
        warn!("Crop {:?} cannot be extracted, skipping", rect);
        return Ok(None);
    };

    if region.dimensions() == (out.w, out.h) {
        return Ok(Some(region));
    }

    debug!(
        "Scaling crop {}x{} -> {} (scale {})",
        region.width(),
        region.height(),
        out,
        scale
    );
    let src = Size {
        w: region.width(),
        h: region.height(),
    };
    let mut dst = vec![0u8; out.w as usize * out.h as usize * 4];
    let mut resizer = Resizer::new();
    scale_rgba_cpu(&mut resizer, region.as_raw(), src, out, &mut dst)?;

    Ok(RgbaImage::from_raw(out.w, out.h, dst))
}
