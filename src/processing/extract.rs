//! Pixel-exact region extraction.

use image::RgbaImage;
use snap_geom::crop::Rect;
use snap_geom::fit::Size;

use super::bounded_size;
use crate::capture::{PixelLayout, RgbaFrame};

/// Copy the pixels under `rect` out of `frame` into a new RGBA image.
///
/// The rectangle is snapped to whole pixels by rounding each edge. Parts of the
/// rectangle outside the frame stay transparent black, so a crop hanging off the
/// edge gives a partially blank image and a crop fully outside gives a blank one.
/// Returns `None` when the snapped rectangle has no area or is larger than
/// [`MAX_REGION_PIXELS`](super::MAX_REGION_PIXELS).
pub fn extract_region(frame: &RgbaFrame, rect: &Rect) -> Option<RgbaImage> {
    if !(rect.x.is_finite() && rect.y.is_finite()) {
        return None;
    }
    let Size { w, h } = bounded_size(rect.w.round(), rect.h.round())?;
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;

    let mut out = RgbaImage::new(w, h);

    // Overlap of the crop with the frame, in frame coordinates.
    let col_start = x0.max(0);
    let col_end = x0.saturating_add(w as i64).min(frame.width as i64);
    let row_start = y0.max(0);
    let row_end = y0.saturating_add(h as i64).min(frame.height as i64);
    if col_start >= col_end || row_start >= row_end {
        return Some(out);
    }
    let dst_col = (col_start - x0) as usize;
    let cols = (col_end - col_start) as usize;

    let row_bytes = w as usize * 4;
    let buf: &mut [u8] = &mut out;
    for sy in row_start..row_end {
        let dy = (sy - y0) as usize;
        let src_row = frame.row(sy as u32);
        let src = &src_row[col_start as usize * 4..(col_start as usize + cols) * 4];
        let dst_off = dy * row_bytes + dst_col * 4;
        let dst = &mut buf[dst_off..dst_off + cols * 4];
        match frame.layout {
            PixelLayout::Rgba => dst.copy_from_slice(src),
            PixelLayout::Bgra => {
                for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                    d.copy_from_slice(&[s[2], s[1], s[0], s[3]]);
                }
            }
        }
    }

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame whose pixel at (x, y) is [x, y, 0, 255].
    fn coords(w: u32, h: u32) -> RgbaFrame {
        RgbaFrame::from_rgba_image(RgbaImage::from_fn(w, h, |x, y| {
            image::Rgba([x as u8, y as u8, 0, 255])
        }))
    }

    #[test]
    fn copies_exact_region() {
        let out = extract_region(&coords(50, 40), &Rect::new(10.0, 5.0, 4.0, 3.0)).unwrap();
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.get_pixel(0, 0).0, [10, 5, 0, 255]);
        assert_eq!(out.get_pixel(3, 2).0, [13, 7, 0, 255]);
    }

    #[test]
    fn out_of_bounds_is_blank() {
        let out = extract_region(&coords(10, 10), &Rect::new(8.0, -2.0, 4.0, 4.0)).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        // inside the frame
        assert_eq!(out.get_pixel(0, 2).0, [8, 0, 0, 255]);
        assert_eq!(out.get_pixel(1, 3).0, [9, 1, 0, 255]);
        // rows above and columns right of the frame
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn fully_outside_is_fully_blank() {
        let out = extract_region(&coords(10, 10), &Rect::new(20.0, 20.0, 5.0, 5.0)).unwrap();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn bgra_frames_are_swizzled() {
        let frame = RgbaFrame::new(vec![1, 2, 3, 4, 5, 6, 7, 8], 2, 1, 8, PixelLayout::Bgra).unwrap();
        let out = extract_region(&frame, &Rect::new(0.0, 0.0, 2.0, 1.0)).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [3, 2, 1, 4]);
        assert_eq!(out.get_pixel(1, 0).0, [7, 6, 5, 8]);
    }

    #[test]
    fn far_away_offsets_stay_blank() {
        let out = extract_region(&coords(10, 10), &Rect::new(1e300, -1e300, 3.0, 2.0)).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
        let out = extract_region(&coords(10, 10), &Rect::new(-1e300, 1e300, 3.0, 2.0)).unwrap();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn oversized_rect_is_refused() {
        assert!(extract_region(&coords(10, 10), &Rect::new(0.0, 0.0, 1e10, 1e10)).is_none());
        assert!(extract_region(&coords(10, 10), &Rect::new(0.0, 0.0, f64::MAX, 1.0)).is_none());
    }

    #[test]
    fn sub_pixel_rect_is_empty() {
        assert!(extract_region(&coords(10, 10), &Rect::new(0.0, 0.0, 0.4, 3.0)).is_none());
    }
}
