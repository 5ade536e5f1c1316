//! # Crop Overlay
//!
//! Display-side geometry for the live preview: the crop rectangle in viewport
//! units, the darkened bands around it, and a ready-to-composite mask image.
//! Nothing here touches source pixels.

use image::{Rgba, RgbaImage};
use snap_geom::crop::Rect;
use snap_geom::fit::Size;

/// Dim level of the area outside the crop (50% black).
pub const MASK_ALPHA: u8 = 128;
const MASK: Rgba<u8> = Rgba([0, 0, 0, MASK_ALPHA]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const BORDER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Live crop rectangle over a viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overlay {
    pub viewport: Size,
    pub crop: Rect,
}

impl Overlay {
    pub fn new(viewport: Size, crop: Rect) -> Self {
        Self { viewport, crop }
    }

    /// The crop clipped to the viewport, `None` when nothing of it is visible.
    pub fn visible_crop(&self) -> Option<Rect> {
        if self.crop.is_degenerate() {
            return None;
        }
        let (vw, vh) = (self.viewport.w as f64, self.viewport.h as f64);
        let x0 = self.crop.x.clamp(0.0, vw);
        let x1 = self.crop.right().clamp(0.0, vw);
        let y0 = self.crop.y.clamp(0.0, vh);
        let y1 = self.crop.bottom().clamp(0.0, vh);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Rectangles to darken: up to four bands around the visible crop, or the
    /// whole viewport when no crop is visible.
    pub fn mask_regions(&self) -> Vec<Rect> {
        let (vw, vh) = (self.viewport.w as f64, self.viewport.h as f64);
        let Some(c) = self.visible_crop() else {
            if self.viewport.is_empty() {
                return Vec::new();
            }
            return vec![Rect::new(0.0, 0.0, vw, vh)];
        };

        let bands = [
            Rect::new(0.0, 0.0, vw, c.y),
            Rect::new(0.0, c.bottom(), vw, vh - c.bottom()),
            Rect::new(0.0, c.y, c.x, c.h),
            Rect::new(c.right(), c.y, vw - c.right(), c.h),
        ];
        bands.into_iter().filter(|r| !r.is_degenerate()).collect()
    }

    /// Stroke path for a 1px border drawn just inside the crop edge.
    pub fn outline(&self) -> Rect {
        Rect::new(
            self.crop.x + 0.5,
            self.crop.y + 0.5,
            self.crop.w - 1.0,
            self.crop.h - 1.0,
        )
    }

    /// Rasterise the overlay: dimmed outside the crop, clear inside, white border.
    pub fn render_mask(&self) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(self.viewport.w, self.viewport.h, MASK);
        let Some(c) = self.visible_crop() else {
            return img;
        };

        let (x0, x1) = (c.x.round() as u32, c.right().round() as u32);
        let (y0, y1) = (c.y.round() as u32, c.bottom().round() as u32);
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, CLEAR);
            }
        }

        // Border sits on the crop's own edge pixels; edges outside the viewport are skipped.
        let (bx0, bx1) = (self.crop.x.round() as i64, (self.crop.right().round() as i64).saturating_sub(1));
        let (by0, by1) = (self.crop.y.round() as i64, (self.crop.bottom().round() as i64).saturating_sub(1));
        let (vw, vh) = (self.viewport.w as i64, self.viewport.h as i64);
        let mut plot = |x: i64, y: i64| {
            if (0..vw).contains(&x) && (0..vh).contains(&y) {
                img.put_pixel(x as u32, y as u32, BORDER);
            }
        };
        for x in bx0.max(-1)..=bx1.min(vw) {
            plot(x, by0);
            plot(x, by1);
        }
        for y in by0.max(-1)..=by1.min(vh) {
            plot(bx0, y);
            plot(bx1, y);
        }
        img
    }
}
