//! Shared pixel container handed from sources to the capture pipeline.

use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use snap_geom::fit::Size;

use crate::error::{CaptureError, SnapResult};

/// Channel order of a 4-byte-per-pixel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgba,
    /// Common for camera and screen backends
    Bgra,
}

/// One frame at native resolution.
///
/// Cloning is cheap: the pixel buffer is reference counted so a source can keep
/// publishing while a capture reads an older frame.
#[derive(Clone, Debug)]
pub struct RgbaFrame {
    /// Raw pixel data. Length must be at least `stride * height`.
    pub data: Arc<Vec<u8>>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Bytes per row (may exceed `width * 4` due to padding)
    pub stride: usize,
    /// Channel order of `data`
    pub layout: PixelLayout,
}

impl RgbaFrame {
    /// Build a frame, checking that `data` covers `stride * height` bytes.
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        layout: PixelLayout,
    ) -> SnapResult<Self> {
        if stride < width as usize * 4 {
            return Err(CaptureError::processing(
                "frame",
                format!("stride {} shorter than row of {} pixels", stride, width),
            ));
        }
        let needed = stride * height as usize;
        if data.len() < needed {
            return Err(CaptureError::processing(
                "frame",
                format!("buffer holds {} bytes, {}x{} needs {}", data.len(), width, height, needed),
            ));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            stride,
            layout,
        })
    }

    /// Tightly packed RGBA frame from an image buffer.
    pub fn from_rgba_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: Arc::new(image.into_raw()),
            width,
            height,
            stride: width as usize * 4,
            layout: PixelLayout::Rgba,
        }
    }

    /// Convert any decoded image into a frame.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgba_image(image.into_rgba8())
    }

    pub fn size(&self) -> Size {
        Size {
            w: self.width,
            h: self.height,
        }
    }

    /// Pixel at `(x, y)` in RGBA order, `None` outside the frame.
    pub fn rgba_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.stride + x as usize * 4;
        let p = &self.data[i..i + 4];
        Some(match self.layout {
            PixelLayout::Rgba => [p[0], p[1], p[2], p[3]],
            PixelLayout::Bgra => [p[2], p[1], p[0], p[3]],
        })
    }

    /// Row `y` as raw bytes in this frame's layout, without padding.
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgra_reads_back_as_rgba() {
        let frame = RgbaFrame::new(vec![1, 2, 3, 4], 1, 1, 4, PixelLayout::Bgra).unwrap();
        assert_eq!(frame.rgba_at(0, 0), Some([3, 2, 1, 4]));
        assert_eq!(frame.rgba_at(1, 0), None);
    }

    #[test]
    fn padded_rows_are_skipped() {
        // 1x2 frame with 8-byte stride, second half of each row is padding
        let data = vec![10, 11, 12, 13, 0, 0, 0, 0, 20, 21, 22, 23, 0, 0, 0, 0];
        let frame = RgbaFrame::new(data, 1, 2, 8, PixelLayout::Rgba).unwrap();
        assert_eq!(frame.rgba_at(0, 1), Some([20, 21, 22, 23]));
        assert_eq!(frame.row(1), &[20, 21, 22, 23]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(RgbaFrame::new(vec![0; 7], 1, 2, 4, PixelLayout::Rgba).is_err());
        assert!(RgbaFrame::new(vec![0; 16], 2, 2, 4, PixelLayout::Rgba).is_err());
    }

    #[test]
    fn from_image_is_tightly_packed() {
        let frame = RgbaFrame::from_rgba_image(RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 6])));
        assert_eq!(frame.size(), Size::new(3, 2));
        assert_eq!(frame.stride, 12);
        assert_eq!(frame.rgba_at(2, 1), Some([9, 8, 7, 6]));
    }
}
