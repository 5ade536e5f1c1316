// SPDX-License-Identifier: MIT
//! # Viewport Fitting
//!
//! The viewport is the on-screen rectangle the user looks at while framing a shot.
//! Its width is fixed by the caller; its height follows the source's native aspect
//! ratio so the preview is never distorted.
//!
//! ## Rounding
//!
//! The height is floored, never rounded, so the viewport never grows past the
//! aspect-correct height: `h = floor(native.h / (native.w / display_width))`.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const ZERO: Size = Size { w: 0, h: 0 };

    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Width over height, `None` for an empty size.
    pub fn aspect(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.w as f64 / self.h as f64)
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Fit a source of `native` resolution to a fixed `display_width`.
///
/// The returned width is always `display_width`. A source with zero native width
/// has no aspect ratio, so the height degrades to 0 instead of dividing by zero.
pub fn viewport_for(native: Size, display_width: u32) -> Size {
    if native.w == 0 || display_width == 0 {
        return Size {
            w: display_width,
            h: 0,
        };
    }
    let downscale = native.w as f64 / display_width as f64;
    let h = (native.h as f64 / downscale).floor();
    Size {
        w: display_width,
        h: h.max(0.0) as u32,
    }
}
