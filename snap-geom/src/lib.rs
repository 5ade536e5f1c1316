// SPDX-License-Identifier: MIT
//! # snap-geom: Crop Geometry for Still Capture
//!
//! This crate turns relative, possibly mixed-unit crop descriptions into absolute
//! pixel rectangles, fits a source to a fixed display width, and resamples pixel
//! regions into caller-provided buffers.
//!
//! ## Architecture Overview
//!
//! The crate has no state and no I/O. Every function is pure and total:
//! 1. **Resolve**: [`crop::resolve`] maps `(space width, space height, CropSpec)` to a [`crop::Rect`]
//! 2. **Fit**: [`fit::viewport_for`] derives the on-screen viewport from the native size
//! 3. **Scale**: [`cpu::scale_rgba_cpu`] resamples an RGBA region for high-density output
//!
//! ## Coordinate Spaces
//!
//! A `Rect` is always expressed in the pixel units of the dimensions it was resolved
//! against. Resolving the same spec against the viewport and against the native
//! resolution gives the overlay rectangle and the extraction rectangle respectively.
//!
//! ## Usage Example
//!
//! ```rust
//! use snap_geom::crop::{resolve, Anchor, CropSpec};
//! use snap_geom::fit::{viewport_for, Size};
//!
//! let native = Size { w: 1920, h: 1080 };
//! let viewport = viewport_for(native, 320);
//! assert_eq!(viewport, Size { w: 320, h: 180 });
//!
//! let spec = CropSpec::new()
//!     .left(Anchor::Center)
//!     .top(Anchor::Start)
//!     .width(0.5)
//!     .ratio(1.0);
//!
//! let overlay = resolve(viewport.w as f64, viewport.h as f64, &spec);
//! assert_eq!((overlay.x, overlay.y, overlay.w, overlay.h), (80.0, 0.0, 160.0, 160.0));
//!
//! let native_rect = resolve(native.w as f64, native.h as f64, &spec);
//! assert_eq!((native_rect.x, native_rect.w), (480.0, 960.0));
//! ```

pub mod cpu;
pub mod crop;
pub mod fit;
