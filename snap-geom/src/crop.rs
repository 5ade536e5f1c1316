// SPDX-License-Identifier: MIT
//! # Crop Rectangle Resolution
//!
//! A [`CropSpec`] describes the wanted crop in relative terms: fractional offsets or
//! named anchors for position, fractional width/height for size, and an optional
//! ratio to derive a missing side. [`resolve`] turns that description into an
//! absolute [`Rect`] for any pixel space.
//!
//! ## Resolution Rules
//!
//! 1. **Size**: both `width` and `height` present → `w = width * W`, `h = height * H`.
//!    Otherwise, with a `ratio` and exactly one side present, the missing side is
//!    `ratio * known side in pixels`. Anything else resolves to `w = h = 0`.
//! 2. **Horizontal offset**: a fraction gives `x = left * W`; an anchor gives
//!    `0`, `W/2 - w/2` or `W - w`; anything else gives `0`.
//! 3. **Vertical offset**: the same with `top`, `H` and `h`.
//!
//! Resolution is total. Missing, non-finite or unrecognised fields degrade to the
//! defaults above and the result is never clamped to the space: a rectangle that
//! hangs off the edge is returned as computed.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Axis-neutral anchor for an offset.
///
/// On the horizontal axis these read as left/center/right, on the vertical axis
/// as top/center/bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    fn offset(self, space: f64, extent: f64) -> f64 {
        match self {
            Anchor::Start => 0.0,
            Anchor::Center => space / 2.0 - extent / 2.0,
            Anchor::End => space - extent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Case-insensitive keyword lookup for this axis.
    fn anchor_for(self, keyword: &str) -> Option<Anchor> {
        let keyword = keyword.trim().to_ascii_lowercase();
        match (self, keyword.as_str()) {
            (_, "start") | (_, "center") | (_, "end") => parse_anchor(&keyword),
            (Axis::Horizontal, "left") | (Axis::Vertical, "top") => Some(Anchor::Start),
            (Axis::Horizontal, "right") | (Axis::Vertical, "bottom") => Some(Anchor::End),
            _ => None,
        }
    }
}

fn parse_anchor(s: &str) -> Option<Anchor> {
    match s.trim().to_ascii_lowercase().as_str() {
        "start" => Some(Anchor::Start),
        "center" => Some(Anchor::Center),
        "end" => Some(Anchor::End),
        _ => None,
    }
}

/// Position of the crop along one axis.
#[derive(Clone, Debug, PartialEq)]
pub enum Offset {
    /// Fraction of the space, normally in `[0, 1]`.
    Fraction(f64),
    /// Axis-neutral anchor.
    Anchor(Anchor),
    /// Axis-specific keyword such as `left` or `bottom`, matched case-insensitively
    /// when resolved. Unknown keywords resolve to 0.
    Keyword(String),
}

impl Offset {
    fn resolve(&self, axis: Axis, space: f64, extent: f64) -> f64 {
        let anchor = match self {
            Offset::Fraction(f) if f.is_finite() => return f * space,
            Offset::Fraction(_) => None,
            Offset::Anchor(anchor) => Some(*anchor),
            Offset::Keyword(keyword) => axis.anchor_for(keyword),
        };
        match anchor.map(|a| a.offset(space, extent)) {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

/// Never fails: numbers become fractions (a fraction always wins over an anchor),
/// `start`/`center`/`end` become anchors and everything else is kept as a keyword.
impl FromStr for Offset {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(f) = s.trim().parse::<f64>() {
            return Ok(Offset::Fraction(f));
        }
        Ok(match parse_anchor(s) {
            Some(anchor) => Offset::Anchor(anchor),
            None => Offset::Keyword(s.to_string()),
        })
    }
}

impl From<f64> for Offset {
    fn from(f: f64) -> Self {
        Offset::Fraction(f)
    }
}

impl From<Anchor> for Offset {
    fn from(anchor: Anchor) -> Self {
        Offset::Anchor(anchor)
    }
}

impl From<&str> for Offset {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(offset) => offset,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Fraction(v) => write!(f, "{}", v),
            Offset::Anchor(Anchor::Start) => f.write_str("start"),
            Offset::Anchor(Anchor::Center) => f.write_str("center"),
            Offset::Anchor(Anchor::End) => f.write_str("end"),
            Offset::Keyword(k) => f.write_str(k),
        }
    }
}

/// Caller-declared crop in relative terms.
///
/// All fields are optional; see the module docs for how absent fields resolve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CropSpec {
    pub left: Option<Offset>,
    pub top: Option<Offset>,
    /// Fraction of the space width.
    pub width: Option<f64>,
    /// Fraction of the space height.
    pub height: Option<f64>,
    /// Multiplier deriving the missing side from the known side's pixel size.
    pub ratio: Option<f64>,
}

impl CropSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(mut self, left: impl Into<Offset>) -> Self {
        self.left = Some(left.into());
        self
    }

    pub fn top(mut self, top: impl Into<Offset>) -> Self {
        self.top = Some(top.into());
        self
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn ratio(mut self, ratio: f64) -> Self {
        self.ratio = Some(ratio);
        self
    }
}

/// Absolute rectangle in the pixel units of the space it was resolved against.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// No usable crop area.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Carry this rectangle into another space.
    pub fn scaled(&self, sx: f64, sy: f64) -> Rect {
        Rect {
            x: self.x * sx,
            y: self.y * sy,
            w: self.w * sx,
            h: self.h * sy,
        }
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

/// Resolve `spec` against a `space_width × space_height` pixel space.
pub fn resolve(space_width: f64, space_height: f64, spec: &CropSpec) -> Rect {
    let (w, h) = match (finite(spec.width), finite(spec.height), finite(spec.ratio)) {
        (Some(width), Some(height), _) => (width * space_width, height * space_height),
        (Some(width), None, Some(ratio)) => {
            let w = width * space_width;
            (w, ratio * w)
        }
        (None, Some(height), Some(ratio)) => {
            let h = height * space_height;
            (ratio * h, h)
        }
        _ => (0.0, 0.0),
    };

    let x = spec
        .left
        .as_ref()
        .map_or(0.0, |o| o.resolve(Axis::Horizontal, space_width, w));
    let y = spec
        .top
        .as_ref()
        .map_or(0.0, |o| o.resolve(Axis::Vertical, space_height, h));

    Rect { x, y, w, h }
}
