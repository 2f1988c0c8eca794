//! Screen-space geometry: positions, sizes, and viewport clamping.
//!
//! All values are CSS pixels relative to the viewport origin (top-left).

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// Top-left offset of the widget from the viewport origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

impl Position {
    #[must_use]
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// Offset this position by a pointer delta.
    #[must_use]
    pub fn offset(self, delta: Point) -> Self {
        Self { left: self.left + delta.x, top: self.top + delta.y }
    }
}

/// A pointer location in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    #[must_use]
    pub fn delta_from(self, origin: Point) -> Point {
        Point { x: self.x - origin.x, y: self.y - origin.y }
    }
}

/// Width and height of a box, used for both viewport and widget.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Constrain `(left, top)` so a widget of size `widget` stays fully inside
/// `viewport`.
///
/// The upper bound on each axis is `viewport - widget`, floored at zero, so a
/// widget larger than the viewport is pinned to the origin on that axis.
/// NaN coordinates are treated as zero.
#[must_use]
pub fn clamp(left: f64, top: f64, viewport: Size, widget: Size) -> Position {
    Position {
        left: clamp_axis(left, viewport.width - widget.width),
        top: clamp_axis(top, viewport.height - widget.height),
    }
}

fn clamp_axis(value: f64, span: f64) -> f64 {
    let max = if span.is_nan() { 0.0 } else { span.max(0.0) };
    let value = if value.is_nan() { 0.0 } else { value };
    value.min(max).max(0.0)
}
