//! Pan/zoom mathematics.
//!
//! This module contains the pure functions behind the viewport transform,
//! extracted for testability and reusability.

use imgpan_input::{Point, Size};

/// Scales this close to a bound are snapped onto it, so accumulated float
/// error from repeated steps still reaches the bound exactly.
const BOUND_SNAP_EPSILON: f32 = 1e-4;

/// Uniform scale plus the image's top-left offset inside its container.
///
/// The scale is applied around the image's own center, so it never moves the
/// layout offset; `x`/`y` are absolute pixel offsets from the container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
}

impl Transform {
    /// Create a new transform with the given scale and offset.
    pub fn new(scale: f32, x: f32, y: f32) -> Self {
        Self { scale, x, y }
    }

    /// Create an identity transform (scale=1, no offset).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Apply a pan delta to the transform. Pan range is unbounded.
    pub fn pan_by(&self, dx: f32, dy: f32) -> Transform {
        Transform {
            scale: self.scale,
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Value for the CSS `transform` property.
    pub fn css_transform(&self) -> String {
        format!("scale({})", self.scale)
    }

    /// Value for the CSS `left` property.
    pub fn css_left(&self) -> String {
        format!("{}px", self.x)
    }

    /// Value for the CSS `top` property.
    pub fn css_top(&self) -> String {
        format!("{}px", self.y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Clamp a requested scale into `[min, max]`.
///
/// Non-finite requests fall back to `min`; out-of-range values are never an error.
/// Values within `BOUND_SNAP_EPSILON` of a bound become that bound; everything
/// else is kept as requested.
pub fn clamp_scale(scale: f32, min: f32, max: f32) -> f32 {
    if !scale.is_finite() {
        return min;
    }
    if (scale - max).abs() < BOUND_SNAP_EPSILON {
        return max;
    }
    if (scale - min).abs() < BOUND_SNAP_EPSILON {
        return min;
    }
    scale.clamp(min, max)
}

/// Offset that centers `image` inside `container`.
///
/// Negative when the image is larger than the container.
pub fn centered_offset(container: Size, image: Size) -> Point {
    Point::new(
        (container.width - image.width) / 2.0,
        (container.height - image.height) / 2.0,
    )
}

/// Scale at which `image` fits entirely inside `container`, preserving aspect ratio.
///
/// Returns `None` while either size is not measurable.
pub fn fit_scale(image: Size, container: Size) -> Option<f32> {
    if image.is_empty() || container.is_empty() {
        return None;
    }
    Some((container.width / image.width).min(container.height / image.height))
}
