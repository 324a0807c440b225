//! Coordinate spaces, hit-testing and drag clamping.
//!
//! Three spaces are involved:
//!
//! - **display space**: where the host reports pointer positions (e.g. CSS
//!   pixels of the on-screen canvas rectangle),
//! - **canvas space**: the fixed logical size the design is authored in
//!   (400x500 by default),
//! - **element space**: an element's box rotated about its center, used
//!   only when drawing.
//!
//! Hit-testing and dragging work purely in canvas space on unrotated boxes.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Element, ElementId, Scene, Transform};

/// A point in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edge-inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Corners in the order top-left, top-right, bottom-left, bottom-right.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        [
            Point::new(self.x, self.y),
            Point::new(right, self.y),
            Point::new(self.x, bottom),
            Point::new(right, bottom),
        ]
    }
}

/// Logical canvas size in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl CanvasSize {
    /// Create a canvas size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(400.0, 500.0)
    }
}

/// The rectangle the canvas currently occupies on the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    /// Left edge in display units.
    pub left: f64,
    /// Top edge in display units.
    pub top: f64,
    /// Rendered width in display units.
    pub width: f64,
    /// Rendered height in display units.
    pub height: f64,
}

impl DisplayRect {
    /// Create a display rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A display rectangle at the origin with the canvas's own size (1:1).
    #[must_use]
    pub const fn identity(canvas: CanvasSize) -> Self {
        Self::new(0.0, 0.0, canvas.width, canvas.height)
    }

    /// Check that pointers can be mapped through this rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidDisplay`] if the origin is not finite or
    /// the size is not finite and positive.
    pub fn validate(&self) -> CanvasResult<()> {
        let sized = |v: f64| v.is_finite() && v > 0.0;
        if !(self.left.is_finite() && self.top.is_finite()) {
            return Err(CanvasError::InvalidDisplay(format!(
                "origin must be finite, got ({}, {})",
                self.left, self.top
            )));
        }
        if !(sized(self.width) && sized(self.height)) {
            return Err(CanvasError::InvalidDisplay(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Map a pointer position in display space to canvas space.
///
/// `canvas = (pointer - rect.origin) * canvas_size / rect_size`, so
/// interaction is independent of how large the canvas is drawn on screen.
#[must_use]
pub fn map_pointer(pointer: Point, rect: DisplayRect, canvas: CanvasSize) -> Point {
    Point::new(
        (pointer.x - rect.left) * canvas.width / rect.width,
        (pointer.y - rect.top) * canvas.height / rect.height,
    )
}

/// Find the topmost element whose unrotated box contains `point`.
///
/// Later elements in the scene are drawn on top, so the scan runs from the
/// end of the list.
#[must_use]
pub fn hit_test(scene: &Scene, point: Point) -> Option<&Element> {
    scene
        .elements()
        .iter()
        .rev()
        .find(|element| element.contains_point(point))
}

/// Id-only variant of [`hit_test`].
#[must_use]
pub fn hit_test_id(scene: &Scene, point: Point) -> Option<ElementId> {
    hit_test(scene, point).map(|element| element.id.clone())
}

/// Apply a drag delta to a box, keeping it inside the canvas.
///
/// Returns the new top-left corner
/// `(max(0, min(W - w, x + dx)), max(0, min(H - h, y + dy)))`.
/// An element larger than the canvas is pinned to the origin. A non-finite
/// delta leaves the box where it is.
#[must_use]
pub fn apply_drag(transform: &Transform, delta: Point, canvas: CanvasSize) -> Point {
    if !delta.is_finite() {
        return Point::new(transform.x, transform.y);
    }
    let x = (transform.x + delta.x)
        .min(canvas.width - transform.width)
        .max(0.0);
    let y = (transform.y + delta.y)
        .min(canvas.height - transform.height)
        .max(0.0);
    Point::new(x, y)
}

/// Rotation of an element's box about its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Pivot point (box center).
    pub center: Point,
    /// Angle in degrees, as stored on the element.
    pub degrees: f64,
}

impl Rotation {
    /// Rotation for an element's transform.
    #[must_use]
    pub fn of(transform: &Transform) -> Self {
        Self {
            center: transform.center(),
            degrees: transform.rotation,
        }
    }

    /// Angle in radians: `degrees * PI / 180`.
    #[must_use]
    pub fn radians(&self) -> f64 {
        self.degrees * std::f64::consts::PI / 180.0
    }

    /// Whether the rotation has any visual effect.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.degrees.rem_euclid(360.0) == 0.0
    }

    /// Rotate a canvas point about the pivot.
    ///
    /// Uses the screen convention (y down), so positive angles turn
    /// clockwise on screen.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        let (sin, cos) = self.radians().sin_cos();
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        Point::new(
            self.center.x + dx * cos - dy * sin,
            self.center.y + dx * sin + dy * cos,
        )
    }

    /// Equivalent 2D affine matrix `[a, b, c, d, e, f]` for
    /// translate(center) * rotate(angle) * translate(-center).
    #[must_use]
    pub fn matrix(&self) -> [f64; 6] {
        let (sin, cos) = self.radians().sin_cos();
        let Point { x: cx, y: cy } = self.center;
        [
            cos,
            sin,
            -sin,
            cos,
            cx - cos * cx + sin * cy,
            cy - sin * cx - cos * cy,
        ]
    }
}
