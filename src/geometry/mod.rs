//! .
//!
//! Pixel coordinates are 1-based: column `x` covers the interval `[x - 1, x]` and its centre
//! is at `x - 0.5`. Primitive positions live in `[1, W] × [1, H]`.

use {
  euclid::{Box2D, Point2D}
};

pub mod shapes;
pub use shapes::*;

/// Pixel coordinate basis
#[derive(Debug, Copy, Clone)]
pub struct PixelSpace;

/// Half-open pixel rectangle: `min` inclusive, `max` exclusive, 1-based.
pub type PixelBox = Box2D<i32, PixelSpace>;

pub trait BoundingBox {
  /// Pixels this shape can touch, expanded by `pad` and clamped to a `width × height` canvas.
  fn bounding_box(&self, width: u32, height: u32, pad: f32) -> PixelBox;
}

/// Fractional area of a pixel occupied by a shape, sampled at the pixel centre.
pub trait Coverage {
  fn coverage(&self, pixel: Point2D<f32, PixelSpace>) -> f32;
}

/// Flat colour and opacity of a shape.
pub trait Paint {
  fn alpha(&self) -> f32;
  fn color(&self) -> [f32; 3];
}

/// Inclusive bounds, as in `xmin..=xmax`, `ymin..=ymax`.
pub fn pixel_box(xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> PixelBox {
  Box2D::new(
    Point2D::new(xmin, ymin),
    Point2D::new(xmax + 1, ymax + 1)
  )
}

/// The whole canvas.
pub fn canvas_box(width: u32, height: u32) -> PixelBox {
  pixel_box(1, width as i32, 1, height as i32)
}

/// Float extents to integer pixels, intersected with the canvas.
/// An empty box is returned when nothing is left.
pub fn clamp_box(min: Point2D<f32, PixelSpace>, max: Point2D<f32, PixelSpace>, width: u32, height: u32) -> PixelBox {
  let xmin = (min.x.floor() as i32).max(1);
  let ymin = (min.y.floor() as i32).max(1);
  let xmax = (max.x.ceil() as i32).min(width as i32);
  let ymax = (max.y.ceil() as i32).min(height as i32);
  if xmax < xmin || ymax < ymin {
    return PixelBox::zero();
  }
  pixel_box(xmin, xmax, ymin, ymax)
}

/// Smallest box containing both; empty boxes are neutral.
pub fn union_box(a: &PixelBox, b: &PixelBox) -> PixelBox {
  if a.is_empty() { return *b; }
  if b.is_empty() { return *a; }
  a.union(b)
}

/// Centre of the 1-based pixel `(x, y)`.
#[inline]
pub fn pixel_center(x: i32, y: i32) -> Point2D<f32, PixelSpace> {
  Point2D::new(x as f32 - 0.5, y as f32 - 0.5)
}

/// Anti-aliasing ramp shared by all shapes.
///
/// `distance` is measured from the shape's skeleton, `extent` is the half-width (lines) or
/// radius (dots). Full coverage inside `extent - 0.5`, none beyond `extent + 0.5`.
#[inline]
pub fn coverage_ramp(distance: f32, extent: f32) -> f32 {
  let inner = extent - 0.5;
  let outer = extent + 0.5;
  if outer <= 0.0 || distance >= outer {
    return 0.0;
  }
  if inner <= 0.0 {
    return (1.0 - distance / outer).max(0.0);
  }
  if distance <= inner {
    1.0
  } else {
    1.0 - (distance - inner) / (outer - inner)
  }
}
