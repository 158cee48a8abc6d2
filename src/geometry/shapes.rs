use {
  super::{BoundingBox, Coverage, Paint, PixelBox, PixelSpace, clamp_box, coverage_ramp},
  euclid::{Point2D, Vector2D as V2},
  serde::{Deserialize, Serialize}
};

/// Straight stroke with round caps.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
  pub x1: f32,
  pub y1: f32,
  pub x2: f32,
  pub y2: f32,
  pub width: f32,
  pub alpha: f32,
  pub color: [f32; 3],
}

/// Filled disc.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dot {
  pub x: f32,
  pub y: f32,
  pub radius: f32,
  pub alpha: f32,
  pub color: [f32; 3],
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
  Line(Line),
  Dot(Dot),
}

/// Which kind of primitive a run paints with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
  #[default]
  Lines,
  Dots,
}

impl Line {
  pub fn start(&self) -> Point2D<f32, PixelSpace> { Point2D::new(self.x1, self.y1) }
  pub fn end(&self) -> Point2D<f32, PixelSpace> { Point2D::new(self.x2, self.y2) }

  /// Distance from `p` to the segment.
  pub fn distance_to(&self, p: Point2D<f32, PixelSpace>) -> f32 {
    let v = self.end() - self.start();
    let t = ((p - self.start()).dot(v) / (v.square_length() + 1e-12))
      .clamp(0.0, 1.0);
    let projection = self.start() + v * t;
    (p - projection).length()
  }
}

impl Dot {
  pub fn center(&self) -> Point2D<f32, PixelSpace> { Point2D::new(self.x, self.y) }
}

impl BoundingBox for Line {
  fn bounding_box(&self, width: u32, height: u32, pad: f32) -> PixelBox {
    let r = V2::splat(self.width / 2.0 + pad);
    let min = self.start().min(self.end());
    let max = self.start().max(self.end());
    clamp_box(min - r, max + r, width, height)
  }
}

impl BoundingBox for Dot {
  fn bounding_box(&self, width: u32, height: u32, pad: f32) -> PixelBox {
    let r = V2::splat(self.radius + pad);
    clamp_box(self.center() - r, self.center() + r, width, height)
  }
}

impl Coverage for Line {
  fn coverage(&self, pixel: Point2D<f32, PixelSpace>) -> f32 {
    coverage_ramp(self.distance_to(pixel), self.width / 2.0)
  }
}

impl Coverage for Dot {
  fn coverage(&self, pixel: Point2D<f32, PixelSpace>) -> f32 {
    coverage_ramp(self.center().distance_to(pixel), self.radius)
  }
}

impl Primitive {
  pub fn family(&self) -> Family {
    match self {
      Primitive::Line(_) => Family::Lines,
      Primitive::Dot(_) => Family::Dots,
    }
  }
}

impl Paint for Line {
  fn alpha(&self) -> f32 { self.alpha }
  fn color(&self) -> [f32; 3] { self.color }
}

impl Paint for Dot {
  fn alpha(&self) -> f32 { self.alpha }
  fn color(&self) -> [f32; 3] { self.color }
}

impl Paint for Primitive {
  fn alpha(&self) -> f32 {
    match self {
      Primitive::Line(l) => l.alpha,
      Primitive::Dot(d) => d.alpha,
    }
  }
  fn color(&self) -> [f32; 3] {
    match self {
      Primitive::Line(l) => l.color,
      Primitive::Dot(d) => d.color,
    }
  }
}

impl BoundingBox for Primitive {
  fn bounding_box(&self, width: u32, height: u32, pad: f32) -> PixelBox {
    match self {
      Primitive::Line(l) => l.bounding_box(width, height, pad),
      Primitive::Dot(d) => d.bounding_box(width, height, pad),
    }
  }
}

impl Coverage for Primitive {
  fn coverage(&self, pixel: Point2D<f32, PixelSpace>) -> f32 {
    match self {
      Primitive::Line(l) => l.coverage(pixel),
      Primitive::Dot(d) => d.coverage(pixel),
    }
  }
}

impl From<Line> for Primitive {
  fn from(line: Line) -> Self { Primitive::Line(line) }
}

impl From<Dot> for Primitive {
  fn from(dot: Dot) -> Self { Primitive::Dot(dot) }
}
