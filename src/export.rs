//! JSON export of a painted primitive list.

use {
  crate::{
    drawing::{PixelBuffer, render_all},
    error::Result,
    geometry::Primitive
  },
  serde::{Deserialize, Serialize},
  std::{fs, path::Path}
};

/// One primitive with its painter position; `order` 0 is painted first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveRecord {
  pub order: usize,
  #[serde(flatten)]
  pub primitive: Primitive,
}

/// Everything needed to repaint a result without the sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Painting {
  pub width: u32,
  pub height: u32,
  /// Squared error against the target the painting was fitted to.
  pub sse: f64,
  pub primitives: Vec<PrimitiveRecord>,
}

impl Painting {
  pub fn new(primitives: &[Primitive], width: u32, height: u32, sse: f64) -> Self {
    let primitives = primitives.iter()
      .enumerate()
      .map(|(order, &primitive)| PrimitiveRecord { order, primitive })
      .collect();
    Self { width, height, sse, primitives }
  }

  /// Primitives in painter order, whatever order the records were stored in.
  pub fn primitives(&self) -> Vec<Primitive> {
    let mut records = self.primitives.clone();
    records.sort_by_key(|r| r.order);
    records.into_iter().map(|r| r.primitive).collect()
  }

  pub fn render(&self) -> PixelBuffer {
    render_all(&self.primitives(), self.width, self.height)
  }

  pub fn to_json(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn from_json(text: &str) -> Result<Self> {
    Ok(serde_json::from_str(text)?)
  }

  pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, self.to_json()?)?;
    Ok(())
  }

  pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_json(&fs::read_to_string(path)?)
  }
}
