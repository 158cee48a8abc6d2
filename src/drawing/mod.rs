//! Raster kernel: alpha-over compositing, region re-rendering and squared error.
//!
//! Buffers are `image::Rgb32FImage` holding linear RGB in `[0, 1]`. Every function here is a
//! pure function of its inputs plus the buffer it writes to.

use {
  crate::geometry::{BoundingBox, Coverage, Paint, PixelBox, canvas_box},
  image::{Rgb, Rgb32FImage, RgbImage},
  itertools::iproduct,
  rayon::prelude::*
};

mod impl_draw_rgb32f;
pub mod canvas;
#[cfg(test)] mod tests;

pub use canvas::{Canvas, Edit};

/// Working canvas or target image.
pub type PixelBuffer = Rgb32FImage;

pub const WHITE: [f32; 3] = [1.0; 3];

pub trait Draw<Backend> {
  /// Composite onto the whole image.
  fn draw(&self, image: &mut Backend);
  /// Composite, touching only pixels inside `region`.
  fn draw_region(&self, image: &mut Backend, region: &PixelBox);
}

/// Primitives that can be composited onto a `PixelBuffer`.
pub trait Stroke: BoundingBox + Coverage + Paint {}
impl <T> Stroke for T where T: BoundingBox + Coverage + Paint {}

pub fn white(width: u32, height: u32) -> PixelBuffer {
  PixelBuffer::from_pixel(width, height, Rgb(WHITE))
}

/// White canvas with every primitive composited in sequence order.
pub fn render_all<'a, S: Stroke + 'a>(
  primitives: impl IntoIterator<Item = &'a S>,
  width: u32,
  height: u32
) -> PixelBuffer {
  let mut buffer = white(width, height);
  primitives.into_iter()
    .for_each(|p| p.draw(&mut buffer));
  buffer
}

/// Reset `region` of `dst` to white and repaint it from `primitives`.
/// Inside `region` the result is bit-identical to [`render_all`] over the same sequence.
pub fn render_region<'a, S: Stroke + 'a>(
  dst: &mut PixelBuffer,
  primitives: impl IntoIterator<Item = &'a S>,
  region: &PixelBox
) {
  fill_region(dst, region, WHITE);
  primitives.into_iter()
    .for_each(|p| p.draw_region(dst, region));
}

pub fn fill_region(dst: &mut PixelBuffer, region: &PixelBox, color: [f32; 3]) {
  let Some(area) = in_bounds(dst, region) else { return };
  iproduct!(area.y_range(), area.x_range())
    .for_each(|(y, x)| *dst.get_pixel_mut(x as u32 - 1, y as u32 - 1) = Rgb(color));
}

pub fn copy_region(dst: &mut PixelBuffer, src: &PixelBuffer, region: &PixelBox) {
  if dst.dimensions() != src.dimensions() { return; }
  let Some(area) = in_bounds(dst, region) else { return };
  iproduct!(area.y_range(), area.x_range())
    .for_each(|(y, x)| {
      let (x, y) = (x as u32 - 1, y as u32 - 1);
      *dst.get_pixel_mut(x, y) = *src.get_pixel(x, y);
    });
}

/// Sum of squared differences over `region`, all three channels.
pub fn sse(target: &PixelBuffer, buffer: &PixelBuffer, region: &PixelBox) -> f64 {
  if target.dimensions() != buffer.dimensions() { return f64::INFINITY; }
  let Some(area) = in_bounds(buffer, region) else { return 0.0 };
  iproduct!(area.y_range(), area.x_range())
    .map(|(y, x)| {
      let (x, y) = (x as u32 - 1, y as u32 - 1);
      pixel_sse(target.get_pixel(x, y), buffer.get_pixel(x, y))
    })
    .sum()
}

/// Whole-image squared error. Rows are reduced in parallel, then summed in row order, so the
/// result does not depend on scheduling.
pub fn sse_full(target: &PixelBuffer, buffer: &PixelBuffer) -> f64 {
  if target.dimensions() != buffer.dimensions() { return f64::INFINITY; }
  let row = buffer.width() as usize * 3;
  if row == 0 { return 0.0; }
  let rows: Vec<f64> = target.as_raw().par_chunks(row)
    .zip(buffer.as_raw().par_chunks(row))
    .map(|(t, b)| t.iter().zip(b)
      .map(|(t, b)| {
        let d = (*t - *b) as f64;
        d * d
      })
      .sum())
    .collect();
  rows.into_iter().sum()
}

/// Per-pixel Euclidean norm of `target - buffer`, row-major.
pub fn residual_magnitude(target: &PixelBuffer, buffer: &PixelBuffer) -> Vec<f32> {
  target.as_raw().par_chunks(3)
    .zip(buffer.as_raw().par_chunks(3))
    .map(|(t, b)| t.iter().zip(b)
      .map(|(t, b)| (t - b) * (t - b))
      .sum::<f32>()
      .sqrt())
    .collect()
}

/// Quantize to 8 bits for encoding.
pub fn to_rgb8(buffer: &PixelBuffer) -> RgbImage {
  RgbImage::from_fn(buffer.width(), buffer.height(), |x, y| {
    let Rgb(c) = *buffer.get_pixel(x, y);
    Rgb(c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
  })
}

#[inline]
fn pixel_sse(a: &Rgb<f32>, b: &Rgb<f32>) -> f64 {
  a.0.iter().zip(b.0.iter())
    .map(|(a, b)| {
      let d = (*a - *b) as f64;
      d * d
    })
    .sum()
}

/// Part of `region` inside the image, if any.
#[inline]
pub(crate) fn in_bounds(image: &PixelBuffer, region: &PixelBox) -> Option<PixelBox> {
  let (w, h) = image.dimensions();
  region.intersection(&canvas_box(w, h))
}
