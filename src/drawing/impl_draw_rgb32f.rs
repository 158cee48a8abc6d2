use {
  super::{Draw, PixelBuffer, Stroke, in_bounds},
  crate::geometry::{PixelBox, canvas_box, pixel_center},
  image::Rgb,
  itertools::iproduct
};

impl <Cutie> Draw<PixelBuffer> for Cutie
  where Cutie: Stroke
{
  fn draw(&self, image: &mut PixelBuffer) {
    let (w, h) = image.dimensions();
    self.draw_region(image, &canvas_box(w, h));
  }

  fn draw_region(&self, image: &mut PixelBuffer, region: &PixelBox) {
    let alpha = self.alpha();
    if !(alpha > 0.0) { return; }
    let (w, h) = image.dimensions();
    // the unpadded box already contains every pixel with non-zero coverage
    let bounding_box = match self.bounding_box(w, h, 0.0).intersection(region) {
      Some(x) => x,
      None => return
    };
    let bounding_box = match in_bounds(image, &bounding_box) {
      Some(x) => x,
      None => return
    };
    let color = self.color();

    iproduct!(bounding_box.y_range(), bounding_box.x_range())
      .for_each(|(y, x)| {
        let a = (self.coverage(pixel_center(x, y)) * alpha).clamp(0.0, 1.0);
        if !(a > 0.0) { return; }
        if let Some(pixel) = pixel_mut(image, x, y) {
          *pixel = alpha_over(*pixel, color, a);
        }
      });
  }
}

/// Out-of-canvas coordinates yield `None` and are skipped by the caller.
#[inline]
fn pixel_mut(image: &mut PixelBuffer, x: i32, y: i32) -> Option<&mut Rgb<f32>> {
  let (w, h) = image.dimensions();
  if x < 1 || y < 1 || x as u32 > w || y as u32 > h {
    return None;
  }
  Some(image.get_pixel_mut(x as u32 - 1, y as u32 - 1))
}

#[inline]
fn alpha_over(Rgb(dst): Rgb<f32>, src: [f32; 3], a: f32) -> Rgb<f32> {
  let mut out = dst;
  out.iter_mut()
    .zip(src)
    .for_each(|(d, s)| *d = (a * s + (1.0 - a) * *d).clamp(0.0, 1.0));
  Rgb(out)
}
