use {
  super::{Draw, PixelBuffer, render_all, render_region, sse_full},
  crate::geometry::{PixelBox, Primitive}
};

/// Single-entry change to the stack, applied on the fly by [`Canvas::rebuild_local`].
#[derive(Debug, Clone, Copy)]
pub enum Edit<'p> {
  Remove(usize),
  Replace(usize, &'p Primitive),
}

/// Working pixel buffer together with the ordered primitives it was painted from.
///
/// After every mutation `buffer == render_all(primitives)`.
#[derive(Debug, Clone)]
pub struct Canvas {
  buffer: PixelBuffer,
  primitives: Vec<Primitive>,
}

impl Canvas {
  /// White, no primitives.
  pub fn new(width: u32, height: u32) -> Self {
    Self::from_primitives(vec![], width, height)
  }

  pub fn from_primitives(primitives: Vec<Primitive>, width: u32, height: u32) -> Self {
    let buffer = render_all(&primitives, width, height);
    Self { buffer, primitives }
  }

  pub fn buffer(&self) -> &PixelBuffer { &self.buffer }
  pub fn primitives(&self) -> &[Primitive] { &self.primitives }
  pub fn len(&self) -> usize { self.primitives.len() }
  pub fn is_empty(&self) -> bool { self.primitives.is_empty() }
  pub fn dimensions(&self) -> (u32, u32) { self.buffer.dimensions() }

  /// Append on top of the stack. Only pixels inside `region` are painted; pass the
  /// primitive's own bounding box to keep the canvas consistent.
  pub fn composite_local(&mut self, primitive: Primitive, region: &PixelBox) {
    primitive.draw_region(&mut self.buffer, region);
    self.primitives.push(primitive);
  }

  /// Paint `region` of `dst` from this canvas's stack with `edit` applied, leaving the
  /// canvas itself untouched.
  pub fn rebuild_local(&self, dst: &mut PixelBuffer, region: &PixelBox, edit: Edit) {
    let primitives = self.primitives.iter()
      .enumerate()
      .filter_map(|(i, p)| match edit {
        Edit::Remove(j) if i == j => None,
        Edit::Replace(j, q) if i == j => Some(q),
        _ => Some(p),
      });
    render_region(dst, primitives, region);
  }

  pub fn rebuild_full(&mut self) {
    let (w, h) = self.dimensions();
    self.buffer = render_all(&self.primitives, w, h);
  }

  pub fn remove(&mut self, index: usize) -> Primitive {
    let removed = self.primitives.remove(index);
    self.rebuild_full();
    removed
  }

  pub fn replace(&mut self, index: usize, primitive: Primitive) -> Primitive {
    let old = std::mem::replace(&mut self.primitives[index], primitive);
    self.rebuild_full();
    old
  }

  /// Take over an already rendered state. `buffer` is handed back with the previous pixels
  /// so it can be reused as scratch space.
  pub fn adopt(&mut self, primitives: Vec<Primitive>, buffer: &mut PixelBuffer) {
    debug_assert_eq!(buffer.dimensions(), self.buffer.dimensions());
    self.primitives = primitives;
    std::mem::swap(&mut self.buffer, buffer);
  }

  pub fn sse(&self, target: &PixelBuffer) -> f64 {
    sse_full(target, &self.buffer)
  }

  pub fn into_parts(self) -> (Vec<Primitive>, PixelBuffer) {
    (self.primitives, self.buffer)
  }
}
