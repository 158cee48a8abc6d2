use {
  super::*,
  crate::geometry::{Dot, Line, Primitive, pixel_box, pixel_center},
  approx::assert_relative_eq,
  image::Rgb
};

fn red_dot(x: f32, y: f32, radius: f32, alpha: f32) -> Primitive {
  Dot { x, y, radius, alpha, color: [1.0, 0.0, 0.0] }.into()
}

fn sample_strokes() -> Vec<Primitive> {
  vec![
    Line { x1: 3.0, y1: 4.0, x2: 28.0, y2: 20.0, width: 3.0, alpha: 0.6, color: [0.1, 0.5, 0.9] }.into(),
    red_dot(15.0, 12.0, 6.0, 0.7),
    Line { x1: 30.0, y1: 2.0, x2: 2.0, y2: 30.0, width: 0.6, alpha: 0.9, color: [0.0, 0.0, 0.0] }.into(),
    Dot { x: 25.5, y: 25.5, radius: 0.3, alpha: 0.5, color: [0.2, 0.9, 0.2] }.into(),
  ]
}

#[test] fn coverage_falloff() {
  let mut image = white(21, 21);
  let dot = red_dot(10.5, 10.5, 5.0, 1.0);
  dot.draw(&mut image);

  // pixel (11, 11) is centred on the dot
  assert_eq!(*image.get_pixel(10, 10), Rgb([1.0, 0.0, 0.0]));

  for y in 1..=21 {
    for x in 1..=21 {
      let d = pixel_center(x, y).distance_to(euclid::Point2D::new(10.5, 10.5));
      let px = image.get_pixel(x as u32 - 1, y as u32 - 1).0;
      if d >= 5.5 {
        assert_eq!(px, WHITE, "pixel ({x}, {y}) at distance {d}");
      } else if d > 4.5 {
        assert_relative_eq!(px[0], 1.0);
        assert!(px[1] > 0.0 && px[1] < 1.0, "ramp at ({x}, {y}): {px:?}");
        assert_eq!(px[1], px[2]);
      } else {
        assert_eq!(px, [1.0, 0.0, 0.0]);
      }
    }
  }
}

#[test] fn thin_line_still_paints() {
  let mut image = white(16, 16);
  let line: Primitive = Line { x1: 2.0, y1: 8.5, x2: 14.0, y2: 8.5, width: 0.4, alpha: 1.0, color: [0.0; 3] }.into();
  line.draw(&mut image);
  // pixel (8, 9) is centred on the stroke
  let px = image.get_pixel(7, 8).0;
  assert_eq!(px, [0.0; 3]);
  // far from the stroke nothing changes
  assert_eq!(image.get_pixel(7, 1).0, WHITE);
}

#[test] fn values_stay_in_unit_range() {
  let mut image = white(32, 32);
  let strokes = sample_strokes();
  (0..20).for_each(|_| strokes.iter().for_each(|s| s.draw(&mut image)));
  assert!(image.as_raw().iter().all(|v| (0.0..=1.0).contains(v)));
}

#[test] fn render_all_is_pure() {
  let strokes = sample_strokes();
  let a = render_all(&strokes, 32, 32);
  let b = render_all(&strokes, 32, 32);
  assert_eq!(a.as_raw(), b.as_raw());
}

#[test] fn region_render_matches_full_render() {
  let strokes = sample_strokes();
  let full = render_all(&strokes, 32, 32);

  // start from garbage outside and inside the region
  let mut partial = PixelBuffer::from_pixel(32, 32, Rgb([0.25, 0.5, 0.75]));
  let region = pixel_box(5, 20, 8, 26);
  render_region(&mut partial, &strokes, &region);

  for y in 8..=26u32 {
    for x in 5..=20u32 {
      assert_eq!(full.get_pixel(x - 1, y - 1), partial.get_pixel(x - 1, y - 1));
    }
  }
  assert_eq!(partial.get_pixel(0, 0).0, [0.25, 0.5, 0.75]);
}

#[test] fn region_outside_canvas_is_ignored() {
  let mut image = white(8, 8);
  let before = image.clone();
  red_dot(4.0, 4.0, 2.0, 1.0).draw_region(&mut image, &pixel_box(20, 30, 20, 30));
  fill_region(&mut image, &pixel_box(-5, 0, -5, 0), [0.0; 3]);
  assert_eq!(image.as_raw(), before.as_raw());
  assert_eq!(sse(&before, &image, &pixel_box(-10, 100, -10, 100)), 0.0);
}

#[test] fn squared_error() {
  let target = PixelBuffer::from_pixel(10, 10, Rgb([0.0, 0.0, 0.0]));
  let canvas = white(10, 10);
  assert_relative_eq!(sse_full(&target, &canvas), 300.0);
  assert_relative_eq!(sse(&target, &canvas, &pixel_box(1, 2, 1, 5)), 30.0);
  // partially out of bounds
  assert_relative_eq!(sse(&target, &canvas, &pixel_box(9, 14, 10, 12)), 6.0);
}

#[test] fn residual_points_at_difference() {
  let target = white(4, 3);
  let mut canvas = white(4, 3);
  *canvas.get_pixel_mut(2, 1) = Rgb([1.0, 0.0, 1.0]);
  let residual = residual_magnitude(&target, &canvas);
  assert_eq!(residual.len(), 12);
  assert_relative_eq!(residual[1 * 4 + 2], 1.0);
  assert_eq!(residual.iter().filter(|&&r| r > 0.0).count(), 1);
}

#[test] fn canvas_mutations_match_render_all() {
  let strokes = sample_strokes();
  let mut canvas = Canvas::new(32, 32);
  for s in &strokes {
    let bbox = s.bounding_box(32, 32, 2.0);
    canvas.composite_local(*s, &bbox);
  }
  assert_eq!(canvas.buffer().as_raw(), render_all(&strokes, 32, 32).as_raw());

  let removed = canvas.remove(1);
  assert_eq!(removed, strokes[1]);
  let replaced = canvas.replace(0, red_dot(3.0, 3.0, 2.0, 0.5));
  assert_eq!(replaced, strokes[0]);
  assert_eq!(canvas.len(), 3);
  assert_eq!(canvas.buffer().as_raw(), render_all(canvas.primitives(), 32, 32).as_raw());
}

#[test] fn quantize() {
  let mut image = white(2, 1);
  *image.get_pixel_mut(1, 0) = Rgb([0.0, 0.5, 1.0]);
  let rgb8 = to_rgb8(&image);
  assert_eq!(rgb8.get_pixel(0, 0).0, [255, 255, 255]);
  assert_eq!(rgb8.get_pixel(1, 0).0, [0, 128, 255]);
}

#[test] fn local_rebuild_applies_edit_to_own_stack() {
  let strokes = sample_strokes();
  let canvas = Canvas::from_primitives(strokes.clone(), 32, 32);
  let region = pixel_box(4, 24, 6, 22);
  let swap = red_dot(10.0, 10.0, 4.0, 0.8);

  let mut without = strokes.clone();
  without.remove(1);
  let mut swapped = strokes.clone();
  swapped[2] = swap;

  for (edit, expected) in [
    (Edit::Remove(1), render_all(&without, 32, 32)),
    (Edit::Replace(2, &swap), render_all(&swapped, 32, 32)),
  ] {
    let mut dst = PixelBuffer::from_pixel(32, 32, Rgb([0.25, 0.5, 0.75]));
    canvas.rebuild_local(&mut dst, &region, edit);
    for y in 6..=22u32 {
      for x in 4..=24u32 {
        assert_eq!(dst.get_pixel(x - 1, y - 1), expected.get_pixel(x - 1, y - 1), "{edit:?} at ({x}, {y})");
      }
    }
    assert_eq!(dst.get_pixel(31, 31).0, [0.25, 0.5, 0.75]);
  }
  assert_eq!(canvas.primitives(), &strokes[..]);
  assert_eq!(canvas.buffer().as_raw(), render_all(&strokes, 32, 32).as_raw());
}
