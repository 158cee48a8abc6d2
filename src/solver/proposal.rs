//! Primitive model: prior density and proposal kernels.
//!
//! The uniform position and colour components of the prior contribute a constant, which is
//! dropped; it cancels in every acceptance ratio comparing primitives of the same family.

use {
  crate::{
    config::{BirthKernel, HalfNormal, JitterSteps, ModelConfig},
    drawing::{PixelBuffer, residual_magnitude},
    geometry::{Dot, Family, Line, Primitive}
  },
  rand::{Rng, distributions::WeightedIndex},
  rand_distr::{Beta, Distribution, StandardNormal},
  std::f32::consts::PI
};

/// Opacity bounds kept by the jitter kernel.
pub const ALPHA_RANGE: (f32, f32) = (0.001, 0.999);
/// Below this maximum residual the canvas counts as matching the target.
pub const RESIDUAL_EPS: f32 = 1e-6;
/// Opacity prior is Beta(2, 2).
const ALPHA_PRIOR_SHAPE: f32 = 2.0;

/// Blind draw from the prior.
pub fn sample_prior(
  family: Family,
  width: u32,
  height: u32,
  model: &ModelConfig,
  rng: &mut impl Rng
) -> Primitive {
  let (x, y) = uniform_position(width, height, rng);
  match family {
    Family::Lines => {
      let m = &model.line;
      let angle = rng.gen_range(0.0..2.0 * PI);
      let length = half_normal(m.prior_length, rng);
      let (x2, y2) = clamp_position(x + length * angle.cos(), y + length * angle.sin(), width, height);
      Line {
        x1: x, y1: y, x2, y2,
        width: half_normal(m.prior_width, rng),
        alpha: beta(ALPHA_PRIOR_SHAPE, rng),
        color: uniform_color(rng),
      }.into()
    }
    Family::Dots => Dot {
      x, y,
      radius: half_normal(model.dot.prior_radius, rng),
      alpha: beta(ALPHA_PRIOR_SHAPE, rng),
      color: uniform_color(rng),
    }.into()
  }
}

/// New primitive from the configured birth kernel.
pub fn sample_birth(
  kernel: BirthKernel,
  family: Family,
  target: &PixelBuffer,
  canvas: &PixelBuffer,
  model: &ModelConfig,
  rng: &mut impl Rng
) -> Primitive {
  match kernel {
    BirthKernel::DataDriven => sample_birth_datadriven(family, target, canvas, model, rng),
    BirthKernel::Prior => sample_prior(family, target.width(), target.height(), model, rng),
  }
}

/// Birth seeded where the canvas is furthest from the target, coloured from the target.
pub fn sample_birth_datadriven(
  family: Family,
  target: &PixelBuffer,
  canvas: &PixelBuffer,
  model: &ModelConfig,
  rng: &mut impl Rng
) -> Primitive {
  let (width, height) = target.dimensions();
  let (x0, y0) = residual_seed(target, canvas, rng);
  match family {
    Family::Lines => {
      let m = &model.line;
      let angle = rng.gen_range(0.0..2.0 * PI);
      let half = half_normal(m.birth_length, rng) / 2.0;
      let (dx, dy) = (half * angle.cos(), half * angle.sin());
      let (x1, y1) = clamp_position(x0 - dx, y0 - dy, width, height);
      let (x2, y2) = clamp_position(x0 + dx, y0 + dy, width, height);
      let mut line = Line {
        x1, y1, x2, y2,
        width: half_normal(m.birth_width, rng),
        alpha: beta(m.birth_alpha_shape, rng),
        color: [0.0; 3],
      };
      line.color = mean_color_along(target, &line, m.probes);
      line.into()
    }
    Family::Dots => Dot {
      x: x0,
      y: y0,
      radius: half_normal(model.dot.birth_radius, rng),
      alpha: beta(model.dot.birth_alpha_shape, rng),
      color: target_color(target, x0, y0),
    }.into()
  }
}

/// Small Gaussian perturbation of every field, clamped back into the valid ranges.
pub fn jitter(
  primitive: &Primitive,
  width: u32,
  height: u32,
  model: &ModelConfig,
  rng: &mut impl Rng
) -> Primitive {
  match primitive {
    Primitive::Line(l) => {
      let s = &model.line.jitter;
      let (x1, y1) = clamp_position(l.x1 + normal(s.position, rng), l.y1 + normal(s.position, rng), width, height);
      let (x2, y2) = clamp_position(l.x2 + normal(s.position, rng), l.y2 + normal(s.position, rng), width, height);
      Line {
        x1, y1, x2, y2,
        width: (l.width + normal(s.size, rng)).max(s.size_floor),
        alpha: jitter_alpha(l.alpha, s, rng),
        color: jitter_color(l.color, s, rng),
      }.into()
    }
    Primitive::Dot(d) => {
      let s = &model.dot.jitter;
      let (x, y) = clamp_position(d.x + normal(s.position, rng), d.y + normal(s.position, rng), width, height);
      Dot {
        x, y,
        radius: (d.radius + normal(s.size, rng)).max(s.size_floor),
        alpha: jitter_alpha(d.alpha, s, rng),
        color: jitter_color(d.color, s, rng),
      }.into()
    }
  }
}

/// Log prior density, `-inf` outside the hard bounds.
pub fn log_prior(primitive: &Primitive, width: u32, height: u32, model: &ModelConfig) -> f64 {
  let inside = |x: f32, y: f32| (1.0..=width as f32).contains(&x) && (1.0..=height as f32).contains(&y);
  let appearance_ok = |alpha: f32, color: &[f32; 3]|
    alpha > 0.0 && alpha < 1.0 && color.iter().all(|c| (0.0..=1.0).contains(c));

  let (size, sigma, alpha) = match primitive {
    Primitive::Line(l) => {
      if !inside(l.x1, l.y1) || !inside(l.x2, l.y2) || !appearance_ok(l.alpha, &l.color) {
        return f64::NEG_INFINITY;
      }
      (l.width, model.line.prior_width.sigma, l.alpha)
    }
    Primitive::Dot(d) => {
      if !inside(d.x, d.y) || !appearance_ok(d.alpha, &d.color) {
        return f64::NEG_INFINITY;
      }
      (d.radius, model.dot.prior_radius.sigma, d.alpha)
    }
  };
  if !(size.is_finite() && size > 0.0) {
    return f64::NEG_INFINITY;
  }
  log_half_normal(size as f64, sigma as f64) + log_beta22(alpha as f64)
}

/// Log Poisson mass at `k`, without the `ln k!` term.
///
/// The `ln(1 / (k + 1))` and `ln k` index terms of the birth and death ratios supply the
/// factorial ratio, so birth/death acceptance sees the exact Poisson ratio `lambda / (k + 1)`.
pub fn log_prior_k(k: usize, lambda: f64) -> f64 {
  k as f64 * lambda.ln() - lambda
}

/// Seed pixel drawn proportionally to the normalized residual, uniform when there is none.
fn residual_seed(target: &PixelBuffer, canvas: &PixelBuffer, rng: &mut impl Rng) -> (f32, f32) {
  let (width, height) = target.dimensions();
  let residual = residual_magnitude(target, canvas);
  let max = residual.iter().cloned().fold(0.0f32, f32::max);
  if !(max >= RESIDUAL_EPS) || residual.len() != (width * height) as usize {
    return uniform_position(width, height, rng);
  }
  match WeightedIndex::new(residual.iter().map(|r| r / max)) {
    Ok(weights) => {
      let idx = weights.sample(rng) as u32;
      ((idx % width + 1) as f32, (idx / width + 1) as f32)
    }
    Err(_) => uniform_position(width, height, rng)
  }
}

/// Average target colour at evenly spaced points along the segment.
fn mean_color_along(target: &PixelBuffer, line: &Line, probes: usize) -> [f32; 3] {
  let probes = probes.max(2);
  let mut sum = [0.0f32; 3];
  (0..probes).for_each(|i| {
    let t = i as f32 / (probes - 1) as f32;
    let c = target_color(target, line.x1 + t * (line.x2 - line.x1), line.y1 + t * (line.y2 - line.y1));
    sum.iter_mut().zip(c).for_each(|(s, c)| *s += c);
  });
  sum.map(|s| (s / probes as f32).clamp(0.0, 1.0))
}

/// Target colour of the pixel nearest to `(x, y)`.
fn target_color(target: &PixelBuffer, x: f32, y: f32) -> [f32; 3] {
  let (width, height) = target.dimensions();
  let px = (x.round() as i64).clamp(1, width as i64) as u32;
  let py = (y.round() as i64).clamp(1, height as i64) as u32;
  target.get_pixel(px - 1, py - 1).0
}

fn uniform_position(width: u32, height: u32, rng: &mut impl Rng) -> (f32, f32) {
  (rng.gen_range(1.0..=width as f32), rng.gen_range(1.0..=height as f32))
}

fn uniform_color(rng: &mut impl Rng) -> [f32; 3] {
  [rng.gen(), rng.gen(), rng.gen()]
}

fn clamp_position(x: f32, y: f32, width: u32, height: u32) -> (f32, f32) {
  (x.clamp(1.0, width as f32), y.clamp(1.0, height as f32))
}

fn jitter_alpha(alpha: f32, s: &JitterSteps, rng: &mut impl Rng) -> f32 {
  (alpha + normal(s.alpha, rng)).clamp(ALPHA_RANGE.0, ALPHA_RANGE.1)
}

fn jitter_color(color: [f32; 3], s: &JitterSteps, rng: &mut impl Rng) -> [f32; 3] {
  color.map(|c| (c + normal(s.color, rng)).clamp(0.0, 1.0))
}

#[inline]
fn normal(sigma: f32, rng: &mut impl Rng) -> f32 {
  let z: f32 = rng.sample(StandardNormal);
  z * sigma
}

#[inline]
fn half_normal(hn: HalfNormal, rng: &mut impl Rng) -> f32 {
  normal(hn.sigma, rng).abs() + hn.offset
}

fn beta(shape: f32, rng: &mut impl Rng) -> f32 {
  match Beta::new(shape, shape) {
    Ok(b) => b.sample(rng),
    Err(_) => 0.5
  }
}

fn log_half_normal(x: f64, sigma: f64) -> f64 {
  use std::f64::consts::PI;
  (2.0 / PI).sqrt().ln() - sigma.ln() - x * x / (2.0 * sigma * sigma)
}

/// Beta(2, 2) density `6 x (1 - x)`.
fn log_beta22(x: f64) -> f64 {
  6f64.ln() + x.ln() + (1.0 - x).ln()
}
