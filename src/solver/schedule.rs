/// Geometric inverse-temperature ramp from `beta_init` at `t = 0` towards `beta_final` at `t = T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
  beta_init: f64,
  beta_final: f64,
  iterations: usize,
}

impl Schedule {
  pub fn new(beta_init: f64, beta_final: f64, iterations: usize) -> Self {
    Self { beta_init, beta_final, iterations: iterations.max(1) }
  }

  /// `β(t) = β_init · (β_final / β_init)^(t / T)`
  pub fn beta(&self, t: usize) -> f64 {
    let progress = t as f64 / self.iterations as f64;
    self.beta_init * (self.beta_final / self.beta_init).powf(progress)
  }
}
