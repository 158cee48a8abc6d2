//! Run configuration, loaded from TOML. Every field has a default, so an empty file is a
//! valid configuration.

use {
  crate::{
    error::{ConfigError, Result},
    geometry::Family
  },
  serde::{Deserialize, Serialize},
  std::{fs, path::Path}
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  /// Total iteration budget `T`.
  #[serde(default = "Config::default_iterations")]
  pub iterations: usize,
  /// Inverse temperature at `t = 0`.
  #[serde(default = "Config::default_beta_init")]
  pub beta_init: f64,
  /// Inverse temperature approached at `t = T`.
  #[serde(default = "Config::default_beta_final")]
  pub beta_final: f64,
  /// Rate of the Poisson prior on the number of primitives.
  #[serde(default = "Config::default_poisson_lambda")]
  pub poisson_lambda: f64,
  /// Checkpoint interval, in iterations.
  #[serde(default = "Config::default_save_every")]
  pub save_every: usize,
  /// Full-image error recomputation interval, in iterations.
  #[serde(default = "Config::default_best_every")]
  pub best_every: usize,
  #[serde(default = "Config::default_seed")]
  pub seed: u64,
  #[serde(default)]
  pub family: Family,
  #[serde(default)]
  pub birth_kernel: BirthKernel,
  /// Extra pixels around a primitive when scoring a move.
  #[serde(default = "Config::default_bbox_pad")]
  pub bbox_pad: f32,
  #[serde(default)]
  pub moves: MoveWeights,
  #[serde(default)]
  pub model: ModelConfig,
}

impl Config {
  fn default_iterations() -> usize { 20_000 }
  fn default_beta_init() -> f64 { 0.1 }
  fn default_beta_final() -> f64 { 3.0 }
  fn default_poisson_lambda() -> f64 { 500.0 }
  fn default_save_every() -> usize { 1_000 }
  fn default_best_every() -> usize { 250 }
  fn default_seed() -> u64 { 42 }
  fn default_bbox_pad() -> f32 { 2.0 }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
  }

  /// Fail fast on anything that would make a run meaningless.
  pub fn validate(&self) -> std::result::Result<(), ConfigError> {
    if self.iterations == 0 {
      return Err(ConfigError::Iterations);
    }
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(self.beta_init) || !positive(self.beta_final) {
      return Err(ConfigError::Beta { init: self.beta_init, final_: self.beta_final });
    }
    if !positive(self.poisson_lambda) {
      return Err(ConfigError::Lambda(self.poisson_lambda));
    }
    if self.save_every == 0 {
      return Err(ConfigError::Interval("save_every"));
    }
    if self.best_every == 0 {
      return Err(ConfigError::Interval("best_every"));
    }
    if !(self.bbox_pad.is_finite() && self.bbox_pad >= 0.0) {
      return Err(ConfigError::Model("bbox_pad"));
    }
    self.moves.validate()?;
    self.model.validate()
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      iterations: Self::default_iterations(),
      beta_init: Self::default_beta_init(),
      beta_final: Self::default_beta_final(),
      moves: MoveWeights::default(),
      poisson_lambda: Self::default_poisson_lambda(),
      save_every: Self::default_save_every(),
      best_every: Self::default_best_every(),
      seed: Self::default_seed(),
      family: Family::default(),
      birth_kernel: BirthKernel::default(),
      bbox_pad: Self::default_bbox_pad(),
      model: ModelConfig::default(),
    }
  }
}

/// Categorical distribution over move kinds. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveWeights {
  pub birth: f64,
  pub death: f64,
  pub jitter: f64,
  #[serde(default)]
  pub reorder: f64,
}

impl MoveWeights {
  const TOLERANCE: f64 = 1e-6;

  pub fn as_array(&self) -> [f64; 4] {
    [self.birth, self.death, self.jitter, self.reorder]
  }

  pub fn validate(&self) -> std::result::Result<(), ConfigError> {
    let names = ["birth", "death", "jitter", "reorder"];
    if let Some((name, value)) = names.into_iter()
      .zip(self.as_array())
      .find(|(_, w)| !(w.is_finite() && *w >= 0.0)) {
      return Err(ConfigError::NegativeWeight { name, value });
    }
    let sum: f64 = self.as_array().iter().sum();
    if (sum - 1.0).abs() > Self::TOLERANCE {
      return Err(ConfigError::MoveWeights { sum });
    }
    Ok(())
  }
}

impl Default for MoveWeights {
  fn default() -> Self {
    Self { birth: 0.35, death: 0.2, jitter: 0.4, reorder: 0.05 }
  }
}

/// Where new primitives come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BirthKernel {
  /// Seeded on badly reconstructed pixels, coloured from the target.
  #[default]
  DataDriven,
  /// Drawn from the prior, blind to the target.
  Prior,
}

/// `|N(0, sigma)| + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HalfNormal {
  pub sigma: f32,
  pub offset: f32,
}

/// Standard deviations of the jitter kernel, plus the floor applied to the size field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterSteps {
  pub position: f32,
  pub size: f32,
  pub alpha: f32,
  pub color: f32,
  pub size_floor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
  #[serde(default)]
  pub line: LineModel,
  #[serde(default)]
  pub dot: DotModel,
}

impl ModelConfig {
  pub fn validate(&self) -> std::result::Result<(), ConfigError> {
    let l = &self.line;
    let d = &self.dot;
    let checks: [(&'static str, f32); 18] = [
      ("line.prior_length.sigma", l.prior_length.sigma),
      ("line.prior_width.sigma", l.prior_width.sigma),
      ("line.birth_length.sigma", l.birth_length.sigma),
      ("line.birth_width.sigma", l.birth_width.sigma),
      ("line.birth_alpha_shape", l.birth_alpha_shape),
      ("line.jitter.position", l.jitter.position),
      ("line.jitter.size", l.jitter.size),
      ("line.jitter.alpha", l.jitter.alpha),
      ("line.jitter.color", l.jitter.color),
      ("line.jitter.size_floor", l.jitter.size_floor),
      ("dot.prior_radius.sigma", d.prior_radius.sigma),
      ("dot.birth_radius.sigma", d.birth_radius.sigma),
      ("dot.birth_alpha_shape", d.birth_alpha_shape),
      ("dot.jitter.position", d.jitter.position),
      ("dot.jitter.size", d.jitter.size),
      ("dot.jitter.alpha", d.jitter.alpha),
      ("dot.jitter.color", d.jitter.color),
      ("dot.jitter.size_floor", d.jitter.size_floor),
    ];
    match checks.into_iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
      Some((name, _)) => Err(ConfigError::Model(name)),
      None if l.probes < 2 => Err(ConfigError::Model("line.probes")),
      None => Ok(())
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineModel {
  /// Symmetric Beta shape of the opacity of newborn lines.
  pub birth_alpha_shape: f32,
  /// Target samples averaged along a newborn line for its colour.
  pub probes: usize,
  pub prior_length: HalfNormal,
  pub prior_width: HalfNormal,
  pub birth_length: HalfNormal,
  pub birth_width: HalfNormal,
  pub jitter: JitterSteps,
}

impl Default for LineModel {
  fn default() -> Self {
    Self {
      prior_length: HalfNormal { sigma: 30.0, offset: 5.0 },
      prior_width: HalfNormal { sigma: 3.0, offset: 1.0 },
      birth_length: HalfNormal { sigma: 35.0, offset: 8.0 },
      birth_width: HalfNormal { sigma: 3.0, offset: 1.0 },
      birth_alpha_shape: 3.0,
      probes: 20,
      jitter: JitterSteps { position: 3.0, size: 0.6, alpha: 0.1, color: 0.08, size_floor: 0.2 },
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotModel {
  pub birth_alpha_shape: f32,
  pub prior_radius: HalfNormal,
  pub birth_radius: HalfNormal,
  pub jitter: JitterSteps,
}

impl Default for DotModel {
  fn default() -> Self {
    Self {
      prior_radius: HalfNormal { sigma: 2.0, offset: 1.0 },
      birth_radius: HalfNormal { sigma: 1.5, offset: 1.0 },
      birth_alpha_shape: 2.0,
      jitter: JitterSteps { position: 3.0, size: 1.0, alpha: 0.1, color: 0.08, size_floor: 1.0 },
    }
  }
}
