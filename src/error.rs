//! Error types.
//!
//! Only configuration and target validation can fail a run. Rejected proposals, degenerate
//! residuals and out-of-canvas pixels are handled inside the sampler and never show up here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid configuration: {0}")]
  Config(#[from] ConfigError),
  #[error("malformed target: {0}")]
  Target(String),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Image(#[from] image::ImageError),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error(transparent)]
  Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("move weights must sum to 1, got {sum}")]
  MoveWeights { sum: f64 },
  #[error("move weight `{name}` is negative or not finite: {value}")]
  NegativeWeight { name: &'static str, value: f64 },
  #[error("iteration budget must be positive")]
  Iterations,
  #[error("inverse temperatures must be positive and finite, got {init} -> {final_}")]
  Beta { init: f64, final_: f64 },
  #[error("poisson rate must be positive and finite, got {0}")]
  Lambda(f64),
  #[error("`{0}` interval must be positive")]
  Interval(&'static str),
  #[error("model parameter `{0}` must be positive and finite")]
  Model(&'static str),
}

/// Convenient wrapper around `std::Result`.
pub type Result<T> = std::result::Result<T, Error>;
