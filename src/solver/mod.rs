//! Reversible-jump MCMC sampler over ordered primitive collections.
//!
//! [`Sampler`] owns the canvas and a seeded generator; [`proposal`] holds the primitive
//! model (priors and kernels) it draws from.

pub mod moves;
pub mod proposal;
pub mod sampler;
pub mod schedule;

pub use {
  moves::{MoveKind, MoveStats, Outcome},
  sampler::{Evaluation, RunOutcome, Sampler, Snapshot},
  schedule::Schedule
};
