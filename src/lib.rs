//! This is a library for painting raster images with a variable number of simple primitives.
//!
//! A target RGB image is approximated by an ordered stack of anti-aliased line segments (or
//! filled dots), alpha-composited onto a white canvas. The stack is grown, pruned, perturbed
//! and reshuffled by a reversible-jump MCMC sampler that minimizes the squared pixel error
//! under a slowly cooling temperature.
//!
//! It is split into [`geometry`] (primitives, bounding boxes, coverage), [`drawing`]
//! (compositing, region re-rendering, error), and [`solver`] (proposal kernels and the
//! sampler). [`driver`] glues them to image files and checkpoint sinks.
//!
//! # Basic usage
//! ```no_run
//! # use mcmc_painter::{
//! #   config::Config,
//! #   driver::{self, PngSink},
//! #   error::Result,
//! #   export::Painting
//! # };
//! # fn main() -> Result<()> {
//! // decode and resize to 200 pixels wide, keeping the aspect ratio
//! let target = driver::load_target("cat.jpg", Some(200), None)?;
//!
//! let config = Config { iterations: 50_000, ..Config::default() };
//! // every `save_every` iterations the canvas lands in out/cat_iter_XXXXXXX.png
//! let mut sink = PngSink::new("out")?.with_prefix("cat");
//! let outcome = driver::run(&target, config, &mut sink)?;
//!
//! println!("{} primitives, best SSE {}", outcome.best.primitives.len(), outcome.best.sse);
//! let (w, h) = target.dimensions();
//! Painting::new(&outcome.best.primitives, w, h, outcome.best.sse)
//!   .write_json("out/cat.json")?;
//! #   Ok(())
//! # }
//! ```
//!
//! Finer control is available through [`solver::Sampler`], which can be stepped one
//! iteration at a time:
//! ```
//! # use mcmc_painter::{config::Config, drawing::white, solver::Sampler};
//! let target = white(16, 16);
//! let mut sampler = Sampler::new(&target, Config::default()).unwrap();
//! for _ in 0..100 {
//!   sampler.step();
//! }
//! assert_eq!(sampler.iteration(), 100);
//! ```
//!
//! Runs are reproducible: the sampler draws from a single generator seeded by
//! [`Config::seed`](config::Config::seed), and the parallel parts of the raster kernel reduce
//! in a fixed order.

pub mod config;
pub mod drawing;
pub mod driver;
pub mod error;
pub mod export;
pub mod geometry;
pub mod solver;
