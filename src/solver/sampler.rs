use {
  super::{
    Schedule,
    moves::{MoveKind, MoveStats, Outcome},
    proposal::{jitter, log_prior, log_prior_k, sample_birth}
  },
  crate::{
    config::Config,
    driver::{Checkpoint, CheckpointSink},
    drawing::{Canvas, Draw, Edit, PixelBuffer, copy_region, render_region, sse, sse_full},
    error::{Error, Result},
    geometry::{BoundingBox, PixelBox, Primitive, canvas_box, union_box}
  },
  rand::{Rng, SeedableRng, seq::SliceRandom},
  rand_pcg::Pcg64,
  tracing::{debug, info, trace, warn}
};

/// Copy of the lowest-error state seen at a best check.
#[derive(Debug, Clone)]
pub struct Snapshot {
  pub primitives: Vec<Primitive>,
  pub buffer: PixelBuffer,
  pub sse: f64,
  pub iteration: usize,
}

/// Everything a finished run hands back.
#[derive(Debug, Clone)]
pub struct RunOutcome {
  pub buffer: PixelBuffer,
  pub primitives: Vec<Primitive>,
  pub best: Snapshot,
  pub stats: MoveStats,
  /// Best SSE after every best check, in order.
  pub history: Vec<f64>,
  pub iterations: usize,
}

/// Scored proposal, not yet accepted or rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
  /// Pixels the proposal was scored on.
  pub region: PixelBox,
  /// `SSE(after) - SSE(before)` over `region`.
  pub delta_sse: f64,
  pub log_alpha: f64,
}

/// Reversible-jump Metropolis-Hastings over an ordered collection of primitives.
///
/// Every iteration proposes one birth, death, jitter or reorder move, scores it on the
/// pixels it can change and commits it to the canvas if accepted.
pub struct Sampler<'a> {
  target: &'a PixelBuffer,
  config: Config,
  schedule: Schedule,
  pub(super) canvas: Canvas,
  /// Proposal evaluation buffer; only the evaluated region is meaningful.
  scratch: PixelBuffer,
  rng: Pcg64,
  iteration: usize,
  best: Snapshot,
  stats: MoveStats,
  history: Vec<f64>,
}

impl<'a> Sampler<'a> {
  /// Empty white canvas over `target`. Fails before any sampling on a bad configuration.
  pub fn new(target: &'a PixelBuffer, config: Config) -> Result<Self> {
    config.validate()?;
    let (w, h) = target.dimensions();
    if w == 0 || h == 0 {
      return Err(Error::Target(format!("empty target ({w}x{h})")));
    }
    let canvas = Canvas::new(w, h);
    let best = Snapshot {
      primitives: vec![],
      buffer: canvas.buffer().clone(),
      sse: canvas.sse(target),
      iteration: 0,
    };
    Ok(Self {
      target,
      schedule: Schedule::new(config.beta_init, config.beta_final, config.iterations),
      scratch: canvas.buffer().clone(),
      rng: Pcg64::seed_from_u64(config.seed),
      config,
      canvas,
      iteration: 0,
      best,
      stats: MoveStats::default(),
      history: vec![],
    })
  }

  pub fn canvas(&self) -> &Canvas { &self.canvas }
  pub fn config(&self) -> &Config { &self.config }
  pub fn iteration(&self) -> usize { self.iteration }
  pub fn stats(&self) -> &MoveStats { &self.stats }
  pub fn best(&self) -> &Snapshot { &self.best }
  pub fn history(&self) -> &[f64] { &self.history }

  /// Inverse temperature of the current iteration.
  pub fn beta(&self) -> f64 {
    self.schedule.beta(self.iteration)
  }

  /// Run the remaining iterations, then the final best check and the `final`/`best`
  /// checkpoints.
  pub fn run(mut self, sink: &mut impl CheckpointSink) -> RunOutcome {
    let (w, h) = self.canvas.dimensions();
    info!(
      "sampling {w}x{h}, {} iterations, family {:?}, seed {}",
      self.config.iterations, self.config.family, self.config.seed
    );
    while self.iteration < self.config.iterations {
      if self.iteration % self.config.save_every == 0 {
        self.log_progress();
        self.checkpoint(sink, Checkpoint::Iteration(self.iteration));
      }
      self.step();
      if self.iteration % self.config.best_every == 0 {
        self.update_best();
      }
    }
    if self.iteration % self.config.best_every != 0 {
      self.update_best();
    }
    self.log_progress();
    self.checkpoint(sink, Checkpoint::Final);
    if let Err(e) = sink.save(&Checkpoint::Best, &self.best.buffer) {
      warn!("checkpoint {} failed: {e:#}", Checkpoint::Best);
    }
    info!(
      "done: {} primitives, best SSE {:.4} at iteration {}",
      self.canvas.len(), self.best.sse, self.best.iteration
    );
    self.into_outcome()
  }

  /// One iteration: draw a move kind, propose, score, accept or reject.
  pub fn step(&mut self) -> (MoveKind, Outcome) {
    let kind = MoveKind::sample(&self.config.moves, &mut self.rng);
    let len = self.canvas.len();
    let outcome = if len < kind.min_len() {
      Outcome::Skipped
    } else {
      let (w, h) = self.canvas.dimensions();
      match kind {
        MoveKind::Birth => {
          let candidate = sample_birth(
            self.config.birth_kernel,
            self.config.family,
            self.target,
            self.canvas.buffer(),
            &self.config.model,
            &mut self.rng
          );
          self.try_birth(candidate)
        }
        MoveKind::Death => {
          let index = self.rng.gen_range(0..len);
          self.try_death(index)
        }
        MoveKind::Jitter => {
          let index = self.rng.gen_range(0..len);
          let proposal = jitter(&self.canvas.primitives()[index], w, h, &self.config.model, &mut self.rng);
          self.try_jitter(index, proposal)
        }
        MoveKind::Reorder => {
          let mut permutation = self.canvas.primitives().to_vec();
          permutation.shuffle(&mut self.rng);
          self.try_reorder(permutation)
        }
      }
    };
    trace!("t={} {kind}: {outcome:?}, K={}", self.iteration, self.canvas.len());
    self.stats.record(kind, outcome);
    self.iteration += 1;
    (kind, outcome)
  }

  pub fn try_birth(&mut self, candidate: Primitive) -> Outcome {
    let Some(eval) = self.evaluate_birth(&candidate) else { return Outcome::Rejected };
    if !self.accept(eval.log_alpha) {
      return Outcome::Rejected;
    }
    self.canvas.composite_local(candidate, &eval.region);
    Outcome::Accepted
  }

  pub fn try_death(&mut self, index: usize) -> Outcome {
    let Some(eval) = self.evaluate_death(index) else { return Outcome::Skipped };
    if !self.accept(eval.log_alpha) {
      return Outcome::Rejected;
    }
    self.canvas.remove(index);
    Outcome::Accepted
  }

  pub fn try_jitter(&mut self, index: usize, proposal: Primitive) -> Outcome {
    if index >= self.canvas.len() {
      return Outcome::Skipped;
    }
    let Some(eval) = self.evaluate_jitter(index, &proposal) else { return Outcome::Rejected };
    if !self.accept(eval.log_alpha) {
      return Outcome::Rejected;
    }
    self.canvas.replace(index, proposal);
    Outcome::Accepted
  }

  /// `permutation` must hold exactly the current primitives, in any order.
  pub fn try_reorder(&mut self, permutation: Vec<Primitive>) -> Outcome {
    let Some(eval) = self.evaluate_reorder(&permutation) else { return Outcome::Skipped };
    if !self.accept(eval.log_alpha) {
      return Outcome::Rejected;
    }
    // scratch holds the full render of `permutation`
    self.canvas.adopt(permutation, &mut self.scratch);
    Outcome::Accepted
  }

  /// `None` when the candidate lies outside the prior's support.
  pub fn evaluate_birth(&mut self, candidate: &Primitive) -> Option<Evaluation> {
    let (w, h) = self.canvas.dimensions();
    let log_p = log_prior(candidate, w, h, &self.config.model);
    if log_p == f64::NEG_INFINITY {
      return None;
    }
    let k = self.canvas.len();
    let lambda = self.config.poisson_lambda;
    let region = candidate.bounding_box(w, h, self.config.bbox_pad);

    // the canvas already equals render_all inside the region
    copy_region(&mut self.scratch, self.canvas.buffer(), &region);
    candidate.draw_region(&mut self.scratch, &region);
    let delta_sse = self.delta_sse(&region);

    let log_alpha = -self.beta() * delta_sse
      + log_p
      + log_prior_k(k + 1, lambda) - log_prior_k(k, lambda)
      + (1.0 / (k + 1) as f64).ln();
    Some(Evaluation { region, delta_sse, log_alpha })
  }

  /// `None` when `index` is out of range.
  pub fn evaluate_death(&mut self, index: usize) -> Option<Evaluation> {
    let k = self.canvas.len();
    let removed = *self.canvas.primitives().get(index)?;
    let (w, h) = self.canvas.dimensions();
    let lambda = self.config.poisson_lambda;
    let region = removed.bounding_box(w, h, self.config.bbox_pad);

    self.canvas.rebuild_local(&mut self.scratch, &region, Edit::Remove(index));
    let delta_sse = self.delta_sse(&region);

    let log_alpha = -self.beta() * delta_sse
      + log_prior_k(k - 1, lambda) - log_prior_k(k, lambda)
      - log_prior(&removed, w, h, &self.config.model)
      + (k as f64).ln();
    Some(Evaluation { region, delta_sse, log_alpha })
  }

  /// The proposal is scored at the painter position of the primitive it replaces.
  /// `None` when the proposal lies outside the prior's support or `index` is out of range.
  pub fn evaluate_jitter(&mut self, index: usize, proposal: &Primitive) -> Option<Evaluation> {
    let old = *self.canvas.primitives().get(index)?;
    let (w, h) = self.canvas.dimensions();
    let log_p_new = log_prior(proposal, w, h, &self.config.model);
    if log_p_new == f64::NEG_INFINITY {
      return None;
    }
    let pad = self.config.bbox_pad;
    let region = union_box(&old.bounding_box(w, h, pad), &proposal.bounding_box(w, h, pad));

    self.canvas.rebuild_local(&mut self.scratch, &region, Edit::Replace(index, proposal));
    let delta_sse = self.delta_sse(&region);

    let log_alpha = -self.beta() * delta_sse
      + log_p_new - log_prior(&old, w, h, &self.config.model);
    Some(Evaluation { region, delta_sse, log_alpha })
  }

  /// Renders `permutation` over the whole scratch buffer. `None` when it cannot be a
  /// permutation of the current primitives.
  pub fn evaluate_reorder(&mut self, permutation: &[Primitive]) -> Option<Evaluation> {
    if permutation.len() != self.canvas.len() {
      return None;
    }
    let (w, h) = self.canvas.dimensions();
    let region = canvas_box(w, h);
    render_region(&mut self.scratch, permutation, &region);
    let delta_sse = sse_full(self.target, &self.scratch) - self.canvas.sse(self.target);
    Some(Evaluation { region, delta_sse, log_alpha: -self.beta() * delta_sse })
  }

  /// Full-image error of the current canvas; replaces the best snapshot if strictly lower.
  pub fn update_best(&mut self) -> f64 {
    let current = self.canvas.sse(self.target);
    if current < self.best.sse {
      debug!("t={}: new best SSE {current:.4} (was {:.4})", self.iteration, self.best.sse);
      self.best = Snapshot {
        primitives: self.canvas.primitives().to_vec(),
        buffer: self.canvas.buffer().clone(),
        sse: current,
        iteration: self.iteration,
      };
    }
    self.history.push(self.best.sse);
    current
  }

  pub fn into_outcome(self) -> RunOutcome {
    let iterations = self.iteration;
    let (primitives, buffer) = self.canvas.into_parts();
    RunOutcome { buffer, primitives, best: self.best, stats: self.stats, history: self.history, iterations }
  }

  /// Error change over `region` between the canvas and the scratch buffer.
  fn delta_sse(&self, region: &PixelBox) -> f64 {
    sse(self.target, &self.scratch, region) - sse(self.target, self.canvas.buffer(), region)
  }

  fn accept(&mut self, log_alpha: f64) -> bool {
    log_alpha >= 0.0 || self.rng.gen::<f64>().ln() < log_alpha
  }

  fn checkpoint(&self, sink: &mut impl CheckpointSink, label: Checkpoint) {
    if let Err(e) = sink.save(&label, self.canvas.buffer()) {
      warn!("checkpoint {label} failed: {e:#}");
    }
  }

  fn log_progress(&self) {
    info!(
      "t={} K={} beta={:.4} sse={:.4} best={:.4} accept[{}]",
      self.iteration,
      self.canvas.len(),
      self.beta(),
      self.canvas.sse(self.target),
      self.best.sse,
      self.stats
    );
  }
}
