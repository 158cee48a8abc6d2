use {
  crate::config::MoveWeights,
  rand::Rng,
  serde::Serialize,
  std::fmt
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
  Birth,
  Death,
  Jitter,
  Reorder,
}

impl MoveKind {
  pub const COUNT: usize = 4;
  pub const ALL: [MoveKind; Self::COUNT] = [Self::Birth, Self::Death, Self::Jitter, Self::Reorder];

  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  /// Categorical draw. Weights are validated to sum to one; any rounding slack lands on the
  /// last kind with non-zero weight.
  pub fn sample(weights: &MoveWeights, rng: &mut impl Rng) -> Self {
    let u: f64 = rng.gen();
    let weights = weights.as_array();
    let mut acc = 0.0;
    for (kind, w) in Self::ALL.into_iter().zip(weights) {
      acc += w;
      if u < acc {
        return kind;
      }
    }
    Self::ALL.into_iter()
      .zip(weights)
      .rev()
      .find(|(_, w)| *w > 0.0)
      .map_or(Self::Jitter, |(kind, _)| kind)
  }

  /// Smallest collection size the move can act on.
  pub fn min_len(self) -> usize {
    match self {
      Self::Birth => 0,
      Self::Death | Self::Jitter => 1,
      Self::Reorder => 2,
    }
  }
}

impl fmt::Display for MoveKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Birth => "birth",
      Self::Death => "death",
      Self::Jitter => "jitter",
      Self::Reorder => "reorder",
    })
  }
}

/// What happened to an iteration's proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Accepted,
  Rejected,
  /// The move could not act on the current collection.
  Skipped,
}

/// Per-kind proposal counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MoveStats {
  pub proposals: [u64; MoveKind::COUNT],
  pub accepts: [u64; MoveKind::COUNT],
  pub skipped: [u64; MoveKind::COUNT],
}

impl MoveStats {
  pub fn record(&mut self, kind: MoveKind, outcome: Outcome) {
    let i = kind.index();
    match outcome {
      Outcome::Skipped => self.skipped[i] = self.skipped[i].saturating_add(1),
      Outcome::Accepted | Outcome::Rejected => {
        self.proposals[i] = self.proposals[i].saturating_add(1);
        if outcome == Outcome::Accepted {
          self.accepts[i] = self.accepts[i].saturating_add(1);
        }
      }
    }
  }

  /// Accepted share of evaluated proposals, `None` before the first one.
  pub fn acceptance_rate(&self, kind: MoveKind) -> Option<f64> {
    let i = kind.index();
    (self.proposals[i] > 0).then(|| self.accepts[i] as f64 / self.proposals[i] as f64)
  }
}

impl fmt::Display for MoveStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (n, kind) in MoveKind::ALL.into_iter().enumerate() {
      if n > 0 { f.write_str(" ")?; }
      match self.acceptance_rate(kind) {
        Some(rate) => write!(f, "{kind}={:.1}%", rate * 100.0)?,
        None => write!(f, "{kind}=-")?,
      }
    }
    Ok(())
  }
}
