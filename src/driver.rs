//! Run driver: target intake, checkpoint sinks and the top-level `run`.

use {
  crate::{
    config::Config,
    drawing::{PixelBuffer, sse_full, to_rgb8},
    error::{Error, Result},
    export::Painting,
    solver::{RunOutcome, Sampler}
  },
  anyhow::Context,
  image::imageops::FilterType,
  std::{fmt, fs, path::{Path, PathBuf}},
  tracing::info
};

/// Which state a checkpoint holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
  /// Working canvas at the start of the given iteration.
  Iteration(usize),
  /// Working canvas after the last iteration.
  Final,
  /// Lowest-error snapshot.
  Best,
}

impl fmt::Display for Checkpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Iteration(t) => write!(f, "iter_{t:07}"),
      Self::Final => f.write_str("final"),
      Self::Best => f.write_str("best"),
    }
  }
}

/// Receives canvas images while a run progresses. A failing sink is logged and the run goes on.
pub trait CheckpointSink {
  fn save(&mut self, label: &Checkpoint, buffer: &PixelBuffer) -> anyhow::Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl CheckpointSink for NullSink {
  fn save(&mut self, _: &Checkpoint, _: &PixelBuffer) -> anyhow::Result<()> {
    Ok(())
  }
}

/// Writes `<dir>/<prefix>_<label>.png`, or `<dir>/<label>.png` without a prefix.
#[derive(Debug, Clone)]
pub struct PngSink {
  dir: PathBuf,
  prefix: Option<String>,
}

impl PngSink {
  pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir)?;
    Ok(Self { dir, prefix: None })
  }

  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = Some(prefix.into());
    self
  }

  pub fn path(&self, label: &Checkpoint) -> PathBuf {
    let name = match &self.prefix {
      Some(prefix) => format!("{prefix}_{label}.png"),
      None => format!("{label}.png"),
    };
    self.dir.join(name)
  }
}

impl CheckpointSink for PngSink {
  fn save(&mut self, label: &Checkpoint, buffer: &PixelBuffer) -> anyhow::Result<()> {
    let path = self.path(label);
    to_rgb8(buffer).save(&path)
      .with_context(|| format!("writing {}", path.display()))
  }
}

/// Target from raw row-major RGB samples in `[0, 1]`.
pub fn target_from_raw(width: u32, height: u32, data: Vec<f32>) -> Result<PixelBuffer> {
  if width == 0 || height == 0 {
    return Err(Error::Target(format!("empty target ({width}x{height})")));
  }
  let expected = width as usize * height as usize * 3;
  if data.len() != expected {
    return Err(Error::Target(format!(
      "{width}x{height} RGB needs {expected} samples, got {}", data.len()
    )));
  }
  if let Some((i, v)) = data.iter().enumerate().find(|(_, v)| !(0.0..=1.0).contains(*v)) {
    return Err(Error::Target(format!("sample {i} is {v}, outside [0, 1]")));
  }
  PixelBuffer::from_raw(width, height, data)
    .ok_or_else(|| Error::Target("buffer size mismatch".into()))
}

/// Decode an image file and resize it. A missing dimension keeps the aspect ratio; with
/// neither given the native size is used.
pub fn load_target(path: impl AsRef<Path>, width: Option<u32>, height: Option<u32>) -> Result<PixelBuffer> {
  let path = path.as_ref();
  let image = image::open(path)?;
  let (w0, h0) = (image.width(), image.height());
  let scaled = |from: u32, to: u32, other: u32| ((other as u64 * to as u64) as f64 / from as f64).round().max(1.0) as u32;
  let (w, h) = match (width, height) {
    (Some(w), Some(h)) => (w, h),
    (Some(w), None) => (w, scaled(w0, w, h0)),
    (None, Some(h)) => (scaled(h0, h, w0), h),
    (None, None) => (w0, h0),
  };
  let image = if (w, h) == (w0, h0) { image } else { image.resize_exact(w, h, FilterType::Lanczos3) };
  let mut target = image.to_rgb32f();
  target.iter_mut().for_each(|v| *v = v.clamp(0.0, 1.0));
  info!("target {} resized {w0}x{h0} -> {w}x{h}", path.display());
  target_from_raw(w, h, target.into_raw())
}

/// Sample `config.iterations` moves over `target`.
pub fn run(target: &PixelBuffer, config: Config, sink: &mut impl CheckpointSink) -> Result<RunOutcome> {
  Ok(Sampler::new(target, config)?.run(sink))
}

/// Write `final.png`, `best.png`, `final.json` and `best.json` into `dir`.
pub fn write_outcome(outcome: &RunOutcome, target: &PixelBuffer, dir: impl AsRef<Path>) -> Result<()> {
  let dir = dir.as_ref();
  fs::create_dir_all(dir)?;
  let (w, h) = target.dimensions();
  to_rgb8(&outcome.buffer).save(dir.join("final.png"))?;
  to_rgb8(&outcome.best.buffer).save(dir.join("best.png"))?;
  Painting::new(&outcome.primitives, w, h, sse_full(target, &outcome.buffer))
    .write_json(dir.join("final.json"))?;
  Painting::new(&outcome.best.primitives, w, h, outcome.best.sse)
    .write_json(dir.join("best.json"))?;
  info!("wrote results to {}", dir.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_target_validation() {
    assert!(target_from_raw(2, 1, vec![0.0, 0.5, 1.0, 1.0, 0.5, 0.0]).is_ok());
    assert!(matches!(target_from_raw(2, 2, vec![0.0; 6]), Err(Error::Target(_))));
    assert!(matches!(target_from_raw(0, 2, vec![]), Err(Error::Target(_))));
    assert!(matches!(target_from_raw(1, 1, vec![0.0, 1.5, 0.0]), Err(Error::Target(_))));
    assert!(matches!(target_from_raw(1, 1, vec![0.0, f32::NAN, 0.0]), Err(Error::Target(_))));
  }

  #[test]
  fn checkpoint_names() {
    assert_eq!(Checkpoint::Iteration(250).to_string(), "iter_0000250");
    assert_eq!(Checkpoint::Final.to_string(), "final");
    let sink = PngSink { dir: "out".into(), prefix: Some("cat".into()) };
    assert_eq!(sink.path(&Checkpoint::Best), Path::new("out/cat_best.png"));
  }

  #[test]
  fn load_and_resize() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target.png");
    image::RgbImage::from_pixel(40, 20, image::Rgb([255, 0, 0])).save(&path).unwrap();

    let target = load_target(&path, Some(10), None).unwrap();
    assert_eq!(target.dimensions(), (10, 5));
    assert!(target.pixels().all(|p| p.0[0] > 0.99 && p.0[1] < 0.01 && p.0[2] < 0.01));

    let target = load_target(&path, None, None).unwrap();
    assert_eq!(target.dimensions(), (40, 20));
  }
}
