use {
  anyhow::Result,
  image::Rgb,
  mcmc_painter::{
    config::{Config, MoveWeights},
    drawing::{PixelBuffer, render_all, sse_full, white},
    driver::{self, NullSink, PngSink},
    export::Painting,
    geometry::{Family, Primitive},
    solver::Sampler
  }
};

fn black_square_config(family: Family) -> Config {
  Config {
    iterations: 500,
    beta_init: 0.1,
    beta_final: 3.0,
    poisson_lambda: 5.0,
    save_every: 100,
    best_every: 50,
    seed: 7,
    family,
    moves: MoveWeights { birth: 0.3, death: 0.3, jitter: 0.4, reorder: 0.0 },
    ..Config::default()
  }
}

#[test] fn lines_darken_a_black_target() -> Result<()> {
  let target = PixelBuffer::from_pixel(20, 20, Rgb([0.0, 0.0, 0.0]));
  let initial = sse_full(&target, &white(20, 20));
  assert_eq!(initial, 1200.0);

  let outcome = driver::run(&target, black_square_config(Family::Lines), &mut NullSink)?;
  let last = sse_full(&target, &outcome.buffer);
  assert!(last < initial, "final SSE {last}");
  assert!(outcome.best.sse <= last);
  assert!(outcome.primitives.iter().all(|p| matches!(p, Primitive::Line(_))));
  assert_eq!(outcome.buffer.as_raw(), render_all(&outcome.primitives, 20, 20).as_raw());
  assert_eq!(outcome.iterations, 500);
  Ok(())
}

#[test] fn primitive_count_settles_near_the_prior() -> Result<()> {
  let target = PixelBuffer::from_pixel(20, 20, Rgb([0.0, 0.0, 0.0]));
  for seed in 0..5 {
    let config = Config { seed, ..black_square_config(Family::Lines) };
    let bound = (8.0 * config.poisson_lambda) as usize;
    let mut sampler = Sampler::new(&target, config)?;

    // K every 25 iterations over the second half of the run
    let mut counts = vec![];
    while sampler.iteration() < 500 {
      sampler.step();
      let t = sampler.iteration();
      if t >= 250 && t % 25 == 0 {
        counts.push(sampler.canvas().len());
      }
    }
    assert_eq!(counts.len(), 11);
    let peak = counts.iter().copied().max().unwrap_or_default();
    assert!(peak <= bound, "seed {seed}: K = {counts:?}");
    let early = counts[..4].iter().copied().max().unwrap_or_default();
    let late = counts[counts.len() - 4..].iter().copied().max().unwrap_or_default();
    assert!(late <= early + 5, "seed {seed}: K keeps growing {counts:?}");
  }
  Ok(())
}

#[test] fn dots_run_writes_checkpoints_and_results() -> Result<()> {
  let dir = tempfile::tempdir()?;
  let target = PixelBuffer::from_fn(24, 16, |x, _| {
    if x < 12 { Rgb([0.9, 0.1, 0.1]) } else { Rgb([0.1, 0.1, 0.8]) }
  });
  let config = Config { iterations: 300, ..black_square_config(Family::Dots) };

  let mut sink = PngSink::new(dir.path().join("checkpoints"))?.with_prefix("run");
  let outcome = driver::run(&target, config, &mut sink)?;
  for name in ["run_iter_0000000", "run_iter_0000200", "run_final", "run_best"] {
    assert!(dir.path().join("checkpoints").join(format!("{name}.png")).exists(), "{name}");
  }
  assert!(outcome.primitives.iter().all(|p| matches!(p, Primitive::Dot(_))));

  driver::write_outcome(&outcome, &target, dir.path())?;
  let best = Painting::read_json(dir.path().join("best.json"))?;
  assert_eq!(best.primitives(), outcome.best.primitives);
  assert_eq!(best.render().as_raw(), outcome.best.buffer.as_raw());
  assert!(dir.path().join("final.png").exists());

  let written = image::open(dir.path().join("best.png"))?.to_rgb8();
  assert_eq!(written.dimensions(), (24, 16));
  Ok(())
}

#[test] fn config_file_drives_the_run() -> Result<()> {
  let dir = tempfile::tempdir()?;
  let path = dir.path().join("run.toml");
  std::fs::write(&path, r#"
    iterations = 120
    seed = 3
    family = "dots"

    [moves]
    birth = 0.5
    death = 0.1
    jitter = 0.3
    reorder = 0.1
  "#)?;
  let config = Config::load(&path)?;
  let target = PixelBuffer::from_pixel(12, 12, Rgb([0.5, 0.5, 0.5]));
  let a = driver::run(&target, config.clone(), &mut NullSink)?;
  let b = driver::run(&target, config, &mut NullSink)?;
  assert_eq!(a.primitives, b.primitives);
  assert_eq!(a.iterations, 120);
  Ok(())
}

#[test] fn bad_config_is_reported_before_sampling() {
  let target = white(8, 8);
  let config = Config { poisson_lambda: -1.0, ..Config::default() };
  let err = driver::run(&target, config, &mut NullSink).unwrap_err();
  assert!(err.to_string().contains("poisson"), "{err}");
}
