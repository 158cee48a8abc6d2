use {
  anyhow::{Context, Result, bail},
  clap::Parser,
  mcmc_painter::{
    config::Config,
    driver::{self, PngSink},
    geometry::Family
  },
  std::path::PathBuf,
  tracing_subscriber::EnvFilter
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
  /// Target image (png or jpeg)
  #[arg(value_name = "INPUT")]
  input: PathBuf,

  /// Path to config TOML; defaults apply to anything it leaves out
  #[arg(long)]
  config: Option<PathBuf>,

  /// Working width in pixels; keeps the aspect ratio when height is not given
  #[arg(long)]
  width: Option<u32>,

  /// Working height in pixels
  #[arg(long)]
  height: Option<u32>,

  /// Output directory for checkpoints and results
  #[arg(long, default_value = "out")]
  out: PathBuf,

  /// Iteration budget (overrides config)
  #[arg(long)]
  iterations: Option<usize>,

  /// Random seed (overrides config)
  #[arg(long)]
  seed: Option<u64>,

  /// Primitive family: lines or dots (overrides config)
  #[arg(long, value_parser = parse_family)]
  family: Option<Family>,
}

fn parse_family(s: &str) -> Result<Family> {
  match s {
    "lines" | "line" => Ok(Family::Lines),
    "dots" | "dot" => Ok(Family::Dots),
    _ => bail!("unknown family `{s}`, expected `lines` or `dots`"),
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();
  let args = Args::parse();

  let mut config = match &args.config {
    Some(path) => Config::load(path)
      .with_context(|| format!("loading config {}", path.display()))?,
    None => Config::default(),
  };
  if let Some(iterations) = args.iterations { config.iterations = iterations; }
  if let Some(seed) = args.seed { config.seed = seed; }
  if let Some(family) = args.family { config.family = family; }

  let target = driver::load_target(&args.input, args.width, args.height)
    .with_context(|| format!("loading target {}", args.input.display()))?;
  let mut sink = PngSink::new(&args.out)?;
  let outcome = driver::run(&target, config, &mut sink)?;
  driver::write_outcome(&outcome, &target, &args.out)?;
  Ok(())
}
