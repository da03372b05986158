use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use fourier_mixer::{
    ComponentKind, JobStatus, MixMode, MixerConfig, MixerSession, Rect, WeightGroup, codec,
};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(name = "fourier-mixer", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Mixer config JSON (resample filter, cancel timeout, FFT parallelism).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug diagnostics to stderr.
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the display view of one component of an image as a PNG.
    Show(ShowArgs),
    /// Mix up to four images in the frequency domain and write the result as a PNG.
    Mix(MixArgs),
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Component to show: raw, magnitude, phase, real or imag.
    #[arg(long, default_value = "magnitude")]
    component: ComponentKind,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct MixArgs {
    /// Input images, stored in slots 0.. in order.
    #[arg(long = "in", required = true, num_args = 1..=4)]
    in_paths: Vec<PathBuf>,

    /// Component pair to blend: mag_phase or real_imag.
    #[arg(long, default_value = "mag_phase")]
    mode: MixMode,

    /// First-group weight as `slot=weight` (magnitude or real part).
    #[arg(long = "w1", value_parser = parse_slot_weight)]
    w1: Vec<(usize, f64)>,

    /// Second-group weight as `slot=weight` (phase or imaginary part).
    #[arg(long = "w2", value_parser = parse_slot_weight)]
    w2: Vec<(usize, f64)>,

    /// Frequency region as `x1,y1,x2,y2` (inclusive, centered spectrum coordinates).
    #[arg(long, value_parser = parse_rect)]
    rect: Option<Rect>,

    /// Keep the outside of `--rect` (high frequencies) instead of the inside.
    #[arg(long, requires = "rect")]
    outer: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match &cli.config {
        Some(path) => MixerConfig::from_path(path)?,
        None => MixerConfig::default(),
    };
    match cli.cmd {
        Command::Show(args) => cmd_show(args, config),
        Command::Mix(args) => cmd_mix(args, config),
    }
}

fn cmd_show(args: ShowArgs, config: MixerConfig) -> anyhow::Result<()> {
    let bytes = read_image(&args.in_path)?;
    let session = MixerSession::new(config);
    let raw = codec::decode_grayscale(&bytes)
        .with_context(|| format!("decode '{}'", args.in_path.display()))?;
    session.upload(0, raw, ComponentKind::Magnitude)?;
    let display = session
        .select_display(0, args.component)?
        .context("uploaded image missing from slot 0")?;
    write_png(&args.out, &codec::display_to_png(&display)?)
}

fn cmd_mix(args: MixArgs, config: MixerConfig) -> anyhow::Result<()> {
    let mut session = MixerSession::new(config);
    for (slot, path) in args.in_paths.iter().enumerate() {
        let bytes = read_image(path)?;
        let report = session
            .upload_encoded(slot, &bytes, ComponentKind::Magnitude)
            .with_context(|| format!("load '{}' into slot {slot}", path.display()))?;
        tracing::debug!(slot, common = %report.common_shape, "loaded input");
    }

    session.set_mode(args.mode);
    for &(slot, weight) in &args.w1 {
        session.set_weight(slot, weight, WeightGroup::First)?;
    }
    for &(slot, weight) in &args.w2 {
        session.set_weight(slot, weight, WeightGroup::Second)?;
    }
    session.set_region(args.rect, !args.outer);
    eprintln!("{}", session.region().describe());

    session.start_mix()?;
    let started = Instant::now();
    while session.is_running() {
        std::thread::sleep(POLL_INTERVAL);
    }

    let result = match session.status() {
        JobStatus::Completed => session
            .poll_result()
            .context("mix completed without a result")?,
        JobStatus::Failed(msg) => anyhow::bail!("mix failed: {msg}"),
        other => anyhow::bail!("mix stopped without a result ({other:?})"),
    };
    tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "mix finished");

    write_png(&args.out, &codec::encode_png_gray(&result)?)
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))
}

fn write_png(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn parse_slot_weight(s: &str) -> Result<(usize, f64), String> {
    let (slot, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected slot=weight, got '{s}'"))?;
    let slot = slot
        .trim()
        .parse()
        .map_err(|e| format!("bad slot '{slot}': {e}"))?;
    let weight = weight
        .trim()
        .parse()
        .map_err(|e| format!("bad weight '{weight}': {e}"))?;
    Ok((slot, weight))
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let coords = s
        .split(',')
        .map(|v| v.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bad rectangle '{s}': {e}"))?;
    match coords.as_slice() {
        &[x1, y1, x2, y2] => Ok(Rect::new(x1, y1, x2, y2)),
        _ => Err(format!("expected x1,y1,x2,y2, got '{s}'")),
    }
}
