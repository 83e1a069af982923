use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "vernissage", version)]
struct Cli {
    /// Engine configuration JSON; defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one sprite frame, cover-fit, as a PNG.
    Frame(FrameArgs),
    /// Print the brush stroke set as JSON.
    Strokes(StrokesArgs),
    /// Render the accumulated reveal mask at a point in time as a grayscale PNG.
    Mask(MaskArgs),
    /// Drive the engine headless through a scripted input sequence.
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Sprite sheet images, in sequence order.
    #[arg(long = "sheet", required = true)]
    sheets: Vec<PathBuf>,

    /// Frame number; clamped into the usable range.
    #[arg(long, allow_hyphen_values = true)]
    frame: i64,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct StrokesArgs {
    /// Band count; the configured value when omitted.
    #[arg(long)]
    bands: Option<u32>,

    /// Strokes per band; the configured value when omitted.
    #[arg(long)]
    per_band: Option<u32>,
}

#[derive(Parser, Debug)]
struct MaskArgs {
    /// Time since the mask mounted, in milliseconds.
    #[arg(long)]
    time_ms: f64,

    /// Sampling step used to accumulate coverage up to `time_ms`.
    #[arg(long, default_value_t = 16.0)]
    step_ms: f64,

    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Script JSON: `{ "previous_route": ..., "until_ms": ..., "steps": [{ "at_ms": .., "input": {..} }] }`.
    #[arg(long)]
    script: PathBuf,

    /// Sprite sheet images; without them the engine holds on frame 0.
    #[arg(long = "sheet")]
    sheets: Vec<PathBuf>,

    /// Number of carousel layers.
    #[arg(long, default_value_t = 8)]
    layers: usize,

    /// Display tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Pace ticks against the wall clock instead of stepping a virtual one.
    #[arg(long)]
    realtime: bool,

    #[arg(long, default_value_t = 640)]
    width: u32,

    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Write the final surface as a PNG.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(serde::Deserialize, Debug)]
struct Script {
    #[serde(default)]
    previous_route: Option<String>,
    #[serde(default)]
    until_ms: Option<u64>,
    steps: Vec<ScriptStep>,
}

#[derive(serde::Deserialize, Debug)]
struct ScriptStep {
    at_ms: u64,
    input: vernissage::EngineInput,
}

#[derive(serde::Serialize)]
struct EventLine<'a> {
    at_ms: u64,
    state: vernissage::ChoreographyState,
    event: &'a vernissage::EngineEvent,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => vernissage::EngineConfig::from_path(path)?,
        None => vernissage::EngineConfig::default(),
    };
    match cli.cmd {
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Strokes(args) => cmd_strokes(&cfg, args),
        Command::Mask(args) => cmd_mask(&cfg, args),
        Command::Simulate(args) => cmd_simulate(cfg, args),
    }
}

fn load_sheets(paths: &[PathBuf]) -> anyhow::Result<Vec<vernissage::PreparedImage>> {
    paths
        .iter()
        .map(|p| {
            vernissage::load_image(p).with_context(|| format!("load sheet '{}'", p.display()))
        })
        .collect()
}

fn write_png(path: &Path, surface: &vernissage::Surface) -> anyhow::Result<()> {
    surface
        .save_png(path)
        .with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_frame(cfg: &vernissage::EngineConfig, args: FrameArgs) -> anyhow::Result<()> {
    let sheets = load_sheets(&args.sheets)?;
    let mut renderer = vernissage::SpriteRenderer::new();
    let layout = cfg.sprite.layout();
    if !renderer.install(Ok(sheets), &layout) {
        anyhow::bail!("sprite sheets do not match the configured layout");
    }

    let mut surface =
        vernissage::Surface::for_viewport(vernissage::Viewport::new(args.width, args.height))?;
    match renderer.draw_frame(args.frame, &mut surface) {
        vernissage::DrawOutcome::Drawn(idx) => eprintln!("frame {}", idx.0),
        other => anyhow::bail!("nothing drawn: {other:?}"),
    }
    write_png(&args.out, &surface)
}

fn cmd_strokes(cfg: &vernissage::EngineConfig, args: StrokesArgs) -> anyhow::Result<()> {
    let bands = args.bands.unwrap_or(cfg.mask.bands);
    let per_band = args.per_band.unwrap_or(cfg.mask.strokes_per_band);
    let strokes = vernissage::generate_with(&cfg.mask, bands, per_band);
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &strokes).context("serialize strokes")?;
    writeln!(out)?;
    Ok(())
}

fn cmd_mask(cfg: &vernissage::EngineConfig, args: MaskArgs) -> anyhow::Result<()> {
    if !(args.step_ms.is_finite() && args.step_ms > 0.0) {
        anyhow::bail!("--step-ms must be > 0");
    }
    let mut mask = vernissage::RevealMask::new(cfg.mask.clone(), args.width, args.height)?;
    // Coverage is final once every stroke has settled.
    let until = args.time_ms.min(mask.settle_time_ms());
    let mut t = 0.0;
    while t < until {
        mask.advance_to(t)?;
        t += args.step_ms;
    }
    mask.advance_to(until)?;
    eprintln!(
        "revealed {:.1}% (settles at {:.0} ms)",
        mask.revealed_fraction() * 100.0,
        mask.settle_time_ms()
    );

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        mask.coverage(),
        mask.width(),
        mask.height(),
        image::ColorType::L8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_simulate(cfg: vernissage::EngineConfig, args: SimulateArgs) -> anyhow::Result<()> {
    let f = File::open(&args.script)
        .with_context(|| format!("open script '{}'", args.script.display()))?;
    let mut script: Script =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse script JSON")?;
    script.steps.sort_by_key(|s| s.at_ms);
    if args.tick_ms == 0 {
        anyhow::bail!("--tick-ms must be > 0");
    }

    let registry = vernissage::OwnershipRegistry::new();
    let artwork = (0..args.layers).map(|i| format!("layer-{i}"));
    let mut engine = vernissage::Engine::new(
        cfg,
        artwork,
        vernissage::Viewport::new(args.width, args.height),
        registry.claim(),
    )?;
    if !args.sheets.is_empty() {
        let sheets = load_sheets(&args.sheets).map_err(vernissage::VernissageError::from);
        engine.install_sheets(sheets);
    }
    engine.enter_from(script.previous_route.as_deref());

    let last_step = script.steps.last().map_or(0, |s| s.at_ms);
    let until = script.until_ms.unwrap_or(last_step + 5_000);
    let tick = Duration::from_millis(args.tick_ms);
    let manual = vernissage::ManualClock::new();
    let system = vernissage::SystemClock::new();
    let clock: &dyn vernissage::FrameClock = if args.realtime { &system } else { &manual };
    let mut steps = script.steps.into_iter().peekable();
    let mut out = std::io::stdout().lock();

    loop {
        let now = clock.now();
        let at_ms = now.as_millis() as u64;
        while let Some(step) = steps.next_if(|s| s.at_ms <= at_ms) {
            engine.push(step.input);
        }
        for event in engine.frame(now) {
            let line = EventLine {
                at_ms,
                state: engine.state(),
                event: &event,
            };
            serde_json::to_writer(&mut out, &line).context("serialize event")?;
            writeln!(out)?;
        }
        if at_ms >= until {
            break;
        }
        if args.realtime {
            out.flush()?;
            std::thread::sleep(tick);
        } else {
            manual.advance(tick);
        }
    }

    if let Some(path) = &args.out {
        write_png(path, engine.surface())?;
    }
    Ok(())
}
