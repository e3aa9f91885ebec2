//! Wheel of fortune command line
//!
//! Usage:
//!   wheel spin --items Alice,Bob,Carol      - Spin once and print the winner
//!   wheel simulate --spins 10000            - Batch statistics
//!   wheel tick-wav --out tick.wav           - Export the peg tick sound
//!   wheel layout --items a,b,c --size 500   - Print wheel geometry as JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use wf_audio::{DEFAULT_SAMPLE_RATE, TickSynth, render_tick_track, write_wav};
use wf_core::SpinMode;
use wf_sim::{BatchSimulator, SimConfig};
use wf_wheel::{
    DEFAULT_SIZE, EventLog, FrameDriver, SegmentList, SpinEngine, WheelConfig, WheelLayout,
};

#[derive(Parser)]
#[command(name = "wheel", version, about = "Wheel of fortune spin engine")]
struct Cli {
    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the wheel once
    Spin(SpinArgs),
    /// Run many spins and report the winner distribution
    Simulate(SimulateArgs),
    /// Write the peg tick sound to a WAV file
    TickWav {
        /// Output path
        #[arg(short, long, default_value = "tick.wav")]
        out: PathBuf,
        /// Sample rate (Hz)
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
    },
    /// Print the wheel geometry as JSON
    Layout {
        #[command(flatten)]
        items: ItemArgs,
        /// Drawing size (px)
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: f64,
    },
}

#[derive(Args)]
struct ItemArgs {
    /// Comma separated items
    #[arg(short, long, value_delimiter = ',')]
    items: Vec<String>,
    /// File with one item per line
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Repeat short lists up to 16 segments
    #[arg(long)]
    pad: bool,
}

#[derive(Args)]
struct SpinArgs {
    #[command(flatten)]
    items: ItemArgs,
    /// Spin mode: physics or booster
    #[arg(short, long)]
    mode: Option<SpinMode>,
    /// Initial velocity for a physics spin (degrees per frame)
    #[arg(long, allow_hyphen_values = true)]
    velocity: Option<f64>,
    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,
    /// Engine config (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
    /// Print every frame's render state
    #[arg(long)]
    trace: bool,
    /// Export the spin's tick track to a WAV file
    #[arg(long)]
    wav: Option<PathBuf>,
}

#[derive(Args)]
struct SimulateArgs {
    /// Number of spins
    #[arg(long, default_value_t = 10_000)]
    spins: usize,
    /// Segments on the simulated wheel
    #[arg(long, default_value_t = 6)]
    segments: usize,
    /// Spin mode: physics or booster
    #[arg(short, long, default_value = "booster")]
    mode: SpinMode,
    /// Master seed
    #[arg(long)]
    seed: Option<u64>,
    /// Engine config (.json, .yaml, .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of `wheel spin`
#[derive(Serialize)]
struct SpinOutcome {
    mode: SpinMode,
    segments: usize,
    winner: usize,
    label: String,
    rotation: f64,
    frames: u64,
    elapsed_ms: f64,
    ticks: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Spin(args) => spin(args),
        Commands::Simulate(args) => simulate(args),
        Commands::TickWav { out, sample_rate } => tick_wav(&out, sample_rate),
        Commands::Layout { items, size } => layout(&items, size),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load_config(path: Option<&Path>) -> Result<WheelConfig> {
    match path {
        Some(path) => WheelConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(WheelConfig::default()),
    }
}

fn load_segments(args: &ItemArgs) -> Result<SegmentList> {
    let segments = match &args.file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read items from {}", path.display()))?;
            SegmentList::from_lines(&text)
        }
        None => SegmentList::new(
            args.items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty()),
        ),
    };
    if segments.is_empty() {
        bail!("No items given: use --items a,b,c or --file <path>");
    }
    Ok(if args.pad { segments.padded() } else { segments })
}

fn spin(args: SpinArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    let segments = load_segments(&args.items)?;
    if segments.len() < 2 {
        bail!("A wheel needs at least 2 items, got {}", segments.len());
    }

    let mut driver = FrameDriver::new(&config.timing);
    let mut engine = SpinEngine::with_config(config, EventLog::new())?;
    engine.set_segments(segments)?;

    let accepted = match (engine.config().mode, args.velocity) {
        (SpinMode::Physics, Some(velocity)) => engine.spin(velocity),
        _ => engine.request_spin(),
    };
    if !accepted {
        bail!("Spin was rejected");
    }
    let mode = engine.config().mode;

    let report = if args.trace {
        driver.run_observed(&mut engine, |state| {
            println!(
                "{:>10.3} {:>8.3} {}",
                state.rotation,
                state.pointer_deflection,
                if state.spinning { "spinning" } else { "idle" }
            );
        })
    } else {
        driver.run_until_idle(&mut engine)
    };
    if report.hit_frame_limit {
        bail!("Spin did not settle within {} frames", report.frames);
    }

    let events = engine.events();
    let winner = events
        .last_winner()
        .context("Engine went idle without settling")?;

    if let Some(path) = &args.wav {
        let synth = TickSynth::default();
        let total_ms = report.elapsed_ms + synth.duration_ms;
        let track = render_tick_track(&synth, &events.tick_times_ms(), total_ms, DEFAULT_SAMPLE_RATE);
        write_wav(path, &track, DEFAULT_SAMPLE_RATE)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let outcome = SpinOutcome {
        mode,
        segments: engine.segments().len(),
        winner,
        label: engine.segments().label(winner).unwrap_or_default().to_string(),
        rotation: engine.rotation(),
        frames: report.frames,
        elapsed_ms: report.elapsed_ms,
        ticks: events.ticks(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "Winner: {} (#{}) after {} frames, {} ticks",
            outcome.label, outcome.winner, outcome.frames, outcome.ticks
        );
    }
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut config = SimConfig::default()
        .with_spins(args.spins)
        .with_segments(args.segments)
        .with_mode(args.mode)
        .with_wheel(load_config(args.config.as_deref())?);
    config.seed = args.seed;
    config.threads = args.threads;

    let report = BatchSimulator::new(config)
        .context("Invalid simulation settings")?
        .run()?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
        if !report.passes_uniformity() {
            log::warn!("Winner distribution failed the uniformity check");
        }
    }
    Ok(())
}

fn tick_wav(out: &Path, sample_rate: u32) -> Result<()> {
    let synth = TickSynth::default();
    synth.validate()?;
    let click = synth.render(sample_rate);
    write_wav(out, &click, sample_rate)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!(
        "Wrote {} samples ({} ms @ {} Hz) to {}",
        click.len(),
        synth.duration_ms,
        sample_rate,
        out.display()
    );
    Ok(())
}

fn layout(items: &ItemArgs, size: f64) -> Result<()> {
    if size.is_nan() || size <= 0.0 {
        bail!("--size must be positive");
    }
    let segments = load_segments(items)?;
    let layout = WheelLayout::compute(&segments, size);
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}
