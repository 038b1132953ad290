use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam::channel::RecvTimeoutError;
use sv_common::{Algorithm, Direction, SpeedSetting, StepEvent, VisualizerConfig};
use sv_engine::{NoopPacer, Pacer, RunReport, SleepPacer, SortController, SortState};
use sv_input::{generate_random, parse_numbers};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// sortviz -- watch a sorting algorithm work, one step at a time.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON configuration file (speed, random range, defaults)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// bubble, selection, insertion, quick or merge
    #[arg(long, short)]
    algorithm: Option<Algorithm>,

    /// asc or desc
    #[arg(long, short)]
    direction: Option<Direction>,

    /// slow, normal, fast, or a delay in milliseconds
    #[arg(long, short)]
    speed: Option<SpeedSetting>,

    /// Comma-separated integers to sort, e.g. "5,3,1". Without it a random
    /// sequence is drawn from the configured range.
    #[arg(long, short)]
    numbers: Option<String>,

    /// Deliver steps without pausing
    #[arg(long)]
    no_delay: bool,

    /// Print one JSON object per step instead of bars
    #[arg(long)]
    json: bool,
}

/// How often the renderer checks whether the run has ended.
const POLL: Duration = Duration::from_millis(20);

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => VisualizerConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => VisualizerConfig::default(),
    };
    let algorithm = cli.algorithm.unwrap_or(config.algorithm);
    let direction = cli.direction.unwrap_or(config.direction);
    let speed = match cli.speed {
        Some(speed) => speed,
        None => config.speed().context("invalid speed in configuration")?,
    };

    let values = match &cli.numbers {
        Some(text) => parse_numbers(text).context("could not read --numbers")?,
        None => generate_random(&config.random).context("could not generate a sequence")?,
    };
    debug!(count = values.len(), random = cli.numbers.is_none(), "Sequence ready");

    let pacer: Arc<dyn Pacer> = if cli.no_delay {
        Arc::new(NoopPacer)
    } else {
        Arc::new(SleepPacer)
    };
    let controller = SortController::with_pacer(pacer);
    controller.set_speed(speed);
    controller.set_sequence(&values)?;

    let mode = if cli.json {
        Mode::Json
    } else {
        Mode::Bars {
            color: io::stdout().is_terminal(),
        }
    };
    let report = run(&controller, algorithm, direction, mode)?;

    let mut out = io::stdout().lock();
    match mode {
        Mode::Json => writeln!(out, "{}", summary_json(&report, &controller.values()))?,
        Mode::Bars { .. } => {
            writeln!(out, "{:?}", controller.values())?;
            writeln!(out, "{}", summary_line(&report))?;
        }
    }

    if report.outcome != SortState::Completed {
        bail!("sort did not complete: {}", report.outcome.label());
    }
    info!(run = %report.run, "Done");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    Bars { color: bool },
    Json,
}

/// Run the sort on a background thread and render steps as they arrive.
fn run(
    controller: &SortController,
    algorithm: Algorithm,
    direction: Direction,
    mode: Mode,
) -> Result<RunReport> {
    let (subscription, rx) = controller.subscribe_channel();
    let handle = controller.spawn(algorithm, direction)?;
    debug!(run = %handle.run(), %algorithm, %direction, "Run spawned");
    let mut out = io::stdout().lock();

    loop {
        match rx.recv_timeout(POLL) {
            Ok(event) => render(&mut out, &event, mode)?,
            Err(RecvTimeoutError::Timeout) if handle.is_finished() => break,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    // Steps sent just before the run thread exited.
    for event in rx.try_iter() {
        render(&mut out, &event, mode)?;
    }
    out.flush()?;

    controller.unsubscribe(subscription);
    Ok(handle.wait()?)
}

fn render(out: &mut impl Write, event: &StepEvent, mode: Mode) -> Result<()> {
    match mode {
        Mode::Json => writeln!(out, "{}", serde_json::to_string(event)?)?,
        Mode::Bars { color } => writeln!(
            out,
            "{:>5} {:<12} {}",
            event.seq,
            event.step.to_string(),
            bar_line(&event.values, &event.step.indices(), color)
        )?,
    }
    Ok(())
}

/// One character per value, scaled between the smallest and largest value.
/// Highlighted positions are drawn in reverse video, or as `^` markers when
/// color is off.
fn bar_line(values: &[i32], highlight: &[usize], color: bool) -> String {
    let (lo, hi) = match (values.iter().min(), values.iter().max()) {
        (Some(&lo), Some(&hi)) => (i64::from(lo), i64::from(hi)),
        _ => return String::new(),
    };
    let span = hi - lo;
    let top = LEVELS.len() as i64 - 1;

    let mut line = String::with_capacity(values.len() * 4);
    for (i, &value) in values.iter().enumerate() {
        let level = if span == 0 {
            top
        } else {
            (i64::from(value) - lo) * top / span
        };
        let bar = LEVELS[level as usize];
        let lit = highlight.contains(&i);
        match (lit, color) {
            (true, true) => {
                line.push_str("\x1b[7m");
                line.push(bar);
                line.push_str("\x1b[0m");
            }
            (true, false) => line.push('^'),
            (false, _) => line.push(bar),
        }
    }
    line
}

fn summary_line(report: &RunReport) -> String {
    format!(
        "{} ({}): {} after {} steps ({} compares, {} swaps, {} overwrites) in {:.1?}",
        report.algorithm,
        report.direction,
        report.outcome.label(),
        report.counts.steps,
        report.counts.compares,
        report.counts.swaps,
        report.counts.overwrites,
        report.elapsed,
    )
}

fn summary_json(report: &RunReport, values: &[i32]) -> serde_json::Value {
    serde_json::json!({
        "run": report.run,
        "algorithm": report.algorithm,
        "stable": report.algorithm.is_stable(),
        "direction": report.direction,
        "outcome": report.outcome.label(),
        "steps": report.counts.steps,
        "compares": report.counts.compares,
        "swaps": report.counts.swaps,
        "overwrites": report.counts.overwrites,
        "elapsed_ms": report.elapsed.as_millis() as u64,
        "values": values,
    })
}
