#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for Geometry Defense sessions.

mod layout_transfer;

use std::{fs, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use geometry_defense_core::{DefenseKind, Event, SessionStats, SimConfig, SimState};
use geometry_defense_simulation::Simulation;
use geometry_defense_world::query;
use glam::Vec2;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use layout_transfer::{DefenseLayout, LayoutDefense};

/// Plays Geometry Defense waves without a renderer and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "geometry-defense", version, about)]
struct Args {
    /// TOML file overriding the default simulation configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of waves to play.
    #[arg(long, default_value_t = 3)]
    waves: u32,
    /// Defense to place before the first wave, as `Kind@x,y`.
    #[arg(long = "place", value_name = "KIND@X,Y")]
    placements: Vec<PlacementArg>,
    /// Layout string produced by a previous run.
    #[arg(long)]
    layout: Option<String>,
    /// Emit the summary as JSON.
    #[arg(long)]
    json: bool,
    /// Milliseconds of wall-clock time represented by one tick.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Upper bound on ticks across the whole run.
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,
}

/// Defense placement parsed from the command line.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PlacementArg {
    kind: DefenseKind,
    position: Vec2,
}

impl FromStr for PlacementArg {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let (kind, coordinates) = value
            .split_once('@')
            .with_context(|| format!("placement '{value}' must look like Kind@x,y"))?;
        let (x, y) = coordinates
            .split_once(',')
            .with_context(|| format!("placement '{value}' is missing a y coordinate"))?;
        let x: f32 = x
            .trim()
            .parse()
            .with_context(|| format!("invalid x coordinate in '{value}'"))?;
        let y: f32 = y
            .trim()
            .parse()
            .with_context(|| format!("invalid y coordinate in '{value}'"))?;

        Ok(Self {
            kind: parse_kind(kind)?,
            position: Vec2::new(x, y),
        })
    }
}

fn parse_kind(value: &str) -> Result<DefenseKind> {
    let needle = value.trim();
    DefenseKind::ALL
        .into_iter()
        .find(|kind| format!("{kind:?}").eq_ignore_ascii_case(needle))
        .with_context(|| {
            format!("unknown defense kind '{needle}' (expected sniper, rapid or heavy)")
        })
}

/// Outcome of a headless run.
#[derive(Debug, Serialize)]
struct RunSummary {
    state: SimState,
    waves_requested: u32,
    waves_cleared: u32,
    ticks: u64,
    currency: u32,
    lives: u32,
    rejected_placements: usize,
    stats: SessionStats,
    layout: String,
}

/// Entry point for the Geometry Defense command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let mut simulation = Simulation::new(config).context("invalid simulation configuration")?;

    let mut requested = Vec::new();
    if let Some(layout) = &args.layout {
        let layout = DefenseLayout::decode(layout).context("failed to decode --layout")?;
        requested.extend(layout.defenses);
    }
    requested.extend(args.placements.iter().map(|placement| LayoutDefense {
        kind: placement.kind,
        position: placement.position,
    }));

    let (placed, rejected_placements) = place_all(&mut simulation, &requested);
    let layout = DefenseLayout { defenses: placed }
        .encode()
        .context("failed to encode the placed layout")?;

    let frame = Duration::from_millis(args.frame_ms);
    let (waves_cleared, ticks) = play(&mut simulation, args.waves, frame, args.max_ticks)?;

    let snapshot = simulation.snapshot();
    let summary = RunSummary {
        state: snapshot.state,
        waves_requested: args.waves,
        waves_cleared,
        ticks,
        currency: snapshot.currency,
        lives: snapshot.lives,
        rejected_placements,
        stats: snapshot.stats,
        layout,
    };

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&summary).context("failed to serialise summary")?;
        println!("{rendered}");
    } else {
        println!("{}", query::welcome_banner(simulation.world()));
        print_summary(&summary);
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn place_all(
    simulation: &mut Simulation,
    requested: &[LayoutDefense],
) -> (Vec<LayoutDefense>, usize) {
    let mut placed = Vec::with_capacity(requested.len());
    let mut rejected = 0;
    for defense in requested {
        match simulation.place_defense(defense.kind, defense.position) {
            Ok(_) => placed.push(*defense),
            Err(reason) => {
                rejected += 1;
                tracing::warn!(
                    kind = ?defense.kind,
                    x = defense.position.x,
                    y = defense.position.y,
                    %reason,
                    "skipping placement"
                );
            }
        }
    }
    (placed, rejected)
}

/// Plays up to `waves` waves and returns the number cleared and ticks spent.
fn play(
    simulation: &mut Simulation,
    waves: u32,
    frame: Duration,
    max_ticks: u64,
) -> Result<(u32, u64)> {
    let mut cleared = 0;
    let mut tick: u64 = 0;

    while cleared < waves && simulation.state() != SimState::GameOver {
        let _ = simulation
            .start_wave()
            .context("failed to start the next wave")?;

        loop {
            if tick >= max_ticks {
                tracing::warn!(max_ticks, "tick budget exhausted");
                return Ok((cleared, tick));
            }

            let Ok(ticks) = u32::try_from(tick) else {
                bail!("tick counter exceeded the supported range");
            };
            let events = simulation.tick(frame * ticks);
            tick += 1;

            if events
                .iter()
                .any(|event| matches!(event, Event::WaveCleared { .. }))
            {
                cleared += 1;
                break;
            }
            if simulation.state() == SimState::GameOver {
                break;
            }
        }
    }

    Ok((cleared, tick))
}

fn print_summary(summary: &RunSummary) {
    println!("state:          {:?}", summary.state);
    println!(
        "waves cleared:  {}/{}",
        summary.waves_cleared, summary.waves_requested
    );
    println!("ticks:          {}", summary.ticks);
    println!("currency:       {}", summary.currency);
    println!("lives:          {}", summary.lives);
    println!("score:          {}", summary.stats.score);
    println!(
        "kills/leaks:    {}/{}",
        summary.stats.kills, summary.stats.leaks
    );
    println!(
        "shots:          {} fired, {} hits, {} misses",
        summary.stats.shots_fired, summary.stats.hits, summary.stats.misses
    );
    if summary.rejected_placements > 0 {
        println!("rejected:       {}", summary.rejected_placements);
    }
    println!("layout:         {}", summary.layout);
}
