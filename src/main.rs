//! Trickle - Entry Point
//!
//! Loads a level file and either plays it interactively from stdin or, with
//! `--ticks`, runs it headless and prints a JSON summary.

use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

use trickle::core::config::SimulationConfig;
use trickle::core::error::Result;
use trickle::level::LevelDefinition;
use trickle::simulation::{LevelPhase, Simulation, SimulationEvent};

/// Water-flow puzzle simulation
#[derive(Parser, Debug)]
#[command(name = "trickle")]
#[command(about = "Run a water-flow puzzle level interactively or headless")]
struct Args {
    /// Level file (TOML)
    level: PathBuf,

    /// Simulation config file (TOML); built-in defaults when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Run this many ticks headless and print a JSON summary
    #[arg(long)]
    ticks: Option<u32>,

    /// Chisel a tile before the first tick, as X,Y (repeatable)
    #[arg(long, value_parser = parse_pos)]
    chisel: Vec<(i32, i32)>,
}

/// JSON output structure for headless runs
#[derive(Serialize)]
struct RunSummary {
    level: String,
    ticks: u64,
    phase: LevelPhase,
    score: u32,
    goals_total: usize,
    goals_complete: usize,
    chisels_remaining: u32,
    water_total: u32,
    seed: u64,
}

fn parse_pos(text: &str) -> std::result::Result<(i32, i32), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", text))?;
    let x = x.trim().parse().map_err(|e| format!("bad x: {}", e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y: {}", e))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trickle=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let level = LevelDefinition::load(&args.level)?;
    let mut sim = level.build(&config)?;

    for &(x, y) in &args.chisel {
        sim.try_chisel(x, y)?;
    }

    match args.ticks {
        Some(ticks) => run_headless(&level, &mut sim, ticks, config.seed),
        None => run_interactive(&level, &config, sim),
    }
}

fn run_headless(
    level: &LevelDefinition,
    sim: &mut Simulation,
    ticks: u32,
    seed: u64,
) -> Result<()> {
    sim.run(ticks);

    let summary = RunSummary {
        level: level.name.clone(),
        ticks: sim.tick_count(),
        phase: sim.phase(),
        score: sim.final_score().unwrap_or_else(|| sim.score()),
        goals_total: sim.goals().len(),
        goals_complete: sim.goals_complete(),
        chisels_remaining: sim.chisels_remaining(),
        water_total: sim.water_total(),
        seed,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_interactive(
    level: &LevelDefinition,
    config: &SimulationConfig,
    mut sim: Simulation,
) -> Result<()> {
    println!("\n=== {} ===", level.name);
    if !level.tip.is_empty() {
        println!("{}", level.tip);
    }
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance simulation by one tick");
    println!("  run <n>         - Run n simulation ticks");
    println!("  chisel <x> <y>  - Chisel away a tile");
    println!("  restart / r     - Start this level over");
    println!("  status / s      - Show level status");
    println!("  quit / q        - Exit");
    println!();

    loop {
        print!("[tick {}] > ", sim.tick_count());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if input == "tick" || input == "t" {
            report_events(&sim.tick());
            continue;
        }

        if input == "status" || input == "s" {
            display_status(&sim);
            continue;
        }

        if let Some(arg) = input.strip_prefix("run ") {
            match arg.trim().parse::<u32>() {
                Ok(n) => {
                    report_events(&sim.run(n));
                    println!("Now at tick {}.", sim.tick_count());
                }
                Err(_) => println!("Usage: run <number>"),
            }
            continue;
        }

        if let Some(arg) = input.strip_prefix("chisel ") {
            let coords: Vec<i32> = arg
                .split_whitespace()
                .filter_map(|part| part.parse().ok())
                .collect();
            match coords.as_slice() {
                [x, y] => match sim.try_chisel(*x, *y) {
                    Ok(kind) => println!(
                        "Removed {:?} at ({}, {}). {} chisel(s) left.",
                        kind,
                        x,
                        y,
                        sim.chisels_remaining()
                    ),
                    Err(e) => println!("Cannot chisel: {}", e),
                },
                _ => println!("Usage: chisel <x> <y>"),
            }
            continue;
        }

        if input == "restart" || input == "r" {
            sim = level.build(config)?;
            println!("Restarted {}.", level.name);
            continue;
        }

        println!(
            "Unknown command. Available: tick, run <n>, chisel <x> <y>, restart, status, quit"
        );
    }

    println!(
        "\nGoodbye! {} ticks elapsed, score {}.",
        sim.tick_count(),
        sim.final_score().unwrap_or_else(|| sim.score())
    );
    Ok(())
}

fn report_events(events: &[SimulationEvent]) {
    for event in events {
        match event {
            SimulationEvent::TileReplaced { pos, from, to } => {
                println!("  ({}, {}) {:?} -> {:?}", pos.x, pos.y, from, to)
            }
            SimulationEvent::PerliteDripped { pos } => {
                println!("  perlite at ({}, {}) dripped", pos.x, pos.y)
            }
            SimulationEvent::LevelCompleted { tick, score } => {
                println!("*** Level complete on tick {} with score {} ***", tick, score)
            }
        }
    }
}

fn display_status(sim: &Simulation) {
    println!("Phase:     {:?}", sim.phase());
    println!("Tick:      {}", sim.tick_count());
    println!("Chisels:   {}", sim.chisels_remaining());
    println!("Goals:     {}/{}", sim.goals_complete(), sim.goals().len());
    println!("Water:     {}", sim.water_total());
    println!("Bodies:    {}", sim.bodies().len());
    println!("Score:     {}", sim.score());
}
