use anyhow::Result;
use clap::Parser;
use log::info;
use std::time::Instant;

use parklogic::{config::SimulationConfig, simulation::Simulation};

// simulated seconds
const STATUS_INTERVAL: f32 = 10.0;

#[derive(Parser)]
#[command(name = "parklogic")]
#[command(about = "Headless autonomous parking and charging traffic simulation")]
struct Args {
    /// Simulation configuration file (built-in defaults at spawn level 3 when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Random seed for reproducible simulations
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long)]
    duration: Option<f32>,

    /// Auto-spawn level, 0 (off) to 5 (busiest)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=5))]
    spawn_level: Option<u8>,

    /// Enable verbose logging for detailed simulation progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting ParkLogic");

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            SimulationConfig::load_from_file(path)?
        }
        None => SimulationConfig::headless(),
    };

    // Command line overrides the file
    if args.seed.is_some() {
        config.random.seed = args.seed;
    }
    if let Some(duration) = args.duration {
        config.simulation.duration = duration;
    }
    if let Some(level) = args.spawn_level {
        config.traffic.initial_spawn_level = level as usize;
    }

    let mut simulation = Simulation::new(&config)?;
    info!(
        "Running {:.0}s at {} Hz, spawn level {}, seed {:?}",
        config.simulation.duration,
        config.simulation.tick_rate,
        simulation.traffic.spawn_level(),
        config.random.seed
    );

    let started = Instant::now();
    let mut next_status = STATUS_INTERVAL;
    while simulation.time() < config.simulation.duration {
        simulation.step();
        // Headless runs have no consumer for notifications.
        simulation.drain_events();

        if simulation.time() >= next_status {
            simulation.log_status();
            next_status += STATUS_INTERVAL;
        }
    }

    let stats = simulation.traffic.stats();
    info!(
        "Finished {:.0}s in {:.2?}: {} spawned, {} reservations, {} through, {} exits, {} despawned",
        simulation.time(),
        started.elapsed(),
        stats.spawned,
        stats.reservations,
        stats.through_traffic,
        stats.exits,
        stats.despawned
    );

    Ok(())
}
