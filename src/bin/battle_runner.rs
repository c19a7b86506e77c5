//! Headless Battle Runner
//!
//! Deploys both factions, scatters forest, runs the tick loop to completion
//! and reports a JSON or text summary.

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use shieldwall::battle::{BattleOutcome, Faction, Simulation};
use shieldwall::core::config::SimConfig;
use shieldwall::core::types::{Circle, Vec2};

/// Headless battle runner: Romans vs Barbarians to the last soldier
#[derive(Parser, Debug)]
#[command(name = "battle_runner")]
#[command(about = "Run a headless battle and report the outcome")]
struct Args {
    /// Optional TOML config; flags below override its values
    #[arg(long)]
    config: Option<String>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Battlefield width in pixels
    #[arg(long)]
    map_width: Option<f32>,

    /// Battlefield height in pixels
    #[arg(long)]
    map_height: Option<f32>,

    /// Roman regiments deployed along the south edge
    #[arg(long)]
    romans: Option<u32>,

    /// Barbarian regiments scattered across the north half
    #[arg(long)]
    barbarians: Option<u32>,

    /// Forest copses scattered before deployment
    #[arg(long)]
    copses: Option<u32>,

    /// Maximum ticks before calling the battle a stalemate
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u64,

    /// Simulated milliseconds per tick
    #[arg(long, default_value_t = 100.0)]
    tick_ms: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log agent-level events to stderr (RUST_LOG still applies)
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct BattleReport {
    outcome: String,
    ticks: u64,
    roman_survivors: u32,
    barbarian_survivors: u32,
    roman_deployed: u32,
    barbarian_deployed: u32,
    cadavers: usize,
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            let text = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Failed to read config '{path}': {e}");
                    std::process::exit(1);
                }
            };
            match SimConfig::from_toml_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Bad config '{path}': {e}");
                    std::process::exit(1);
                }
            }
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(w) = args.map_width {
        config.world_width = w;
    }
    if let Some(h) = args.map_height {
        config.world_height = h;
    }
    if let Some(n) = args.romans {
        config.roman_regiments = n;
    }
    if let Some(n) = args.barbarians {
        config.barbarian_regiments = n;
    }
    if let Some(n) = args.copses {
        config.copse_count = n;
    }

    let mut sim = match Simulation::new(config.clone()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Failed to set up the battle: {e}");
            std::process::exit(1);
        }
    };
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(1));

    scatter_copses(&mut sim, &config, &mut rng);
    let roman_deployed = deploy_romans(&mut sim, &config);
    let barbarian_deployed = deploy_barbarians(&mut sim, &config, &mut rng);

    let mut cadavers = Vec::new();
    for _ in 0..args.max_ticks {
        sim.update(args.tick_ms);
        sim.collect_cadavers(&mut cadavers);
        if sim.outcome().is_some() {
            break;
        }
    }

    let outcome = match sim.outcome() {
        Some(BattleOutcome::RomanVictory) => "roman_victory".to_string(),
        Some(BattleOutcome::BarbarianVictory) => "barbarian_victory".to_string(),
        Some(BattleOutcome::MutualAnnihilation) => "mutual_annihilation".to_string(),
        None => "stalemate".to_string(),
    };
    let report = BattleReport {
        outcome,
        ticks: sim.tick(),
        roman_survivors: sim.surviving_strength(Faction::Roman),
        barbarian_survivors: sim.surviving_strength(Faction::Barbarian),
        roman_deployed,
        barbarian_deployed,
        cadavers: cadavers.len(),
        seed: config.seed,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report).unwrap()),
        "text" => {
            println!("Battle Report");
            println!("=============");
            println!("Outcome: {}", report.outcome);
            println!("Ticks: {}", report.ticks);
            println!(
                "Romans: {}/{} soldiers survive",
                report.roman_survivors, report.roman_deployed
            );
            println!(
                "Barbarians: {}/{} soldiers survive",
                report.barbarian_survivors, report.barbarian_deployed
            );
            println!("Cadavers on the field: {}", report.cadavers);
            println!("Seed: {}", report.seed);
            for agent in sim.live_agents() {
                println!(
                    "  {} regiment {} - {} soldiers, {}",
                    agent.faction(),
                    agent.id().0,
                    agent.strength(),
                    agent.state()
                );
            }
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&report).unwrap());
        }
    }
}

fn scatter_copses(sim: &mut Simulation, config: &SimConfig, rng: &mut ChaCha8Rng) {
    for _ in 0..config.copse_count {
        let center = Vec2::new(
            rng.gen_range(0.0..config.world_width),
            rng.gen_range(0.0..config.world_height * 0.7),
        );
        let radius = rng.gen_range(config.tile_size..config.tile_size * 3.0);
        sim.register_copse(Circle::new(center, radius));
    }
}

/// Romans march in from the south in an evenly spaced line; returns total
/// soldiers deployed.
fn deploy_romans(sim: &mut Simulation, config: &SimConfig) -> u32 {
    let count = config.roman_regiments;
    if count == 0 {
        return 0;
    }
    let y = config.world_height - config.tile_size * 1.5;
    let spacing = config.world_width / (count + 1) as f32;
    let mut deployed = 0;
    for i in 0..count {
        let position = Vec2::new(spacing * (i + 1) as f32, y);
        match sim.spawn_regiment(Faction::Roman, position) {
            Ok(id) => {
                if let Some(agent) = sim.agent(id) {
                    deployed += agent.strength();
                }
            }
            Err(e) => eprintln!("Could not deploy a Roman regiment: {e}"),
        }
    }
    deployed
}

/// Barbarians lurk scattered across the northern half, many of them in the
/// trees; returns total soldiers deployed.
fn deploy_barbarians(sim: &mut Simulation, config: &SimConfig, rng: &mut ChaCha8Rng) -> u32 {
    let mut deployed = 0;
    for _ in 0..config.barbarian_regiments {
        // blocked tiles just get a re-roll
        for _attempt in 0..32 {
            let position = Vec2::new(
                deploy_coord(rng, config.tile_size, config.world_width - config.tile_size),
                deploy_coord(rng, config.tile_size, config.world_height * 0.5),
            );
            if let Ok(id) = sim.spawn_regiment(Faction::Barbarian, position) {
                if let Some(agent) = sim.agent(id) {
                    deployed += agent.strength();
                }
                break;
            }
        }
    }
    deployed
}

/// Uniform draw over `lo..hi` that falls back to the midpoint when a tiny
/// map leaves no room between the margins
fn deploy_coord(rng: &mut ChaCha8Rng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        (lo + hi) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_coord_tolerates_degenerate_span() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // world_width == 2 * tile_size leaves an empty margin range
        assert_eq!(deploy_coord(&mut rng, 128.0, 128.0), 128.0);
        assert_eq!(deploy_coord(&mut rng, 128.0, 64.0), 96.0);
        let drawn = deploy_coord(&mut rng, 128.0, 512.0);
        assert!((128.0..512.0).contains(&drawn));
    }
}
