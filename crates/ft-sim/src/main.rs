//! Fruit Tumble batch simulator
//!
//! Usage:
//!   ft-sim --spins 1000000 --seed 42
//!   ft-sim --config game.yaml --threads 8 --no-bonus

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ft_sim::SimConfig;
use ft_slot::EngineConfig;

#[derive(Parser)]
#[command(name = "ft-sim", about = "Fruit Tumble batch spin simulator")]
struct Cli {
    /// Paid base spins to simulate
    #[arg(short, long, default_value_t = 100_000)]
    spins: u64,

    /// RNG seed (worker N uses seed + N)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Worker threads, 0 = one per CPU
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Engine config file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Free spins per triggered bonus
    #[arg(long)]
    bonus_spins: Option<u32>,

    /// Do not play triggered bonuses
    #[arg(long)]
    no_bonus: bool,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,
}

fn load_engine_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let config = if is_yaml {
        EngineConfig::from_yaml(&text)
    } else {
        EngineConfig::from_json(&text)
    };
    config.with_context(|| format!("Invalid engine config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let engine = match &cli.config {
        Some(path) => load_engine_config(path)?,
        None => EngineConfig::default(),
    };

    let config = SimConfig {
        spins: cli.spins,
        seed: cli.seed,
        threads: cli.threads,
        auto_bonus: !cli.no_bonus,
        bonus_spins: cli.bonus_spins,
        engine,
    };

    let report = ft_sim::run(&config).context("Simulation failed")?;
    let json = if cli.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}
