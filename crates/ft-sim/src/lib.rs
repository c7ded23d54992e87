//! # ft-sim — Batch spin simulator
//!
//! Runs many headless spins split across rayon workers. Worker `w` owns an
//! engine seeded with `seed + w`, so a run is reproducible for a given seed
//! and thread count. Triggered bonuses are started and played out
//! automatically unless disabled.

use std::time::Instant;

use ft_slot::{ConfigError, EngineConfig, SessionStats, SlotEngine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Simulation errors
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid engine config: {0}")]
    Config(#[from] ConfigError),

    #[error("Spin count must be positive")]
    NoSpins,

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// Simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Paid base spins across all workers
    pub spins: u64,
    pub seed: u64,
    /// Worker threads, 0 = one per CPU
    pub threads: usize,
    /// Start and play a bonus whenever one is triggered
    pub auto_bonus: bool,
    /// Free spins per bonus, `None` = engine default
    pub bonus_spins: Option<u32>,
    pub engine: EngineConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spins: 100_000,
            seed: 0,
            threads: 0,
            auto_bonus: true,
            bonus_spins: None,
            engine: EngineConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn with_spins(mut self, spins: u64) -> Self {
        self.spins = spins;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    fn resolved_threads(&self) -> usize {
        let threads = if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        };
        threads.max(1)
    }

    /// Spins for worker `index` out of `workers`
    fn quota(&self, index: usize, workers: usize) -> u64 {
        let workers = workers as u64;
        let index = index as u64;
        self.spins / workers + u64::from(index < self.spins % workers)
    }
}

/// Simulation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimReport {
    pub spins: u64,
    pub seed: u64,
    pub workers: usize,
    pub bet: f64,
    /// Percent
    pub rtp: f64,
    /// Percent of base spins
    pub hit_rate: f64,
    /// Base spins per bonus trigger
    pub trigger_frequency: Option<f64>,
    pub avg_cascade_steps: f64,
    pub max_win_ratio: f64,
    pub elapsed_ms: u128,
    pub stats: SessionStats,
}

impl SimReport {
    fn new(config: &SimConfig, workers: usize, stats: SessionStats, elapsed_ms: u128) -> Self {
        Self {
            spins: stats.total_spins,
            seed: config.seed,
            workers,
            bet: config.engine.bet,
            rtp: stats.rtp(),
            hit_rate: stats.hit_rate(),
            trigger_frequency: stats.trigger_frequency(),
            avg_cascade_steps: stats.avg_cascade_steps(),
            max_win_ratio: stats.max_win_ratio,
            elapsed_ms,
            stats,
        }
    }
}

/// Run the simulation
pub fn run(config: &SimConfig) -> SimResult<SimReport> {
    if config.spins == 0 {
        return Err(SimError::NoSpins);
    }
    config.engine.validate()?;

    let threads = config.resolved_threads();
    let workers = threads.min(usize::try_from(config.spins).unwrap_or(usize::MAX));
    log::info!(
        "Simulating {} spins on {} worker(s), seed {}",
        config.spins,
        workers,
        config.seed
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| SimError::ThreadPool(e.to_string()))?;

    let started = Instant::now();
    let results: Vec<SimResult<SessionStats>> = pool.install(|| {
        (0..workers)
            .into_par_iter()
            .map(|w| run_worker(config, w as u64, config.quota(w, workers)))
            .collect()
    });

    let mut stats = SessionStats::new();
    for result in results {
        stats.merge(&result?);
    }

    let report = SimReport::new(config, workers, stats, started.elapsed().as_millis());
    log::info!(
        "Simulation done in {} ms: RTP {:.2}%, hit rate {:.2}%",
        report.elapsed_ms,
        report.rtp,
        report.hit_rate
    );
    Ok(report)
}

fn run_worker(config: &SimConfig, worker: u64, spins: u64) -> SimResult<SessionStats> {
    let mut engine = SlotEngine::with_seed(config.engine.clone(), config.seed.wrapping_add(worker))?;
    let bonus_spins = config.bonus_spins.unwrap_or(config.engine.bonus_spins);

    for _ in 0..spins {
        engine.spin();
        engine.finish();

        let triggered = engine.last_spin().is_some_and(|s| s.triggered_bonus());
        if config.auto_bonus && triggered && engine.start_bonus(bonus_spins) {
            while engine.spin_bonus_once() {
                engine.finish();
            }
        }
    }

    log::debug!("worker {} finished {} spins", worker, spins);
    Ok(engine.stats().clone())
}
