//! Engine configuration
//!
//! Immutable once an engine is built. Every field has a reference default,
//! so partial JSON/YAML documents are accepted.

use serde::{Deserialize, Serialize};

use crate::big_win::DEFAULT_BIG_WIN_THRESHOLD;
use crate::bonus::DEFAULT_BONUS_SPINS;
use crate::error::{ConfigError, ConfigResult};
use crate::paytable::{DEFAULT_MIN_CLUSTER_SIZE, PayTable};
use crate::scatter::{DEFAULT_SCATTER_PAYOUT, DEFAULT_SCATTER_TRIGGER_COUNT};
use crate::symbols::WeightedPool;
use crate::timing::TimingConfig;

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cols: usize,
    pub rows: usize,
    /// Fixed stake per base spin
    pub bet: f64,
    pub base_pay_table: PayTable,
    pub base_pool: WeightedPool,
    pub bonus_pool: WeightedPool,
    pub min_cluster_size: u32,
    pub scatter_trigger_count: u32,
    pub scatter_payout: f64,
    /// Big win when `win / bet` reaches this
    pub big_win_threshold: f64,
    /// Spins granted by `start_bonus` callers that don't pick a count
    pub bonus_spins: u32,
    pub timing: TimingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cols: 6,
            rows: 5,
            bet: 10.0,
            base_pay_table: PayTable::standard(),
            base_pool: WeightedPool::base(),
            bonus_pool: WeightedPool::bonus(),
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            scatter_trigger_count: DEFAULT_SCATTER_TRIGGER_COUNT,
            scatter_payout: DEFAULT_SCATTER_PAYOUT,
            big_win_threshold: DEFAULT_BIG_WIN_THRESHOLD,
            bonus_spins: DEFAULT_BONUS_SPINS,
            timing: TimingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Builder: set bet
    pub fn with_bet(mut self, bet: f64) -> Self {
        self.bet = bet;
        self
    }

    /// Builder: set grid size
    pub fn with_dimensions(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    /// Builder: set both pools
    pub fn with_pools(mut self, base: WeightedPool, bonus: WeightedPool) -> Self {
        self.base_pool = base;
        self.bonus_pool = bonus;
        self
    }

    /// Builder: set timing
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }

        if !self.bet.is_finite() || self.bet <= 0.0 {
            return Err(ConfigError::InvalidBet(self.bet));
        }

        if self.min_cluster_size == 0 {
            return Err(ConfigError::InvalidParam(
                "min_cluster_size must be at least 1".into(),
            ));
        }

        if self.scatter_trigger_count == 0 {
            return Err(ConfigError::InvalidParam(
                "scatter_trigger_count must be at least 1".into(),
            ));
        }

        if !self.big_win_threshold.is_finite() || self.big_win_threshold <= 0.0 {
            return Err(ConfigError::InvalidParam(format!(
                "big_win_threshold must be positive, got {}",
                self.big_win_threshold
            )));
        }

        if !self.scatter_payout.is_finite() || self.scatter_payout < 0.0 {
            return Err(ConfigError::InvalidParam(format!(
                "scatter_payout must be non-negative, got {}",
                self.scatter_payout
            )));
        }

        if !self.timing.speed.is_finite() || self.timing.speed < 0.0 {
            return Err(ConfigError::InvalidParam(format!(
                "timing speed must be non-negative, got {}",
                self.timing.speed
            )));
        }

        // pools are validated on construction
        if let Some(entry) = self
            .base_pool
            .entries()
            .iter()
            .find(|e| e.symbol.is_multiplier())
        {
            return Err(ConfigError::MultiplierInBasePool(entry.symbol));
        }

        self.base_pay_table.validate()
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Total grid cells
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}
