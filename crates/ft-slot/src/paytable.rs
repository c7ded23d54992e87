//! Paytable and cluster (count-pay) win calculation
//!
//! A symbol wins when it appears at least `min_cluster_size` times anywhere on
//! the grid. Position and adjacency are irrelevant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::grid::{Grid, Mask};
use crate::symbols::SymbolKey;

/// Reference minimum count for a cluster win
pub const DEFAULT_MIN_CLUSTER_SIZE: u32 = 8;

/// Base multiplier per paying symbol
///
/// Symbols absent from the table pay a multiplier of 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayTable {
    values: BTreeMap<SymbolKey, f64>,
}

impl PayTable {
    /// Empty table: every symbol pays 1
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Reference fruit paytable
    pub fn standard() -> Self {
        Self::new()
            .with(SymbolKey::Apple, 1.0)
            .with(SymbolKey::Banana, 1.0)
            .with(SymbolKey::Grapes, 2.0)
            .with(SymbolKey::Lemon, 2.0)
            .with(SymbolKey::Orange, 3.0)
            .with(SymbolKey::Peach, 4.0)
            .with(SymbolKey::Watermelon, 6.0)
    }

    /// Builder: set a symbol's multiplier
    pub fn with(mut self, symbol: SymbolKey, value: f64) -> Self {
        self.values.insert(symbol, value);
        self
    }

    /// Base multiplier for `symbol` (1 when absent)
    pub fn value(&self, symbol: SymbolKey) -> f64 {
        self.values.get(&symbol).copied().unwrap_or(1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolKey, f64)> + '_ {
        self.values.iter().map(|(&s, &v)| (s, v))
    }

    /// Reject negative or non-finite values
    pub fn validate(&self) -> ConfigResult<()> {
        match self.iter().find(|(_, v)| !v.is_finite() || *v < 0.0) {
            Some((symbol, value)) => Err(ConfigError::InvalidPayValue { symbol, value }),
            None => Ok(()),
        }
    }
}

impl Default for PayTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// One winning symbol in a cascade step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterWin {
    pub symbol: SymbolKey,
    /// Occurrences on the grid
    pub count: u32,
    /// Paytable multiplier used
    pub pay_value: f64,
    /// `(count − (min − 1)) × pay_value × bet / 10`
    pub win_amount: f64,
}

/// Result of resolving one grid state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutcome {
    /// Winners in symbol declaration order
    pub wins: Vec<ClusterWin>,
    /// Sum of all winners
    pub total_win: f64,
    /// Every cell holding a winning symbol
    pub mask: Mask,
}

impl ClusterOutcome {
    /// No winners: the cascade loop stops here
    pub fn is_empty(&self) -> bool {
        self.wins.is_empty()
    }

    pub fn winning_symbols(&self) -> impl Iterator<Item = SymbolKey> + '_ {
        self.wins.iter().map(|w| w.symbol)
    }
}

/// Count-pay resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterResolver {
    pub min_cluster_size: u32,
}

impl ClusterResolver {
    pub fn new(min_cluster_size: u32) -> Self {
        Self { min_cluster_size }
    }

    /// Payout for `count` occurrences of a symbol worth `pay_value`
    pub fn payout(&self, count: u32, pay_value: f64, bet: f64) -> f64 {
        let over = count.saturating_sub(self.min_cluster_size.saturating_sub(1));
        over as f64 * pay_value * (bet / 10.0)
    }

    /// Count every eligible symbol, pay those at or above the threshold and
    /// mark their cells.
    pub fn resolve(
        &self,
        grid: &Grid,
        paytable: &PayTable,
        bet: f64,
        eligible: impl Fn(SymbolKey) -> bool,
    ) -> ClusterOutcome {
        let mut counts = [0u32; SymbolKey::COUNT];
        for (_, _, cell) in grid.iter() {
            if let Some(symbol) = cell.filter(|&s| eligible(s)) {
                counts[symbol.index()] += 1;
            }
        }

        let wins: Vec<ClusterWin> = SymbolKey::ALL
            .iter()
            .filter(|s| counts[s.index()] >= self.min_cluster_size)
            .map(|&symbol| {
                let count = counts[symbol.index()];
                let pay_value = paytable.value(symbol);
                ClusterWin {
                    symbol,
                    count,
                    pay_value,
                    win_amount: self.payout(count, pay_value, bet),
                }
            })
            .collect();

        let mask = grid.mask_where(|s| wins.iter().any(|w| w.symbol == s));
        let total_win = wins.iter().map(|w| w.win_amount).sum();

        ClusterOutcome {
            wins,
            total_win,
            mask,
        }
    }
}

impl Default for ClusterResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CLUSTER_SIZE)
    }
}
