//! Scatter scan and bonus trigger
//!
//! A base spin scans for scatters twice: once after the grid lands and once
//! after the cascades settle. The payout and trigger fire at most once per
//! spin; the guard is reset when the next base spin starts.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, Mask};
use crate::symbols::SymbolKey;

/// Reference scatter count needed to trigger the bonus
pub const DEFAULT_SCATTER_TRIGGER_COUNT: u32 = 3;

/// Reference fixed payout for a trigger
pub const DEFAULT_SCATTER_PAYOUT: f64 = 200.0;

/// Scatter cells found by one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterScan {
    pub count: u32,
    pub mask: Mask,
}

/// Fired trigger
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterAward {
    pub scatters: u32,
    pub payout: f64,
}

/// Scatter counter with a per-spin guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterTrigger {
    trigger_count: u32,
    payout: f64,
    fired: bool,
}

impl ScatterTrigger {
    pub fn new(trigger_count: u32, payout: f64) -> Self {
        Self {
            trigger_count,
            payout,
            fired: false,
        }
    }

    /// Clear the guard at the start of a base spin
    pub fn reset(&mut self) {
        self.fired = false;
    }

    /// Has the trigger fired during the current spin?
    pub fn fired(&self) -> bool {
        self.fired
    }

    pub fn trigger_count(&self) -> u32 {
        self.trigger_count
    }

    pub fn payout(&self) -> f64 {
        self.payout
    }

    /// Count scatters on `grid`
    pub fn scan(&self, grid: &Grid) -> ScatterScan {
        let mask = grid.mask_where(SymbolKey::is_scatter);
        ScatterScan {
            count: mask.count() as u32,
            mask,
        }
    }

    /// Is the scan at or above the trigger count? Independent of the guard,
    /// so a second qualifying scan still highlights its scatters.
    pub fn qualifies(&self, scan: &ScatterScan) -> bool {
        scan.count >= self.trigger_count
    }

    /// Fire if the scan qualifies and the guard is clear
    pub fn check(&mut self, scan: &ScatterScan) -> Option<ScatterAward> {
        if self.fired || !self.qualifies(scan) {
            return None;
        }
        self.fired = true;
        Some(ScatterAward {
            scatters: scan.count,
            payout: self.payout,
        })
    }
}

impl Default for ScatterTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_SCATTER_TRIGGER_COUNT, DEFAULT_SCATTER_PAYOUT)
    }
}
