//! Free-spin bonus session

use serde::{Deserialize, Serialize};

/// Reference number of free spins per bonus
pub const DEFAULT_BONUS_SPINS: u32 = 10;

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Running bonus round. Exists only while the engine is in bonus mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSession {
    pub spins_total: u32,
    pub spins_remaining: u32,
    /// Sum of every bonus spin's (multiplied) win
    pub total_win: f64,
}

impl BonusSession {
    pub fn new(spins: u32) -> Self {
        Self {
            spins_total: spins,
            spins_remaining: spins,
            total_win: 0.0,
        }
    }

    /// Spins already played
    pub fn spins_played(&self) -> u32 {
        self.spins_total - self.spins_remaining
    }

    pub fn has_spins(&self) -> bool {
        self.spins_remaining > 0
    }

    pub fn is_complete(&self) -> bool {
        self.spins_remaining == 0
    }

    /// Book one finished bonus spin; returns the spins left
    pub fn record_spin(&mut self, win: f64) -> u32 {
        self.total_win += win;
        self.spins_remaining = self.spins_remaining.saturating_sub(1);
        self.spins_remaining
    }
}
