//! Session statistics

use serde::{Deserialize, Serialize};

use crate::big_win::WinTier;

/// Aggregate figures for a run of spins
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Paid base spins
    pub total_spins: u64,
    /// Free spins played inside bonus sessions
    pub bonus_spins: u64,
    pub total_bet: f64,
    /// Base wins (cascades + scatter payouts) plus bonus totals
    pub total_win: f64,
    pub base_win: f64,
    pub scatter_win: f64,
    pub bonus_win: f64,
    /// Base spins returning anything
    pub wins: u64,
    pub losses: u64,
    pub big_wins: u64,
    pub bonus_triggers: u64,
    pub bonus_sessions: u64,
    pub cascade_steps: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book a finished base spin
    pub fn record_base_spin(&mut self, bet: f64, cascade_win: f64, scatter_win: f64, steps: usize, tier: WinTier) {
        let win = cascade_win + scatter_win;
        self.total_spins += 1;
        self.total_bet += bet;
        self.total_win += win;
        self.base_win += cascade_win;
        self.scatter_win += scatter_win;
        self.cascade_steps += steps as u64;
        if win > 0.0 {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        if tier == WinTier::Big {
            self.big_wins += 1;
        }
        if bet > 0.0 {
            self.max_win_ratio = self.max_win_ratio.max(win / bet);
        }
    }

    /// Book one free spin
    pub fn record_bonus_spin(&mut self, win: f64, steps: usize, tier: WinTier) {
        self.bonus_spins += 1;
        self.total_win += win;
        self.bonus_win += win;
        self.cascade_steps += steps as u64;
        if tier == WinTier::Big {
            self.big_wins += 1;
        }
    }

    pub fn record_trigger(&mut self) {
        self.bonus_triggers += 1;
    }

    pub fn record_bonus_session(&mut self) {
        self.bonus_sessions += 1;
    }

    /// Return to player, percent
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Winning base spins, percent
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Base spins per bonus trigger
    pub fn trigger_frequency(&self) -> Option<f64> {
        (self.bonus_triggers > 0).then(|| self.total_spins as f64 / self.bonus_triggers as f64)
    }

    pub fn avg_cascade_steps(&self) -> f64 {
        let spins = self.total_spins + self.bonus_spins;
        if spins > 0 {
            self.cascade_steps as f64 / spins as f64
        } else {
            0.0
        }
    }

    /// Fold another run into this one
    pub fn merge(&mut self, other: &SessionStats) {
        self.total_spins += other.total_spins;
        self.bonus_spins += other.bonus_spins;
        self.total_bet += other.total_bet;
        self.total_win += other.total_win;
        self.base_win += other.base_win;
        self.scatter_win += other.scatter_win;
        self.bonus_win += other.bonus_win;
        self.wins += other.wins;
        self.losses += other.losses;
        self.big_wins += other.big_wins;
        self.bonus_triggers += other.bonus_triggers;
        self.bonus_sessions += other.bonus_sessions;
        self.cascade_steps += other.cascade_steps;
        self.max_win_ratio = self.max_win_ratio.max(other.max_win_ratio);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_stats() {
        let stats = SessionStats::new();
        assert_eq!(stats.rtp(), 0.0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.trigger_frequency(), None);
    }

    #[test]
    fn test_rtp_and_hit_rate() {
        let mut stats = SessionStats::new();
        stats.record_base_spin(10.0, 0.0, 0.0, 0, WinTier::None);
        stats.record_base_spin(10.0, 4.0, 0.0, 1, WinTier::Win);
        stats.record_base_spin(10.0, 2.0, 200.0, 1, WinTier::Big);
        stats.record_trigger();

        assert_eq!(stats.total_spins, 3);
        assert_relative_eq!(stats.rtp(), 206.0 / 30.0 * 100.0);
        assert_relative_eq!(stats.hit_rate(), 200.0 / 3.0);
        assert_eq!(stats.big_wins, 1);
        assert_relative_eq!(stats.max_win_ratio, 20.2);
        assert_eq!(stats.trigger_frequency(), Some(3.0));
    }

    #[test]
    fn test_bonus_spins_add_win_not_bet() {
        let mut stats = SessionStats::new();
        stats.record_base_spin(10.0, 0.0, 0.0, 0, WinTier::None);
        stats.record_bonus_session();
        stats.record_bonus_spin(30.0, 2, WinTier::Win);
        assert_relative_eq!(stats.total_bet, 10.0);
        assert_relative_eq!(stats.rtp(), 300.0);
        assert_relative_eq!(stats.avg_cascade_steps(), 1.0);
    }

    #[test]
    fn test_merge() {
        let mut a = SessionStats::new();
        a.record_base_spin(10.0, 5.0, 0.0, 1, WinTier::Win);
        let mut b = SessionStats::new();
        b.record_base_spin(10.0, 0.0, 0.0, 0, WinTier::None);
        b.record_base_spin(10.0, 120.0, 0.0, 3, WinTier::Big);
        a.merge(&b);
        assert_eq!(a.total_spins, 3);
        assert_eq!(a.wins, 2);
        assert_eq!(a.cascade_steps, 4);
        assert_relative_eq!(a.max_win_ratio, 12.0);
    }
}
