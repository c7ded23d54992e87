//! Big-win detection and win tiers

use ft_stage::{EngineEvent, GameMode};
use serde::{Deserialize, Serialize};

/// Reference big-win threshold, as a multiple of the bet
pub const DEFAULT_BIG_WIN_THRESHOLD: f64 = 10.0;

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Win classification for one spin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinTier {
    #[default]
    None,
    Win,
    Big,
}

impl WinTier {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::None => "No Win",
            Self::Win => "Win",
            Self::Big => "Big Win",
        }
    }
}

/// Detected big win
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BigWin {
    /// Win amount, 2 decimals
    pub amount: f64,
    /// `amount / bet`, 1 decimal
    pub factor: f64,
    pub mode: GameMode,
}

impl BigWin {
    pub fn to_event(&self) -> EngineEvent {
        EngineEvent::BigWin {
            amount: self.amount,
            factor: self.factor,
            mode: self.mode,
        }
    }
}

/// Compares a spin total against `threshold × bet`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BigWinDetector {
    pub threshold: f64,
}

impl BigWinDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Inclusive: a win of exactly `threshold × bet` is big
    pub fn check(&self, amount: f64, bet: f64, mode: GameMode) -> Option<BigWin> {
        if bet <= 0.0 {
            return None;
        }
        let factor = amount / bet;
        (factor >= self.threshold).then(|| BigWin {
            amount: round2(amount),
            factor: round1(factor),
            mode,
        })
    }

    pub fn classify(&self, amount: f64, bet: f64) -> WinTier {
        if amount <= 0.0 {
            WinTier::None
        } else if self.check(amount, bet, GameMode::Base).is_some() {
            WinTier::Big
        } else {
            WinTier::Win
        }
    }
}

impl Default for BigWinDetector {
    fn default() -> Self {
        Self::new(DEFAULT_BIG_WIN_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_inclusive() {
        let detector = BigWinDetector::default();
        let hit = detector.check(100.0, 10.0, GameMode::Base).unwrap();
        assert_eq!(hit.amount, 100.0);
        assert_eq!(hit.factor, 10.0);
        assert_eq!(hit.mode, GameMode::Base);

        assert!(detector.check(99.99, 10.0, GameMode::Base).is_none());
    }

    #[test]
    fn test_rounding() {
        let detector = BigWinDetector::default();
        let hit = detector.check(123.456, 10.0, GameMode::Bonus).unwrap();
        assert_eq!(hit.amount, 123.46);
        assert_eq!(hit.factor, 12.3);
        assert_eq!(
            hit.to_event(),
            EngineEvent::BigWin {
                amount: 123.46,
                factor: 12.3,
                mode: GameMode::Bonus
            }
        );
    }

    #[test]
    fn test_classify() {
        let detector = BigWinDetector::default();
        assert_eq!(detector.classify(0.0, 10.0), WinTier::None);
        assert_eq!(detector.classify(15.0, 10.0), WinTier::Win);
        assert_eq!(detector.classify(250.0, 10.0), WinTier::Big);
        assert_eq!(WinTier::Big.display_name(), "Big Win");
    }

    #[test]
    fn test_round_helpers() {
        assert_eq!(round2(1.005 * 1000.0), 1005.0);
        assert_eq!(round2(2.345_6), 2.35);
        assert_eq!(round1(7.25), 7.3);
    }
}
