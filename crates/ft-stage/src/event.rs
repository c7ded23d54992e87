//! EngineEvent — Everything a tumble engine tells the outside world
//!
//! Events are emitted in causal order within a spin. UIs, wallets and
//! recorders consume them; none of them can influence the game math.

use serde::{Deserialize, Serialize};

use crate::taxonomy::{EventCategory, EventKind, GameMode};

/// An event emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Spin started. In base mode the stake is committed here.
    SpinStart,

    /// A non-zero win contribution: scatter payout, cascade total or bonus spin total
    TumbleWin {
        /// Amount rounded to 2 decimals
        amount: f64,
    },

    /// Enough scatters landed to award the bonus (at most once per base spin)
    BonusTrigger {
        scatters: u32,
    },

    /// Free spins started
    BonusStart {
        spins: u32,
    },

    /// A free spin finished
    BonusProgress {
        remaining: u32,
    },

    /// Free spins exhausted
    BonusEnd {
        /// Accumulated bonus winnings rounded to 2 decimals
        total: f64,
    },

    /// Win at or above the big-win factor
    BigWin {
        /// Amount rounded to 2 decimals
        amount: f64,
        /// Win-to-bet factor rounded to 1 decimal
        factor: f64,
        mode: GameMode,
    },

    /// Terminal event of every spin
    SpinEnd,
}

impl EngineEvent {
    /// Get the event discriminant
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SpinStart => EventKind::SpinStart,
            Self::TumbleWin { .. } => EventKind::TumbleWin,
            Self::BonusTrigger { .. } => EventKind::BonusTrigger,
            Self::BonusStart { .. } => EventKind::BonusStart,
            Self::BonusProgress { .. } => EventKind::BonusProgress,
            Self::BonusEnd { .. } => EventKind::BonusEnd,
            Self::BigWin { .. } => EventKind::BigWin,
            Self::SpinEnd => EventKind::SpinEnd,
        }
    }

    /// Get event type name
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn category(&self) -> EventCategory {
        self.kind().category()
    }

    /// Monetary amount carried by this event, if any
    pub fn win_amount(&self) -> Option<f64> {
        match self {
            Self::TumbleWin { amount } | Self::BigWin { amount, .. } => Some(*amount),
            Self::BonusEnd { total } => Some(*total),
            _ => None,
        }
    }

    /// Is this the last event of a spin?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SpinEnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = EngineEvent::BigWin {
            amount: 120.5,
            factor: 12.1,
            mode: GameMode::Bonus,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"big_win\""));
        assert!(json.contains("\"mode\":\"bonus\""));

        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_unit_variants_serialize_as_tag() {
        let json = serde_json::to_string(&EngineEvent::SpinStart).unwrap();
        assert_eq!(json, r#"{"type":"spin_start"}"#);
    }

    #[test]
    fn test_win_amount() {
        assert_eq!(EngineEvent::TumbleWin { amount: 2.0 }.win_amount(), Some(2.0));
        assert_eq!(EngineEvent::BonusEnd { total: 40.0 }.win_amount(), Some(40.0));
        assert_eq!(EngineEvent::BonusProgress { remaining: 3 }.win_amount(), None);
        assert!(EngineEvent::SpinEnd.is_terminal());
    }
}
