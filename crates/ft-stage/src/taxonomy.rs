//! Taxonomy — Enums classifying engine modes and event kinds

use serde::{Deserialize, Serialize};

/// Engine-wide play mode
///
/// Exactly one mode is active at a time. The engine enters `Bonus` only via an
/// explicit bonus start and returns to `Base` when the free spins run out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Base,
    Bonus,
}

impl GameMode {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Base => "BASE",
            Self::Bonus => "BONUS",
        }
    }

    pub fn is_bonus(&self) -> bool {
        matches!(self, Self::Bonus)
    }
}

/// Discriminant of an [`EngineEvent`](crate::EngineEvent), used for filtered subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SpinStart,
    TumbleWin,
    BonusTrigger,
    BonusStart,
    BonusProgress,
    BonusEnd,
    BigWin,
    SpinEnd,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        Self::SpinStart,
        Self::TumbleWin,
        Self::BonusTrigger,
        Self::BonusStart,
        Self::BonusProgress,
        Self::BonusEnd,
        Self::BigWin,
        Self::SpinEnd,
    ];

    /// Canonical snake_case name (matches the serde `type` tag)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStart => "spin_start",
            Self::TumbleWin => "tumble_win",
            Self::BonusTrigger => "bonus_trigger",
            Self::BonusStart => "bonus_start",
            Self::BonusProgress => "bonus_progress",
            Self::BonusEnd => "bonus_end",
            Self::BigWin => "big_win",
            Self::SpinEnd => "spin_end",
        }
    }

    /// Parse from canonical name
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.type_name() == name)
    }

    /// Event category
    pub fn category(&self) -> EventCategory {
        match self {
            Self::SpinStart | Self::SpinEnd => EventCategory::SpinLifecycle,
            Self::TumbleWin | Self::BigWin => EventCategory::Win,
            Self::BonusTrigger | Self::BonusStart | Self::BonusProgress | Self::BonusEnd => {
                EventCategory::Bonus
            }
        }
    }
}

/// Coarse grouping of events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    SpinLifecycle,
    Win,
    Bonus,
}

impl EventCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SpinLifecycle => "Spin Lifecycle",
            Self::Win => "Win",
            Self::Bonus => "Bonus",
        }
    }
}
