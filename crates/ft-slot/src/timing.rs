//! Timing profiles for step playback
//!
//! Durations only pace the renderer. They never influence game math.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (instant for testing)
    Studio,
}

/// Detailed timing configuration (milliseconds before scaling)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub profile: TimingProfile,

    /// Global speed scaler applied to every duration
    pub speed: f64,

    /// Full grid drop at the start of a base spin
    pub entry_drop_ms: f64,

    /// Delay between columns during the entry drop
    pub column_stagger_ms: f64,

    /// Hold on highlighted winners
    pub highlight_hold_ms: f64,

    /// Pulse scale-up phase
    pub pulse_up_ms: f64,

    /// Pulse scale-down phase
    pub pulse_down_ms: f64,

    /// Surviving symbols falling into gaps
    pub tumble_drop_ms: f64,

    /// Refilled symbols dropping in
    pub new_drop_ms: f64,

    /// Full grid drop at the start of a bonus spin
    pub bonus_entry_drop_ms: f64,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            speed: 1.5,
            entry_drop_ms: 520.0,
            column_stagger_ms: 70.0,
            highlight_hold_ms: 160.0,
            pulse_up_ms: 110.0,
            pulse_down_ms: 110.0,
            tumble_drop_ms: 240.0,
            new_drop_ms: 240.0,
            bonus_entry_drop_ms: 320.0,
        }
    }

    /// Turbo timing
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            speed: 0.5,
            ..Self::normal()
        }
    }

    /// Studio timing (instant)
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            speed: 0.0,
            ..Self::normal()
        }
    }

    /// Create from profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
        }
    }

    /// Scale a base duration, rounded to whole milliseconds
    pub fn scaled(&self, base_ms: f64) -> Duration {
        Duration::from_millis((base_ms * self.speed).round().max(0.0) as u64)
    }

    pub fn entry_drop(&self) -> Duration {
        self.scaled(self.entry_drop_ms)
    }

    pub fn column_stagger(&self) -> Duration {
        self.scaled(self.column_stagger_ms)
    }

    pub fn highlight_hold(&self) -> Duration {
        self.scaled(self.highlight_hold_ms)
    }

    pub fn pulse_up(&self) -> Duration {
        self.scaled(self.pulse_up_ms)
    }

    pub fn pulse_down(&self) -> Duration {
        self.scaled(self.pulse_down_ms)
    }

    pub fn tumble_drop(&self) -> Duration {
        self.scaled(self.tumble_drop_ms)
    }

    pub fn new_drop(&self) -> Duration {
        self.scaled(self.new_drop_ms)
    }

    pub fn bonus_entry_drop(&self) -> Duration {
        self.scaled(self.bonus_entry_drop_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_scaling() {
        let timing = TimingConfig::normal();
        assert_eq!(timing.entry_drop(), Duration::from_millis(780));
        assert_eq!(timing.pulse_up(), Duration::from_millis(165));
        assert_eq!(timing.bonus_entry_drop(), Duration::from_millis(480));
    }

    #[test]
    fn test_studio_is_instant() {
        let timing = TimingConfig::from_profile(TimingProfile::Studio);
        assert_eq!(timing.entry_drop(), Duration::ZERO);
        assert_eq!(timing.new_drop(), Duration::ZERO);
    }

    #[test]
    fn test_turbo_faster_than_normal() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        assert!(turbo.tumble_drop() < normal.tumble_drop());
    }
}
