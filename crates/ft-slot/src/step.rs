//! Playback steps
//!
//! A spin is computed in one go and queued as steps. Each step carries the
//! grid as it should look, what to animate, and the events to publish once
//! the step has been shown.

use std::collections::VecDeque;

use ft_stage::{EngineEvent, GameMode};
use serde::{Deserialize, Serialize};

use crate::grid::{DropMap, Grid, Mask};
use crate::render::{DropAnimation, Pulse, Renderer, YMatrix};
use crate::timing::TimingConfig;

/// Rows above the grid that dropping symbols start from
const DROP_LIFT_ROWS: f32 = 2.0;

/// Why cells are pulsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightReason {
    Cluster,
    Scatter,
    Multiplier,
}

impl HighlightReason {
    pub fn pulse_scale(&self) -> f32 {
        match self {
            Self::Cluster => 1.12,
            Self::Scatter => 1.15,
            Self::Multiplier => 1.2,
        }
    }
}

/// What a step shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Freshly drawn grid drops in
    Land { mode: GameMode },
    /// Cells pulse in place
    Highlight { mask: Mask, reason: HighlightReason },
    /// Winners are gone; survivors fall by `falls`
    Collapse { falls: DropMap },
    /// New symbols drop into the masked cells
    Refill { mask: Mask },
    /// Spin win is known
    Settle { win: f64 },
    /// Spin is over
    Finish,
}

impl StepKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Land { .. } => "land",
            Self::Highlight { .. } => "highlight",
            Self::Collapse { .. } => "collapse",
            Self::Refill { .. } => "refill",
            Self::Settle { .. } => "settle",
            Self::Finish => "finish",
        }
    }
}

/// One queued unit of playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    /// Grid to draw for this step
    pub grid: Grid,
    /// Published after the step is shown
    pub events: Vec<EngineEvent>,
}

impl Step {
    pub fn new(kind: StepKind, grid: Grid) -> Self {
        Self {
            kind,
            grid,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: EngineEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = EngineEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn is_finish(&self) -> bool {
        matches!(self.kind, StepKind::Finish)
    }

    /// Drive `renderer` through this step, blocking on each animation
    pub fn play(&self, renderer: &mut dyn Renderer, timing: &TimingConfig) {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        let lift = rows as f32 + DROP_LIFT_ROWS;

        match &self.kind {
            StepKind::Land { mode } => {
                renderer.render_grid(&self.grid, None);
                let (duration, column_stagger) = match mode {
                    GameMode::Base => (timing.entry_drop(), timing.column_stagger()),
                    GameMode::Bonus => (timing.bonus_entry_drop(), Default::default()),
                };
                renderer
                    .animate_drop(&DropAnimation {
                        from: YMatrix::lifted(rows, cols, lift),
                        to: YMatrix::resting(rows, cols),
                        duration,
                        column_stagger,
                    })
                    .wait();
            }
            StepKind::Highlight { mask, reason } => {
                renderer.render_grid(&self.grid, Some(mask));
                renderer
                    .pulse(&Pulse {
                        mask: mask.clone(),
                        scale: reason.pulse_scale(),
                        up: timing.pulse_up(),
                        hold: timing.highlight_hold(),
                        down: timing.pulse_down(),
                    })
                    .wait();
                renderer.render_grid(&self.grid, None);
            }
            StepKind::Collapse { falls } => {
                renderer.render_grid(&self.grid, None);
                if falls.any() {
                    renderer
                        .animate_drop(&DropAnimation {
                            from: YMatrix::resting(rows, cols),
                            to: YMatrix::after_falls(falls),
                            duration: timing.tumble_drop(),
                            column_stagger: Default::default(),
                        })
                        .wait();
                }
            }
            StepKind::Refill { mask } => {
                renderer.render_grid(&self.grid, None);
                renderer
                    .animate_drop(&DropAnimation {
                        from: YMatrix::above_for_mask(mask, lift),
                        to: YMatrix::resting(rows, cols),
                        duration: timing.new_drop(),
                        column_stagger: Default::default(),
                    })
                    .wait();
            }
            StepKind::Settle { .. } => {}
            StepKind::Finish => renderer.render_grid(&self.grid, None),
        }
    }
}

/// FIFO of steps awaiting delivery
pub type StepQueue = VecDeque<Step>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Playback;
    use crate::symbols::SymbolKey::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn render_grid(&mut self, _grid: &Grid, highlight: Option<&Mask>) {
            self.calls
                .push(format!("render:{}", highlight.map_or(0, Mask::count)));
        }

        fn animate_drop(&mut self, drop: &DropAnimation) -> Playback {
            self.calls.push(format!("drop:{}", drop.duration.as_millis()));
            Playback::done()
        }

        fn pulse(&mut self, pulse: &Pulse) -> Playback {
            self.calls.push(format!("pulse:{}", pulse.scale));
            Playback::done()
        }
    }

    fn grid() -> Grid {
        Grid::from_rows(&[vec![Apple, Scatter], vec![Lemon, Scatter]]).unwrap()
    }

    #[test]
    fn test_land_uses_mode_timing() {
        let timing = TimingConfig::normal();
        let mut recorder = Recorder::default();
        Step::new(StepKind::Land { mode: GameMode::Base }, grid()).play(&mut recorder, &timing);
        Step::new(StepKind::Land { mode: GameMode::Bonus }, grid()).play(&mut recorder, &timing);
        assert_eq!(
            recorder.calls,
            vec!["render:0", "drop:780", "render:0", "drop:480"]
        );
    }

    #[test]
    fn test_highlight_pulses_then_clears() {
        let g = grid();
        let mask = g.mask_where(|s| s == Scatter);
        let mut recorder = Recorder::default();
        Step::new(
            StepKind::Highlight {
                mask,
                reason: HighlightReason::Scatter,
            },
            g,
        )
        .play(&mut recorder, &TimingConfig::studio());
        assert_eq!(recorder.calls, vec!["render:2", "pulse:1.15", "render:0"]);
    }

    #[test]
    fn test_collapse_without_falls_skips_animation() {
        let g = grid();
        let falls = g.fall_distances();
        let mut recorder = Recorder::default();
        Step::new(StepKind::Collapse { falls }, g).play(&mut recorder, &TimingConfig::studio());
        assert_eq!(recorder.calls, vec!["render:0"]);
    }

    #[test]
    fn test_settle_draws_nothing() {
        let mut recorder = Recorder::default();
        let step = Step::new(StepKind::Settle { win: 4.0 }, grid())
            .with_event(EngineEvent::TumbleWin { amount: 4.0 });
        step.play(&mut recorder, &TimingConfig::studio());
        assert!(recorder.calls.is_empty());
        assert_eq!(step.events.len(), 1);
        assert_eq!(step.kind.type_name(), "settle");
    }
}
