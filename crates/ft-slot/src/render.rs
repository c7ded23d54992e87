//! Renderer contract
//!
//! Renderers draw grid snapshots and run drop/pulse animations. They never
//! mutate engine state. Positions are vertical offsets in cell units: a cell
//! at rest in row `r` sits at `y = r`, negative values are above the grid.
//!
//! Every animation returns a [`Playback`]. The engine waits on it before
//! delivering the next step, so a renderer that animates on another thread
//! hands back [`Playback::pending`] and completes the handle when done.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::grid::{DropMap, Grid, Mask};

// ═══════════════════════════════════════════════════════════════════════════════
// POSITIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-cell vertical position in cell units
#[derive(Debug, Clone, PartialEq)]
pub struct YMatrix {
    rows: usize,
    cols: usize,
    y: Vec<f32>,
}

impl YMatrix {
    /// Every cell at rest in its own row
    pub fn resting(rows: usize, cols: usize) -> Self {
        let y = (0..rows * cols).map(|i| (i / cols) as f32).collect();
        Self { rows, cols, y }
    }

    /// Whole grid lifted `lift` rows above its resting place
    pub fn lifted(rows: usize, cols: usize, lift: f32) -> Self {
        let mut m = Self::resting(rows, cols);
        m.y.iter_mut().for_each(|y| *y -= lift);
        m
    }

    /// Resting, except masked cells which start `lift` rows higher
    pub fn above_for_mask(mask: &Mask, lift: f32) -> Self {
        let mut m = Self::resting(mask.rows(), mask.cols());
        for (row, col) in mask.iter_set() {
            m.y[row * m.cols + col] -= lift;
        }
        m
    }

    /// Where each surviving cell ends up after falling
    pub fn after_falls(falls: &DropMap) -> Self {
        let mut m = Self::resting(falls.rows(), falls.cols());
        for row in 0..m.rows {
            for col in 0..m.cols {
                m.y[row * m.cols + col] += falls.get(row, col) as f32;
            }
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.y[row * self.cols + col]
    }
}

/// One drop animation: every cell moves from `from` to `to`
#[derive(Debug, Clone, PartialEq)]
pub struct DropAnimation {
    pub from: YMatrix,
    pub to: YMatrix,
    pub duration: Duration,
    /// Start delay added per column, left to right
    pub column_stagger: Duration,
}

impl DropAnimation {
    /// Wall time until the last column lands
    pub fn total_duration(&self) -> Duration {
        let cols = self.from.cols().saturating_sub(1) as u32;
        self.duration + self.column_stagger * cols
    }
}

/// Scale pulse on highlighted cells
#[derive(Debug, Clone, PartialEq)]
pub struct Pulse {
    pub mask: Mask,
    pub scale: f32,
    pub up: Duration,
    pub hold: Duration,
    pub down: Duration,
}

impl Pulse {
    pub fn total_duration(&self) -> Duration {
        self.up + self.hold + self.down
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYBACK
// ═══════════════════════════════════════════════════════════════════════════════

/// Completion handle for an animation
#[derive(Debug)]
pub struct Playback {
    done: Option<Receiver<()>>,
}

/// Sender side of a pending [`Playback`]
#[derive(Debug)]
pub struct PlaybackHandle {
    tx: Sender<()>,
}

impl Playback {
    /// Already finished
    pub fn done() -> Self {
        Self { done: None }
    }

    /// Unfinished playback plus the handle that completes it
    pub fn pending() -> (Self, PlaybackHandle) {
        let (tx, rx) = bounded(1);
        (Self { done: Some(rx) }, PlaybackHandle { tx })
    }

    pub fn is_pending(&self) -> bool {
        self.done.is_some()
    }

    /// Block until finished. A dropped handle counts as finished.
    pub fn wait(self) {
        if let Some(rx) = self.done {
            let _ = rx.recv();
        }
    }
}

impl PlaybackHandle {
    pub fn complete(self) {
        let _ = self.tx.send(());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERER
// ═══════════════════════════════════════════════════════════════════════════════

/// Presentation collaborator
pub trait Renderer {
    /// Draw `grid`, optionally emphasising `highlight`
    fn render_grid(&mut self, grid: &Grid, highlight: Option<&Mask>);

    fn animate_drop(&mut self, drop: &DropAnimation) -> Playback;

    fn pulse(&mut self, pulse: &Pulse) -> Playback;
}

/// Renderer that draws nothing and completes immediately
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_grid(&mut self, _grid: &Grid, _highlight: Option<&Mask>) {}

    fn animate_drop(&mut self, _drop: &DropAnimation) -> Playback {
        Playback::done()
    }

    fn pulse(&mut self, _pulse: &Pulse) -> Playback {
        Playback::done()
    }
}
