//! # ft-stage — Fruit Tumble engine event system
//!
//! Defines the events a tumble engine emits during a spin, the typed
//! publish/subscribe bus that delivers them, and traces for recording them.
//!
//! ## Event order
//!
//! ```text
//! base spin:   SpinStart → [TumbleWin, BonusTrigger] → [TumbleWin, BigWin]
//!              → [TumbleWin, BonusTrigger] → SpinEnd
//! bonus spin:  SpinStart → [TumbleWin, BigWin] → SpinEnd
//!              → BonusProgress → [BonusEnd]
//! ```

pub mod bus;
pub mod event;
pub mod taxonomy;
pub mod trace;

pub use bus::*;
pub use event::*;
pub use taxonomy::*;
pub use trace::*;
