//! # ft-slot — Fruit Tumble cascading slot engine
//!
//! Count-pay tumble slot: any symbol showing 8 or more times anywhere on the
//! grid wins, winners are removed, survivors fall, the gaps refill, and the
//! loop repeats until the grid is stable. Three or more scatters award a fixed
//! payout and trigger free spins, where multiplier symbols left on the final
//! grid multiply the spin's win.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ft_slot::{EngineConfig, NullRenderer, SlotEngine};
//!
//! let mut engine = SlotEngine::with_seed(EngineConfig::default(), 42)?;
//! engine.subscribe(|event| println!("{}", event.type_name()));
//!
//! engine.seed();
//! if engine.spin() {
//!     engine.play(&mut NullRenderer);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`symbols`] / [`grid`]: symbol set, weighted pools, grid model
//! - [`paytable`] / [`cascade`]: cluster resolution and the tumble loop
//! - [`scatter`] / [`bonus`] / [`big_win`]: triggers and win detection
//! - [`engine`]: orchestration, step queue and bonus state machine
//! - [`render`] / [`step`] / [`timing`]: presentation contract
//! - [`wallet`] / [`stats`]: bookkeeping

pub mod big_win;
pub mod bonus;
pub mod cascade;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod render;
pub mod scatter;
pub mod stats;
pub mod step;
pub mod symbols;
pub mod timing;
pub mod wallet;

pub use big_win::*;
pub use bonus::*;
pub use cascade::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use paytable::*;
pub use render::*;
pub use scatter::*;
pub use stats::*;
pub use step::*;
pub use symbols::*;
pub use timing::*;
pub use wallet::*;

pub use ft_stage::{EngineEvent, EventBus, EventKind, GameMode};
