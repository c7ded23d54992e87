//! Player balance driven by engine events
//!
//! Base spins debit the bet on `SpinStart` and credit their accumulated wins
//! on `SpinEnd`. Free spins cost nothing; their wins are held until
//! `BonusEnd` credits the session total.

use std::sync::Arc;

use ft_stage::{EngineEvent, EventBus, GameMode, SubscriptionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::big_win::round2;

/// Reference opening balance
pub const DEFAULT_BALANCE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    balance: f64,
    bet: f64,
    mode: GameMode,
    /// Wins of the base spin in progress
    spin_win: f64,
    /// Wins of the running bonus session
    bonus_win: f64,
    /// Most recent single win event
    last_win: f64,
}

impl Wallet {
    pub fn new(balance: f64, bet: f64) -> Self {
        Self {
            balance,
            bet,
            mode: GameMode::Base,
            spin_win: 0.0,
            bonus_win: 0.0,
            last_win: 0.0,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn spin_win(&self) -> f64 {
        self.spin_win
    }

    pub fn bonus_win(&self) -> f64 {
        self.bonus_win
    }

    pub fn last_win(&self) -> f64 {
        self.last_win
    }

    /// Can a base spin be paid for? Free spins are always affordable.
    pub fn can_afford(&self) -> bool {
        self.mode.is_bonus() || self.balance >= self.bet
    }

    /// Apply one event to the ledger
    pub fn apply(&mut self, event: &EngineEvent) {
        match *event {
            EngineEvent::SpinStart => {
                self.last_win = 0.0;
                self.spin_win = 0.0;
                if self.mode == GameMode::Base {
                    self.balance = round2(self.balance - self.bet);
                }
            }
            EngineEvent::TumbleWin { amount } => {
                self.last_win = amount;
                match self.mode {
                    GameMode::Base => self.spin_win += amount,
                    GameMode::Bonus => self.bonus_win += amount,
                }
            }
            EngineEvent::SpinEnd => {
                if self.mode == GameMode::Base {
                    self.balance = round2(self.balance + self.spin_win);
                }
                self.spin_win = 0.0;
            }
            EngineEvent::BonusStart { .. } => {
                self.mode = GameMode::Bonus;
                self.bonus_win = 0.0;
            }
            EngineEvent::BonusEnd { total } => {
                self.balance = round2(self.balance + total);
                self.bonus_win = 0.0;
                self.mode = GameMode::Base;
            }
            EngineEvent::BonusTrigger { .. }
            | EngineEvent::BonusProgress { .. }
            | EngineEvent::BigWin { .. } => {}
        }
    }

    /// Share a wallet with an event bus subscription
    pub fn attach(self, bus: &mut EventBus) -> (Arc<Mutex<Wallet>>, SubscriptionId) {
        let wallet = Arc::new(Mutex::new(self));
        let shared = Arc::clone(&wallet);
        let id = bus.subscribe(move |event| shared.lock().apply(event));
        (wallet, id)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(DEFAULT_BALANCE, 10.0)
    }
}
