//! Slot engine — orchestrates spins and the bonus state machine
//!
//! ```text
//!   spin()                      spin_bonus_once(), remaining > 0
//!  ┌──────┐                    ┌──────┐
//!  │      v   start_bonus(n)   │      v
//! ┌┴───────┐ ───────────────> ┌┴───────┐
//! │  Base  │                  │ Bonus  │
//! └────────┘ <─────────────── └────────┘
//!             last free spin
//! ```
//!
//! Commands compute a whole spin immediately and queue it as [`Step`]s. The
//! engine stays "spinning" until the last step is delivered through
//! [`SlotEngine::advance`], [`SlotEngine::play`] or [`SlotEngine::finish`];
//! spin requests in the meantime are ignored. Bonus mode is left only when
//! the step carrying `BonusEnd` is delivered.

use ft_stage::{EngineEvent, EventBus, GameMode, SubscriptionId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::big_win::{BigWin, BigWinDetector, WinTier, round2};
use crate::bonus::BonusSession;
use crate::cascade::{CascadeEngine, CascadeOutcome, CascadeVariant};
use crate::config::EngineConfig;
use crate::error::ConfigResult;
use crate::grid::Grid;
use crate::paytable::ClusterResolver;
use crate::render::Renderer;
use crate::scatter::{ScatterAward, ScatterTrigger};
use crate::stats::SessionStats;
use crate::step::{HighlightReason, Step, StepKind, StepQueue};

/// What one spin produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinSummary {
    pub mode: GameMode,
    pub cascade: CascadeOutcome,
    /// Scatter count at each scan point (base spins only)
    pub scatter_counts: Vec<u32>,
    /// At most one per spin
    pub scatter_award: Option<ScatterAward>,
    pub big_win: Option<BigWin>,
    /// Free spins left after this spin (bonus spins only)
    pub bonus_remaining: Option<u32>,
    /// Final grid
    pub grid: Grid,
}

impl SpinSummary {
    /// Cascade win (multiplied in bonus)
    pub fn cascade_win(&self) -> f64 {
        self.cascade.total_win
    }

    pub fn scatter_win(&self) -> f64 {
        self.scatter_award.map_or(0.0, |a| a.payout)
    }

    /// Everything this spin paid
    pub fn total_win(&self) -> f64 {
        self.cascade_win() + self.scatter_win()
    }

    pub fn triggered_bonus(&self) -> bool {
        self.scatter_award.is_some()
    }

    pub fn tier(&self) -> WinTier {
        if self.big_win.is_some() {
            WinTier::Big
        } else if self.total_win() > 0.0 {
            WinTier::Win
        } else {
            WinTier::None
        }
    }
}

/// Cascading slot engine
///
/// Owns the grid, RNG, bonus session and event bus. Generic over the RNG so
/// tests and simulations can inject a seeded generator.
pub struct SlotEngine<R = ChaCha8Rng> {
    config: EngineConfig,
    rng: R,
    /// Engine-side grid, ahead of playback
    grid: Grid,
    /// Grid of the last delivered step
    visible: Grid,
    mode: GameMode,
    spinning: bool,
    bonus: Option<BonusSession>,
    /// Set when the last free spin is queued; cleared once its `BonusEnd` is delivered
    bonus_exit_pending: bool,
    scatter: ScatterTrigger,
    big_win: BigWinDetector,
    resolver: ClusterResolver,
    events: EventBus,
    queue: StepQueue,
    stats: SessionStats,
    last_spin: Option<SpinSummary>,
}

impl SlotEngine<ChaCha8Rng> {
    /// Engine seeded from the OS
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        Self::with_rng(config, ChaCha8Rng::from_os_rng())
    }

    /// Reproducible engine
    pub fn with_seed(config: EngineConfig, seed: u64) -> ConfigResult<Self> {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng + SeedableRng> SlotEngine<R> {
    /// Replace the RNG with a seeded one
    pub fn reseed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }
}

impl<R: Rng> SlotEngine<R> {
    /// Validate `config` and build an engine around `rng`
    pub fn with_rng(config: EngineConfig, rng: R) -> ConfigResult<Self> {
        config.validate()?;
        let grid = Grid::new(config.rows, config.cols);
        Ok(Self {
            scatter: ScatterTrigger::new(config.scatter_trigger_count, config.scatter_payout),
            big_win: BigWinDetector::new(config.big_win_threshold),
            resolver: ClusterResolver::new(config.min_cluster_size),
            visible: grid.clone(),
            grid,
            rng,
            config,
            mode: GameMode::Base,
            spinning: false,
            bonus: None,
            bonus_exit_pending: false,
            events: EventBus::new(),
            queue: StepQueue::new(),
            stats: SessionStats::new(),
            last_spin: None,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_in_bonus(&self) -> bool {
        self.mode.is_bonus()
    }

    /// True from an accepted spin until its last step is delivered
    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn bet(&self) -> f64 {
        self.config.bet
    }

    /// Grid as last delivered to the presentation side
    pub fn grid(&self) -> &Grid {
        &self.visible
    }

    pub fn bonus_session(&self) -> Option<&BonusSession> {
        self.bonus.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    pub fn last_spin(&self) -> Option<&SpinSummary> {
        self.last_spin.as_ref()
    }

    /// Steps waiting for delivery
    pub fn pending_steps(&self) -> usize {
        self.queue.len()
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Shorthand for `events_mut().subscribe(handler)`
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) + Send + 'static,
    {
        self.events.subscribe(handler)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Fill the grid from the base pool. No evaluation, no events.
    pub fn seed(&mut self) -> bool {
        if self.spinning {
            log::debug!("seed ignored: spin in progress");
            return false;
        }
        self.grid.fill_from(&self.config.base_pool, &mut self.rng);
        self.visible = self.grid.clone();
        true
    }

    /// Run one paid base spin
    pub fn spin(&mut self) -> bool {
        if self.spinning {
            log::debug!("spin ignored: spin in progress");
            return false;
        }
        if self.mode.is_bonus() {
            log::debug!("spin ignored: bonus in progress");
            return false;
        }

        self.begin_spin();
        self.scatter.reset();
        let bet = self.config.bet;

        self.grid.fill_from(&self.config.base_pool, &mut self.rng);
        self.push(StepKind::Land { mode: GameMode::Base }, Vec::new());

        let mut scatter_counts = Vec::with_capacity(2);
        let mut scatter_award = self.scan_scatters(&mut scatter_counts);

        let cascade = CascadeEngine::new(self.resolver, &self.config.base_pay_table, bet).run(
            CascadeVariant::Base,
            &mut self.grid,
            &self.config.base_pool,
            &mut self.rng,
        );
        self.queue_cascade(&cascade);
        let big_win = self.settle(cascade.total_win, GameMode::Base);

        if let Some(award) = self.scan_scatters(&mut scatter_counts) {
            scatter_award = Some(award);
        }

        self.push(StepKind::Finish, vec![EngineEvent::SpinEnd]);

        let summary = SpinSummary {
            mode: GameMode::Base,
            cascade,
            scatter_counts,
            scatter_award,
            big_win,
            bonus_remaining: None,
            grid: self.grid.clone(),
        };
        self.stats.record_base_spin(
            bet,
            summary.cascade_win(),
            summary.scatter_win(),
            summary.cascade.step_count(),
            summary.tier(),
        );
        if summary.triggered_bonus() {
            self.stats.record_trigger();
        }
        self.last_spin = Some(summary);
        true
    }

    /// Enter bonus mode with `spins` free spins
    pub fn start_bonus(&mut self, spins: u32) -> bool {
        if self.spinning {
            log::debug!("start_bonus ignored: spin in progress");
            return false;
        }
        if self.mode.is_bonus() {
            log::debug!("start_bonus ignored: already in bonus");
            return false;
        }
        if spins == 0 {
            log::debug!("start_bonus ignored: zero spins");
            return false;
        }

        self.scatter.reset();
        self.mode = GameMode::Bonus;
        self.bonus = Some(BonusSession::new(spins));
        self.stats.record_bonus_session();
        log::info!("Bonus started: {} free spins", spins);
        self.events.publish(&EngineEvent::BonusStart { spins });
        true
    }

    /// Enter bonus mode with the configured number of spins
    pub fn start_default_bonus(&mut self) -> bool {
        self.start_bonus(self.config.bonus_spins)
    }

    /// Play one free spin
    pub fn spin_bonus_once(&mut self) -> bool {
        if self.spinning {
            log::debug!("spin_bonus_once ignored: spin in progress");
            return false;
        }
        if !self.mode.is_bonus() {
            log::debug!("spin_bonus_once ignored: not in bonus");
            return false;
        }
        if !self.bonus.as_ref().is_some_and(BonusSession::has_spins) {
            log::debug!("spin_bonus_once ignored: no free spins left");
            return false;
        }

        self.begin_spin();
        let bet = self.config.bet;

        self.grid.fill_from(&self.config.bonus_pool, &mut self.rng);
        self.push(StepKind::Land { mode: GameMode::Bonus }, Vec::new());

        let cascade = CascadeEngine::new(self.resolver, &self.config.base_pay_table, bet).run(
            CascadeVariant::Bonus,
            &mut self.grid,
            &self.config.bonus_pool,
            &mut self.rng,
        );
        self.queue_cascade(&cascade);
        if let Some(multipliers) = cascade.multipliers.as_ref().filter(|m| m.mask.any()) {
            self.push(
                StepKind::Highlight {
                    mask: multipliers.mask.clone(),
                    reason: HighlightReason::Multiplier,
                },
                Vec::new(),
            );
        }

        let win = cascade.total_win;
        let big_win = self.settle(win, GameMode::Bonus);

        let mut finish = vec![EngineEvent::SpinEnd];
        let mut remaining = 0;
        if let Some(session) = self.bonus.as_mut() {
            remaining = session.record_spin(win);
            finish.push(EngineEvent::BonusProgress { remaining });

            if session.is_complete() {
                let total = round2(session.total_win);
                log::info!(
                    "Bonus finished: {} spins, total win {:.2}",
                    session.spins_total,
                    total
                );
                finish.push(EngineEvent::BonusEnd { total });
                self.bonus_exit_pending = true;
            }
        }
        self.push(StepKind::Finish, finish);

        let summary = SpinSummary {
            mode: GameMode::Bonus,
            cascade,
            scatter_counts: Vec::new(),
            scatter_award: None,
            big_win,
            bonus_remaining: Some(remaining),
            grid: self.grid.clone(),
        };
        self.stats
            .record_bonus_spin(win, summary.cascade.step_count(), summary.tier());
        self.last_spin = Some(summary);
        true
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYBACK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deliver the next queued step: show its grid, then publish its events
    pub fn advance(&mut self) -> Option<Step> {
        let step = self.queue.pop_front()?;
        self.visible = step.grid.clone();
        if step.is_finish() {
            self.spinning = false;
        }
        for event in &step.events {
            self.events.publish(event);
        }
        if step.is_finish() && self.bonus_exit_pending {
            self.exit_bonus();
        }
        Some(step)
    }

    /// Play every queued step through `renderer`, waiting on each animation
    pub fn play(&mut self, renderer: &mut dyn Renderer) -> usize {
        let mut delivered = 0;
        while let Some(step) = self.queue.front() {
            step.play(renderer, &self.config.timing);
            self.advance();
            delivered += 1;
        }
        delivered
    }

    /// Deliver every queued step without rendering
    pub fn finish(&mut self) -> usize {
        let mut delivered = 0;
        while self.advance().is_some() {
            delivered += 1;
        }
        delivered
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Claim the engine and announce the spin. The queue is empty here, so
    /// publishing directly keeps event order.
    fn begin_spin(&mut self) {
        self.spinning = true;
        self.events.publish(&EngineEvent::SpinStart);
    }

    fn push(&mut self, kind: StepKind, events: Vec<EngineEvent>) {
        log::debug!("queue step {}", kind.type_name());
        self.queue
            .push_back(Step::new(kind, self.grid.clone()).with_events(events));
    }

    /// Scatter scan point. Qualifying scatters always pulse; the payout and
    /// trigger are attached only the first time in a spin.
    fn scan_scatters(&mut self, counts: &mut Vec<u32>) -> Option<ScatterAward> {
        let scan = self.scatter.scan(&self.grid);
        counts.push(scan.count);
        if !self.scatter.qualifies(&scan) {
            return None;
        }

        let award = self.scatter.check(&scan);
        let events = match award {
            Some(award) => {
                log::info!("Bonus triggered by {} scatters", award.scatters);
                vec![
                    EngineEvent::TumbleWin {
                        amount: round2(award.payout),
                    },
                    EngineEvent::BonusTrigger {
                        scatters: award.scatters,
                    },
                ]
            }
            None => Vec::new(),
        };
        self.push(
            StepKind::Highlight {
                mask: scan.mask,
                reason: HighlightReason::Scatter,
            },
            events,
        );
        award
    }

    fn queue_cascade(&mut self, cascade: &CascadeOutcome) {
        for step in &cascade.steps {
            self.queue.extend([
                Step::new(
                    StepKind::Highlight {
                        mask: step.winners.clone(),
                        reason: HighlightReason::Cluster,
                    },
                    step.resolved.clone(),
                ),
                Step::new(
                    StepKind::Collapse {
                        falls: step.falls.clone(),
                    },
                    step.removed.clone(),
                ),
                Step::new(
                    StepKind::Refill {
                        mask: step.refilled.clone(),
                    },
                    step.settled.clone(),
                ),
            ]);
        }
    }

    /// Leave bonus mode once `BonusEnd` has gone out
    fn exit_bonus(&mut self) {
        self.bonus_exit_pending = false;
        self.bonus = None;
        self.mode = GameMode::Base;
    }

    /// Queue the spin's win and big-win events
    fn settle(&mut self, win: f64, mode: GameMode) -> Option<BigWin> {
        let mut events = Vec::new();
        let mut big_win = None;
        if win > 0.0 {
            events.push(EngineEvent::TumbleWin { amount: round2(win) });
            big_win = self.big_win.check(win, self.config.bet, mode);
            if let Some(hit) = big_win {
                log::info!(
                    "Big win in {} mode: {:.2} ({:.1}x bet)",
                    mode.display_name(),
                    hit.amount,
                    hit.factor
                );
                events.push(hit.to_event());
            }
        }
        self.push(StepKind::Settle { win }, events);
        big_win
    }
}

impl<R> std::fmt::Debug for SlotEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotEngine")
            .field("mode", &self.mode)
            .field("spinning", &self.spinning)
            .field("bonus", &self.bonus)
            .field("bonus_exit_pending", &self.bonus_exit_pending)
            .field("pending_steps", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NullRenderer;

    fn engine(seed: u64) -> SlotEngine {
        SlotEngine::with_seed(EngineConfig::default(), seed).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig::default().with_bet(-5.0);
        assert!(SlotEngine::new(config).is_err());
    }

    #[test]
    fn test_seed_fills_without_events() {
        let mut engine = engine(1);
        assert_eq!(engine.grid().empty_count(), 30);
        let (recorder, _) = ft_stage::TraceRecorder::attach(engine.events_mut(), "test");

        assert!(engine.seed());
        assert_eq!(engine.grid().empty_count(), 0);
        assert!(recorder.snapshot().is_empty());
        assert_eq!(engine.pending_steps(), 0);
    }

    #[test]
    fn test_spin_queues_until_finished() {
        let mut engine = engine(7);
        assert!(engine.spin());
        assert!(engine.is_spinning());
        assert!(engine.pending_steps() >= 3);
        assert!(!engine.spin());

        let delivered = engine.play(&mut NullRenderer);
        assert!(delivered >= 3);
        assert!(!engine.is_spinning());
        assert_eq!(engine.pending_steps(), 0);
        assert_eq!(engine.grid(), &engine.last_spin().unwrap().grid);
    }

    #[test]
    fn test_spin_ignored_in_bonus() {
        let mut engine = engine(3);
        assert!(engine.start_bonus(2));
        assert!(!engine.spin());
        assert!(!engine.start_bonus(5));
        assert_eq!(engine.bonus_session().unwrap().spins_total, 2);
    }

    #[test]
    fn test_start_bonus_zero_is_noop() {
        let mut engine = engine(3);
        assert!(!engine.start_bonus(0));
        assert_eq!(engine.mode(), GameMode::Base);
        assert!(!engine.spin_bonus_once());
    }

    #[test]
    fn test_start_bonus_refused_while_spinning() {
        let mut engine = engine(4);
        assert!(engine.spin());
        assert!(!engine.start_bonus(3));
        engine.finish();
        assert!(engine.start_default_bonus());
        assert_eq!(engine.bonus_session().unwrap().spins_remaining, 10);
    }

    #[test]
    fn test_summary_matches_stats() {
        let mut engine = engine(11);
        for _ in 0..20 {
            assert!(engine.spin());
            engine.finish();
        }
        let stats = engine.stats();
        assert_eq!(stats.total_spins, 20);
        assert_eq!(stats.total_bet, 200.0);
        assert_eq!(stats.wins + stats.losses, 20);
    }

    #[test]
    fn test_bonus_state_held_until_bonus_end_delivered() {
        let mut engine = engine(5);
        let (recorder, _) = ft_stage::TraceRecorder::attach(engine.events_mut(), "exit");
        assert!(engine.start_bonus(1));
        assert!(engine.spin_bonus_once());

        assert!(!recorder.snapshot().has(ft_stage::EventKind::BonusEnd));
        assert!(engine.is_in_bonus());
        assert_eq!(engine.mode(), GameMode::Bonus);
        let session = engine.bonus_session().unwrap();
        assert_eq!(session.spins_remaining, 0);
        assert!(!engine.spin_bonus_once());
        assert!(!engine.spin());

        while let Some(step) = engine.advance() {
            if step.is_finish() {
                assert!(!engine.is_in_bonus());
                assert!(engine.bonus_session().is_none());
            } else {
                assert!(engine.is_in_bonus());
                assert!(engine.bonus_session().is_some());
            }
        }
        assert_eq!(recorder.snapshot().count(ft_stage::EventKind::BonusEnd), 1);
        assert!(engine.spin());
    }

    #[test]
    fn test_reseed_reproduces() {
        let mut a = engine(0);
        let mut b = engine(1);
        a.reseed(99);
        b.reseed(99);
        a.spin();
        b.spin();
        assert_eq!(a.last_spin(), b.last_spin());
    }
}
