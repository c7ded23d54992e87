//! Cascade engine — resolve, remove, compact, refill until the grid is stable
//!
//! ```text
//! ┌──────────┐  winners  ┌────────┐   ┌─────────┐   ┌────────┐
//! │ resolve  │──────────>│ remove │──>│ compact │──>│ refill │──┐
//! └──────────┘           └────────┘   └─────────┘   └────────┘  │
//!      ^ │ none                                                 │
//!      │ └──> done (bonus: collect multipliers)                 │
//!      └────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no iteration cap. A pool that makes endless cascades likely is a
//! configuration problem.

use ft_stage::GameMode;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{DropMap, Grid, Mask};
use crate::paytable::{ClusterResolver, ClusterWin, PayTable};
use crate::symbols::{SymbolKey, WeightedPool};

/// Which cascade rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeVariant {
    /// Every symbol counts toward clusters
    Base,
    /// Multipliers and scatters never count; multipliers scale the final win
    Bonus,
}

impl CascadeVariant {
    pub fn for_mode(mode: GameMode) -> Self {
        match mode {
            GameMode::Base => Self::Base,
            GameMode::Bonus => Self::Bonus,
        }
    }

    /// Does `symbol` count toward cluster wins under this variant?
    pub fn counts(self, symbol: SymbolKey) -> bool {
        match self {
            Self::Base => true,
            Self::Bonus => !symbol.is_multiplier() && !symbol.is_scatter(),
        }
    }
}

/// One resolve → remove → compact → refill iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeStep {
    /// 0-based step index within the spin
    pub index: u32,
    pub wins: Vec<ClusterWin>,
    /// Win of this step before any bonus multiplier
    pub win: f64,
    /// Cells removed
    pub winners: Mask,
    /// Grid as resolved, winners still present
    pub resolved: Grid,
    /// Grid right after removal
    pub removed: Grid,
    /// Rows each survivor falls
    pub falls: DropMap,
    /// Cells drawn fresh after compaction
    pub refilled: Mask,
    /// Grid after compaction and refill
    pub settled: Grid,
}

/// Multipliers left on the final bonus grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierCollection {
    /// Sum of multiplier values on the grid
    pub sum: u32,
    /// Cells holding a multiplier
    pub mask: Mask,
}

impl MultiplierCollection {
    /// Scan the final grid
    pub fn collect(grid: &Grid) -> Self {
        let sum = grid
            .iter()
            .filter_map(|(_, _, cell)| cell)
            .map(SymbolKey::multiplier_value)
            .sum();
        Self {
            sum,
            mask: grid.mask_where(SymbolKey::is_multiplier),
        }
    }

    /// Factor applied once to the spin's collected win
    pub fn factor(&self) -> f64 {
        if self.sum > 0 { self.sum as f64 } else { 1.0 }
    }
}

/// Everything that happened in one cascade sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub variant: CascadeVariant,
    pub steps: Vec<CascadeStep>,
    /// Sum of every step's win
    pub collected: f64,
    /// Bonus only
    pub multipliers: Option<MultiplierCollection>,
    /// `collected × factor` (bonus) or `collected` (base)
    pub total_win: f64,
}

impl CascadeOutcome {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn factor(&self) -> f64 {
        self.multipliers.as_ref().map_or(1.0, MultiplierCollection::factor)
    }
}

/// Runs cascade sequences against a pay table and bet
#[derive(Debug, Clone)]
pub struct CascadeEngine<'a> {
    resolver: ClusterResolver,
    paytable: &'a PayTable,
    bet: f64,
}

impl<'a> CascadeEngine<'a> {
    pub fn new(resolver: ClusterResolver, paytable: &'a PayTable, bet: f64) -> Self {
        Self {
            resolver,
            paytable,
            bet,
        }
    }

    /// Run the loop on `grid` until no cluster remains, refilling from `pool`.
    pub fn run<R: Rng + ?Sized>(
        &self,
        variant: CascadeVariant,
        grid: &mut Grid,
        pool: &WeightedPool,
        rng: &mut R,
    ) -> CascadeOutcome {
        let mut steps = Vec::new();
        let mut collected = 0.0;

        loop {
            let outcome = self
                .resolver
                .resolve(grid, self.paytable, self.bet, |s| variant.counts(s));
            if outcome.is_empty() {
                break;
            }

            let resolved = grid.clone();
            grid.remove_masked(&outcome.mask);
            let removed = grid.clone();
            let falls = grid.fall_distances();
            grid.compact_down();
            let refilled = grid.refill(pool, rng);

            log::debug!(
                "cascade step {}: {} winner(s), win {:.2}",
                steps.len(),
                outcome.wins.len(),
                outcome.total_win
            );

            collected += outcome.total_win;
            steps.push(CascadeStep {
                index: steps.len() as u32,
                wins: outcome.wins,
                win: outcome.total_win,
                winners: outcome.mask,
                resolved,
                removed,
                falls,
                refilled,
                settled: grid.clone(),
            });
        }

        let multipliers = match variant {
            CascadeVariant::Base => None,
            CascadeVariant::Bonus => Some(MultiplierCollection::collect(grid)),
        };
        let factor = multipliers.as_ref().map_or(1.0, MultiplierCollection::factor);

        CascadeOutcome {
            variant,
            steps,
            collected,
            multipliers,
            total_win: collected * factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKey::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Fruits only: refills never add scatters or multipliers
    fn calm_pool() -> WeightedPool {
        WeightedPool::new(SymbolKey::FRUITS.map(|s| (s, 1.0))).unwrap()
    }

    fn no_win_rows() -> Vec<Vec<SymbolKey>> {
        vec![
            vec![Apple, Banana, Grapes, Lemon, Orange, Peach],
            vec![Watermelon, Apple, Banana, Grapes, Lemon, Orange],
            vec![Peach, Watermelon, Apple, Banana, Grapes, Lemon],
            vec![Orange, Peach, Watermelon, Apple, Banana, Grapes],
            vec![Lemon, Orange, Peach, Watermelon, Apple, Banana],
        ]
    }

    #[test]
    fn test_no_win_grid_is_untouched() {
        let mut grid = Grid::from_rows(&no_win_rows()).unwrap();
        let before = grid.clone();
        let paytable = PayTable::standard();
        let engine = CascadeEngine::new(ClusterResolver::default(), &paytable, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let outcome = engine.run(CascadeVariant::Base, &mut grid, &calm_pool(), &mut rng);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.total_win, 0.0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_single_cascade_step() {
        let mut rows = no_win_rows();
        // four more watermelons on top of the diagonal's four
        rows[0] = vec![Watermelon, Watermelon, Watermelon, Watermelon, Orange, Peach];
        let mut grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.count(Watermelon), 8);

        let paytable = PayTable::standard();
        let engine = CascadeEngine::new(ClusterResolver::default(), &paytable, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = engine.run(CascadeVariant::Base, &mut grid, &calm_pool(), &mut rng);

        let first = &outcome.steps[0];
        assert_eq!(first.wins[0].symbol, Watermelon);
        assert_relative_eq!(first.win, 6.0);
        assert_eq!(first.winners.count(), 8);
        assert_eq!(first.removed.empty_count(), 8);
        assert_eq!(first.refilled.count(), 8);
        assert_eq!(first.settled.empty_count(), 0);
        assert_relative_eq!(outcome.collected, outcome.steps.iter().map(|s| s.win).sum::<f64>());
        assert_eq!(grid, outcome.steps.last().unwrap().settled);
    }

    #[test]
    fn test_seeded_cascade_is_deterministic() {
        let paytable = PayTable::standard();
        let engine = CascadeEngine::new(ClusterResolver::default(), &paytable, 10.0);
        let pool = WeightedPool::base();

        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = Grid::new(5, 6);
            grid.fill_from(&pool, &mut rng);
            let outcome = engine.run(CascadeVariant::Base, &mut grid, &pool, &mut rng);
            (outcome, grid)
        };

        for seed in 0..50 {
            let (a, grid_a) = run(seed);
            let (b, grid_b) = run(seed);
            assert_eq!(a, b);
            assert_eq!(grid_a, grid_b);
            // terminated on a stable grid
            let check = ClusterResolver::default().resolve(&grid_a, &paytable, 10.0, |_| true);
            assert!(check.is_empty());
        }
    }

    #[test]
    fn test_bonus_ignores_multipliers_and_scatter() {
        let mut rows = no_win_rows();
        rows[0] = vec![X2, X2, X2, X2, X2, X2];
        rows[1] = vec![X2, X2, Scatter, Scatter, Scatter, Scatter];
        let mut grid = Grid::from_rows(&rows).unwrap();
        let paytable = PayTable::standard();
        let engine = CascadeEngine::new(ClusterResolver::default(), &paytable, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let outcome = engine.run(CascadeVariant::Bonus, &mut grid, &calm_pool(), &mut rng);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.multipliers.as_ref().unwrap().sum, 16);
        assert_eq!(outcome.total_win, 0.0);
    }

    #[test]
    fn test_multiplier_factor() {
        let grid = Grid::from_rows(&no_win_rows()).unwrap();
        let none = MultiplierCollection::collect(&grid);
        assert_eq!(none.sum, 0);
        assert_eq!(none.factor(), 1.0);
        assert!(!none.mask.any());

        let mut rows = no_win_rows();
        rows[4][0] = X3;
        rows[2][3] = X4;
        let grid = Grid::from_rows(&rows).unwrap();
        let seven = MultiplierCollection::collect(&grid);
        assert_eq!(seven.sum, 7);
        assert_eq!(seven.factor(), 7.0);
        assert_eq!(seven.mask.count(), 2);
    }

    #[test]
    fn test_bonus_win_multiplied_once() {
        // x3 and x4 sit on the bottom row and are never removed
        let mut rows = no_win_rows();
        rows[0] = vec![Peach, Peach, Peach, Peach, Apple, Banana];
        rows[4] = vec![X3, X4, Peach, Peach, Apple, Banana];
        let mut grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.count(Peach), 8);

        let paytable = PayTable::standard();
        let engine = CascadeEngine::new(ClusterResolver::default(), &paytable, 10.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let outcome = engine.run(CascadeVariant::Bonus, &mut grid, &calm_pool(), &mut rng);

        assert!(!outcome.steps.is_empty());
        assert_eq!(outcome.steps[0].wins[0].symbol, Peach);
        assert_relative_eq!(outcome.steps[0].win, 4.0);
        assert_eq!(outcome.factor(), 7.0);
        assert_relative_eq!(outcome.total_win, outcome.collected * 7.0);
    }

    #[test]
    fn test_variant_counts() {
        assert!(CascadeVariant::Base.counts(Scatter));
        assert!(CascadeVariant::Base.counts(X5));
        assert!(!CascadeVariant::Bonus.counts(Scatter));
        assert!(!CascadeVariant::Bonus.counts(X5));
        assert!(CascadeVariant::Bonus.counts(Lemon));
        assert_eq!(CascadeVariant::for_mode(GameMode::Bonus), CascadeVariant::Bonus);
    }
}
