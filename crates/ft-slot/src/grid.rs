//! Grid model — fixed rows × cols matrix of optional symbols
//!
//! Row 0 is the top of the screen; symbols fall toward the highest row index.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::symbols::{SymbolKey, WeightedPool};

/// A grid cell. `None` is the transient empty state during a cascade.
pub type Cell = Option<SymbolKey>;

/// Symbol grid (row-major)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Build a full grid from rows of symbols (top row first)
    pub fn from_rows(rows: &[Vec<SymbolKey>]) -> ConfigResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return Err(ConfigError::InvalidDimensions {
                rows: rows.len(),
                cols,
            });
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.iter().flatten().map(|&s| Some(s)).collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total cell count
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.offset(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let idx = self.offset(row, col);
        self.cells[idx] = cell;
    }

    pub fn clear(&mut self, row: usize, col: usize) {
        self.set(row, col, None);
    }

    /// Full reseed: every cell drawn from `pool`, row by row
    pub fn fill_from<R: Rng + ?Sized>(&mut self, pool: &WeightedPool, rng: &mut R) {
        for cell in &mut self.cells {
            *cell = Some(pool.pick(rng));
        }
    }

    /// Iterate `(row, col, cell)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (i / cols, i % cols, cell))
    }

    /// Occurrences of `symbol` anywhere on the grid
    pub fn count(&self, symbol: SymbolKey) -> usize {
        self.cells.iter().filter(|&&c| c == Some(symbol)).count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Mask of cells holding a symbol matching `pred`
    pub fn mask_where(&self, pred: impl Fn(SymbolKey) -> bool) -> Mask {
        let mut mask = Mask::new(self.rows, self.cols);
        for (row, col, cell) in self.iter() {
            if cell.is_some_and(&pred) {
                mask.set(row, col, true);
            }
        }
        mask
    }

    /// Clear every masked cell, returning how many held a symbol
    pub fn remove_masked(&mut self, mask: &Mask) -> usize {
        let mut removed = 0;
        for (row, col) in mask.iter_set() {
            let idx = self.offset(row, col);
            if self.cells[idx].take().is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// How many rows each symbol will fall during the next compaction:
    /// the number of empty cells below it in its column.
    pub fn fall_distances(&self) -> DropMap {
        let mut drops = DropMap::new(self.rows, self.cols);
        for col in 0..self.cols {
            let mut gaps = 0;
            for row in (0..self.rows).rev() {
                match self.get(row, col) {
                    Some(_) => drops.set(row, col, gaps),
                    None => gaps += 1,
                }
            }
        }
        drops
    }

    /// Slide every symbol down its column, keeping relative order and
    /// leaving the empties at the top.
    pub fn compact_down(&mut self) {
        for col in 0..self.cols {
            let mut write = self.rows;
            for row in (0..self.rows).rev() {
                if let Some(sym) = self.get(row, col) {
                    write -= 1;
                    if write != row {
                        self.set(write, col, Some(sym));
                        self.clear(row, col);
                    }
                }
            }
        }
    }

    /// Fill every empty cell from `pool`. Columns left to right, each from
    /// its lowest empty cell upward. Returns the refill mask.
    pub fn refill<R: Rng + ?Sized>(&mut self, pool: &WeightedPool, rng: &mut R) -> Mask {
        let mut mask = Mask::new(self.rows, self.cols);
        for col in 0..self.cols {
            for row in (0..self.rows).rev() {
                if self.get(row, col).is_none() {
                    self.set(row, col, Some(pool.pick(rng)));
                    mask.set(row, col, true);
                }
            }
        }
        mask
    }

    /// Column contents, top to bottom
    pub fn column(&self, col: usize) -> Vec<Cell> {
        (0..self.rows).map(|row| self.get(row, col)).collect()
    }

    /// Rows of cells, top row first
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.cells.chunks(self.cols.max(1)).map(<[Cell]>::to_vec).collect()
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    f.write_str(" ")?;
                }
                match self.get(row, col) {
                    Some(sym) => write!(f, "{:>10}", sym.name())?,
                    None => write!(f, "{:>10}", ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Boolean overlay on a grid: winners, refilled cells, scatter hits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
}

impl Mask {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.bits[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(row < self.rows && col < self.cols, "mask cell out of range");
        self.bits[row * self.cols + col] = value;
    }

    /// Any cell marked?
    pub fn any(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Union with another mask of the same shape
    pub fn merge(&mut self, other: &Mask) {
        for (a, &b) in self.bits.iter_mut().zip(&other.bits) {
            *a |= b;
        }
    }

    /// Marked cells as `(row, col)`, row-major
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let cols = self.cols;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| (i / cols, i % cols))
    }
}

/// Per-cell fall distance in rows (0 for empty or resting cells)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropMap {
    rows: usize,
    cols: usize,
    rows_to_fall: Vec<usize>,
}

impl DropMap {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            rows_to_fall: vec![0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> usize {
        self.rows_to_fall[row * self.cols + col]
    }

    fn set(&mut self, row: usize, col: usize, value: usize) {
        self.rows_to_fall[row * self.cols + col] = value;
    }

    /// Does anything move?
    pub fn any(&self) -> bool {
        self.rows_to_fall.iter().any(|&d| d > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolKey::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_grid() -> Grid {
        Grid::from_rows(&[
            vec![Apple, Banana],
            vec![Lemon, Peach],
            vec![Orange, Grapes],
        ])
        .unwrap()
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Grid::from_rows(&[vec![Apple], vec![Apple, Lemon]]).is_err());
        assert!(Grid::from_rows(&[]).is_err());
    }

    #[test]
    fn test_get_set_iter() {
        let mut grid = small_grid();
        assert_eq!(grid.get(1, 1), Some(Peach));
        grid.set(1, 1, Some(Apple));
        assert_eq!(grid.count(Apple), 2);
        grid.clear(0, 0);
        assert_eq!(grid.empty_count(), 1);

        let cells: Vec<_> = grid.iter().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[3], (1, 1, Some(Apple)));
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        small_grid().get(3, 0);
    }

    #[test]
    fn test_compact_preserves_order() {
        let mut grid = small_grid();
        // column 0: Apple, Lemon, Orange -> remove Lemon
        // column 1: Banana, Peach, Grapes -> remove Grapes
        let mut mask = Mask::new(3, 2);
        mask.set(1, 0, true);
        mask.set(2, 1, true);
        assert_eq!(grid.remove_masked(&mask), 2);

        let drops = grid.fall_distances();
        assert_eq!(drops.get(0, 0), 1);
        assert_eq!(drops.get(2, 0), 0);
        assert_eq!(drops.get(0, 1), 1);
        assert_eq!(drops.get(1, 1), 1);

        grid.compact_down();
        assert_eq!(grid.column(0), vec![None, Some(Apple), Some(Orange)]);
        assert_eq!(grid.column(1), vec![None, Some(Banana), Some(Peach)]);
    }

    #[test]
    fn test_compaction_invariant_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let pool = WeightedPool::base();
        for _ in 0..200 {
            let mut grid = Grid::new(5, 6);
            grid.fill_from(&pool, &mut rng);
            let mut mask = Mask::new(5, 6);
            for (row, col, _) in grid.iter() {
                if rng.random_bool(0.4) {
                    mask.set(row, col, true);
                }
            }
            grid.remove_masked(&mask);
            let before: Vec<Vec<SymbolKey>> = (0..6)
                .map(|c| grid.column(c).into_iter().flatten().collect())
                .collect();

            grid.compact_down();

            for (col, expected) in before.iter().enumerate() {
                let column = grid.column(col);
                let empties = column.iter().take_while(|c| c.is_none()).count();
                assert!(column[empties..].iter().all(Option::is_some));
                let kept: Vec<SymbolKey> = column.into_iter().flatten().collect();
                assert_eq!(&kept, expected);
            }
        }
    }

    #[test]
    fn test_refill_fills_only_empties() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = small_grid();
        grid.clear(0, 1);
        grid.clear(0, 0);
        let mask = grid.refill(&WeightedPool::base(), &mut rng);
        assert_eq!(grid.empty_count(), 0);
        assert_eq!(mask.count(), 2);
        assert!(mask.get(0, 0) && mask.get(0, 1));
        assert!(!mask.get(2, 1));
    }

    #[test]
    fn test_mask_ops() {
        let mut a = Mask::new(2, 2);
        let mut b = Mask::new(2, 2);
        assert!(!a.any());
        a.set(0, 0, true);
        b.set(1, 1, true);
        a.merge(&b);
        assert_eq!(a.count(), 2);
        assert_eq!(a.iter_set().collect::<Vec<_>>(), vec![(0, 0), (1, 1)]);
        assert!(!a.get(5, 5));
    }

    #[test]
    fn test_mask_where() {
        let grid = small_grid();
        let mask = grid.mask_where(|s| s == Apple || s == Grapes);
        assert_eq!(mask.count(), 2);
        assert!(mask.get(0, 0) && mask.get(2, 1));
    }
}
