//! Symbol definitions and weighted symbol pools

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SymbolType {
    /// Paying fruit, counted for cluster wins
    Fruit = 0,
    /// Scatter - triggers the bonus regardless of position
    Scatter = 1,
    /// Multiplier - bonus pool only, scales the bonus spin win
    Multiplier = 2,
}

/// Every symbol the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKey {
    Apple,
    Banana,
    Grapes,
    Lemon,
    Orange,
    Peach,
    Watermelon,
    Scatter,
    X2,
    X3,
    X4,
    X5,
}

impl SymbolKey {
    /// All symbols in declaration order
    pub const ALL: [SymbolKey; 12] = [
        Self::Apple,
        Self::Banana,
        Self::Grapes,
        Self::Lemon,
        Self::Orange,
        Self::Peach,
        Self::Watermelon,
        Self::Scatter,
        Self::X2,
        Self::X3,
        Self::X4,
        Self::X5,
    ];

    /// The seven paying symbols
    pub const FRUITS: [SymbolKey; 7] = [
        Self::Apple,
        Self::Banana,
        Self::Grapes,
        Self::Lemon,
        Self::Orange,
        Self::Peach,
        Self::Watermelon,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Dense index, stable across runs
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Banana => "banana",
            Self::Grapes => "grapes",
            Self::Lemon => "lemon",
            Self::Orange => "orange",
            Self::Peach => "peach",
            Self::Watermelon => "watermelon",
            Self::Scatter => "scatter",
            Self::X2 => "x2",
            Self::X3 => "x3",
            Self::X4 => "x4",
            Self::X5 => "x5",
        }
    }

    pub fn symbol_type(self) -> SymbolType {
        match self {
            Self::Scatter => SymbolType::Scatter,
            Self::X2 | Self::X3 | Self::X4 | Self::X5 => SymbolType::Multiplier,
            _ => SymbolType::Fruit,
        }
    }

    pub fn is_scatter(self) -> bool {
        self == Self::Scatter
    }

    pub fn is_multiplier(self) -> bool {
        self.symbol_type() == SymbolType::Multiplier
    }

    /// Fruit symbols only
    pub fn is_paying(self) -> bool {
        self.symbol_type() == SymbolType::Fruit
    }

    /// Numeric value of a multiplier symbol, 0 for everything else
    pub fn multiplier_value(self) -> u32 {
        match self {
            Self::X2 => 2,
            Self::X3 => 3,
            Self::X4 => 4,
            Self::X5 => 5,
            _ => 0,
        }
    }
}

impl std::fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One weighted entry of a pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolEntry {
    pub symbol: SymbolKey,
    pub weight: f64,
}

/// Ordered list of weighted symbols for one game mode
///
/// Serialized as `[["apple", 1.0], ...]`. Order matters: the draw walks the
/// entries in order and the first entry is the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(SymbolKey, f64)>", into = "Vec<(SymbolKey, f64)>")]
pub struct WeightedPool {
    entries: Vec<PoolEntry>,
    total: f64,
}

impl WeightedPool {
    /// Build a pool, rejecting empty pools, negative or non-finite weights
    /// and a zero total.
    pub fn new(entries: impl IntoIterator<Item = (SymbolKey, f64)>) -> ConfigResult<Self> {
        let entries: Vec<PoolEntry> = entries
            .into_iter()
            .map(|(symbol, weight)| PoolEntry { symbol, weight })
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::EmptyPool);
        }
        if let Some(bad) = entries.iter().find(|e| !e.weight.is_finite() || e.weight < 0.0) {
            return Err(ConfigError::InvalidWeight {
                symbol: bad.symbol,
                weight: bad.weight,
            });
        }

        let total: f64 = entries.iter().map(|e| e.weight).sum();
        if total <= 0.0 {
            return Err(ConfigError::ZeroTotalWeight);
        }

        Ok(Self { entries, total })
    }

    /// Base game pool: seven fruits at weight 1, scatter at 0.25
    pub fn base() -> Self {
        let mut entries: Vec<(SymbolKey, f64)> =
            SymbolKey::FRUITS.iter().map(|&s| (s, 1.0)).collect();
        entries.push((SymbolKey::Scatter, 0.25));
        Self::from_trusted(entries)
    }

    /// Bonus pool: seven fruits at weight 1 plus the four multipliers
    pub fn bonus() -> Self {
        let mut entries: Vec<(SymbolKey, f64)> =
            SymbolKey::FRUITS.iter().map(|&s| (s, 1.0)).collect();
        entries.extend([
            (SymbolKey::X2, 0.2),
            (SymbolKey::X3, 0.15),
            (SymbolKey::X4, 0.1),
            (SymbolKey::X5, 0.05),
        ]);
        Self::from_trusted(entries)
    }

    fn from_trusted(entries: Vec<(SymbolKey, f64)>) -> Self {
        let entries: Vec<PoolEntry> = entries
            .into_iter()
            .map(|(symbol, weight)| PoolEntry { symbol, weight })
            .collect();
        let total = entries.iter().map(|e| e.weight).sum();
        Self { entries, total }
    }

    /// Draw one symbol.
    ///
    /// `r` is uniform in `[0, total)`; the first entry whose weight brings the
    /// remainder to ≤ 0 wins. If floating-point error leaves a positive
    /// remainder after the last entry, the first entry is returned.
    ///
    /// A binary search over cumulative weights would give the same results;
    /// at ≤ 12 entries the linear walk is cheaper.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolKey {
        let mut r = rng.random::<f64>() * self.total;
        for entry in &self.entries {
            r -= entry.weight;
            if r <= 0.0 {
                return entry.symbol;
            }
        }
        self.fallback()
    }

    /// Symbol returned when no weight consumed the draw
    pub fn fallback(&self) -> SymbolKey {
        // non-empty by construction
        self.entries[0].symbol
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, symbol: SymbolKey) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    /// Configured probability of drawing `symbol`
    pub fn probability(&self, symbol: SymbolKey) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.symbol == symbol)
            .map(|e| e.weight)
            .sum::<f64>()
            / self.total
    }
}

impl TryFrom<Vec<(SymbolKey, f64)>> for WeightedPool {
    type Error = ConfigError;

    fn try_from(entries: Vec<(SymbolKey, f64)>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<WeightedPool> for Vec<(SymbolKey, f64)> {
    fn from(pool: WeightedPool) -> Self {
        pool.entries.into_iter().map(|e| (e.symbol, e.weight)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Always draws 0.0
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn test_symbol_classification() {
        assert!(SymbolKey::Apple.is_paying());
        assert!(SymbolKey::Scatter.is_scatter());
        assert!(!SymbolKey::Scatter.is_paying());
        assert!(SymbolKey::X4.is_multiplier());
        assert_eq!(SymbolKey::X5.multiplier_value(), 5);
        assert_eq!(SymbolKey::Peach.multiplier_value(), 0);
        assert_eq!(SymbolKey::COUNT, 12);
        assert_eq!(SymbolKey::X2.to_string(), "x2");
    }

    #[test]
    fn test_pool_validation() {
        assert_eq!(WeightedPool::new(vec![]), Err(ConfigError::EmptyPool));
        assert_eq!(
            WeightedPool::new(vec![(SymbolKey::Apple, 0.0)]),
            Err(ConfigError::ZeroTotalWeight)
        );
        assert!(matches!(
            WeightedPool::new(vec![(SymbolKey::Apple, -1.0)]),
            Err(ConfigError::InvalidWeight { .. })
        ));
        assert!(matches!(
            WeightedPool::new(vec![(SymbolKey::Apple, f64::NAN)]),
            Err(ConfigError::InvalidWeight { .. })
        ));
        assert!(WeightedPool::new(vec![(SymbolKey::Apple, 0.0), (SymbolKey::Lemon, 1.0)]).is_ok());
    }

    #[test]
    fn test_reference_pools() {
        let base = WeightedPool::base();
        assert_eq!(base.len(), 8);
        assert!((base.total_weight() - 7.25).abs() < 1e-12);
        assert!(!base.entries().iter().any(|e| e.symbol.is_multiplier()));

        let bonus = WeightedPool::bonus();
        assert_eq!(bonus.len(), 11);
        assert!(!bonus.contains(SymbolKey::Scatter));
        assert!((bonus.total_weight() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_pick_converges_to_weights() {
        let pool = WeightedPool::base();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let draws = 200_000;
        let mut counts = [0usize; SymbolKey::COUNT];
        for _ in 0..draws {
            counts[pool.pick(&mut rng).index()] += 1;
        }

        for entry in pool.entries() {
            let observed = counts[entry.symbol.index()] as f64 / draws as f64;
            let expected = pool.probability(entry.symbol);
            assert!(
                (observed - expected).abs() < 0.01,
                "{}: observed {observed}, expected {expected}",
                entry.symbol
            );
            assert!(counts[entry.symbol.index()] > 0);
        }
    }

    #[test]
    fn test_zero_weight_unreachable() {
        let pool = WeightedPool::new(vec![
            (SymbolKey::Lemon, 1.0),
            (SymbolKey::Peach, 0.0),
            (SymbolKey::Orange, 1.0),
        ])
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..10_000 {
            assert_ne!(pool.pick(&mut rng), SymbolKey::Peach);
        }
    }

    #[test]
    fn test_draw_at_zero_picks_first_entry() {
        let pool = WeightedPool::bonus();
        let mut rng = ZeroRng;
        assert_eq!(pool.pick(&mut rng), SymbolKey::Apple);
        assert_eq!(pool.fallback(), SymbolKey::Apple);
    }

    #[test]
    fn test_pool_serde() {
        let pool = WeightedPool::base();
        let json = serde_json::to_string(&pool).unwrap();
        assert!(json.starts_with("[[\"apple\",1.0]"));
        let back: WeightedPool = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pool);

        let bad = serde_json::from_str::<WeightedPool>("[]");
        assert!(bad.is_err());
    }
}
