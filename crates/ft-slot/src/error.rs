//! Error types for the tumble engine
//!
//! Only configuration can fail. Out-of-order commands are ignored, not errors.

use thiserror::Error;

use crate::symbols::SymbolKey;

/// Configuration error, raised before an engine exists
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Symbol pool is empty")]
    EmptyPool,

    #[error("Invalid weight {weight} for symbol {symbol:?}")]
    InvalidWeight { symbol: SymbolKey, weight: f64 },

    #[error("Symbol pool total weight is zero")]
    ZeroTotalWeight,

    #[error("Multiplier symbol {0:?} is not allowed in the base pool")]
    MultiplierInBasePool(SymbolKey),

    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Invalid bet: {0}")]
    InvalidBet(f64),

    #[error("Invalid pay value {value} for symbol {symbol:?}")]
    InvalidPayValue { symbol: SymbolKey, value: f64 },

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Config parse error: {0}")]
    Parse(String),
}

/// Result type alias
pub type ConfigResult<T> = Result<T, ConfigError>;
