//! Error types for unit handling

use thiserror::Error;

/// Result type for unit operations
pub type Result<T> = std::result::Result<T, UnitError>;

/// Errors raised when quantities are combined or converted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Units have different dimensions
    #[error("Cannot convert {from} to {to}: incompatible dimensions")]
    Incompatible {
        /// Source unit symbol
        from: String,
        /// Target unit symbol
        to: String,
    },

    /// Symbol does not name a known unit
    #[error("Unknown unit symbol: {symbol:?}")]
    UnknownSymbol {
        /// The unrecognised symbol
        symbol: String,
    },

    /// Operand shapes cannot be broadcast together
    #[error("Shape mismatch: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        /// Left operand shape
        lhs: Vec<usize>,
        /// Right operand shape
        rhs: Vec<usize>,
    },
}
